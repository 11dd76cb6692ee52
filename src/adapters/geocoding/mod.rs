//! Geocoding adapters. Implement GeocoderPort.

pub mod here;

pub use here::HereGeocoder;
