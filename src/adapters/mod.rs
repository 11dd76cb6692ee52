//! Infrastructure adapters. Implement outbound ports.
//!
//! Geocoding, email, dialogue model, startup files, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod clock;
pub mod email;
pub mod files;
pub mod geocoding;
pub mod ui;
