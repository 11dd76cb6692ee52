//! intake-desk: conversational patient intake with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

#[cfg(test)]
mod test_support;
