//! Startup file loading: provider directory and dialogue instructions.

pub mod loader;

pub use loader::{load_instructions, load_provider_directory};
