//! Reads the provider configuration and the intake prompt from disk.
//!
//! Both are read once at startup. Any failure here is fatal to the caller.

use crate::domain::{DomainError, ProviderDirectory};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Load and parse the provider directory (JSON array of provider records).
pub async fn load_provider_directory(path: impl AsRef<Path>) -> Result<ProviderDirectory, DomainError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).await.map_err(|e| {
        DomainError::Config(format!("read provider file {}: {}", path.display(), e))
    })?;
    let directory = ProviderDirectory::from_json(&raw)?;
    info!(path = %path.display(), providers = directory.len(), "provider directory loaded");
    Ok(directory)
}

/// Load the behavioral prompt for the dialogue engine. Passed through verbatim (trimmed).
pub async fn load_instructions(path: impl AsRef<Path>) -> Result<String, DomainError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).await.map_err(|e| {
        DomainError::Config(format!("read prompt file {}: {}", path.display(), e))
    })?;
    let instructions = raw.trim().to_string();
    if instructions.is_empty() {
        return Err(DomainError::Config(format!(
            "prompt file {} is empty",
            path.display()
        )));
    }
    info!(path = %path.display(), chars = instructions.len(), "intake prompt loaded");
    Ok(instructions)
}
