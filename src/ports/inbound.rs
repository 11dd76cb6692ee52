//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: terminal front end drives one intake session.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the session until the patient leaves.
    async fn run(&self) -> Result<(), DomainError>;
}
