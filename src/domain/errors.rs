//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Session actions never
//! return them outward; they are folded into structured responses.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Dialogue engine error: {0}")]
    Dialogue(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("UI error: {0}")]
    Ui(String),
}
