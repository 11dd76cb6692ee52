//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters. Each call is a single attempt; no retries.

use chrono::NaiveDate;

use crate::domain::{
    DialogueMessage, DialogueTurn, DomainError, GeocodedAddress, OutgoingEmail, ToolSpec,
};

/// Geocoding lookup. Returns the single best match for a free-text query.
#[async_trait::async_trait]
pub trait GeocoderPort: Send + Sync {
    /// `Ok(None)` when the service answered but found nothing.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, DomainError>;
}

/// Transactional email delivery.
#[async_trait::async_trait]
pub trait MailerPort: Send + Sync {
    /// Send one message. The sender address is adapter configuration.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DomainError>;
}

/// Language-model dialogue engine that decides the next utterance or action.
#[async_trait::async_trait]
pub trait DialoguePort: Send + Sync {
    /// Run one model round over the transcript with the given actions available.
    async fn next_turn(
        &self,
        instructions: &str,
        history: &[DialogueMessage],
        tools: &[ToolSpec],
    ) -> Result<DialogueTurn, DomainError>;
}

/// Source of "today" for slot searches.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
