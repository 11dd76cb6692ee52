//! Confirmation email shapes and the delivery outcome reported by the worker.

use serde::Serialize;

/// Rendered message handed to the transactional email provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Result of one delivery attempt, emitted on the worker's outcome channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub session_id: Option<String>,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered { to: String },
    Failed { reason: String },
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self.status, DeliveryStatus::Delivered { .. })
    }
}
