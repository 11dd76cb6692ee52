//! Structured results returned by session actions.
//!
//! Every action answers with one of these; failures are data, not errors.

use crate::domain::{AppointmentSlot, ValidatedAddress};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<AppointmentSlot>,
}

impl AppointmentResponse {
    pub fn found(slot: AppointmentSlot, message: String) -> Self {
        Self {
            success: true,
            message,
            appointment: Some(slot),
        }
    }

    pub fn none(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            appointment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOption {
    pub name: String,
    pub next_available: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOptionsResponse {
    pub success: bool,
    pub providers: Vec<ProviderOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

impl SaveResponse {
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressValidationResponse {
    pub valid: bool,
    pub message: String,
    pub validated_address: Option<ValidatedAddress>,
}
