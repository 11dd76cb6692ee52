//! Per-session intake data: an enumerated key set over string values.
//!
//! Owned by exactly one session; nothing else reads or writes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Known intake fields. Add a variant (and its wire name) to extend the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
    SessionId,
    PatientName,
    DateOfBirth,
    Phone,
    Email,
    InsurancePayer,
    InsuranceId,
    ReferralPhysician,
    ChiefComplaint,
    AddressLine1,
    AddressLine2,
    City,
    State,
    ZipCode,
    AppointmentProvider,
    AppointmentDate,
    AppointmentTime,
}

impl SessionField {
    pub const ALL: [SessionField; 17] = [
        SessionField::SessionId,
        SessionField::PatientName,
        SessionField::DateOfBirth,
        SessionField::Phone,
        SessionField::Email,
        SessionField::InsurancePayer,
        SessionField::InsuranceId,
        SessionField::ReferralPhysician,
        SessionField::ChiefComplaint,
        SessionField::AddressLine1,
        SessionField::AddressLine2,
        SessionField::City,
        SessionField::State,
        SessionField::ZipCode,
        SessionField::AppointmentProvider,
        SessionField::AppointmentDate,
        SessionField::AppointmentTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionField::SessionId => "session_id",
            SessionField::PatientName => "patient_name",
            SessionField::DateOfBirth => "date_of_birth",
            SessionField::Phone => "phone",
            SessionField::Email => "email",
            SessionField::InsurancePayer => "insurance_payer",
            SessionField::InsuranceId => "insurance_id",
            SessionField::ReferralPhysician => "referral_physician",
            SessionField::ChiefComplaint => "chief_complaint",
            SessionField::AddressLine1 => "address_line1",
            SessionField::AddressLine2 => "address_line2",
            SessionField::City => "city",
            SessionField::State => "state",
            SessionField::ZipCode => "zip_code",
            SessionField::AppointmentProvider => "appointment_provider",
            SessionField::AppointmentDate => "appointment_date",
            SessionField::AppointmentTime => "appointment_time",
        }
    }

    /// Fields the dialogue engine may write. `session_id` is set only by session start.
    pub fn writable() -> impl Iterator<Item = SessionField> {
        Self::ALL
            .into_iter()
            .filter(|f| *f != SessionField::SessionId)
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| DomainError::Session(format!("Unknown field: {}", wanted)))
    }
}

/// Accumulated intake answers for one session.
///
/// Empty until a session id is assigned; writes before that are rejected.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    session_id: Option<String>,
    fields: BTreeMap<SessionField, String>,
}

impl SessionData {
    /// Fresh store for `session_id`, holding only the id itself.
    pub fn started(session_id: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(SessionField::SessionId, session_id.to_string());
        Self {
            session_id: Some(session_id.to_string()),
            fields,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn set(&mut self, field: SessionField, value: impl Into<String>) -> Result<(), DomainError> {
        if !self.is_initialized() {
            return Err(DomainError::Session("Session not initialized".to_string()));
        }
        self.fields.insert(field, value.into());
        Ok(())
    }

    pub fn get(&self, field: SessionField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Non-empty value, if any.
    pub fn present(&self, field: SessionField) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
