//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod address;
pub mod dialogue;
pub mod entities;
pub mod errors;
pub mod notification;
pub mod session;
pub mod slots;

pub use address::{AddressCandidate, GeocodedAddress, ValidatedAddress};
pub use dialogue::{DialogueMessage, DialogueTurn, ToolCall, ToolSpec};
pub use entities::{AppointmentSlot, Provider, ProviderDirectory, ScheduleEntry};
pub use errors::DomainError;
pub use notification::{DeliveryStatus, NotificationOutcome, OutgoingEmail};
pub use session::{SessionData, SessionField};
pub use slots::{find_next_slot, find_next_slot_for};
