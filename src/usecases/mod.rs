//! Application use cases. Orchestrate domain logic via ports.

pub mod address_normalizer;
pub mod conversation_service;
pub mod intake_agent;
pub mod notification;
pub mod responses;

pub use address_normalizer::AddressNormalizer;
pub use conversation_service::ConversationService;
pub use intake_agent::IntakeAgent;
pub use notification::{NotificationComposer, NotificationJob, NotificationWorker};
