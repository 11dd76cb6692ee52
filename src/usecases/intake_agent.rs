//! Session actions exposed to the dialogue engine.
//!
//! One `IntakeAgent` per conversation. It owns that session's data, shares the
//! read-only provider directory, and answers every action with a structured
//! result. Nothing here returns an error outward.

use crate::domain::{
    AddressCandidate, AppointmentSlot, ProviderDirectory, SessionData, SessionField, ToolSpec,
    find_next_slot, find_next_slot_for,
};
use crate::ports::Clock;
use crate::usecases::address_normalizer::AddressNormalizer;
use crate::usecases::notification::NotificationJob;
use crate::usecases::responses::{
    AddressValidationResponse, AppointmentResponse, ProviderOption, ProviderOptionsResponse,
    SaveResponse,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const GET_NEXT_APPOINTMENT: &str = "get_next_appointment";
pub const BOOK_NEXT_APPOINTMENT: &str = "book_next_appointment";
pub const GET_PROVIDER_OPTIONS: &str = "get_provider_options";
pub const SAVE_PATIENT_DATA: &str = "save_patient_data";
pub const VALIDATE_ADDRESS: &str = "validate_address";

pub struct IntakeAgent {
    directory: Arc<ProviderDirectory>,
    clock: Arc<dyn Clock>,
    address: AddressNormalizer,
    notifications: mpsc::UnboundedSender<NotificationJob>,
    session: SessionData,
}

#[derive(Deserialize, Default)]
struct ProviderPreferenceArgs {
    #[serde(default)]
    provider_preference: Option<String>,
}

#[derive(Deserialize)]
struct SaveArgs {
    field_name: String,
    field_value: String,
}

#[derive(Deserialize)]
struct ValidateArgs {
    address_data: AddressCandidate,
}

impl IntakeAgent {
    pub fn new(
        directory: Arc<ProviderDirectory>,
        clock: Arc<dyn Clock>,
        address: AddressNormalizer,
        notifications: mpsc::UnboundedSender<NotificationJob>,
    ) -> Self {
        Self {
            directory,
            clock,
            address,
            notifications,
            session: SessionData::default(),
        }
    }

    /// Bind this agent to a session id. Any previous data is discarded.
    pub fn start_session(&mut self, session_id: &str) {
        self.session = SessionData::started(session_id);
        info!(session_id, "intake session started");
    }

    /// Drop everything collected for the current session.
    pub fn end_session(&mut self) {
        if let Some(id) = self.session.session_id() {
            info!(session_id = id, fields = self.session.len(), "intake session ended");
        }
        self.session = SessionData::default();
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    fn next_slot(&self, provider_preference: Option<&str>) -> Option<AppointmentSlot> {
        find_next_slot(&self.directory, self.clock.today(), provider_preference)
    }

    pub fn get_next_appointment(&self, provider_preference: Option<&str>) -> AppointmentResponse {
        match self.next_slot(provider_preference) {
            Some(slot) => {
                let message = format!("Next available: {} on {}", slot.provider, slot.when());
                AppointmentResponse::found(slot, message)
            }
            None => AppointmentResponse::none("No appointments available in the next week"),
        }
    }

    /// Books the next slot into the session and queues the confirmation email.
    /// Only "no slot" fails; save and enqueue problems are logged and ignored.
    pub fn book_next_appointment(&mut self, provider_preference: Option<&str>) -> AppointmentResponse {
        let Some(slot) = self.next_slot(provider_preference) else {
            return AppointmentResponse::none("No appointments available");
        };

        let date = slot.date.format("%Y-%m-%d").to_string();
        let time = slot.time.format(crate::domain::entities::TIME_FORMAT).to_string();
        for (field, value) in [
            (SessionField::AppointmentProvider, slot.provider.as_str()),
            (SessionField::AppointmentDate, date.as_str()),
            (SessionField::AppointmentTime, time.as_str()),
        ] {
            self.store(field, value);
        }

        let job = NotificationJob {
            session: self.session.clone(),
            slot: slot.clone(),
        };
        if self.notifications.send(job).is_err() {
            warn!(session_id = ?self.session.session_id(), "notification worker gone; confirmation not queued");
        }

        info!(session_id = ?self.session.session_id(), provider = %slot.provider, date = %date, "appointment booked");
        let message = format!("Booked with {} on {}", slot.provider, slot.when());
        AppointmentResponse::found(slot, message)
    }

    pub fn get_provider_options(&self) -> ProviderOptionsResponse {
        let today = self.clock.today();
        let providers = self
            .directory
            .providers()
            .iter()
            .filter_map(|provider| {
                find_next_slot_for(provider, today).map(|slot| ProviderOption {
                    name: provider.name.clone(),
                    next_available: slot.when(),
                })
            })
            .collect::<Vec<_>>();
        let message = providers
            .is_empty()
            .then(|| "No providers have openings in the next week".to_string());
        ProviderOptionsResponse {
            success: true,
            providers,
            message,
        }
    }

    pub fn save_patient_data(&mut self, field_name: &str, field_value: &str) -> SaveResponse {
        if !self.session.is_initialized() {
            return SaveResponse::failed("Session not initialized");
        }
        let field = match field_name.parse::<SessionField>() {
            Ok(SessionField::SessionId) => {
                return SaveResponse::failed("Field session_id is reserved");
            }
            Ok(field) => field,
            Err(_) => return SaveResponse::failed(format!("Unknown field: {}", field_name.trim())),
        };
        if self.store(field, field_value) {
            SaveResponse::ok(format!("Successfully saved {}", field))
        } else {
            SaveResponse::failed("Session not initialized")
        }
    }

    /// Single write path into the session store. Returns false when rejected.
    fn store(&mut self, field: SessionField, value: &str) -> bool {
        match self.session.set(field, value) {
            Ok(()) => {
                info!(session_id = ?self.session.session_id(), field = %field, "saved patient field");
                debug!(field = %field, value, "saved value");
                true
            }
            Err(e) => {
                warn!(field = %field, error = %e, "patient field not saved");
                false
            }
        }
    }

    pub async fn validate_address(&mut self, candidate: &AddressCandidate) -> AddressValidationResponse {
        let Some(validated) = self.address.normalize(candidate).await else {
            return AddressValidationResponse {
                valid: false,
                message: "Address needs correction".to_string(),
                validated_address: None,
            };
        };

        for (field, value) in [
            (SessionField::AddressLine1, &validated.line1),
            (SessionField::AddressLine2, &validated.line2),
            (SessionField::City, &validated.city),
            (SessionField::State, &validated.state),
            (SessionField::ZipCode, &validated.zip_code),
        ] {
            self.store(field, value);
        }

        AddressValidationResponse {
            valid: true,
            message: "Address validated successfully".to_string(),
            validated_address: Some(validated),
        }
    }

    /// Dispatch one action by name with JSON arguments and return its JSON result.
    pub async fn invoke(&mut self, name: &str, arguments: Value) -> Value {
        debug!(action = name, "invoking session action");
        match name {
            GET_NEXT_APPOINTMENT => match decode::<ProviderPreferenceArgs>(name, arguments) {
                Ok(args) => to_json(&self.get_next_appointment(args.provider_preference.as_deref())),
                Err(failure) => failure,
            },
            BOOK_NEXT_APPOINTMENT => match decode::<ProviderPreferenceArgs>(name, arguments) {
                Ok(args) => {
                    to_json(&self.book_next_appointment(args.provider_preference.as_deref()))
                }
                Err(failure) => failure,
            },
            GET_PROVIDER_OPTIONS => to_json(&self.get_provider_options()),
            SAVE_PATIENT_DATA => match decode::<SaveArgs>(name, arguments) {
                Ok(args) => to_json(&self.save_patient_data(&args.field_name, &args.field_value)),
                Err(failure) => failure,
            },
            VALIDATE_ADDRESS => match decode::<ValidateArgs>(name, arguments) {
                Ok(args) => to_json(&self.validate_address(&args.address_data).await),
                Err(failure) => failure,
            },
            other => {
                warn!(action = other, "unknown action requested");
                json!({"success": false, "message": format!("Unknown action: {}", other)})
            }
        }
    }

    /// Actions advertised to the dialogue engine.
    pub fn tool_specs() -> Vec<ToolSpec> {
        let field_names: Vec<&'static str> = SessionField::writable().map(SessionField::as_str).collect();
        let provider_preference = json!({
            "type": "object",
            "properties": {
                "provider_preference": {
                    "type": "string",
                    "description": "Optional provider name or part of it; empty for any provider"
                }
            }
        });
        vec![
            ToolSpec {
                name: GET_NEXT_APPOINTMENT,
                description: "Get the next available appointment, optionally for a specific provider",
                parameters: provider_preference.clone(),
            },
            ToolSpec {
                name: BOOK_NEXT_APPOINTMENT,
                description: "Book the next available appointment and send a confirmation email",
                parameters: provider_preference,
            },
            ToolSpec {
                name: GET_PROVIDER_OPTIONS,
                description: "Get list of available providers with their next open slot",
                parameters: json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: SAVE_PATIENT_DATA,
                description: "Save one patient intake field to session memory",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "field_name": {"type": "string", "enum": field_names},
                        "field_value": {"type": "string"}
                    },
                    "required": ["field_name", "field_value"]
                }),
            },
            ToolSpec {
                name: VALIDATE_ADDRESS,
                description: "Validate a mailing address and save the confirmed version",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "address_data": {
                            "type": "object",
                            "properties": {
                                "line1": {"type": "string"},
                                "line2": {"type": "string"},
                                "city": {"type": "string"},
                                "state": {"type": "string"},
                                "zip_code": {"type": "string"}
                            }
                        }
                    },
                    "required": ["address_data"]
                }),
            },
        ]
    }
}

fn decode<T: DeserializeOwned>(action: &str, arguments: Value) -> Result<T, Value> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| {
        warn!(action, error = %e, "undecodable action arguments");
        json!({"success": false, "message": format!("Invalid arguments for {}: {}", action, e)})
    })
}

fn to_json<T: serde::Serialize>(response: &T) -> Value {
    serde_json::to_value(response).unwrap_or_else(
        |e| json!({"success": false, "message": format!("Error encoding result: {}", e)}),
    )
}
