//! Implements InputPort. Inquire-based terminal front end for one intake session.
//!
//! With a dialogue model configured, the patient chats in free text. Without
//! one, an action menu calls the same session actions directly.

use crate::adapters::ui::progress::spinner;
use crate::domain::{AddressCandidate, DomainError, SessionField};
use crate::ports::InputPort;
use crate::usecases::{ConversationService, IntakeAgent};
use async_trait::async_trait;
use crossterm::style::Stylize;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Select, Text};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

const ACTION_NEXT: &str = "Find next appointment";
const ACTION_BOOK: &str = "Book next appointment";
const ACTION_PROVIDERS: &str = "List providers";
const ACTION_SAVE: &str = "Save a patient field";
const ACTION_ADDRESS: &str = "Validate address";
const ACTION_QUIT: &str = "End session";

const PROVIDER_PROMPT: &str = "Provider (blank for any):";
const ADDRESS_PROMPTS: [&str; 5] = [
    "Street address:",
    "Apt / suite (optional):",
    "City:",
    "State:",
    "ZIP code:",
];

/// Applies the prompt theme for every subsequent inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightCyan))
        .with_answered_prompt_prefix(Styled::new("✓").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

enum Shell {
    Conversational(ConversationService),
    Manual(IntakeAgent),
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    shell: Mutex<Shell>,
    session_id: String,
}

impl TuiInputPort {
    pub fn conversational(conversation: ConversationService, session_id: String) -> Self {
        Self {
            shell: Mutex::new(Shell::Conversational(conversation)),
            session_id,
        }
    }

    pub fn manual(agent: IntakeAgent, session_id: String) -> Self {
        Self {
            shell: Mutex::new(Shell::Manual(agent)),
            session_id,
        }
    }

    async fn run_chat(&self, conversation: &mut ConversationService) -> Result<(), DomainError> {
        let pb = spinner("Connecting to the intake assistant...");
        let greeting = conversation.start(&self.session_id).await;
        pb.finish_and_clear();
        say(greeting);

        loop {
            let line = match Text::new("You:").prompt() {
                Ok(line) => line,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(e) => return Err(DomainError::Ui(e.to_string())),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
                break;
            }

            let pb = spinner("Thinking...");
            let reply = conversation.respond(line).await;
            pb.finish_and_clear();
            say(reply);
        }

        conversation.end();
        Ok(())
    }

    async fn run_manual(&self, agent: &mut IntakeAgent) -> Result<(), DomainError> {
        agent.start_session(&self.session_id);
        println!(
            "{} no dialogue model configured; using the action menu.",
            "Manual mode:".yellow().bold()
        );

        let options = vec![
            ACTION_NEXT,
            ACTION_BOOK,
            ACTION_PROVIDERS,
            ACTION_SAVE,
            ACTION_ADDRESS,
            ACTION_QUIT,
        ];
        loop {
            let choice = match Select::new("Action:", options.clone()).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(e) => return Err(DomainError::Ui(e.to_string())),
            };

            // Esc inside a sub-prompt abandons that action and returns to the menu.
            match choice {
                ACTION_NEXT => {
                    let Some(preference) = skip_on_cancel(Text::new(PROVIDER_PROMPT).prompt())?
                    else {
                        continue;
                    };
                    show(&agent.get_next_appointment(non_blank(&preference)));
                }
                ACTION_BOOK => {
                    let Some(preference) = skip_on_cancel(Text::new(PROVIDER_PROMPT).prompt())?
                    else {
                        continue;
                    };
                    show(&agent.book_next_appointment(non_blank(&preference)));
                }
                ACTION_PROVIDERS => show(&agent.get_provider_options()),
                ACTION_SAVE => {
                    let fields: Vec<&str> = SessionField::writable().map(SessionField::as_str).collect();
                    let Some(field) = skip_on_cancel(Select::new("Field:", fields).prompt())? else {
                        continue;
                    };
                    let Some(value) = skip_on_cancel(Text::new("Value:").prompt())? else {
                        continue;
                    };
                    show(&agent.save_patient_data(field, &value));
                }
                ACTION_ADDRESS => {
                    let Some(candidate) = ask_address()? else {
                        continue;
                    };
                    let pb = spinner("Validating address...");
                    let response = agent.validate_address(&candidate).await;
                    pb.finish_and_clear();
                    show(&response);
                }
                _ => break,
            }
        }

        agent.end_session();
        Ok(())
    }
}

/// `Ok(None)` when the user pressed Esc; other prompt failures are errors.
fn skip_on_cancel<T>(answer: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn non_blank(answer: &str) -> Option<&str> {
    let answer = answer.trim();
    (!answer.is_empty()).then_some(answer)
}

fn ask_address() -> Result<Option<AddressCandidate>, DomainError> {
    let mut parts = Vec::with_capacity(ADDRESS_PROMPTS.len());
    for prompt in ADDRESS_PROMPTS {
        let Some(answer) = skip_on_cancel(Text::new(prompt).prompt())? else {
            return Ok(None);
        };
        parts.push(non_blank(&answer).map(str::to_string));
    }
    let mut parts = parts.into_iter();
    let mut next = || parts.next().flatten();
    Ok(Some(AddressCandidate {
        line1: next(),
        line2: next(),
        city: next(),
        state: next(),
        zip_code: next(),
    }))
}

fn say(reply: Result<String, DomainError>) {
    match reply {
        Ok(text) => println!("{} {}", "Assistant:".cyan().bold(), text),
        Err(e) => {
            warn!(error = %e, "dialogue turn failed");
            println!(
                "{} Sorry, I'm having trouble right now. Could you say that again?",
                "Assistant:".cyan().bold()
            );
        }
    }
}

fn show<T: Serialize>(response: &T) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "could not render action result"),
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut shell = self.shell.lock().await;
        let result = match &mut *shell {
            Shell::Conversational(conversation) => self.run_chat(conversation).await,
            Shell::Manual(agent) => self.run_manual(agent).await,
        };
        info!(session_id = %self.session_id, "session closed");
        result
    }
}
