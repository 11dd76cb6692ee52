//! Conversation loop: feeds the transcript to the dialogue engine and runs the
//! actions it asks for, strictly one at a time, until it answers in text.

use crate::domain::{DialogueMessage, DomainError, ToolSpec};
use crate::ports::DialoguePort;
use crate::usecases::intake_agent::IntakeAgent;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tool rounds allowed per utterance before the model is asked to answer in text.
pub const MAX_TOOL_ROUNDS: usize = 8;

pub struct ConversationService {
    agent: IntakeAgent,
    dialogue: Arc<dyn DialoguePort>,
    instructions: String,
    tools: Vec<ToolSpec>,
    history: Vec<DialogueMessage>,
}

impl ConversationService {
    pub fn new(agent: IntakeAgent, dialogue: Arc<dyn DialoguePort>, instructions: String) -> Self {
        Self {
            agent,
            dialogue,
            instructions,
            tools: IntakeAgent::tool_specs(),
            history: Vec::new(),
        }
    }

    pub fn agent(&self) -> &IntakeAgent {
        &self.agent
    }

    pub fn history(&self) -> &[DialogueMessage] {
        &self.history
    }

    /// Start a session and return the model's greeting.
    pub async fn start(&mut self, session_id: &str) -> Result<String, DomainError> {
        self.agent.start_session(session_id);
        self.history.clear();
        self.history.push(DialogueMessage::System {
            content: format!(
                "Greet the user and begin the healthcare intake process. Your session ID is {}.",
                session_id
            ),
        });
        self.run_rounds().await
    }

    /// Handle one patient utterance and return the reply to speak.
    pub async fn respond(&mut self, utterance: &str) -> Result<String, DomainError> {
        self.history.push(DialogueMessage::User {
            content: utterance.to_string(),
        });
        self.run_rounds().await
    }

    pub fn end(&mut self) {
        self.agent.end_session();
        self.history.clear();
    }

    async fn run_rounds(&mut self) -> Result<String, DomainError> {
        for round in 0..=MAX_TOOL_ROUNDS {
            // Last round offers no tools, forcing a text answer.
            let final_round = round == MAX_TOOL_ROUNDS;
            let tools: &[ToolSpec] = if final_round { &[] } else { &self.tools };
            let turn = self
                .dialogue
                .next_turn(&self.instructions, &self.history, tools)
                .await?;

            if final_round && !turn.tool_calls.is_empty() {
                // Calls on the tool-less round are never executed.
                warn!(
                    rounds = MAX_TOOL_ROUNDS,
                    dropped = turn.tool_calls.len(),
                    "dialogue engine kept calling actions"
                );
                return match turn.text.filter(|t| !t.trim().is_empty()) {
                    Some(reply) => Ok(self.reply(reply)),
                    None => Err(DomainError::Dialogue(
                        "model did not produce a reply".to_string(),
                    )),
                };
            }

            if turn.tool_calls.is_empty() {
                return Ok(self.reply(turn.text.unwrap_or_default()));
            }

            self.history.push(DialogueMessage::Assistant {
                content: turn.text,
                tool_calls: turn.tool_calls.clone(),
            });
            for call in turn.tool_calls {
                info!(action = %call.name, round, "dialogue engine invoked action");
                let result = self.agent.invoke(&call.name, call.arguments).await;
                debug!(action = %call.name, result = %result, "action result");
                self.history.push(DialogueMessage::Tool {
                    call_id: call.id,
                    content: result.to_string(),
                });
            }
        }
        Err(DomainError::Dialogue(
            "model did not produce a reply".to_string(),
        ))
    }

    fn reply(&mut self, text: String) -> String {
        self.history.push(DialogueMessage::Assistant {
            content: Some(text.clone()),
            tool_calls: Vec::new(),
        });
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DialogueTurn, GeocodedAddress, Provider, ProviderDirectory, ScheduleEntry, SessionField,
        ToolCall,
    };
    use crate::ports::{Clock, GeocoderPort};
    use crate::usecases::address_normalizer::AddressNormalizer;
    use crate::usecases::notification::NotificationJob;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct ScriptedDialogue {
        turns: Mutex<VecDeque<DialogueTurn>>,
        seen_tools: Mutex<Vec<usize>>,
    }

    impl ScriptedDialogue {
        fn new(turns: Vec<DialogueTurn>) -> Arc<Self> {
            Arc::new(Self {
                turns: Mutex::new(turns.into()),
                seen_tools: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl DialoguePort for ScriptedDialogue {
        async fn next_turn(
            &self,
            _instructions: &str,
            _history: &[DialogueMessage],
            tools: &[ToolSpec],
        ) -> Result<DialogueTurn, DomainError> {
            self.seen_tools.lock().unwrap().push(tools.len());
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| DomainError::Dialogue("script exhausted".to_string()))
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        }
    }

    struct NoGeocoder;

    #[async_trait::async_trait]
    impl GeocoderPort for NoGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Option<GeocodedAddress>, DomainError> {
            Ok(None)
        }
    }

    fn agent() -> IntakeAgent {
        let (tx, _rx) = mpsc::unbounded_channel();
        agent_with_jobs(tx)
    }

    fn agent_with_jobs(tx: mpsc::UnboundedSender<NotificationJob>) -> IntakeAgent {
        IntakeAgent::new(
            Arc::new(ProviderDirectory::new(vec![Provider {
                name: "Dr. Ada Lane".to_string(),
                schedule: vec![ScheduleEntry {
                    day: Weekday::Mon,
                    start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                }],
            }])),
            Arc::new(FixedClock),
            AddressNormalizer::new(Arc::new(NoGeocoder)),
            tx,
        )
    }

    fn text(reply: &str) -> DialogueTurn {
        DialogueTurn {
            text: Some(reply.to_string()),
            tool_calls: vec![],
        }
    }

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> DialogueTurn {
        DialogueTurn {
            text: None,
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            }],
        }
    }

    #[tokio::test]
    async fn test_start_greets_with_session_id() {
        let dialogue = ScriptedDialogue::new(vec![text("Hi! What's your full name?")]);
        let mut conversation = ConversationService::new(agent(), dialogue, "Be kind.".to_string());

        let greeting = conversation.start("room-42").await.unwrap();
        assert_eq!(greeting, "Hi! What's your full name?");
        assert_eq!(conversation.agent().session().session_id(), Some("room-42"));
        match &conversation.history()[0] {
            DialogueMessage::System { content } => assert!(content.contains("room-42")),
            other => panic!("unexpected first message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_calls_run_before_text_reply() {
        let dialogue = ScriptedDialogue::new(vec![
            text("Hello!"),
            call(
                "c1",
                "save_patient_data",
                json!({"field_name": "patient_name", "field_value": "Jo Smith"}),
            ),
            call("c2", "get_next_appointment", json!({})),
            text("Dr. Ada Lane is free Monday at 9."),
        ]);
        let mut conversation = ConversationService::new(agent(), dialogue, "Be kind.".to_string());
        conversation.start("room-1").await.unwrap();

        let reply = conversation.respond("I'm Jo Smith").await.unwrap();
        assert_eq!(reply, "Dr. Ada Lane is free Monday at 9.");
        assert_eq!(
            conversation.agent().session().get(SessionField::PatientName),
            Some("Jo Smith")
        );

        let tool_results: Vec<&String> = conversation
            .history()
            .iter()
            .filter_map(|m| match m {
                DialogueMessage::Tool { content, .. } => Some(content),
                _ => None,
            })
            .collect();
        assert_eq!(tool_results.len(), 2);
        assert!(tool_results[1].contains("Dr. Ada Lane"));
    }

    #[tokio::test]
    async fn test_runaway_tool_loop_ends_with_toolless_round() {
        let mut turns: Vec<DialogueTurn> = (0..MAX_TOOL_ROUNDS)
            .map(|i| call(&format!("c{}", i), "get_provider_options", json!({})))
            .collect();
        turns.push(text("Here are the providers."));
        let dialogue = ScriptedDialogue::new(turns);
        let mut conversation =
            ConversationService::new(agent(), dialogue.clone(), "Be kind.".to_string());

        let reply = conversation.respond("who is available?").await.unwrap();
        assert_eq!(reply, "Here are the providers.");
        let seen = dialogue.seen_tools.lock().unwrap();
        assert_eq!(seen.len(), MAX_TOOL_ROUNDS + 1);
        assert_eq!(*seen.last().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_calls_on_toolless_round_are_not_executed() {
        let mut turns: Vec<DialogueTurn> = (0..=MAX_TOOL_ROUNDS)
            .map(|i| {
                call(
                    &format!("c{}", i),
                    "save_patient_data",
                    json!({"field_name": "chief_complaint", "field_value": format!("round {}", i)}),
                )
            })
            .collect();
        turns[MAX_TOOL_ROUNDS].text = Some("Let me check on that.".to_string());
        let dialogue = ScriptedDialogue::new(turns);
        let mut conversation =
            ConversationService::new(agent(), dialogue.clone(), "Be kind.".to_string());
        conversation.agent.start_session("room-1");

        let reply = conversation.respond("my knee hurts").await.unwrap();
        assert_eq!(reply, "Let me check on that.");
        assert_eq!(
            conversation.agent().session().get(SessionField::ChiefComplaint),
            Some(format!("round {}", MAX_TOOL_ROUNDS - 1).as_str())
        );
        let executed = conversation
            .history()
            .iter()
            .filter(|m| matches!(m, DialogueMessage::Tool { .. }))
            .count();
        assert_eq!(executed, MAX_TOOL_ROUNDS);
        assert_eq!(*dialogue.seen_tools.lock().unwrap().last().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_toolless_round_without_text_is_an_error() {
        let turns: Vec<DialogueTurn> = (0..=MAX_TOOL_ROUNDS)
            .map(|i| call(&format!("c{}", i), "book_next_appointment", json!({})))
            .collect();
        let dialogue = ScriptedDialogue::new(turns);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut agent = agent_with_jobs(tx);
        agent.start_session("room-1");
        let mut conversation = ConversationService::new(agent, dialogue, "Be kind.".to_string());

        assert!(conversation.respond("book me").await.is_err());
        let mut queued = 0;
        while rx.try_recv().is_ok() {
            queued += 1;
        }
        assert_eq!(queued, MAX_TOOL_ROUNDS);
    }

    #[tokio::test]
    async fn test_dialogue_failure_propagates() {
        let dialogue = ScriptedDialogue::new(vec![]);
        let mut conversation = ConversationService::new(agent(), dialogue, "Be kind.".to_string());
        assert!(conversation.respond("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_end_clears_session_and_history() {
        let dialogue = ScriptedDialogue::new(vec![text("Hello!")]);
        let mut conversation = ConversationService::new(agent(), dialogue, "Be kind.".to_string());
        conversation.start("room-1").await.unwrap();
        conversation.end();
        assert!(conversation.history().is_empty());
        assert!(!conversation.agent().session().is_initialized());
    }
}
