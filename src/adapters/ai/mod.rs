//! AI adapter module. Implements DialoguePort for LLM-driven conversation.

pub mod openai_adapter;

pub use openai_adapter::OpenAiAdapter;
