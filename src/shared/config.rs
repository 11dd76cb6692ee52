//! Application configuration. File paths, service endpoints, credentials.

use serde::Deserialize;

use crate::adapters::email::resend::RESEND_EMAILS_URL;
use crate::adapters::geocoding::here::HERE_GEOCODE_URL;

pub const DEFAULT_PROVIDERS_PATH: &str = "providers.json";
pub const DEFAULT_PROMPT_PATH: &str = "healthcare_intake_prompt.md";
pub const DEFAULT_AI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Provider directory (JSON). Read from INTAKE_PROVIDERS_PATH.
    #[serde(default)]
    pub providers_path: Option<String>,

    /// Dialogue instructions (free text). Read from INTAKE_PROMPT_PATH.
    #[serde(default)]
    pub prompt_path: Option<String>,

    /// Fixed session id (e.g. room name). Generated per run when unset. Read from INTAKE_SESSION_ID.
    #[serde(default)]
    pub session_id: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Geocoding (HERE)
    // ─────────────────────────────────────────────────────────────────────────
    /// HERE API key. Read from INTAKE_HERE_API_KEY or HERE_API_KEY.
    #[serde(default)]
    pub here_api_key: Option<String>,

    /// HERE geocode endpoint. Read from INTAKE_HERE_GEOCODE_URL.
    #[serde(default)]
    pub here_geocode_url: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Email (Resend)
    // ─────────────────────────────────────────────────────────────────────────
    /// Email API key. Read from INTAKE_EMAIL_API_KEY or RESEND_API_KEY.
    #[serde(default)]
    pub email_api_key: Option<String>,

    /// Email send endpoint. Read from INTAKE_EMAIL_API_URL.
    #[serde(default)]
    pub email_api_url: Option<String>,

    /// From address for confirmations. Read from INTAKE_SENDER_EMAIL or SENDER_EMAIL.
    #[serde(default)]
    pub sender_email: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogue model
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key. Read from INTAKE_AI_API_KEY or OPENAI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from INTAKE_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4o-mini". Read from INTAKE_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("INTAKE"));
        if let Ok(path) = std::env::var("INTAKE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn providers_path_or_default(&self) -> String {
        self.providers_path
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDERS_PATH.to_string())
    }

    pub fn prompt_path_or_default(&self) -> String {
        self.prompt_path
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT_PATH.to_string())
    }

    /// Configured session id, or `intake-YYYYMMDD-HHMMSS` from the local clock.
    pub fn session_id_or_generated(&self) -> String {
        self.session_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("intake-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")))
    }

    /// Returns the HERE API key from config or HERE_API_KEY env.
    pub fn here_api_key(&self) -> Option<String> {
        non_empty(
            self.here_api_key
                .clone()
                .or_else(|| std::env::var("HERE_API_KEY").ok()),
        )
    }

    pub fn here_geocode_url_or_default(&self) -> String {
        self.here_geocode_url
            .clone()
            .unwrap_or_else(|| HERE_GEOCODE_URL.to_string())
    }

    /// Returns the email API key from config or RESEND_API_KEY env.
    pub fn email_api_key(&self) -> Option<String> {
        non_empty(
            self.email_api_key
                .clone()
                .or_else(|| std::env::var("RESEND_API_KEY").ok()),
        )
    }

    pub fn email_api_url_or_default(&self) -> String {
        self.email_api_url
            .clone()
            .unwrap_or_else(|| RESEND_EMAILS_URL.to_string())
    }

    /// Returns the sender address from config or SENDER_EMAIL env.
    pub fn sender_email(&self) -> Option<String> {
        non_empty(
            self.sender_email
                .clone()
                .or_else(|| std::env::var("SENDER_EMAIL").ok()),
        )
    }

    /// Returns the AI API key from config or OPENAI_API_KEY env.
    pub fn ai_api_key(&self) -> Option<String> {
        non_empty(
            self.ai_api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok()),
        )
    }

    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
    }

    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string())
    }

    /// Returns true if the dialogue model is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
