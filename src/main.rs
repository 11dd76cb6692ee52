//! Wiring & DI. Entry point: load configuration and startup files, build adapters,
//! start the notification worker, run one intake session in the terminal.
//! No business logic here.

use dotenv::dotenv;
use intake_desk::adapters::ai::OpenAiAdapter;
use intake_desk::adapters::clock::SystemClock;
use intake_desk::adapters::email::ResendMailer;
use intake_desk::adapters::files::{load_instructions, load_provider_directory};
use intake_desk::adapters::geocoding::HereGeocoder;
use intake_desk::adapters::ui::tui::TuiInputPort;
use intake_desk::domain::{DeliveryStatus, NotificationOutcome};
use intake_desk::ports::{Clock, DialoguePort, GeocoderPort, InputPort, MailerPort};
use intake_desk::shared::config::AppConfig;
use intake_desk::usecases::{
    AddressNormalizer, ConversationService, IntakeAgent, NotificationComposer, NotificationJob,
    NotificationWorker,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed; using defaults");
        AppConfig::default()
    });

    // --- Startup files: any failure here stops the process ---
    let directory = Arc::new(
        load_provider_directory(cfg.providers_path_or_default())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    let instructions = load_instructions(cfg.prompt_path_or_default())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if directory.is_empty() {
        warn!("provider directory is empty; no appointments can be offered");
    }

    // --- External services: missing credentials degrade to permanent failure ---
    let here_key = cfg.here_api_key();
    if here_key.is_none() {
        warn!("HERE_API_KEY not set; every address will be reported as needing correction");
    }
    let geocoder: Arc<dyn GeocoderPort> =
        Arc::new(HereGeocoder::new(cfg.here_geocode_url_or_default(), here_key));

    let email_key = cfg.email_api_key();
    let sender = cfg.sender_email();
    if email_key.is_none() || sender.is_none() {
        warn!("RESEND_API_KEY or SENDER_EMAIL not set; confirmation emails will fail");
    }
    let mailer: Arc<dyn MailerPort> = Arc::new(ResendMailer::new(
        cfg.email_api_url_or_default(),
        email_key,
        sender,
    ));

    // --- Notification pipeline: booking enqueues, worker sends, outcomes are logged ---
    let (job_tx, job_rx) = mpsc::unbounded_channel::<NotificationJob>();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<NotificationOutcome>();
    let composer = NotificationComposer::new().map_err(|e| anyhow::anyhow!("{}", e))?;
    let worker = NotificationWorker::new(composer, Arc::clone(&mailer), job_rx, outcome_tx);
    let worker_handle = tokio::spawn(worker.run());
    let outcome_handle = tokio::spawn(log_outcomes(outcome_rx));

    // --- Session ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let agent = IntakeAgent::new(
        Arc::clone(&directory),
        clock,
        AddressNormalizer::new(geocoder),
        job_tx,
    );
    let session_id = cfg.session_id_or_generated();

    intake_desk::adapters::ui::init_ui();

    let input_port: Arc<dyn InputPort> = if let Some(api_key) = cfg.ai_api_key() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "dialogue model enabled"
        );
        let dialogue: Arc<dyn DialoguePort> = Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            api_key,
            cfg.ai_model_or_default(),
        ));
        let conversation = ConversationService::new(agent, dialogue, instructions);
        Arc::new(TuiInputPort::conversational(conversation, session_id))
    } else {
        warn!("OPENAI_API_KEY not set, using manual action menu");
        Arc::new(TuiInputPort::manual(agent, session_id))
    };

    let run_result = input_port.run().await;

    // Dropping the port drops the last job sender; the worker drains and exits.
    drop(input_port);
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "notification worker aborted");
    }
    if let Err(e) = outcome_handle.await {
        warn!(error = %e, "outcome logger aborted");
    }

    run_result.map_err(|e| anyhow::anyhow!("{}", e))
}

/// Observability sink for confirmation email results.
async fn log_outcomes(mut outcomes: mpsc::UnboundedReceiver<NotificationOutcome>) {
    while let Some(outcome) = outcomes.recv().await {
        match outcome.status {
            DeliveryStatus::Delivered { to } => {
                info!(session_id = ?outcome.session_id, to = %to, "confirmation delivered")
            }
            DeliveryStatus::Failed { reason } => {
                warn!(session_id = ?outcome.session_id, reason = %reason, "confirmation not delivered")
            }
        }
    }
}
