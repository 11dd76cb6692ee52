//! Booking confirmation email: template rendering and the background sender.
//!
//! Booking enqueues a `NotificationJob` and returns immediately. The worker
//! makes one send attempt per job and reports every result on its outcome
//! channel, so delivery failures are observable without touching the booking.

use crate::domain::{
    AppointmentSlot, DeliveryStatus, DomainError, NotificationOutcome, OutgoingEmail, SessionData,
    SessionField,
};
use crate::ports::MailerPort;
use std::sync::Arc;
use tera::{Context, Tera};
use tokio::sync::mpsc;
use tracing::{error, info};

pub const CONFIRMATION_SUBJECT: &str = "Your Appointment Confirmation";

const PLACEHOLDER: &str = "Not provided";

/// Snapshot of a booked session, queued for the worker.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub session: SessionData,
    pub slot: AppointmentSlot,
}

const TEMPLATE_NAME: &str = "confirmation.html";

/// Renders the fixed confirmation document from session fields.
///
/// The template name ends in `.html`, so tera autoescapes every value.
pub struct NotificationComposer {
    templates: Tera,
}

impl NotificationComposer {
    pub fn new() -> Result<Self, DomainError> {
        let mut templates = Tera::default();
        templates
            .add_raw_template(
                TEMPLATE_NAME,
                include_str!("../../templates/confirmation_email.html"),
            )
            .map_err(|e| DomainError::Notification(format!("template error: {}", e)))?;
        Ok(Self { templates })
    }

    /// Build the outgoing email. Fails when the session has no email address.
    pub fn compose(
        &self,
        session: &SessionData,
        slot: &AppointmentSlot,
    ) -> Result<OutgoingEmail, DomainError> {
        let to = session
            .present(SessionField::Email)
            .ok_or_else(|| DomainError::Notification("no recipient email".to_string()))?;
        Ok(OutgoingEmail {
            to: to.trim().to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            html: self.render(session, slot)?,
        })
    }

    pub fn render(
        &self,
        session: &SessionData,
        slot: &AppointmentSlot,
    ) -> Result<String, DomainError> {
        let field = |f: SessionField| session.present(f).unwrap_or(PLACEHOLDER);
        let address_parts: Vec<&str> = [
            SessionField::AddressLine1,
            SessionField::AddressLine2,
            SessionField::City,
            SessionField::State,
            SessionField::ZipCode,
        ]
        .into_iter()
        .filter_map(|f| session.present(f))
        .map(str::trim)
        .collect();
        let address = if address_parts.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            address_parts.join(", ")
        };

        let mut context = Context::new();
        context.insert("name", field(SessionField::PatientName));
        context.insert("provider", &slot.provider);
        context.insert("day", &slot.day_of_week);
        context.insert("date", &slot.formatted_date);
        context.insert("time", &slot.formatted_time);
        context.insert("dob", field(SessionField::DateOfBirth));
        context.insert("phone", field(SessionField::Phone));
        context.insert("email", field(SessionField::Email));
        context.insert("address", &address);
        context.insert("payer", field(SessionField::InsurancePayer));
        context.insert("member_id", field(SessionField::InsuranceId));
        context.insert("referral", field(SessionField::ReferralPhysician));
        context.insert("complaint", field(SessionField::ChiefComplaint));

        self.templates
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| DomainError::Notification(format!("template render failed: {}", e)))
    }
}

/// Background sender. Consumes jobs until every sender handle is dropped.
pub struct NotificationWorker {
    composer: NotificationComposer,
    mailer: Arc<dyn MailerPort>,
    rx: mpsc::UnboundedReceiver<NotificationJob>,
    outcomes: mpsc::UnboundedSender<NotificationOutcome>,
}

impl NotificationWorker {
    pub fn new(
        composer: NotificationComposer,
        mailer: Arc<dyn MailerPort>,
        rx: mpsc::UnboundedReceiver<NotificationJob>,
        outcomes: mpsc::UnboundedSender<NotificationOutcome>,
    ) -> Self {
        Self {
            composer,
            mailer,
            rx,
            outcomes,
        }
    }

    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            let outcome = self.deliver(&job).await;
            match &outcome.status {
                DeliveryStatus::Delivered { to } => {
                    info!(session_id = ?outcome.session_id, to = %to, "confirmation email sent")
                }
                DeliveryStatus::Failed { reason } => {
                    error!(session_id = ?outcome.session_id, error = %reason, "confirmation email failed")
                }
            }
            // Nobody listening is fine; the log line above is the fallback sink.
            let _ = self.outcomes.send(outcome);
        }
        info!("notification worker finished (channel closed)");
    }

    async fn deliver(&self, job: &NotificationJob) -> NotificationOutcome {
        let session_id = job.session.session_id().map(str::to_string);
        let status = match self.composer.compose(&job.session, &job.slot) {
            Ok(email) => match self.mailer.send(&email).await {
                Ok(()) => DeliveryStatus::Delivered { to: email.to },
                Err(e) => DeliveryStatus::Failed {
                    reason: e.to_string(),
                },
            },
            Err(e) => DeliveryStatus::Failed {
                reason: e.to_string(),
            },
        };
        NotificationOutcome { session_id, status }
    }
}
