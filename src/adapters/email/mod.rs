//! Email adapters. Implement MailerPort.

pub mod resend;

pub use resend::ResendMailer;
