//! mb-email: Email sending for mailbot
//!
//! A mail sender that reports every outcome as a human-readable line, the
//! SMTP transport behind it, and the `send_email` tool agents call.

pub mod error;
pub mod send;
pub mod tools;

pub use error::{EmailError, Result};
pub use send::{MailSender, MailTransport, OutgoingEmail, SmtpMailTransport};
pub use tools::EmailSendTool;
