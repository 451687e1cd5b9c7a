//! Error types for mb-email

use thiserror::Error;

/// mb-email error type
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("SMTP configuration error: {0}")]
    SmtpConfig(String),

    #[error("SMTP send error: {0}")]
    SmtpSend(String),

    #[error("Message build error: {0}")]
    MessageBuild(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Recipient rejected: {0}")]
    RecipientRejected(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EmailError>;
