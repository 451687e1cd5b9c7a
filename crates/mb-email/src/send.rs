//! Email sending via SMTP
//!
//! `MailSender` never fails: every outcome, including configuration
//! problems and transport faults, comes back as a displayable line.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use mb_core::EmailConfig;

use crate::error::{EmailError, Result};

/// A single plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// One delivery attempt for one email
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<()>;
}

/// SMTP over implicit TLS, authenticated with the sender's credentials
///
/// A fresh connection is opened for every delivery and dropped when it
/// returns.
#[derive(Clone)]
pub struct SmtpMailTransport {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl SmtpMailTransport {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    fn build_message(email: &OutgoingEmail) -> Result<Message> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|e| EmailError::SmtpConfig(format!("sender {}: {}", email.from, e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| EmailError::MessageBuild(e.to_string()))
    }
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        let message = Self::build_message(email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| EmailError::SmtpConfig(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        transport.send(message).await.map_err(|e| {
            let code = e.status().map(|code| code.to_string());
            classify_reply(code.as_deref(), e.to_string())
        })?;

        Ok(())
    }
}

/// Map an SMTP reply code to the error it stands for
fn classify_reply(code: Option<&str>, detail: String) -> EmailError {
    match code {
        Some("530" | "534" | "535") => EmailError::AuthFailed(detail),
        Some("501" | "550" | "551" | "553") => EmailError::RecipientRejected(detail),
        _ => EmailError::SmtpSend(detail),
    }
}

/// Cheap shape check; anything with `@` and `.` gets a delivery attempt
pub fn is_plausible_address(address: &str) -> bool {
    address.contains('@') && address.contains('.')
}

/// Sends mail on behalf of the configured sender
pub struct MailSender {
    address: Option<String>,
    password: Option<String>,
    transport: Arc<dyn MailTransport>,
}

impl MailSender {
    /// Sender backed by SMTP, using the configured address and app password
    pub fn new(config: &EmailConfig) -> Self {
        let transport = SmtpMailTransport::new(
            &config.smtp_host,
            config.smtp_port,
            config.address.clone().unwrap_or_default(),
            config.password.clone().unwrap_or_default(),
        );
        Self::with_transport(
            config.address.clone(),
            config.password.clone(),
            Arc::new(transport),
        )
    }

    pub fn with_transport(
        address: Option<String>,
        password: Option<String>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            address: address.filter(|a| !a.trim().is_empty()),
            password: password.filter(|p| !p.trim().is_empty()),
            transport,
        }
    }

    /// Send one email and describe the outcome
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) -> String {
        let Some(address) = &self.address else {
            return "❌ EMAIL_ADDRESS not set in .env file".to_string();
        };
        if self.password.is_none() {
            return "❌ EMAIL_PASSWORD not set in .env file. Please set your Gmail App Password!"
                .to_string();
        }
        if !is_plausible_address(recipient) {
            return format!("❌ Invalid email format: {}", recipient);
        }

        let email = OutgoingEmail {
            from: address.clone(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        match self.transport.deliver(&email).await {
            Ok(()) => {
                info!("Email sent to {}", recipient);
                format!(
                    "✅ Email sent successfully!\nTo: {}\nSubject: {}",
                    recipient, subject
                )
            }
            Err(EmailError::AuthFailed(e)) => {
                warn!("SMTP authentication failed: {}", e);
                "❌ Authentication failed! Please check your Gmail App Password in .env file"
                    .to_string()
            }
            Err(EmailError::RecipientRejected(_)) | Err(EmailError::InvalidAddress(_)) => {
                warn!("Recipient refused: {}", recipient);
                format!("❌ Invalid recipient email: {}", recipient)
            }
            Err(e) => {
                warn!("Failed to send email to {}: {}", recipient, e);
                format!("❌ Failed to send email: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport that records deliveries and fails on demand
    struct ScriptedTransport {
        failure: Mutex<Option<EmailError>>,
        delivered: Mutex<Vec<OutgoingEmail>>,
    }

    impl ScriptedTransport {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                failure: Mutex::new(None),
                delivered: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: EmailError) -> Arc<Self> {
            Arc::new(Self {
                failure: Mutex::new(Some(error)),
                delivered: Mutex::new(Vec::new()),
            })
        }

        fn attempts(&self) -> usize {
            self.delivered.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MailTransport for ScriptedTransport {
        async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
            self.delivered.lock().unwrap().push(email.clone());
            match self.failure.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn sender(transport: Arc<ScriptedTransport>) -> MailSender {
        MailSender::with_transport(
            Some("bot@example.com".to_string()),
            Some("app-password".to_string()),
            transport,
        )
    }

    #[tokio::test]
    async fn test_success() {
        let transport = ScriptedTransport::ok();
        let outcome = sender(transport.clone())
            .send("friend@example.com", "Lunch", "Noon?")
            .await;

        assert_eq!(
            outcome,
            "✅ Email sent successfully!\nTo: friend@example.com\nSubject: Lunch"
        );
        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered[0].from, "bot@example.com");
        assert_eq!(delivered[0].body, "Noon?");
    }

    #[tokio::test]
    async fn test_invalid_format_needs_no_network() {
        let transport = ScriptedTransport::ok();
        let outcome = sender(transport.clone()).send("not-an-email", "s", "b").await;

        assert_eq!(outcome, "❌ Invalid email format: not-an-email");
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let transport = ScriptedTransport::ok();

        let no_address = MailSender::with_transport(None, None, transport.clone());
        assert_eq!(
            no_address.send("a@b.com", "s", "b").await,
            "❌ EMAIL_ADDRESS not set in .env file"
        );

        let no_password = MailSender::with_transport(
            Some("bot@example.com".to_string()),
            Some("  ".to_string()),
            transport.clone(),
        );
        assert_eq!(
            no_password.send("a@b.com", "s", "b").await,
            "❌ EMAIL_PASSWORD not set in .env file. Please set your Gmail App Password!"
        );

        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let transport = ScriptedTransport::failing(EmailError::AuthFailed("535".to_string()));
        let outcome = sender(transport.clone()).send("a@b.com", "s", "b").await;

        assert_eq!(
            outcome,
            "❌ Authentication failed! Please check your Gmail App Password in .env file"
        );
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_smtp_connection_refused() {
        // bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = SmtpMailTransport::new("127.0.0.1", port, "bot@example.com", "app-password");
        let sender = MailSender::with_transport(
            Some("bot@example.com".to_string()),
            Some("app-password".to_string()),
            Arc::new(transport),
        );

        let outcome = sender.send("friend@example.com", "Lunch", "Noon?").await;
        assert!(
            outcome.starts_with("❌ Failed to send email: "),
            "unexpected outcome: {}",
            outcome
        );
    }

    #[tokio::test]
    async fn test_recipient_refused() {
        let transport =
            ScriptedTransport::failing(EmailError::RecipientRejected("550".to_string()));
        let outcome = sender(transport).send("nobody@b.com", "s", "b").await;
        assert_eq!(outcome, "❌ Invalid recipient email: nobody@b.com");
    }

    #[tokio::test]
    async fn test_other_failure() {
        let transport =
            ScriptedTransport::failing(EmailError::SmtpSend("connection reset".to_string()));
        let outcome = sender(transport.clone()).send("a@b.com", "s", "b").await;

        assert_eq!(
            outcome,
            "❌ Failed to send email: SMTP send error: connection reset"
        );
        // no retry
        assert_eq!(transport.attempts(), 1);
    }

    #[test]
    fn test_classify_reply() {
        assert!(matches!(
            classify_reply(Some("535"), String::new()),
            EmailError::AuthFailed(_)
        ));
        assert!(matches!(
            classify_reply(Some("550"), String::new()),
            EmailError::RecipientRejected(_)
        ));
        assert!(matches!(
            classify_reply(Some("421"), String::new()),
            EmailError::SmtpSend(_)
        ));
        assert!(matches!(
            classify_reply(None, String::new()),
            EmailError::SmtpSend(_)
        ));
    }

    #[test]
    fn test_build_message() {
        let email = OutgoingEmail {
            from: "bot@example.com".to_string(),
            to: "friend@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
        };
        assert!(SmtpMailTransport::build_message(&email).is_ok());

        let bad = OutgoingEmail {
            to: "not an address".to_string(),
            ..email
        };
        assert!(matches!(
            SmtpMailTransport::build_message(&bad),
            Err(EmailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let transport = SmtpMailTransport::new("smtp.gmail.com", 465, "bot@example.com", "secret");
        assert!(!format!("{:?}", transport).contains("secret"));
    }
}
