//! Email tools for mailbot

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use mb_core::agents::SEND_EMAIL_TOOL;
use mb_core::session::ERROR_MARKER;
use mb_core::tool::SchemaBuilder;
use mb_core::{Tool, ToolResult};

use super::send::MailSender;

/// Email send tool
pub struct EmailSendTool {
    sender: Arc<MailSender>,
}

impl EmailSendTool {
    pub fn new(sender: Arc<MailSender>) -> Self {
        Self { sender }
    }
}

fn required_str<'a>(input: &'a Value, key: &str) -> mb_core::Result<&'a str> {
    input[key]
        .as_str()
        .ok_or_else(|| mb_core::Error::ToolExecution(format!("Missing '{}' parameter", key)))
}

#[async_trait]
impl Tool for EmailSendTool {
    fn name(&self) -> &str {
        SEND_EMAIL_TOOL
    }

    fn description(&self) -> &str {
        "Send an email to a recipient with the given subject and plain-text body"
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema_with_descriptions(vec![
            ("recipient", "string", "Recipient email address", true),
            ("subject", "string", "Email subject", true),
            ("body", "string", "Email body (plain text)", true),
        ])
    }

    async fn execute(&self, input: Value) -> mb_core::Result<ToolResult> {
        let recipient = required_str(&input, "recipient")?;
        let subject = required_str(&input, "subject")?;
        let body = required_str(&input, "body")?;

        let outcome = self.sender.send(recipient, subject, body).await;

        if outcome.starts_with(ERROR_MARKER) {
            Ok(ToolResult::error(outcome))
        } else {
            Ok(ToolResult::success(outcome))
        }
    }
}
