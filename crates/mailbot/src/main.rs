//! mailbot: Email assistant main binary
//!
//! Usage:
//!   mailbot           - Start the web UI
//!   mailbot --cli     - Start interactive CLI mode
//!   mailbot --help    - Show help

mod cli;

use std::sync::Arc;
use std::time::Duration;

use mb_core::{Config, LlmClient, Responder, ToolManager, TriageResponder};
use mb_email::{EmailSendTool, MailSender};
use mb_web::AppState;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Web UI
    Server,
    /// Interactive CLI mode
    Cli,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("mailbot {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // CLI output shares the terminal with the conversation
    let default_level = match mode {
        RunMode::Cli => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    let status = config.status();

    tracing::info!("Starting mailbot...");
    tracing::info!("Model: {} ({:?})", config.llm.model, config.llm.provider);

    let responder = if status.can_chat() {
        Some(build_responder(&config)?)
    } else {
        None
    };

    match mode {
        RunMode::Cli => {
            let Some(responder) = responder else {
                eprintln!("❌ OPENAI_API_KEY not found in .env file");
                return Ok(());
            };
            cli::run_cli(responder, &status).await
        }
        RunMode::Server => {
            for warning in status.warnings() {
                tracing::warn!("{}", warning);
            }
            if responder.is_none() {
                tracing::warn!("OPENAI_API_KEY not set - chat requests will be rejected");
            }

            let idle = Duration::from_secs(config.web.session_idle_minutes.saturating_mul(60));
            let state = AppState::new(status, config.llm.model.clone(), responder)
                .with_session_idle(idle);
            mb_web::start_server(&config.web, state).await?;

            tracing::info!("mailbot stopped");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--cli" | "-c" => return RunMode::Cli,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Wire the LLM client, the mail tool and the agents together
fn build_responder(config: &Config) -> anyhow::Result<Arc<dyn Responder>> {
    let client = LlmClient::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    let sender = Arc::new(MailSender::new(&config.email));
    let mut tool_manager = ToolManager::new();
    tool_manager.register(Arc::new(EmailSendTool::new(sender)));
    tracing::info!("Registered tools: {:?}", tool_manager.tool_names());

    Ok(Arc::new(TriageResponder::new(client, Arc::new(tool_manager))))
}

/// Print help message
fn print_help() {
    println!("mailbot - Conversational email assistant");
    println!();
    println!("Usage:");
    println!("  mailbot              Start the web UI (default http://127.0.0.1:8501)");
    println!("  mailbot --cli        Start interactive CLI mode");
    println!("  mailbot --help       Show this help message");
    println!("  mailbot --version    Show version");
    println!();
    println!("Environment Variables (also read from .env and mailbot.toml):");
    println!("  OPENAI_API_KEY       Model API key (required for chat; LLM_API_KEY also accepted)");
    println!("  LLM_PROVIDER         Provider: openai or claude (default: openai)");
    println!("  LLM_MODEL            Model name (default: gpt-4)");
    println!("  LLM_BASE_URL         Custom API endpoint");
    println!("  EMAIL_ADDRESS        Sender address (required for sending)");
    println!("  EMAIL_PASSWORD       Sender app password (required for sending)");
    println!("  SMTP_HOST            SMTP server (default: smtp.gmail.com)");
    println!("  SMTP_PORT            SMTP port, implicit TLS (default: 465)");
    println!("  WEB_HOST             Web UI bind host (default: 127.0.0.1)");
    println!("  WEB_PORT             Web UI port (default: 8501)");
    println!("  SESSION_IDLE_MINUTES Drop web sessions idle this long, 0 = never (default: 60)");
}
