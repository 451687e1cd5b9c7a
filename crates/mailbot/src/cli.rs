//! CLI (Command Line Interface) mode
//!
//! Interactive REPL over a single conversation session.

use std::sync::Arc;

use mb_core::{ChatSession, ConfigStatus, ContextWindow, Responder};
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use tracing::info;

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show available commands"),
    ("/clear", "Start a new conversation"),
    ("/history", "Show the conversation so far"),
    ("/exit", "Quit"),
];

/// Plain words that end the session
const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// "You: " prompt
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Green.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint("You: ").to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Blank,
    Exit,
    Help,
    Clear,
    History,
    UnknownCommand(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let input = line.trim();
    if input.is_empty() {
        return Input::Blank;
    }

    let lower = input.to_lowercase();
    if EXIT_WORDS.contains(&lower.as_str()) {
        return Input::Exit;
    }

    match lower.as_str() {
        "/exit" | "/quit" | "/q" => Input::Exit,
        "/help" | "/?" => Input::Help,
        "/clear" => Input::Clear,
        "/history" => Input::History,
        _ if lower.starts_with('/') => Input::UnknownCommand(input),
        _ => Input::Message(input),
    }
}

/// Run CLI interactive mode
pub async fn run_cli(responder: Arc<dyn Responder>, status: &ConfigStatus) -> anyhow::Result<()> {
    print_welcome(status);

    // Setup keybindings
    let mut keybindings = default_keybindings();

    // Trigger completion on '/' key
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();
    let mut session = ChatSession::new(ContextWindow::CLI);
    info!("Starting CLI session {}", session.id());

    loop {
        let signal = line_editor.read_line(&prompt);

        match signal {
            Ok(Signal::Success(line)) => match parse_input(&line) {
                Input::Blank => continue,
                Input::Exit => {
                    print_goodbye();
                    break;
                }
                Input::Help => print_help(),
                Input::Clear => {
                    let id = session.clear();
                    info!("Cleared CLI session, new id {}", id);
                    println!("\n✅ Conversation cleared.\n");
                }
                Input::History => print_history(&session),
                Input::UnknownCommand(cmd) => {
                    eprintln!("\n❓ Unknown command: {}. Type /help for available commands.\n", cmd);
                }
                Input::Message(message) => {
                    let exchange = session.exchange(responder.as_ref(), message).await;
                    let label = Color::Cyan.bold().paint("🤖 Bot:");
                    if exchange.is_error {
                        println!("{} {}", label, Color::Red.paint(&exchange.reply));
                    } else {
                        println!("{} {}", label, exchange.reply);
                    }
                    println!();
                }
            },
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                println!();
                print_goodbye();
                break;
            }
            Err(err) => {
                eprintln!("\n❌ Error: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    // Tab key triggers completion
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('c'),
        ReedlineEvent::CtrlC,
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('d'),
        ReedlineEvent::CtrlD,
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

/// Print the banner and any credential warnings
fn print_welcome(status: &ConfigStatus) {
    println!();
    println!("{}", Color::Green.bold().paint("🤖 Email Bot - CLI Mode"));
    println!(
        "{}",
        Style::new()
            .dimmed()
            .paint("Type 'exit' or 'quit' to stop, /help for commands")
    );
    for warning in status.warnings() {
        println!("{}", Color::Yellow.paint(format!("⚠️  {}", warning)));
    }
    println!();
}

fn print_goodbye() {
    println!("{}", Color::Yellow.paint("👋 Goodbye!"));
}

/// Print help message
fn print_help() {
    println!();
    println!("📖 Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {} - {}", cmd, desc);
    }
    println!("  exit | quit | bye - Quit");
    println!();
}

/// Print conversation history
fn print_history(session: &ChatSession) {
    let turns = session.history().turns();
    println!();
    println!("📜 Conversation ({} turns):", turns.len());
    println!("{}", "─".repeat(50));

    for (i, turn) in turns.iter().enumerate() {
        let text = turn.content();
        let preview = match text.char_indices().nth(100) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        };
        println!(
            "{}. {}: {}",
            i + 1,
            turn.role().title(),
            preview.replace('\n', " ")
        );
    }

    println!("{}", "─".repeat(50));
    println!();
}
