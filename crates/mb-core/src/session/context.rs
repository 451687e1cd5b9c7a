//! Bounded conversation context
//!
//! Recent turns are rendered as plain text and prepended to the next user
//! message, so the responder sees the conversation without receiving the
//! full history.

use super::types::Turn;

/// Trailing-turn window and header used by one front-end
///
/// Only the two front-end windows exist; the size is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    turns: usize,
    header: &'static str,
}

impl ContextWindow {
    /// Web front-end: last 10 turns
    pub const WEB: ContextWindow = ContextWindow {
        turns: 10,
        header: "Previous conversation context:",
    };

    /// CLI front-end: last 6 turns
    pub const CLI: ContextWindow = ContextWindow {
        turns: 6,
        header: "Previous conversation:",
    };

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn header(&self) -> &'static str {
        self.header
    }
}

/// Closing line of a context block
pub const CONTEXT_SEPARATOR: &str = "---";

/// Render the last `window.turns()` turns as a context block
///
/// Returns an empty string for an empty slice.
pub fn build_context(turns: &[Turn], window: ContextWindow) -> String {
    if turns.is_empty() {
        return String::new();
    }

    let start = turns.len().saturating_sub(window.turns);
    let mut lines = Vec::with_capacity(turns.len() - start + 2);
    lines.push(window.header.to_string());
    for turn in &turns[start..] {
        lines.push(format!("{}: {}", turn.role().title(), turn.content()));
    }
    lines.push(CONTEXT_SEPARATOR.to_string());

    lines.join("\n")
}

/// Input handed to the responder for `message`
///
/// `prior` are the turns that preceded `message`. The first message of a
/// session goes out verbatim.
pub fn contextual_input(prior: &[Turn], window: ContextWindow, message: &str) -> String {
    if prior.is_empty() {
        return message.to_string();
    }

    format!(
        "{}\n\nCurrent message: {}",
        build_context(prior, window),
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating(n: usize) -> Vec<Turn> {
        (1..=n)
            .map(|i| {
                if i % 2 == 1 {
                    Turn::user(format!("turn {i}"))
                } else {
                    Turn::assistant(format!("turn {i}"))
                }
            })
            .collect()
    }

    fn body_lines(context: &str) -> Vec<&str> {
        let lines: Vec<&str> = context.lines().collect();
        lines[1..lines.len() - 1].to_vec()
    }

    #[test]
    fn test_empty_history_yields_empty_context() {
        assert_eq!(build_context(&[], ContextWindow::WEB), "");
        assert_eq!(build_context(&[], ContextWindow::CLI), "");
    }

    #[test]
    fn test_non_empty_history_yields_non_empty_context() {
        let turns = alternating(1);
        assert!(!build_context(&turns, ContextWindow::WEB).is_empty());
    }

    #[test]
    fn test_format() {
        let turns = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let context = build_context(&turns, ContextWindow::WEB);
        assert_eq!(
            context,
            "Previous conversation context:\nUser: Hi\nAssistant: Hello!\n---"
        );

        let context = build_context(&turns, ContextWindow::CLI);
        assert!(context.starts_with("Previous conversation:\n"));
    }

    #[test]
    fn test_includes_every_turn_within_window() {
        for window in [ContextWindow::WEB, ContextWindow::CLI] {
            for n in 1..=window.turns() {
                let turns = alternating(n);
                let context = build_context(&turns, window);
                assert_eq!(body_lines(&context).len(), n);
                assert!(context.contains("turn 1\n"));
            }
        }
    }

    #[test]
    fn test_includes_exactly_last_k_beyond_window() {
        for window in [ContextWindow::WEB, ContextWindow::CLI] {
            let n = window.turns() + 5;
            let turns = alternating(n);
            let context = build_context(&turns, window);
            let body = body_lines(&context);

            assert_eq!(body.len(), window.turns());
            let first_kept = n - window.turns() + 1;
            assert!(body[0].ends_with(&format!("turn {first_kept}")));
            assert!(body.last().unwrap().ends_with(&format!("turn {n}")));
            for dropped in 1..first_kept {
                assert!(!body.iter().any(|l| l.ends_with(&format!("turn {dropped}"))));
            }
        }
    }

    #[test]
    fn test_content_is_not_truncated() {
        let long = "x".repeat(10_000);
        let turns = vec![Turn::user(long.clone())];
        let context = build_context(&turns, ContextWindow::CLI);
        assert!(context.contains(&long));
    }

    #[test]
    fn test_deterministic() {
        let turns = alternating(14);
        assert_eq!(
            build_context(&turns, ContextWindow::WEB),
            build_context(&turns, ContextWindow::WEB)
        );
    }

    #[test]
    fn test_first_message_is_verbatim() {
        assert_eq!(contextual_input(&[], ContextWindow::WEB, "Hi"), "Hi");
    }

    #[test]
    fn test_later_messages_carry_context() {
        let prior = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let input = contextual_input(&prior, ContextWindow::WEB, "send it");
        assert_eq!(
            input,
            "Previous conversation context:\nUser: Hi\nAssistant: Hello!\n---\n\nCurrent message: send it"
        );
    }

    #[test]
    fn test_twelve_prior_turns_keep_three_through_twelve() {
        let prior = alternating(12);
        let input = contextual_input(&prior, ContextWindow::WEB, "send it");

        for i in 3..=12 {
            assert!(input.contains(&format!(": turn {i}\n")));
        }
        assert!(!input.contains(": turn 1\n"));
        assert!(!input.contains(": turn 2\n"));
        assert!(input.ends_with("Current message: send it"));
    }
}
