//! Chat platform events, validated before they reach the dispatcher.

use crate::selection::parse_correlation_id;

pub const HELP_PREFIX: &str = "!botiano";
pub const QUESTION_PREFIX: &str = "!pregunta";
pub const RESERVATIONS_PREFIX: &str = "!reservas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message(MessageEvent),
    Selection(SelectionEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub author_name: String,
    pub author_is_bot: bool,
    pub content: String,
    pub mentions_bot: bool,
}

/// A click on one of our suggestion buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub entry_id: String,
    pub user_name: String,
}

impl SelectionEvent {
    /// `None` when `custom_id` is not one of ours or carries no entry id.
    pub fn from_custom_id(custom_id: &str, user_name: impl Into<String>) -> Option<Self> {
        parse_correlation_id(custom_id).map(|entry_id| Self {
            entry_id: entry_id.to_string(),
            user_name: user_name.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Text after the prefix, trimmed. May be empty.
    Question(String),
    Reservations,
    /// The bot was mentioned outside of a question.
    Mention,
}

impl MessageEvent {
    /// Maps the message onto a command; `None` for ordinary chatter.
    ///
    /// Prefixes are checked in a fixed order: help, mention, question,
    /// reservations.
    pub fn command(&self) -> Option<Command> {
        let content = self.content.as_str();
        if content.starts_with(HELP_PREFIX) {
            return Some(Command::Help);
        }
        if self.mentions_bot && !content.starts_with(QUESTION_PREFIX) {
            return Some(Command::Mention);
        }
        if let Some(rest) = content.strip_prefix(QUESTION_PREFIX) {
            return Some(Command::Question(rest.trim().to_string()));
        }
        if content.starts_with(RESERVATIONS_PREFIX) {
            return Some(Command::Reservations);
        }
        None
    }
}
