use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::event::{ChatEvent, Command, MessageEvent, SelectionEvent};
use crate::messages;
use crate::model::{FaqEntry, Suggestion};
use crate::reservations::{
    CHUNK_CHARS, MESSAGE_LIMIT, ReservationSource, format_reservations, split_message,
};
use crate::retrieval::{TOP_K, top_k};
use crate::selection::{ButtonRow, suggestion_rows};
use crate::storage::FaqStore;
use crate::tokenize::tokenize;

/// Outcome of a `!pregunta` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Nothing left after tokenizing; the store was not consulted.
    MissingQuestion,
    Suggestions(Vec<Suggestion>),
    Direct(FaqEntry),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Found(FaqEntry),
    NoLongerAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub rows: Vec<ButtonRow>,
    pub ephemeral: bool,
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rows: Vec::new(),
            ephemeral: false,
        }
    }

    fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            ephemeral: true,
            ..Self::text(content)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Answer the triggering message (or interaction) directly.
    Reply(Reply),
    /// Post each part to the channel, in order.
    Send(Vec<String>),
}

/// Turns chat events into responses. Holds the injected FAQ store and,
/// optionally, a reservation source.
#[derive(Clone)]
pub struct Botiano {
    faqs: Arc<dyn FaqStore>,
    reservations: Option<Arc<dyn ReservationSource>>,
}

impl Botiano {
    pub fn new(faqs: Arc<dyn FaqStore>) -> Self {
        Self {
            faqs,
            reservations: None,
        }
    }

    pub fn with_reservations(mut self, source: Arc<dyn ReservationSource>) -> Self {
        self.reservations = Some(source);
        self
    }

    /// Ranks the collection against `raw_query`, falling back to a pattern
    /// search when no entry shares a token with it.
    pub async fn answer(&self, raw_query: &str) -> Result<Answer> {
        let query_tokens = tokenize(raw_query);
        if query_tokens.is_empty() {
            return Ok(Answer::MissingQuestion);
        }

        let entries = self.faqs.all_entries().await?;
        let suggestions = top_k(&query_tokens, &entries, TOP_K);
        debug!(
            candidates = entries.len(),
            suggestions = suggestions.len(),
            "Ranked question"
        );
        if !suggestions.is_empty() {
            return Ok(Answer::Suggestions(suggestions));
        }

        Ok(match self.faqs.find_matching(raw_query.trim()).await? {
            Some(entry) => Answer::Direct(entry),
            None => Answer::NotFound,
        })
    }

    pub async fn resolve_selection(&self, entry_id: &str) -> Result<SelectionOutcome> {
        Ok(match self.faqs.find_by_id(entry_id).await? {
            Some(entry) => SelectionOutcome::Found(entry),
            None => SelectionOutcome::NoLongerAvailable,
        })
    }

    /// `None` when the event needs no response.
    pub async fn handle(&self, event: ChatEvent) -> Option<Response> {
        match event {
            ChatEvent::Message(message) => self.handle_message(&message).await,
            ChatEvent::Selection(selection) => Some(self.handle_selection(&selection).await),
        }
    }

    async fn handle_message(&self, message: &MessageEvent) -> Option<Response> {
        if message.author_is_bot {
            return None;
        }

        let response = match message.command()? {
            Command::Help => Response::Reply(Reply::text(messages::help(&message.author_name))),
            Command::Mention => {
                Response::Reply(Reply::text(messages::mention(&message.author_name)))
            }
            Command::Question(text) => self.question_reply(&message.author_name, &text).await,
            Command::Reservations => self.reservations_reply().await,
        };
        Some(response)
    }

    async fn question_reply(&self, author: &str, text: &str) -> Response {
        let reply = match self.answer(text).await {
            Ok(Answer::MissingQuestion) => Reply::text(messages::MISSING_QUESTION),
            Ok(Answer::Suggestions(suggestions)) => {
                info!(%author, count = suggestions.len(), "Offering suggestions");
                Reply {
                    content: messages::SUGGESTIONS_HEADER.to_string(),
                    rows: suggestion_rows(&suggestions),
                    ephemeral: false,
                }
            }
            Ok(Answer::Direct(entry)) => {
                info!(%author, entry_id = %entry.id, "Answered by pattern match");
                Reply::text(entry.answer)
            }
            Ok(Answer::NotFound) => Reply::text(messages::NO_ANSWER),
            Err(err) => {
                error!(error = %err, "Failed to look up question");
                Reply::text(messages::QUESTION_FAILED)
            }
        };
        Response::Reply(reply)
    }

    async fn handle_selection(&self, selection: &SelectionEvent) -> Response {
        let reply = match self.resolve_selection(&selection.entry_id).await {
            Ok(SelectionOutcome::Found(entry)) => {
                info!(user = %selection.user_name, entry_id = %entry.id, "Revealing suggestion");
                Reply::text(messages::revealed(&entry.question, &entry.answer))
            }
            Ok(SelectionOutcome::NoLongerAvailable) => {
                info!(
                    user = %selection.user_name,
                    entry_id = %selection.entry_id,
                    "Selected suggestion is gone"
                );
                Reply::ephemeral(messages::SUGGESTION_GONE)
            }
            Err(err) => {
                error!(
                    error = %err,
                    user = %selection.user_name,
                    entry_id = %selection.entry_id,
                    "Failed to resolve suggestion"
                );
                Reply::ephemeral(messages::SELECTION_FAILED)
            }
        };
        Response::Reply(reply)
    }

    async fn reservations_reply(&self) -> Response {
        let Some(source) = self.reservations.as_ref() else {
            warn!("!reservas requested but no reservation source is configured");
            return Response::Reply(Reply::text(messages::RESERVATIONS_DISABLED));
        };

        let reservations = match source.fetch().await {
            Ok(reservations) => reservations,
            Err(err) => {
                error!(error = %err, "Failed to load reservations");
                return Response::Reply(Reply::text(messages::RESERVATIONS_FAILED));
            }
        };
        if reservations.is_empty() {
            return Response::Reply(Reply::text(messages::NO_RESERVATIONS));
        }

        let text = format_reservations(&reservations, &Local);
        let mut parts = split_message(&text, MESSAGE_LIMIT, CHUNK_CHARS);
        if parts.len() == 1 {
            Response::Reply(Reply::text(parts.remove(0)))
        } else {
            Response::Send(parts)
        }
    }
}
