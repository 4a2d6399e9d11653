//! Suggestion buttons and the correlation ids that tie a later click back
//! to its FAQ entry.

use serde::Serialize;

use crate::model::Suggestion;

pub const CORRELATION_PREFIX: &str = "pregunta_sugerida_";

/// Buttons per row accepted by the presentation layer.
pub const ROW_CAPACITY: usize = 5;

/// Longest button label accepted by the presentation layer, ellipsis included.
pub const LABEL_MAX_CHARS: usize = 80;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionButton {
    pub custom_id: String,
    pub label: String,
}

pub type ButtonRow = Vec<SuggestionButton>;

pub fn correlation_id(entry_id: &str) -> String {
    format!("{CORRELATION_PREFIX}{entry_id}")
}

/// Strips the correlation prefix. `None` for foreign or empty ids.
pub fn parse_correlation_id(custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(CORRELATION_PREFIX)
        .filter(|id| !id.is_empty())
}

pub fn button_label(question: &str) -> String {
    if question.chars().count() <= LABEL_MAX_CHARS {
        return question.to_string();
    }
    let kept: String = question
        .chars()
        .take(LABEL_MAX_CHARS - ELLIPSIS.len())
        .collect();
    format!("{}{ELLIPSIS}", kept.trim_end())
}

pub fn suggestion_rows(suggestions: &[Suggestion]) -> Vec<ButtonRow> {
    suggestions
        .chunks(ROW_CAPACITY)
        .map(|chunk| {
            chunk
                .iter()
                .map(|s| SuggestionButton {
                    custom_id: correlation_id(&s.entry_id),
                    label: button_label(&s.question),
                })
                .collect()
        })
        .collect()
}
