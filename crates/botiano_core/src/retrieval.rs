use regex::RegexBuilder;

use crate::error::Result;
use crate::model::{FaqEntry, Suggestion};
use crate::tokenize::tokenize;

/// Number of suggestions surfaced for a question.
pub const TOP_K: usize = 3;

/// Counts query tokens contained in the question tokens. Repeated query
/// tokens are checked (and counted) once per occurrence.
pub fn match_count(query_tokens: &[String], question_tokens: &[String]) -> usize {
    query_tokens
        .iter()
        .filter(|token| question_tokens.contains(token))
        .count()
}

/// Scores every entry against the query and returns the non-zero ones,
/// best first. Equal scores keep the order of `entries`.
pub fn rank(query_tokens: &[String], entries: &[FaqEntry]) -> Vec<Suggestion> {
    let mut scored: Vec<Suggestion> = entries
        .iter()
        .filter_map(|entry| {
            let score = match_count(query_tokens, &tokenize(&entry.question));
            (score > 0).then(|| Suggestion {
                entry_id: entry.id.clone(),
                question: entry.question.clone(),
                score,
            })
        })
        .collect();

    // `sort_by` is stable, which keeps ties in collection order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

pub fn top_k(query_tokens: &[String], entries: &[FaqEntry], k: usize) -> Vec<Suggestion> {
    let mut ranked = rank(query_tokens, entries);
    ranked.truncate(k);
    ranked
}

/// Builds the literal search pattern used when ranking finds nothing.
///
/// Every whitespace-separated word of the raw query is escaped and the words
/// are joined with `.*`, so `horario biblioteca` matches
/// `el horario de la biblioteca`. Returns `None` for blank input.
pub fn fallback_pattern(raw_query: &str) -> Option<String> {
    let words: Vec<String> = raw_query.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(".*"))
    }
}

/// Case-insensitive pattern search over questions, first hit wins.
pub fn direct_match<'a>(raw_query: &str, entries: &'a [FaqEntry]) -> Result<Option<&'a FaqEntry>> {
    let Some(pattern) = fallback_pattern(raw_query) else {
        return Ok(None);
    };
    let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
    Ok(entries.iter().find(|entry| regex.is_match(&entry.question)))
}
