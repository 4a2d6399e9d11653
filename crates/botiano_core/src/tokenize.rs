use std::sync::LazyLock;

use regex::Regex;

// Unicode-aware `\w`, so accents and combining marks survive.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static pattern compiles"));

/// Lowercases `text`, strips punctuation and splits it on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
