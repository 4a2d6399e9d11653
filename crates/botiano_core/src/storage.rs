use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use crate::error::Result;
use crate::model::FaqEntry;
use crate::retrieval::direct_match;

/// Read-only access to the FAQ collection.
///
/// Implementations are injected into [`crate::Botiano`]; the bot never
/// writes through this trait.
#[async_trait]
pub trait FaqStore: Send + Sync {
    /// Every entry, in the collection's natural order.
    async fn all_entries(&self) -> Result<Vec<FaqEntry>>;

    /// First entry whose question matches the escaped fallback pattern of
    /// `raw_query`, case-insensitively.
    async fn find_matching(&self, raw_query: &str) -> Result<Option<FaqEntry>>;

    /// `Ok(None)` when the id is unknown, including ids that are not
    /// well-formed for the backing store.
    async fn find_by_id(&self, id: &str) -> Result<Option<FaqEntry>>;
}

/// FAQ collection held in memory, usually loaded from a JSONL file.
#[derive(Debug, Clone, Default)]
pub struct MemoryFaqStore {
    entries: Vec<FaqEntry>,
}

impl MemoryFaqStore {
    pub fn from_entries(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    pub fn load_jsonl(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::from_entries(load_entries_jsonl(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, id: &str) -> Option<FaqEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }
}

#[async_trait]
impl FaqStore for MemoryFaqStore {
    async fn all_entries(&self) -> Result<Vec<FaqEntry>> {
        Ok(self.entries.clone())
    }

    async fn find_matching(&self, raw_query: &str) -> Result<Option<FaqEntry>> {
        Ok(direct_match(raw_query, &self.entries)?.cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FaqEntry>> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }
}

pub fn load_entries_jsonl(path: &Path) -> anyhow::Result<Vec<FaqEntry>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("read jsonl line")?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: FaqEntry = serde_json::from_str(&line)
            .with_context(|| format!("parse faq entry on line {}", lineno + 1))?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FaqEntry> {
        vec![
            FaqEntry::new("1", "¿Cuál es el horario de la biblioteca?", "De 8 a 20 h."),
            FaqEntry::new("2", "¿Cómo me inscribo?", "Desde el campus virtual."),
        ]
    }

    #[test]
    fn load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.jsonl");
        let mut raw = String::new();
        for entry in sample() {
            raw.push_str(&serde_json::to_string(&entry).unwrap());
            raw.push_str("\n\n   \n");
        }
        std::fs::write(&path, raw).unwrap();

        let store = MemoryFaqStore::load_jsonl(&path).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.jsonl");
        let raw = "{\"id\":\"1\",\"question\":\"q\",\"answer\":\"a\"}\nnot json\n";
        std::fs::write(&path, raw).unwrap();

        let err = load_entries_jsonl(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[tokio::test]
    async fn finds_by_id_and_reports_unknown_ids_as_none() {
        let store = MemoryFaqStore::from_entries(sample());
        let found = store.find_by_id("2").await.unwrap();
        assert_eq!(found.map(|e| e.answer), Some("Desde el campus virtual.".to_string()));
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_matching_uses_fallback_pattern() {
        let store = MemoryFaqStore::from_entries(sample());
        let found = store.find_matching("HORARIO biblioteca").await.unwrap();
        assert_eq!(found.map(|e| e.id), Some("1".to_string()));
        assert!(store.find_matching("comedor").await.unwrap().is_none());
    }
}
