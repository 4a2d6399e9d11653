//! Room reservations listed by `!reservas`.

use std::fmt::{Display, Write as _};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::TimeZone;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Reservation;

/// Replies longer than this are split into several messages.
pub const MESSAGE_LIMIT: usize = 2000;

/// Size of each message when a reply has to be split.
pub const CHUNK_CHARS: usize = 1900;

#[async_trait]
pub trait ReservationSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Reservation>>;
}

/// JSON array of reservations stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileReservations {
    path: PathBuf,
}

impl FileReservations {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReservationSource for FileReservations {
    async fn fetch(&self) -> Result<Vec<Reservation>> {
        debug!(path = %self.path.display(), "Reading reservations file");
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Reservations API answering `GET` with a JSON array.
#[derive(Debug, Clone)]
pub struct ApiReservations {
    url: String,
    client: reqwest::Client,
}

impl ApiReservations {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReservationSource for ApiReservations {
    async fn fetch(&self) -> Result<Vec<Reservation>> {
        debug!(url = %self.url, "Fetching reservations");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Reservations(format!(
                "{} answered {status}",
                self.url
            )));
        }
        Ok(response.json().await?)
    }
}

/// Renders the listing with dates as `DD/MM/YYYY` and times as `HH:MM` in `tz`.
pub fn format_reservations<Tz>(reservations: &[Reservation], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::from("**Reservas Actuales:**\n\n");

    for (index, reservation) in reservations.iter().enumerate() {
        let start = reservation.start_date.with_timezone(tz);
        let end = reservation.end_date.with_timezone(tz);
        let _ = writeln!(
            out,
            "{}. **{}** - {} ({} a {})",
            index + 1,
            reservation.resource_name,
            start.format("%d/%m/%Y"),
            start.format("%H:%M"),
            end.format("%H:%M"),
        );
        let _ = writeln!(out, "   {} - {}\n", reservation.title, reservation.description);
    }

    out
}

/// Splits `text` into pieces of at most `chunk_chars` characters when it is
/// longer than `limit` characters; otherwise returns it whole.
pub fn split_message(text: &str, limit: usize, chunk_chars: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn reservation(resource: &str, start: &str, end: &str) -> Reservation {
        Reservation {
            resource_name: resource.to_string(),
            title: "Clase de repaso".to_string(),
            description: "Álgebra".to_string(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
        }
    }

    #[test]
    fn parses_camel_case_json_with_offsets() {
        let raw = r#"[{
            "resourceName": "Aula 1",
            "title": "Tutoría",
            "description": "Grupo B",
            "startDate": "2025-03-10T09:00:00.000Z",
            "endDate": "2025-03-10T11:30:00+01:00",
            "id": "ignored"
        }]"#;
        let parsed: Vec<Reservation> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed[0].resource_name, "Aula 1");
        assert_eq!(parsed[0].end_date.to_rfc3339(), "2025-03-10T10:30:00+00:00");
    }

    #[test]
    fn formats_in_the_given_time_zone() {
        let items = vec![
            reservation("Aula 1", "2025-03-10T09:00:00Z", "2025-03-10T10:30:00Z"),
            reservation("Laboratorio", "2025-12-31T23:15:00Z", "2026-01-01T00:45:00Z"),
        ];
        let madrid = FixedOffset::east_opt(3600).unwrap();
        let text = format_reservations(&items, &madrid);

        assert_eq!(
            text,
            "**Reservas Actuales:**\n\n\
             1. **Aula 1** - 10/03/2025 (10:00 a 11:30)\n   Clase de repaso - Álgebra\n\n\
             2. **Laboratorio** - 01/01/2026 (00:15 a 01:45)\n   Clase de repaso - Álgebra\n\n"
        );
    }

    #[test]
    fn utc_rendering_keeps_wall_clock() {
        let items = vec![reservation("Aula 2", "2025-06-01T08:05:00Z", "2025-06-01T09:00:00Z")];
        let text = format_reservations(&items, &Utc);
        assert!(text.contains("01/06/2025 (08:05 a 09:00)"));
    }

    #[test]
    fn short_messages_are_not_split() {
        let parts = split_message("hola", MESSAGE_LIMIT, CHUNK_CHARS);
        assert_eq!(parts, vec!["hola"]);
        let exact = "x".repeat(MESSAGE_LIMIT);
        assert_eq!(split_message(&exact, MESSAGE_LIMIT, CHUNK_CHARS).len(), 1);
    }

    #[test]
    fn long_messages_split_into_fixed_chunks() {
        let text = "ñ".repeat(4000);
        let parts = split_message(&text, MESSAGE_LIMIT, CHUNK_CHARS);
        let sizes: Vec<usize> = parts.iter().map(|p| p.chars().count()).collect();
        assert_eq!(sizes, vec![1900, 1900, 200]);
        assert_eq!(parts.concat(), text);
    }

    #[tokio::test]
    async fn file_source_reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");
        std::fs::write(
            &path,
            r#"[{"resourceName":"Aula 3","title":"T","description":"D",
                "startDate":"2025-01-01T10:00:00Z","endDate":"2025-01-01T11:00:00Z"}]"#,
        )
        .unwrap();

        let items = FileReservations::new(&path).fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].resource_name, "Aula 3");
    }

    #[tokio::test]
    async fn file_source_surfaces_missing_file() {
        let err = FileReservations::new("/nonexistent/reservations.json")
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
