use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FAQ store error: {0}")]
    Store(String),

    #[error("Reservations unavailable: {0}")]
    Reservations(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
