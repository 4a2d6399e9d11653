use std::path::PathBuf;

use clap::Parser;

/// Every option can also come from the environment (or a `.env` file).
#[derive(Parser, Debug)]
#[command(name = "botiano", version, about = "UMAI academic FAQ bot for Discord")]
pub struct Config {
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    #[arg(long, env = "MONGODB_DATABASE", default_value = "datos_bot")]
    pub mongodb_database: String,

    #[arg(long, env = "FAQ_COLLECTION", default_value = "preguntas_frecuentes")]
    pub faq_collection: String,

    /// JSONL file of `{"id","question","answer"}` lines, used instead of MongoDB.
    #[arg(long, env = "FAQ_FILE")]
    pub faq_file: Option<PathBuf>,

    /// JSON array of reservations answered by `!reservas`.
    #[arg(long, env = "RESERVATIONS_FILE")]
    pub reservations_file: Option<PathBuf>,

    /// Reservations API endpoint answered by `!reservas`.
    #[arg(long, env = "RESERVATIONS_URL")]
    pub reservations_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqBackend {
    Mongo {
        uri: String,
        database: String,
        collection: String,
    },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationsBackend {
    File(PathBuf),
    Api(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.discord_token.trim().is_empty() {
            return Err("discord token must not be empty".to_string());
        }
        self.faq_backend()?;
        if self.reservations_file.is_some() && self.reservations_url.is_some() {
            return Err("set only one of --reservations-file and --reservations-url".to_string());
        }
        Ok(())
    }

    pub fn faq_backend(&self) -> Result<FaqBackend, String> {
        match (&self.mongodb_uri, &self.faq_file) {
            (Some(uri), None) => Ok(FaqBackend::Mongo {
                uri: uri.clone(),
                database: self.mongodb_database.clone(),
                collection: self.faq_collection.clone(),
            }),
            (None, Some(path)) => Ok(FaqBackend::File(path.clone())),
            (Some(_), Some(_)) => Err("set only one of --mongodb-uri and --faq-file".to_string()),
            (None, None) => Err("one of --mongodb-uri or --faq-file is required".to_string()),
        }
    }

    pub fn reservations_backend(&self) -> Option<ReservationsBackend> {
        match (&self.reservations_file, &self.reservations_url) {
            (Some(path), _) => Some(ReservationsBackend::File(path.clone())),
            (None, Some(url)) => Some(ReservationsBackend::Api(url.clone())),
            (None, None) => None,
        }
    }
}
