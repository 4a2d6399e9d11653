mod config;
mod discord;
mod mongo;

use std::sync::Arc;

use anyhow::{Context, Result};
use botiano_core::{
    ApiReservations, Botiano, FaqStore, FileReservations, MemoryFaqStore, ReservationSource,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, FaqBackend, ReservationsBackend};
use crate::mongo::MongoFaqStore;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init()
        .ok();
}

async fn build_store(backend: FaqBackend) -> Result<Arc<dyn FaqStore>> {
    match backend {
        FaqBackend::Mongo {
            uri,
            database,
            collection,
        } => {
            let store = MongoFaqStore::connect(&uri, &database, &collection)
                .await
                .context("connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        FaqBackend::File(path) => {
            let store = MemoryFaqStore::load_jsonl(&path)?;
            info!(path = %path.display(), entries = store.len(), "Loaded FAQ file");
            Ok(Arc::new(store))
        }
    }
}

fn reservation_source(backend: ReservationsBackend) -> Arc<dyn ReservationSource> {
    match backend {
        ReservationsBackend::File(path) => {
            info!(path = %path.display(), "Reservations read from file");
            Arc::new(FileReservations::new(path))
        }
        ReservationsBackend::Api(url) => {
            info!(%url, "Reservations fetched from API");
            Arc::new(ApiReservations::new(url))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so clap can pick up env vars.
    let _ = dotenvy::dotenv();
    let config = Config::parse();
    init_tracing();

    config.validate().map_err(anyhow::Error::msg)?;
    let backend = config.faq_backend().map_err(anyhow::Error::msg)?;

    let mut bot = Botiano::new(build_store(backend).await?);
    if let Some(reservations) = config.reservations_backend() {
        bot = bot.with_reservations(reservation_source(reservations));
    }

    info!("Starting botiano");
    discord::run(&config.discord_token, bot).await
}
