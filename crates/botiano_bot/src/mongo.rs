//! MongoDB-backed FAQ collection.
//!
//! Documents carry `_id`, `pregunta` and `respuesta`. Ids are exposed as
//! ObjectId hex strings so they can travel inside button custom ids.

use async_trait::async_trait;
use botiano_core::{Error, FaqEntry, FaqStore, Result, fallback_pattern};
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct FaqDocument {
    #[serde(rename = "_id")]
    id: Bson,
    #[serde(rename = "pregunta", default)]
    question: String,
    #[serde(rename = "respuesta", default)]
    answer: String,
}

impl From<FaqDocument> for FaqEntry {
    fn from(doc: FaqDocument) -> Self {
        let id = match doc.id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        };
        FaqEntry::new(id, doc.question, doc.answer)
    }
}

pub struct MongoFaqStore {
    collection: Collection<FaqDocument>,
}

impl MongoFaqStore {
    /// Connects and pings the server. A failed ping is logged, not fatal:
    /// lookups will fail individually until the database comes back.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(Error::store)?;
        let db = client.database(database);

        match db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => info!(%database, %collection, "Connected to MongoDB"),
            Err(err) => warn!(error = %err, %database, "MongoDB ping failed"),
        }

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

/// Filter for an id taken from a button. ObjectId hex is tried first so
/// collections keyed by plain strings keep working.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id },
    }
}

fn pattern_filter(pattern: &str) -> Document {
    doc! { "pregunta": { "$regex": pattern, "$options": "i" } }
}

#[async_trait]
impl FaqStore for MongoFaqStore {
    async fn all_entries(&self) -> Result<Vec<FaqEntry>> {
        let cursor = self.collection.find(doc! {}).await.map_err(Error::store)?;
        let docs: Vec<FaqDocument> = cursor.try_collect().await.map_err(Error::store)?;
        Ok(docs.into_iter().map(FaqEntry::from).collect())
    }

    async fn find_matching(&self, raw_query: &str) -> Result<Option<FaqEntry>> {
        let Some(pattern) = fallback_pattern(raw_query) else {
            return Ok(None);
        };
        let found = self
            .collection
            .find_one(pattern_filter(&pattern))
            .await
            .map_err(Error::store)?;
        Ok(found.map(FaqEntry::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FaqEntry>> {
        let found = self
            .collection
            .find_one(id_filter(id))
            .await
            .map_err(Error::store)?;
        Ok(found.map(FaqEntry::from))
    }
}
