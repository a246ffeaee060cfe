//! Document persistence
//!
//! Each use case appends to its own collection; nothing is ever updated or deleted.
//! [`MongoStore`] is the production backend, [`MemoryStore`] backs tests and
//! `serve --memory-store`.

use async_trait::async_trait;
use mongodb::bson::{self, Document, doc};
use mongodb::{Client, Database};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;

use crate::log_debug;

/// One collection per use case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Courses,
    Syllabi,
    Outcomes,
    Books,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("document conversion failed: {0}")]
    Conversion(#[from] bson::ser::Error),
}

/// Append-only document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Round-trip to the backend to confirm it is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections; called once at shutdown
    async fn close(&self);

    fn backend(&self) -> &'static str;
}

/// MongoDB-backed store
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Parse the connection string and select the database.
    ///
    /// The driver connects lazily, so this succeeds even when the server is down;
    /// use [`DocumentStore::ping`] to check reachability.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database_name);
        Ok(Self { client, database })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let document: Document = bson::to_document(&Value::Object(document))?;
        self.database
            .collection::<Document>(collection.as_ref())
            .insert_one(document)
            .await?;
        log_debug!("Stored document in '{}'", collection);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

/// In-process store keeping documents in insertion order
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored in `collection`
    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.documents
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.documents
            .lock()
            .entry(collection)
            .or_default()
            .push(Value::Object(document));
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Merge the request record and the generated fields into one stored document.
///
/// Generated fields win on key collisions; `created_at` is always set.
pub fn merge_document(record: Map<String, Value>, output: &Value) -> Map<String, Value> {
    let mut document = record;
    if let Value::Object(fields) = output {
        for (key, value) in fields {
            document.insert(key.clone(), value.clone());
        }
    }
    document.insert(
        "created_at".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    document
}
