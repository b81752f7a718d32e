pub mod memory;
pub mod models;
pub mod postgres;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use models::{AlertDocument, TransactionDocument, UserDocument};
pub use postgres::PgDocumentStore;

/// A schema-less record as it travels between the store and the gateway.
pub type Document = Map<String, Value>;

/// Field carrying the store-assigned identifier on every document.
pub const ID_FIELD: &str = "_id";

/// Field holding large embedded vectors; never returned to callers.
pub const EMBEDDING_FIELD: &str = "embedding";

/// Errors raised by document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Duplicate key in {collection}: {detail}")]
    DuplicateKey { collection: Collection, detail: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Raised when a caller-supplied string is not a native store identifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid identifier: {0}")]
pub struct InvalidIdentifier(pub String);

/// Native identifier form of the store (UUID, hyphenated on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| InvalidIdentifier(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Named collections exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Alerts,
    Transactions,
    Feedback,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Alerts,
        Collection::Transactions,
        Collection::Feedback,
        Collection::Users,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Alerts => "alerts",
            Collection::Transactions => "transactions",
            Collection::Feedback => "user_feedback",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filter shapes supported by every backend
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    ById(DocumentId),
    /// Unordered set membership on the identifier; an empty set matches nothing.
    IdIn(HashSet<DocumentId>),
    FieldEq(String, Value),
}

impl Filter {
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::FieldEq(field.into(), value.into())
    }

    /// In-memory evaluation, shared by the memory backend and tests.
    pub fn matches(&self, id: &DocumentId, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::ById(wanted) => wanted == id,
            Filter::IdIn(ids) => ids.contains(id),
            Filter::FieldEq(field, value) if field == ID_FIELD => {
                value.as_str() == Some(id.to_string().as_str())
            }
            Filter::FieldEq(field, value) => doc.get(field) == Some(value),
        }
    }
}

/// Fields excluded from returned documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub exclude: Vec<String>,
}

impl Projection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn without_embedding() -> Self {
        Self {
            exclude: vec![EMBEDDING_FIELD.to_string()],
        }
    }

    pub fn apply(&self, doc: &mut Document) {
        for field in &self.exclude {
            doc.remove(field);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn page(limit: u64, skip: u64) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }
}

/// Backend contract. Documents come back with `_id` set to the stringified id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self
            .find(collection, filter, projection, FindOptions { skip: 0, limit: Some(1) })
            .await?;
        Ok(docs.pop())
    }

    /// Stores `doc` (without `_id`) under `id`.
    async fn insert_one(
        &self,
        collection: Collection,
        id: DocumentId,
        doc: Document,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Cheaply cloneable handle onto the configured document store
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the backend named by the configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory document store");
                Ok(Self::memory())
            }
            StoreBackend::Postgres => {
                let store = PgDocumentStore::connect(config).await?;
                if config.auto_migrate {
                    store.ensure_schema().await?;
                }
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    pub fn alerts(&self) -> CollectionHandle<'_> {
        self.collection(Collection::Alerts)
    }

    pub fn transactions(&self) -> CollectionHandle<'_> {
        self.collection(Collection::Transactions)
    }

    pub fn feedback(&self) -> CollectionHandle<'_> {
        self.collection(Collection::Feedback)
    }

    pub fn users(&self) -> CollectionHandle<'_> {
        self.collection(Collection::Users)
    }

    pub fn collection(&self, collection: Collection) -> CollectionHandle<'_> {
        CollectionHandle {
            store: self.store.as_ref(),
            collection,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

/// Operations scoped to one named collection
pub struct CollectionHandle<'a> {
    store: &'a dyn DocumentStore,
    collection: Collection,
}

impl CollectionHandle<'_> {
    pub async fn find(
        &self,
        filter: &Filter,
        projection: &Projection,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.store.find(self.collection, filter, projection, options).await
    }

    pub async fn find_one(
        &self,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        self.store.find_one(self.collection, filter, projection).await
    }

    /// Insert a document, keeping a valid `_id` if the caller supplied one.
    pub async fn insert_one(&self, mut doc: Document) -> Result<DocumentId, StoreError> {
        let id = match doc.remove(ID_FIELD) {
            None | Some(Value::Null) => DocumentId::new(),
            Some(Value::String(raw)) => DocumentId::parse(&raw)
                .map_err(|e| StoreError::InvalidDocument(e.to_string()))?,
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "{} must be a string, got {}",
                    ID_FIELD, other
                )))
            }
        };
        self.store.insert_one(self.collection, id, doc).await?;
        Ok(id)
    }
}

/// Attach the identifier to a raw backend document.
pub(crate) fn with_id(id: DocumentId, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}
