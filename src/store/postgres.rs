use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    types::Json,
    PgPool, Postgres, QueryBuilder, Row,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    with_id, Collection, Document, DocumentId, DocumentStore, Filter, FindOptions, Projection,
    StoreError, ID_FIELD,
};
use crate::config::StoreConfig;

/// Unique lookups the account service relies on.
const USER_INDEXES: [&str; 2] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON \"users\" ((doc ->> 'email'))",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON \"users\" ((doc ->> 'username'))",
];

/// Document store over Postgres: one JSONB table per collection
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;
        let shown = redacted_url(database_url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;

        info!("Created database pool for: {}", shown);
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create collection tables and user indexes if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            sqlx::query(&create_table_sql(collection))
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        for statement in USER_INDEXES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        info!("Document tables ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        if matches!(filter, Filter::IdIn(ids) if ids.is_empty()) {
            return Ok(vec![]);
        }

        let mut query = select_query(collection, filter, projection, options);
        debug!("find on {}: {}", collection, query.sql());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(decode_row).collect()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        id: DocumentId,
        doc: Document,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db) = &err {
                    if db.is_unique_violation() {
                        return StoreError::DuplicateKey {
                            collection,
                            detail: db.message().to_string(),
                        };
                    }
                }
                map_sqlx_error(err)
            })?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn create_table_sql(collection: Collection) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB NOT NULL)",
        quote_identifier(collection.name())
    )
}

/// Build the SELECT for a find; natural order is insertion (`seq`).
fn select_query(
    collection: Collection,
    filter: &Filter,
    projection: &Projection,
    options: FindOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT id, ");
    if projection.exclude.is_empty() {
        query.push("doc");
    } else {
        query.push("doc - ");
        query.push_bind(projection.exclude.clone());
        query.push("::text[] AS doc");
    }
    query.push(" FROM ");
    query.push(quote_identifier(collection.name()));

    match filter {
        Filter::All => {}
        Filter::ById(id) => {
            query.push(" WHERE id = ");
            query.push_bind(id.as_uuid());
        }
        Filter::IdIn(ids) => {
            let ids: Vec<Uuid> = ids.iter().map(DocumentId::as_uuid).collect();
            query.push(" WHERE id = ANY(");
            query.push_bind(ids);
            query.push(")");
        }
        Filter::FieldEq(field, value) if field == ID_FIELD => {
            match value.as_str().map(DocumentId::parse) {
                Some(Ok(id)) => {
                    query.push(" WHERE id = ");
                    query.push_bind(id.as_uuid());
                }
                _ => {
                    query.push(" WHERE FALSE");
                }
            }
        }
        Filter::FieldEq(field, value) => {
            query.push(" WHERE doc -> ");
            query.push_bind(field.clone());
            query.push(" = ");
            query.push_bind(Json(value.clone()));
        }
    }

    query.push(" ORDER BY seq");
    if options.skip > 0 {
        query.push(" OFFSET ");
        query.push_bind(options.skip as i64);
    }
    if let Some(limit) = options.limit {
        query.push(" LIMIT ");
        query.push_bind(limit as i64);
    }
    query
}

fn decode_row(row: &PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row.try_get("id").map_err(map_sqlx_error)?;
    let Json(doc): Json<Value> = row.try_get("doc").map_err(map_sqlx_error)?;
    match doc {
        Value::Object(map) => Ok(with_id(id.into(), map)),
        other => Err(StoreError::InvalidDocument(format!(
            "document {} is not an object: {}",
            id, other
        ))),
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Connection string safe for logs (password removed).
fn redacted_url(database_url: &str) -> Result<String, StoreError> {
    let mut url = url::Url::parse(database_url)
        .map_err(|_| StoreError::Unavailable("Invalid database URL".to_string()))?;
    if url.password().is_some() {
        let _ = url.set_password(Some("****"));
    }
    Ok(url.to_string())
}
