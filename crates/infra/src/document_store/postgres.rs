//! Postgres-backed document store.
//!
//! All collections share one table; each row is a `jsonb` body keyed by
//! `(collection, id)`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (invalid text representation) | `22P02` | `InvalidDocument` (e.g. incrementing a non-integer) |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Tls / timeouts | N/A | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `InvalidDocument` |

use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use votecast_core::DocumentId;

use super::r#trait::{Document, DocumentStore, Filter, Patch, StoreError, StoredDocument};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)
"#;

const CREATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS documents_collection_created_idx
    ON documents (collection, created_at)
"#;

/// Postgres-backed document store.
///
/// `increment` is a single `UPDATE ... jsonb_set` statement, so concurrent
/// increments of the same field are serialized by the row lock.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the `documents` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in [CREATE_TABLE, CREATE_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("22P02") => StoreError::InvalidDocument(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
            StoreError::InvalidDocument(format!("failed to decode row in {operation}: {e}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

/// Turn equality conditions into a `jsonb` containment pattern.
///
/// `counts.raffle = 2` becomes `{"counts": {"raffle": 2}}`.
fn containment_pattern(filter: &Filter) -> JsonValue {
    let mut root = Map::new();
    'fields: for (field, value) in &filter.equals {
        let mut segments: Vec<&str> = field.split('.').collect();
        let Some(leaf) = segments.pop() else { continue };

        let mut current = &mut root;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            match entry.as_object_mut() {
                Some(next) => current = next,
                // A scalar condition on a parent path already claimed this key.
                None => continue 'fields,
            }
        }
        current.insert(leaf.to_string(), value.clone());
    }
    JsonValue::Object(root)
}

fn stored_from_row(row: &PgRow) -> Result<StoredDocument, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_id", e))?;
    let body: JsonValue = row
        .try_get("body")
        .map_err(|e| map_sqlx_error("decode_body", e))?;

    match body {
        JsonValue::Object(body) => Ok(StoredDocument {
            id: DocumentId::from_uuid(id),
            body,
        }),
        other => Err(StoreError::InvalidDocument(format!(
            "document {id} is not an object: {other}"
        ))),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, doc))]
    async fn insert(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError> {
        let id = DocumentId::new();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(JsonValue::Object(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let id_param: Option<Uuid> = filter.id.map(Uuid::from);

        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
                AND ($2::uuid IS NULL OR id = $2)
                AND body @> $3
            ORDER BY created_at ASC, id ASC
            LIMIT $4
            "#,
        )
        .bind(collection)
        .bind(id_param)
        .bind(containment_pattern(filter))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query", e))?;

        rows.iter().map(stored_from_row).collect()
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Patch,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(JsonValue::Object(patch.set))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        path: &str,
        delta: i64,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let path: Vec<String> = path.split('.').map(str::to_string).collect();

        let row = sqlx::query(
            r#"
            UPDATE documents
            SET body = jsonb_set(
                body,
                $3::text[],
                to_jsonb(COALESCE((body #>> $3::text[])::bigint, 0) + $4),
                true
            )
            WHERE collection = $1 AND id = $2
            RETURNING id, body
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(&path)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment", e))?;

        row.as_ref().map(stored_from_row).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error("ping", e))
    }

    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("collections", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("collection")
                    .map_err(|e| map_sqlx_error("collections", e))
            })
            .collect()
    }
}
