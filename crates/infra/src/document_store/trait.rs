use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use votecast_core::DocumentId;

/// A JSON object stored in a collection. The id is kept beside the body.
pub type Document = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored or submitted document does not have the expected shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Equality filter over document fields.
///
/// Field names may be dotted paths into nested objects (`"counts.raffle"`).
/// All conditions must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<DocumentId>,
    pub equals: Vec<(String, JsonValue)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocumentId) -> Self {
        Self {
            id: Some(id),
            equals: Vec::new(),
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, id: DocumentId, body: &Document) -> bool {
        if self.id.is_some_and(|wanted| wanted != id) {
            return false;
        }
        self.equals
            .iter()
            .all(|(field, value)| lookup(body, field) == Some(value))
    }
}

/// Top-level fields to overwrite on an existing document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub set: Document,
}

impl Patch {
    pub fn set(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }
}

/// Resolve a dotted path inside a document.
pub(crate) fn lookup<'a>(body: &'a Document, path: &str) -> Option<&'a JsonValue> {
    let mut segments = path.split('.');
    let mut current = body.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Narrow document-store interface used by the product repository.
///
/// Implementations must make `increment` atomic per document: concurrent
/// increments of the same field never lose an update.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for diagnostics.
    fn kind(&self) -> &'static str;

    /// Store a new document and return its assigned id.
    async fn insert(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError>;

    /// Documents matching `filter`, oldest first, at most `limit` of them.
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Overwrite top-level fields. Returns `false` if the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Patch,
    ) -> Result<bool, StoreError>;

    /// Atomically add `delta` to the integer at `path`, treating a missing
    /// field as zero. Returns the updated document, or `None` if it does not exist.
    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        path: &str,
        delta: i64,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Names of collections holding at least one document.
    async fn collections(&self) -> Result<Vec<String>, StoreError>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self
            .query(collection, &Filter::by_id(id), 1)
            .await?
            .into_iter()
            .next())
    }
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError> {
        (**self).insert(collection, doc).await
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).query(collection, filter, limit).await
    }

    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Patch,
    ) -> Result<bool, StoreError> {
        (**self).update(collection, id, patch).await
    }

    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        path: &str,
        delta: i64,
    ) -> Result<Option<StoredDocument>, StoreError> {
        (**self).increment(collection, id, path, delta).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        (**self).collections().await
    }
}
