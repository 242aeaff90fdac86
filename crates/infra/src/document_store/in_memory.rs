use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map, Value as JsonValue};

use votecast_core::DocumentId;

use super::r#trait::{Document, DocumentStore, Filter, Patch, StoreError, StoredDocument};

/// In-memory document store.
///
/// Intended for dev/tests and the default single-process deployment. Documents
/// are kept in id order, which is insertion order since ids are UUIDv7.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<DocumentId, Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// Add `delta` to the integer at `path`, creating missing intermediate objects.
fn increment_in_place(body: &mut Document, path: &str, delta: i64) -> Result<(), StoreError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return Err(StoreError::InvalidDocument("empty field path".to_string()));
    };

    let mut current = body;
    for segment in segments {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        current = next.as_object_mut().ok_or_else(|| {
            StoreError::InvalidDocument(format!("{path}: `{segment}` is not an object"))
        })?;
    }

    let existing = match current.get(leaf) {
        None | Some(JsonValue::Null) => 0,
        Some(v) => v.as_i64().ok_or_else(|| {
            StoreError::InvalidDocument(format!("{path}: not an integer ({v})"))
        })?,
    };
    let next = existing
        .checked_add(delta)
        .ok_or_else(|| StoreError::InvalidDocument(format!("{path}: counter overflow")))?;
    current.insert(leaf.to_string(), JsonValue::from(next));
    Ok(())
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn kind(&self) -> &'static str {
        "in_memory"
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError> {
        let id = DocumentId::new();
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc);
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .iter()
            .filter(|(id, body)| filter.matches(**id, body))
            .take(limit)
            .map(|(id, body)| StoredDocument {
                id: *id,
                body: body.clone(),
            })
            .collect())
    }

    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Patch,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let Some(body) = collections.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
            return Ok(false);
        };
        body.extend(patch.set);
        Ok(true)
    }

    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        path: &str,
        delta: i64,
    ) -> Result<Option<StoredDocument>, StoreError> {
        // Read, add and write happen under one write guard.
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let Some(body) = collections.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
            return Ok(None);
        };

        increment_in_place(body, path, delta)?;
        Ok(Some(StoredDocument {
            id,
            body: body.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.collections.read().map(|_| ()).map_err(|_| poisoned())
    }

    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
