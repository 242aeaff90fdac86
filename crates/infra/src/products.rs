//! Product persistence over the generic document store.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value as JsonValue;

use votecast_products::{
    NewProduct, PRODUCT_COLLECTION, Product, ProductId, ProductStatus, StoredProduct, VoteOption,
};

use crate::document_store::{Document, DocumentStore, Filter, StoreError, StoredDocument};
use crate::error::ServiceError;

/// Typed access to the `product` collection.
#[derive(Debug, Clone)]
pub struct ProductRepository<S> {
    store: S,
    vote_window: Duration,
}

impl<S: DocumentStore> ProductRepository<S> {
    /// Upper bound on a single listing.
    pub const LIST_LIMIT: usize = 100;

    pub fn new(store: S, vote_window: Duration) -> Self {
        Self { store, vote_window }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn vote_window(&self) -> Duration {
        self.vote_window
    }

    pub async fn create(
        &self,
        input: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<StoredProduct, ServiceError> {
        let product = input.into_product(now, self.vote_window)?;
        let id = self
            .store
            .insert(PRODUCT_COLLECTION, to_document(&product)?)
            .await?;

        tracing::info!(product_id = %id, title = product.title(), "product created");
        Ok(StoredProduct {
            id: ProductId::new(id),
            product,
        })
    }

    /// Products currently open for voting, oldest first.
    pub async fn list_in_voting(&self, limit: usize) -> Result<Vec<StoredProduct>, ServiceError> {
        let filter = Filter::all().eq("status", ProductStatus::InVoting.as_str());
        self.store
            .query(PRODUCT_COLLECTION, &filter, limit.min(Self::LIST_LIMIT))
            .await?
            .into_iter()
            .map(|doc| from_stored(doc).map_err(ServiceError::from))
            .collect()
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, ServiceError> {
        let found = self
            .store
            .find_by_id(PRODUCT_COLLECTION, id.document_id())
            .await?;
        Ok(found.map(from_stored).transpose()?)
    }

    /// Look up a product by its textual id. Malformed ids are reported as not found.
    pub async fn find(&self, raw_id: &str) -> Result<StoredProduct, ServiceError> {
        let id: ProductId = raw_id.parse()?;
        self.get(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Atomically add one vote for `option`. `None` if the product vanished.
    pub async fn record_vote(
        &self,
        id: ProductId,
        option: VoteOption,
    ) -> Result<Option<StoredProduct>, ServiceError> {
        let updated = self
            .store
            .increment(
                PRODUCT_COLLECTION,
                id.document_id(),
                &option.counter_path(),
                1,
            )
            .await?;
        Ok(updated.map(from_stored).transpose()?)
    }
}

fn to_document(product: &Product) -> Result<Document, StoreError> {
    match serde_json::to_value(product) {
        Ok(JsonValue::Object(doc)) => Ok(doc),
        Ok(other) => Err(StoreError::InvalidDocument(format!(
            "product encoded as non-object: {other}"
        ))),
        Err(e) => Err(StoreError::InvalidDocument(e.to_string())),
    }
}

fn from_stored(doc: StoredDocument) -> Result<StoredProduct, StoreError> {
    let product: Product = serde_json::from_value(JsonValue::Object(doc.body))
        .map_err(|e| StoreError::InvalidDocument(format!("product {}: {e}", doc.id)))?;
    Ok(StoredProduct {
        id: ProductId::new(doc.id),
        product,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use serde_json::json;
    use votecast_core::DocumentId;
    use votecast_products::Counts;

    use super::*;
    use crate::document_store::{InMemoryDocumentStore, Patch};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn repo() -> ProductRepository<Arc<InMemoryDocumentStore>> {
        ProductRepository::new(Arc::new(InMemoryDocumentStore::new()), Duration::hours(72))
    }

    #[tokio::test]
    async fn create_persists_initial_document() {
        let repo = repo();
        let created = repo.create(NewProduct::new("Lamp"), test_time()).await.unwrap();

        let raw = repo
            .store()
            .find_by_id(PRODUCT_COLLECTION, created.id.document_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.body["status"], "in_voting");
        assert_eq!(raw.body["vote_end_at"], json!(test_time() + Duration::hours(72)));
        assert_eq!(raw.body["counts"]["buy_now"], 0);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn invalid_input_is_not_stored() {
        let repo = repo();
        let err = repo.create(NewProduct::new(""), test_time()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert!(repo.store().collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_only_returns_products_in_voting() {
        let repo = repo();
        let open = repo.create(NewProduct::new("Open"), test_time()).await.unwrap();
        let closed = repo.create(NewProduct::new("Closed"), test_time()).await.unwrap();
        repo.store()
            .update(
                PRODUCT_COLLECTION,
                closed.id.document_id(),
                Patch::default().set("status", "sold"),
            )
            .await
            .unwrap();

        let listed = repo.list_in_voting(100).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);
    }

    #[tokio::test]
    async fn listing_is_capped() {
        let repo = repo();
        for i in 0..105 {
            repo.create(NewProduct::new(format!("p{i}")), test_time())
                .await
                .unwrap();
        }

        assert_eq!(repo.list_in_voting(usize::MAX).await.unwrap().len(), 100);
        assert_eq!(repo.list_in_voting(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn find_treats_malformed_and_unknown_ids_as_not_found() {
        let repo = repo();
        assert!(matches!(repo.find("not-an-id").await, Err(ServiceError::NotFound)));
        assert!(matches!(
            repo.find(&DocumentId::new().to_string()).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn record_vote_increments_a_single_option() {
        let repo = repo();
        let created = repo.create(NewProduct::new("Lamp"), test_time()).await.unwrap();

        let updated = repo
            .record_vote(created.id, VoteOption::Tokenization)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.product.counts.get(VoteOption::Tokenization), 1);
        assert_eq!(updated.product.counts.total(), 1);
        assert_ne!(updated.product.counts, Counts::zeroed());

        let missing = repo
            .record_vote(ProductId::new(DocumentId::new()), VoteOption::Raffle)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
