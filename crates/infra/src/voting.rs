//! Vote handling: validate, persist atomically, then notify viewers.

use chrono::Utc;

use votecast_products::{Counts, VoteRequest};
use votecast_realtime::{Broadcaster, Topic, VoteUpdate};

use crate::document_store::DocumentStore;
use crate::error::ServiceError;
use crate::products::ProductRepository;

#[derive(Debug, Clone)]
pub struct VoteHandler<S> {
    products: ProductRepository<S>,
    broadcaster: Broadcaster,
}

impl<S: DocumentStore> VoteHandler<S> {
    pub fn new(products: ProductRepository<S>, broadcaster: Broadcaster) -> Self {
        Self {
            products,
            broadcaster,
        }
    }

    pub fn products(&self) -> &ProductRepository<S> {
        &self.products
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Record one vote and push the resulting counts to the product's viewers.
    ///
    /// The increment is a single store operation, so concurrent votes never
    /// overwrite each other. The status check happens before it and is not
    /// repeated, so a vote racing a status change may still land.
    ///
    /// Delivery to viewers is best-effort and never fails the vote. When a
    /// later vote on the same product has already been pushed, this vote's
    /// older snapshot is not sent, so viewers never see a count go down.
    pub async fn cast_vote(
        &self,
        product_id: &str,
        request: VoteRequest,
    ) -> Result<Counts, ServiceError> {
        let product = self.products.find(product_id).await?;
        product.product.validate_vote(&request)?;

        let updated = self
            .products
            .record_vote(product.id, request.option)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let counts = updated.product.counts;

        // Each vote adds exactly one, so the total orders snapshots of a product.
        let update = VoteUpdate::new(updated.id, counts.clone(), Utc::now());
        let report = self.broadcaster.broadcast_latest(
            &Topic::from(updated.id),
            counts.total(),
            &update,
        );

        tracing::info!(
            product_id = %updated.id,
            option = %request.option,
            desired_shares = ?request.desired_shares,
            desired_tickets = ?request.desired_tickets,
            viewers = report.map_or(0, |r| r.attempted),
            delivered = report.map_or(0, |r| r.delivered),
            superseded = report.is_none(),
            "vote recorded"
        );
        Ok(counts)
    }
}
