//! Store selection and service wiring.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;

use votecast_infra::document_store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};
use votecast_infra::{ProductRepository, VoteHandler};
use votecast_realtime::{Broadcaster, SubscriptionRegistry};

use crate::config::{Config, StoreConfig};

/// Type-erased store shared by every service.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Everything a handler needs, injected as `Extension<Arc<AppServices>>`.
#[derive(Clone)]
pub struct AppServices {
    pub store: SharedStore,
    pub products: ProductRepository<SharedStore>,
    pub votes: VoteHandler<SharedStore>,
    pub registry: Arc<SubscriptionRegistry>,
}

impl AppServices {
    pub fn new(store: SharedStore, vote_window: Duration) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let products = ProductRepository::new(store.clone(), vote_window);
        let votes = VoteHandler::new(products.clone(), Broadcaster::new(registry.clone()));
        Self {
            store,
            products,
            votes,
            registry,
        }
    }

    /// In-memory services, as used by tests and the default deployment.
    pub fn in_memory(vote_window: Duration) -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()), vote_window)
    }
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
        StoreConfig::Postgres { database_url } => {
            tracing::info!("using postgres document store");
            let store = PostgresDocumentStore::connect(database_url)
                .await
                .context("failed to connect to postgres")?;
            Arc::new(store)
        }
    };

    Ok(AppServices::new(store, config.vote_window))
}
