//! Generic document storage (collections of JSON documents keyed by id).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{Document, DocumentStore, Filter, Patch, StoreError, StoredDocument};
