//! Infrastructure layer: document storage, product persistence, vote handling.

pub mod document_store;
pub mod error;
pub mod products;
pub mod voting;

pub use error::ServiceError;
pub use products::ProductRepository;
pub use voting::VoteHandler;
