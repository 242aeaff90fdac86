//! `votecast-core` — shared building blocks for the voting backend.
//!
//! Pure domain primitives only (no IO, no async, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
