use thiserror::Error;

use votecast_core::DomainError;

use crate::document_store::StoreError;

/// Error surfaced by product and voting services.
///
/// The first three are caller mistakes (4xx); `StoreUnavailable` is ours (5xx).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unknown or malformed identifier.
    #[error("product not found")]
    NotFound,

    /// Action attempted outside the status that allows it.
    #[error("{0}")]
    InvalidState(String),

    /// Unrecognised option or out-of-range field.
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ServiceError::InvalidArgument(msg),
            DomainError::InvalidState(msg) => ServiceError::InvalidState(msg),
            DomainError::InvalidId(_) | DomainError::NotFound => ServiceError::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_onto_service_taxonomy() {
        assert!(matches!(
            ServiceError::from(DomainError::validation("invalid option: x")),
            ServiceError::InvalidArgument(m) if m == "invalid option: x"
        ));
        assert!(matches!(
            ServiceError::from(DomainError::invalid_state("voting not active")),
            ServiceError::InvalidState(_)
        ));
        assert!(matches!(
            ServiceError::from(DomainError::invalid_id("DocumentId: bad")),
            ServiceError::NotFound
        ));
        assert!(matches!(ServiceError::from(DomainError::not_found()), ServiceError::NotFound));
    }
}
