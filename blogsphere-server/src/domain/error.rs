use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// One secondary fetch of an enrichment call failed; no rows were joined.
    #[error("failed to fetch {relation}: {source}")]
    Aggregation {
        relation: &'static str,
        #[source]
        source: Box<DomainError>,
    },

    #[error("{source}; rollback failed: {rollback}")]
    RollbackFailed {
        #[source]
        source: Box<DomainError>,
        rollback: Box<DomainError>,
    },

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn aggregation(relation: &'static str) -> impl FnOnce(DomainError) -> DomainError {
        move |source| DomainError::Aggregation {
            relation,
            source: Box::new(source),
        }
    }
}
