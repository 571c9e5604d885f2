//! Error taxonomy for stockroom operations.

use thiserror::Error;

/// Repository layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    /// The referenced parent project does not exist.
    #[error("project {project_id} not found")]
    ProjectNotFound { project_id: i32 },

    /// No good exists under the given `(id, project_id)` pair.
    #[error("good {id} not found in project {project_id}")]
    GoodNotFound { id: i32, project_id: i32 },

    /// Existence was confirmed inside the transaction but the subsequent
    /// write failed (lost race with a concurrent mutation).
    #[error("update of good {id} failed after existence check")]
    UpdateFailed { id: i32 },

    /// Connection or transaction failure from the relational store.
    #[error("store error: {reason}")]
    Store { reason: String },
}

impl RepoError {
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }
}

/// Cache layer errors.
///
/// `Miss` is a control-flow signal, not a failure: callers branch on it to
/// fall back to the source of truth. Every other variant is a real error and
/// the list read path fails closed on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,

    #[error("cache backend error: {reason}")]
    Backend { reason: String },
}

impl CacheError {
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// True when this is the miss signal rather than a real failure.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Event buffer/writer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// The bulk transactional insert failed; buffered events were retained
    /// and the next append re-attempts the flush.
    #[error("event flush failed: {reason}")]
    FlushFailed { reason: String },

    /// Connection failure from the analytical store.
    #[error("analytical store error: {reason}")]
    Store { reason: String },
}

impl EventError {
    pub fn flush(reason: impl Into<String>) -> Self {
        Self::FlushFailed {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_is_distinguished_from_backend_errors() {
        assert!(CacheError::Miss.is_miss());
        assert!(!CacheError::backend("connection refused").is_miss());
    }

    #[test]
    fn repo_errors_render_identifiers() {
        let err = RepoError::GoodNotFound {
            id: 4,
            project_id: 2,
        };
        assert_eq!(err.to_string(), "good 4 not found in project 2");

        let err = RepoError::ProjectNotFound { project_id: 8 };
        assert!(err.to_string().contains('8'));
    }
}
