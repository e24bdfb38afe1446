//! Errors raised by the generic repository and the entity store.

use thiserror::Error;

/// Failure taxonomy shared by every repository operation
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Malformed caller input (non-positive page size, null identity, ...)
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    /// The entity type does not declare exactly one integer identity column
    #[error("entity '{entity}' cannot be managed: {message}")]
    Schema { entity: String, message: String },
    /// Any failure reported by the underlying store
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl RepositoryError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn schema<E: Into<String>, S: Into<String>>(entity: E, message: S) -> Self {
        Self::Schema {
            entity: entity.into(),
            message: message.into(),
        }
    }
}
