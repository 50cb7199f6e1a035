//! Errors raised by the store layer.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matched the requested key.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = StoreError::not_found("Book", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Book 42 not found");
    }

    #[test]
    fn sqlx_errors_are_not_not_found() {
        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(!err.is_not_found());
    }
}
