//! Error types for school-server services

use thiserror::Error;

use crate::db::DbError;
use crate::models::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the resource services
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced identifier does not exist
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Missing or malformed input field
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Datastore failure during a read or write
    #[error("persistence failure: {0}")]
    Persistence(DbError),
}

impl From<DbError> for Error {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Persistence(other),
        }
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_not_found_maps_to_not_found() {
        let err = Error::from(DbError::NotFound {
            resource: "student",
            id: 7,
        });
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "student '7' not found");
    }

    #[test]
    fn sqlx_error_maps_to_persistence() {
        let err = Error::from(DbError::Sqlx(sqlx::Error::RowNotFound));
        assert!(matches!(err, Error::Persistence(_)));
    }
}
