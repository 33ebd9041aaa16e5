//! Store error model.
//!
//! | Source | StoreError | Caller action |
//! |--------|------------|---------------|
//! | `DomainError::Validation` | `Domain` | re-prompt |
//! | `DomainError::NotFound` | `Domain` | re-select |
//! | `DomainError::InsufficientStock` | `Domain` | nothing was written |
//! | any `sqlx::Error` | `Persistence` | in-flight transaction was rolled back |
//! | filesystem (backup/export) | `Io` | data untouched |
//! | CSV encoding | `Export` | data untouched |
//! | undecodable stored row | `Corrupt` | inspect the database |

use std::path::{Path, PathBuf};

use thiserror::Error;

use labinv_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error in {operation}: {message}")]
    Persistence { operation: String, message: String },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export failed: {0}")]
    Export(String),

    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::Validation(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::InsufficientStock { .. }))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence { .. })
    }

    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Export(err.to_string())
    }
}

/// Map a sqlx error raised during `operation`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    let message = match &err {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                format!("unique constraint violated: {}", db_err.message())
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                format!("foreign key violated: {}", db_err.message())
            }
            sqlx::error::ErrorKind::CheckViolation => {
                format!("check constraint violated: {}", db_err.message())
            }
            _ => db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed => "connection pool is closed".to_string(),
        other => other.to_string(),
    };
    StoreError::Persistence {
        operation: operation.to_string(),
        message,
    }
}
