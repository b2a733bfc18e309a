//! Service-layer errors for the catalog modules.

use bookshelf_db::DbError;
use bookshelf_http::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The record vanished between an existence check and the write that relied on it.
    #[error("{entity} {key} does not exist")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Store(#[from] DbError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            // Callers check existence first; a miss here is a lost race, not a 404.
            e @ CatalogError::NotFound { .. } => AppError::internal(e.to_string()),
            CatalogError::Store(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}
