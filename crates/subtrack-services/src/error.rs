//! Use-case level errors
//!
//! The delivery layer only ever sees these two outcomes; storage-specific
//! details stay in the logs.

use subtrack_core::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("subscription not found")]
    NotFound,

    #[error("internal error")]
    Internal,
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => ServiceError::NotFound,
            _ => ServiceError::Internal,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => AppError::NotFound(err.to_string()),
            ServiceError::Internal => AppError::Internal(err.to_string()),
        }
    }
}
