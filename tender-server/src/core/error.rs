//! Server startup errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Storage initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
