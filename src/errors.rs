//! Error types for prefab pools and asset loads

use std::time::Duration;
use thiserror::Error;

/// Failure reported by an asset load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset load failed: {0}")]
    Failed(String),

    #[error("Load was abandoned before completing")]
    Abandoned,
}

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("Prefab runtime key is not valid: {0}")]
    InvalidPrefab(String),

    #[error("Prefab load failed: {0}")]
    LoadFailed(#[from] LoadError),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Pool has been destroyed")]
    PoolDestroyed,
}

pub type PoolResult<T> = Result<T, PoolError>;
