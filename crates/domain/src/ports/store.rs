use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store request timed out: {0}")]
    Timeout(String),
    #[error("store permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid store path: {0}")]
    InvalidPath(String),
    #[error("store payload error: {0}")]
    Serialization(String),
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Path-addressed JSON store. Paths are `/`-separated, without a leading slash.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, path: &str) -> BoxFuture<'_, Result<Option<Value>, StoreError>>;

    /// Applies every entry or none of them.
    fn atomic_write(
        &self,
        updates: &BTreeMap<String, Value>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;
}
