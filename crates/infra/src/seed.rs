use std::path::Path;

use anyhow::{Context, Result};
use assessment_domain::store::InMemoryStore;
use serde_json::Value;

/// Loads a JSON document shaped like the remote database into memory.
pub async fn load_memory_store(path: impl AsRef<Path>) -> Result<InMemoryStore> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading seed file {}", path.display()))?;
    memory_store_from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
}

pub fn memory_store_from_str(raw: &str) -> Result<InMemoryStore> {
    let root: Value = serde_json::from_str(raw)?;
    if !root.is_object() {
        anyhow::bail!("seed document must be a JSON object");
    }
    Ok(InMemoryStore::with_root(root))
}
