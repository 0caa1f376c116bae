use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::ports::BoxFuture;
use crate::ports::store::{KeyValueStore, StoreError};

const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// JSON tree held in memory, addressed the same way as the remote store.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    root: Arc<Mutex<Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    pub fn with_root(root: Value) -> Self {
        Self {
            root: Arc::new(Mutex::new(root)),
        }
    }

    pub fn snapshot(&self) -> Value {
        self.root.lock().expect("memory store lock").clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub fn split_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath("path is empty".into()));
    }
    let segments = trimmed.split('/').collect::<Vec<_>>();
    for segment in &segments {
        if segment.trim().is_empty() {
            return Err(StoreError::InvalidPath(format!(
                "empty segment in '{path}'"
            )));
        }
        if segment.contains(FORBIDDEN_KEY_CHARS) {
            return Err(StoreError::InvalidPath(format!(
                "forbidden character in segment '{segment}'"
            )));
        }
    }
    Ok(segments)
}

fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

fn assign(root: &mut Value, segments: &[&str], value: Value) {
    let mut node = root;
    for segment in segments {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            unreachable!("node was just replaced with an object");
        };
        node = map
            .entry((*segment).to_string())
            .or_insert(Value::Null);
    }
    *node = value;
}

impl KeyValueStore for InMemoryStore {
    fn read(&self, path: &str) -> BoxFuture<'_, Result<Option<Value>, StoreError>> {
        let path = path.to_string();
        let root = self.root.clone();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let guard = root.lock().expect("memory store lock");
            Ok(lookup(&guard, &segments)
                .filter(|value| !value.is_null())
                .cloned())
        })
    }

    fn atomic_write(
        &self,
        updates: &BTreeMap<String, Value>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let updates = updates.clone();
        let root = self.root.clone();
        Box::pin(async move {
            let mut staged = Vec::with_capacity(updates.len());
            for (path, value) in &updates {
                staged.push((split_path(path)?, value.clone()));
            }

            let mut guard = root.lock().expect("memory store lock");
            for (segments, value) in staged {
                assign(&mut guard, &segments, value);
            }
            Ok(())
        })
    }
}
