//! Per-node key-value storage.

use crate::error::KvError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory map shared by the leader's write path and a follower's replicate path.
///
/// Reads and writes go through the same mutex, so a `get` never observes a
/// half-applied `put` but read throughput is bounded by writes on the node.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional upsert. The only validation is a non-empty key.
    pub fn put(&self, key: &str, value: Value) -> Result<(), KvError> {
        if key.is_empty() {
            return Err(KvError::EmptyKey);
        }
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // A panic while holding the guard cannot leave the map half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
