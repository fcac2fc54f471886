// src/client/cache.rs

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use serde_json::Value;

/// Hierarchical cache key, e.g. `["solutions", "{\"page\":1}"]`.
/// The first segment is the root that mutations invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Short-lived cache of GET responses.
///
/// Entries expire after `ttl` and are dropped early when a mutation
/// invalidates their root key.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: QueryKey, value: Value) {
        if self.ttl.is_zero() {
            return;
        }
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
    }

    /// Drops every entry whose key starts with `root`.
    pub fn invalidate(&self, root: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| key.root() != Some(root));
        tracing::debug!("Invalidated {} cached '{}' entries", before - entries.len(), root);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
