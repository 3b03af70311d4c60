//! In-process ordered store.
//!
//! Behaves like a single etcd member without the network: ordered keys,
//! last-write-wins puts, idempotent deletes. Faults can be injected so
//! callers can exercise their error paths.

use crate::error::{Result, StoreError};
use crate::kv_store::{KeyValue, KvStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// [`KvStore`] over a `BTreeMap` behind a read-write lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    unavailable: AtomicBool,
    fail_next: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `pairs`.
    pub fn with_entries<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            for (k, v) in pairs {
                entries.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Make every subsequent operation fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `n` operations, then recover.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_fault(&self, op: &'static str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op}: injected outage")));
        }

        let consumed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            return Err(StoreError::Request {
                op,
                reason: "injected failure".to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.check_fault("put")?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_fault("get")?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        self.check_fault("range")?;
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| KeyValue::new(k.as_str(), v.as_str()))
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_fault("delete")?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
