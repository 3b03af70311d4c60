//! Store trait and the key-value record it returns.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A single key-value pair, as stored and as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Narrow interface over an ordered key-value store.
///
/// Implementations must be safe to share across concurrently running
/// requests. Each method is a single round trip; none of them retry.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`. Last write wins.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Read the value stored under exactly `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// All pairs whose key starts with `prefix`, ordered by key.
    ///
    /// The empty prefix matches every key.
    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Short backend name for health reporting ("etcd", "memory").
    fn backend_name(&self) -> &'static str;
}
