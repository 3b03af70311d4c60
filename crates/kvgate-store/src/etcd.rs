//! etcd v3 backed store.
//!
//! Wraps a single `etcd_client::Client` created at startup. `KvClient` is a
//! cheap handle over a shared gRPC channel, so each call clones it instead
//! of locking a shared `&mut` client.

use crate::error::{Result, StoreError};
use crate::kv_store::{KeyValue, KvStore};
use etcd_client::{Client, ConnectOptions, GetOptions, KvClient};
use std::time::Duration;

/// Connection settings for [`EtcdStore`].
#[derive(Debug, Clone)]
pub struct EtcdStoreConfig {
    /// Cluster endpoints, e.g. `127.0.0.1:2379`.
    pub endpoints: Vec<String>,

    /// Timeout for establishing the connection.
    pub dial_timeout: Duration,

    /// Per-request timeout. `None` leaves the client default in place.
    pub request_timeout: Option<Duration>,
}

/// [`KvStore`] backed by an etcd cluster.
pub struct EtcdStore {
    kv: KvClient,
}

impl EtcdStore {
    /// Connect to the cluster.
    pub async fn connect(config: &EtcdStoreConfig) -> Result<Self> {
        tracing::info!(
            endpoints = ?config.endpoints,
            dial_timeout = ?config.dial_timeout,
            "Connecting to etcd"
        );

        let mut options = ConnectOptions::new().with_connect_timeout(config.dial_timeout);
        if let Some(timeout) = config.request_timeout {
            options = options.with_timeout(timeout);
        }

        let client = Client::connect(&config.endpoints, Some(options))
            .await
            .map_err(|e| StoreError::Connect {
                endpoints: config.endpoints.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            kv: client.kv_client(),
        })
    }

    fn kv(&self) -> KvClient {
        self.kv.clone()
    }
}

/// Which range request a prefix scan turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeScope {
    /// Every key in the cluster.
    AllKeys,
    /// Keys starting with the given prefix.
    Prefix,
}

// etcd has no "prefix of nothing"; the empty prefix is the full key space.
fn range_scope(prefix: &str) -> RangeScope {
    if prefix.is_empty() {
        RangeScope::AllKeys
    } else {
        RangeScope::Prefix
    }
}

fn range_options(prefix: &str) -> GetOptions {
    match range_scope(prefix) {
        RangeScope::AllKeys => GetOptions::new().with_all_keys(),
        RangeScope::Prefix => GetOptions::new().with_prefix(),
    }
}

#[async_trait::async_trait]
impl KvStore for EtcdStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!("PUT key_len={} value_len={}", key.len(), value.len());

        self.kv()
            .put(key, value, None)
            .await
            .map_err(|e| StoreError::request("put", e))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        tracing::debug!("GET key_len={}", key.len());

        let resp = self
            .kv()
            .get(key, None)
            .await
            .map_err(|e| StoreError::request("get", e))?;

        Ok(resp
            .kvs()
            .first()
            .map(|kv| String::from_utf8_lossy(kv.value()).into_owned()))
    }

    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        tracing::debug!("RANGE prefix_len={}", prefix.len());

        let resp = self
            .kv()
            .get(prefix, Some(range_options(prefix)))
            .await
            .map_err(|e| StoreError::request("range", e))?;

        Ok(resp
            .kvs()
            .iter()
            .map(|kv| {
                KeyValue::new(
                    String::from_utf8_lossy(kv.key()),
                    String::from_utf8_lossy(kv.value()),
                )
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        tracing::debug!("DELETE key_len={}", key.len());

        self.kv()
            .delete(key, None)
            .await
            .map_err(|e| StoreError::request("delete", e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "etcd"
    }
}
