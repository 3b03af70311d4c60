//! Key-value store capability for the kvgate HTTP gateway.
//!
//! The gateway never talks to a client library directly. It holds an
//! `Arc<dyn KvStore>` built at startup and hands it to every handler:
//! - [`EtcdStore`]: an etcd v3 cluster reached over gRPC
//! - [`MemoryStore`]: an ordered in-process map, for tests and local runs

pub mod error;
pub mod etcd;
pub mod kv_store;
pub mod memory;

pub use error::{Result, StoreError};
pub use etcd::{EtcdStore, EtcdStoreConfig};
pub use kv_store::{KeyValue, KvStore};
pub use memory::MemoryStore;
