//! kvgate server library.
//!
//! HTTP facade over an etcd cluster: `set`, `get`, `getAll` and `delete`
//! as REST endpoints. Exposed as a library for integration tests.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod node;
pub mod paths;
