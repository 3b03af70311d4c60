//! Store error types.

use thiserror::Error;

/// Errors surfaced by a [`KvStore`](crate::KvStore) implementation.
///
/// The gateway treats every variant the same way; the distinction exists
/// for logs.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not establish a client connection to any endpoint.
    #[error("Failed to connect to {endpoints:?}: {reason}")]
    Connect {
        endpoints: Vec<String>,
        reason: String,
    },

    /// A store operation was sent but failed (transport, timeout, server fault).
    #[error("{op} failed: {reason}")]
    Request { op: &'static str, reason: String },

    /// The store is not reachable at all.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn request(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Request {
            op,
            reason: err.to_string(),
        }
    }
}

/// Store result type.
pub type Result<T> = std::result::Result<T, StoreError>;
