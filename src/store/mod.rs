//! KV Store Adapters
//!
//! Narrow boundary to the backing key-value store. The directory only ever
//! issues single-key create/get/update/delete calls and prefix lists; every
//! call answers with a [`KvResponse`] carrying a status, zero or more raw
//! documents and an error detail.

pub mod etcd;
pub mod key;
pub mod memory;

pub use etcd::EtcdStore;
pub use key::KeySpace;
pub use memory::MemoryStore;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::info;

// =============================================================================
// Request / Response
// =============================================================================

/// A single adapter call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvRequest {
    /// Record key or collection prefix
    pub url: String,
    /// Document to create
    pub content: Bytes,
    /// Replacement document for update
    pub new_content: Bytes,
}

impl KvRequest {
    /// Request addressing a key or prefix only
    pub fn key(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create request
    pub fn create(url: impl Into<String>, content: Bytes) -> Self {
        Self {
            url: url.into(),
            content,
            ..Default::default()
        }
    }

    /// Update request
    pub fn update(url: impl Into<String>, new_content: Bytes) -> Self {
        Self {
            url: url.into(),
            new_content,
            ..Default::default()
        }
    }
}

/// Outcome reported by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvStatus {
    Success,
    /// The key (or, for create, a free slot) does not exist
    NotFound,
    /// The store could not be reached or refused the call
    Failure,
}

impl fmt::Display for KvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvStatus::Success => write!(f, "Success"),
            KvStatus::NotFound => write!(f, "NotFound"),
            KvStatus::Failure => write!(f, "Failure"),
        }
    }
}

/// Adapter answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvResponse {
    pub status: KvStatus,
    /// Raw documents, in key order
    pub message: Vec<Bytes>,
    /// Error detail when the status is not [`KvStatus::Success`]
    pub error: String,
}

impl KvResponse {
    pub fn success(message: Vec<Bytes>) -> Self {
        Self {
            status: KvStatus::Success,
            message,
            error: String::new(),
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: KvStatus::NotFound,
            message: Vec::new(),
            error: error.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: KvStatus::Failure,
            message: Vec::new(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == KvStatus::Success
    }
}

// =============================================================================
// KvStore Trait
// =============================================================================

/// Backing store boundary
///
/// Mutations are visible to every reader as soon as the call returns.
/// Implementations never cache.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Adapter name, for logs
    fn name(&self) -> &str;

    /// Store `content` under `url`; fails if the key already exists
    async fn create(&self, request: KvRequest) -> KvResponse;

    /// Fetch the document at `url`
    async fn get(&self, request: KvRequest) -> KvResponse;

    /// Fetch every document whose key starts with `url`
    async fn list(&self, request: KvRequest) -> KvResponse;

    /// Replace the document at `url` with `new_content`; the key must exist
    async fn update(&self, request: KvRequest) -> KvResponse;

    /// Remove the key `url`
    async fn delete(&self, request: KvRequest) -> KvResponse;
}

/// Build the adapter named by the database configuration
pub fn connect(config: &DatabaseConfig) -> Result<Arc<dyn KvStore>> {
    match config.driver.to_lowercase().as_str() {
        "memory" => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "etcd" => {
            info!("Using etcd store at {:?}", config.endpoints);
            Ok(Arc::new(EtcdStore::new(config)?))
        }
        other => Err(Error::Configuration(format!(
            "unknown database driver: {}",
            other
        ))),
    }
}
