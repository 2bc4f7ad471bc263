//! In-Memory Store
//!
//! Ordered map behind a lock. Used for tests, demos and single-process
//! deployments without etcd.

use super::{KvRequest, KvResponse, KvStore};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const UNAVAILABLE: &str = "store unavailable";

/// In-memory [`KvStore`]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Bytes>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away (for testing)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Store a raw document, bypassing the create guard (for testing)
    pub fn insert_raw(&self, key: impl Into<String>, document: Bytes) {
        self.entries.write().insert(key.into(), document);
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, request: KvRequest) -> KvResponse {
        if !self.is_available() {
            return KvResponse::failure(UNAVAILABLE);
        }
        let mut entries = self.entries.write();
        if entries.contains_key(&request.url) {
            return KvResponse::failure(format!("key already exists: {}", request.url));
        }
        debug!("memory create {}", request.url);
        entries.insert(request.url, request.content.clone());
        KvResponse::success(vec![request.content])
    }

    async fn get(&self, request: KvRequest) -> KvResponse {
        if !self.is_available() {
            return KvResponse::failure(UNAVAILABLE);
        }
        match self.entries.read().get(&request.url) {
            Some(document) => KvResponse::success(vec![document.clone()]),
            None => KvResponse::not_found(format!("key not found: {}", request.url)),
        }
    }

    async fn list(&self, request: KvRequest) -> KvResponse {
        if !self.is_available() {
            return KvResponse::failure(UNAVAILABLE);
        }
        let entries = self.entries.read();
        let documents = entries
            .range(request.url.clone()..)
            .take_while(|(key, _)| key.starts_with(&request.url))
            .map(|(_, document)| document.clone())
            .collect();
        KvResponse::success(documents)
    }

    async fn update(&self, request: KvRequest) -> KvResponse {
        if !self.is_available() {
            return KvResponse::failure(UNAVAILABLE);
        }
        let mut entries = self.entries.write();
        match entries.get_mut(&request.url) {
            Some(slot) => {
                debug!("memory update {}", request.url);
                *slot = request.new_content.clone();
                KvResponse::success(vec![request.new_content])
            }
            None => KvResponse::not_found(format!("key not found: {}", request.url)),
        }
    }

    async fn delete(&self, request: KvRequest) -> KvResponse {
        if !self.is_available() {
            return KvResponse::failure(UNAVAILABLE);
        }
        match self.entries.write().remove(&request.url) {
            Some(_) => KvResponse::success(Vec::new()),
            None => KvResponse::not_found(format!("key not found: {}", request.url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KvStatus;

    fn doc(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = MemoryStore::new();
        let resp = store.create(KvRequest::create("/a/1", doc("one"))).await;
        assert!(resp.is_success());

        let resp = store.get(KvRequest::key("/a/1")).await;
        assert_eq!(resp.message, vec![doc("one")]);

        assert!(store.delete(KvRequest::key("/a/1")).await.is_success());
        assert_eq!(
            store.get(KvRequest::key("/a/1")).await.status,
            KvStatus::NotFound
        );
        assert_eq!(
            store.delete(KvRequest::key("/a/1")).await.status,
            KvStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_create_refuses_existing_key() {
        let store = MemoryStore::new();
        store.create(KvRequest::create("/a/1", doc("one"))).await;
        let resp = store.create(KvRequest::create("/a/1", doc("two"))).await;
        assert_eq!(resp.status, KvStatus::Failure);
        assert_eq!(store.get(KvRequest::key("/a/1")).await.message, vec![doc("one")]);
    }

    #[tokio::test]
    async fn test_update_requires_existing_key() {
        let store = MemoryStore::new();
        let resp = store.update(KvRequest::update("/a/1", doc("x"))).await;
        assert_eq!(resp.status, KvStatus::NotFound);

        store.create(KvRequest::create("/a/1", doc("one"))).await;
        assert!(store.update(KvRequest::update("/a/1", doc("two"))).await.is_success());
        assert_eq!(store.get(KvRequest::key("/a/1")).await.message, vec![doc("two")]);
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryStore::new();
        store.insert_raw("/v/t1/a", doc("a"));
        store.insert_raw("/v/t1/b", doc("b"));
        store.insert_raw("/v/t2/c", doc("c"));
        store.insert_raw("/w/t1/d", doc("d"));

        let resp = store.list(KvRequest::key("/v/t1/")).await;
        assert_eq!(resp.message, vec![doc("a"), doc("b")]);

        let resp = store.list(KvRequest::key("/v/")).await;
        assert_eq!(resp.message.len(), 3);

        let resp = store.list(KvRequest::key("/x/")).await;
        assert!(resp.is_success());
        assert!(resp.message.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.insert_raw("/a/1", doc("one"));
        store.set_available(false);

        assert_eq!(store.get(KvRequest::key("/a/1")).await.status, KvStatus::Failure);
        assert_eq!(store.list(KvRequest::key("/a/")).await.status, KvStatus::Failure);
        assert_eq!(
            store.create(KvRequest::create("/a/2", doc("x"))).await.status,
            KvStatus::Failure
        );

        store.set_available(true);
        assert!(store.get(KvRequest::key("/a/1")).await.is_success());
        assert_eq!(store.len(), 1);
    }
}
