//! In-process document store backend.
//!
//! `MemoryStore` implements the [`DocumentStore`] boundary entirely in
//! memory: documents live in per-collection maps with a delivery-order
//! index, and every successful write broadcasts a fresh full snapshot to the
//! collection's subscribers. This is the backend used by the test suite and
//! by offline development; it also exposes failure-injection hooks so tests
//! can exercise degraded and partial-mutation paths.

use crate::error::{HeartfyError, Result};
use crate::store::{CollectionKind, Document, DocumentStore, Snapshot, StoreEvent, Subscription};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Which operation a failure injection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOp {
    /// Fail the next `get_one` for the keyed document.
    Get,
    /// Fail the next `set_one` for the keyed document.
    Set,
    /// Fail the next `update_fields` for the keyed document.
    Update,
}

#[derive(Default)]
struct CollectionData {
    docs: HashMap<String, Value>,
    order: Vec<String>,
}

impl CollectionData {
    fn insert(&mut self, id: String, doc: Value) {
        if !self.docs.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.docs.insert(id, doc);
    }

    fn snapshot(&self, collection: CollectionKind) -> Snapshot {
        let docs = self
            .order
            .iter()
            .filter_map(|id| {
                self.docs
                    .get(id)
                    .map(|data| Document::new(id.clone(), data.clone()))
            })
            .collect();
        Snapshot { collection, docs }
    }
}

#[derive(Default)]
struct Inner {
    collections: HashMap<CollectionKind, CollectionData>,
    subscribers: HashMap<CollectionKind, Vec<mpsc::UnboundedSender<StoreEvent>>>,
    fail_next: HashSet<(FailOp, CollectionKind, String)>,
}

impl Inner {
    fn take_failure(&mut self, op: FailOp, collection: CollectionKind, id: &str) -> bool {
        self.fail_next
            .remove(&(op, collection, id.to_string()))
    }

    fn broadcast(&mut self, collection: CollectionKind) {
        let snapshot = self
            .collections
            .entry(collection)
            .or_default()
            .snapshot(collection);
        if let Some(senders) = self.subscribers.get_mut(&collection) {
            senders.retain(|tx| tx.send(StoreEvent::Snapshot(snapshot.clone())).is_ok());
        }
    }
}

/// In-memory implementation of [`DocumentStore`].
///
/// Cloning yields another handle onto the same underlying store, so tests
/// can keep a handle while the client owns one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot failure for the next `op` on `collection/{id}`.
    pub fn fail_next(&self, op: FailOp, collection: CollectionKind, id: &str) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.fail_next.insert((op, collection, id.to_string()));
    }

    /// Delivers a subscription error to the collection's subscribers.
    pub fn emit_error(&self, collection: CollectionKind, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(senders) = inner.subscribers.get_mut(&collection) {
            senders.retain(|tx| tx.send(StoreEvent::Error(message.clone())).is_ok());
        }
    }

    /// Number of live subscribers to a collection. Closed channels are
    /// pruned before counting.
    pub fn subscriber_count(&self, collection: CollectionKind) -> usize {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(senders) = inner.subscribers.get_mut(&collection) {
            senders.retain(|tx| !tx.is_closed());
            senders.len()
        } else {
            0
        }
    }

    /// Number of documents currently in a collection.
    pub fn doc_count(&self, collection: CollectionKind) -> usize {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner
            .collections
            .get(&collection)
            .map(|c| c.docs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_one(&self, collection: CollectionKind, id: &str) -> Result<Option<Document>> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.take_failure(FailOp::Get, collection, id) {
            return Err(HeartfyError::mutation(format!(
                "injected read failure for {}/{}",
                collection, id
            )));
        }
        Ok(inner
            .collections
            .get(&collection)
            .and_then(|c| c.docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn set_one(&self, collection: CollectionKind, id: &str, doc: Value) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.take_failure(FailOp::Set, collection, id) {
            return Err(HeartfyError::mutation(format!(
                "injected write failure for {}/{}",
                collection, id
            )));
        }
        inner
            .collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), doc);
        inner.broadcast(collection);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: CollectionKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.take_failure(FailOp::Update, collection, id) {
            return Err(HeartfyError::mutation(format!(
                "injected update failure for {}/{}",
                collection, id
            )));
        }
        let data = inner
            .collections
            .entry(collection)
            .or_default()
            .docs
            .get_mut(id)
            .ok_or_else(|| HeartfyError::not_found(format!("{}/{}", collection, id)))?;
        match data {
            Value::Object(map) => {
                for (key, value) in fields {
                    map.insert(key, value);
                }
            }
            _ => {
                return Err(HeartfyError::mutation(format!(
                    "document {}/{} is not an object",
                    collection, id
                )))
            }
        }
        inner.broadcast(collection);
        Ok(())
    }

    async fn add_one(&self, collection: CollectionKind, doc: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner
            .collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), doc);
        inner.broadcast(collection);
        Ok(id)
    }

    fn subscribe(&self, collection: CollectionKind) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().expect("store lock poisoned");
        // Initial delivery: the collection's current contents.
        let snapshot = inner
            .collections
            .entry(collection)
            .or_default()
            .snapshot(collection);
        tx.send(StoreEvent::Snapshot(snapshot))
            .map_err(|_| HeartfyError::subscription("subscriber channel closed"))?;
        inner.subscribers.entry(collection).or_default().push(tx);
        Ok(Subscription::new(collection, rx))
    }
}
