//! Document-store boundary.
//!
//! The remote managed document store is consumed as a black box behind the
//! [`DocumentStore`] trait: point read/write/update of single documents plus
//! a realtime subscription per logical collection. A subscription delivers
//! *full snapshots* of the collection (no incremental diffs); each delivery
//! wholesale-replaces the local mirror's view of that collection.
//!
//! The actual transport is left to the implementation. [`memory::MemoryStore`]
//! is the in-process backend used for development and tests.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::mpsc;

/// Logical collections of the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Profile documents, keyed by identity uid.
    Users,
    /// Post documents (image posts and pulses).
    Posts,
    /// Post collection documents.
    Collections,
    /// User-filed reports.
    Reports,
    /// The configuration singleton.
    Config,
}

impl CollectionKind {
    /// All collections, in subscription order.
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Users,
        CollectionKind::Posts,
        CollectionKind::Collections,
        CollectionKind::Reports,
        CollectionKind::Config,
    ];

    /// Remote collection name.
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::Users => "users",
            CollectionKind::Posts => "posts",
            CollectionKind::Collections => "collections",
            CollectionKind::Reports => "reports",
            CollectionKind::Config => "config",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document as delivered by the store: envelope id plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Document body.
    pub data: Value,
}

impl Document {
    /// Creates a new document envelope.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A full replacement delivery of a collection's current contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The collection this snapshot replaces.
    pub collection: CollectionKind,
    /// All documents currently in the collection, in delivery order.
    pub docs: Vec<Document>,
}

/// Event delivered on a subscription channel.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A full snapshot of the subscribed collection.
    Snapshot(Snapshot),
    /// A delivery error. The mirror stays stale; no automatic retry.
    Error(String),
}

/// An active realtime subscription to one collection.
///
/// Dropping the subscription unsubscribes: the store observes the closed
/// channel and stops delivering. [`crate::client::FeedClient`] drops all
/// subscriptions deterministically on logout and before re-subscribing.
#[derive(Debug)]
pub struct Subscription {
    collection: CollectionKind,
    receiver: mpsc::UnboundedReceiver<StoreEvent>,
}

impl Subscription {
    /// Creates a subscription from its channel half. Used by store
    /// implementations.
    pub fn new(collection: CollectionKind, receiver: mpsc::UnboundedReceiver<StoreEvent>) -> Self {
        Self {
            collection,
            receiver,
        }
    }

    /// The collection this subscription covers.
    pub fn collection(&self) -> CollectionKind {
        self.collection
    }

    /// Non-blocking poll for the next pending event.
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        self.receiver.try_recv().ok()
    }

    /// Awaits the next event. Returns `None` once the store side is gone.
    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.receiver.recv().await
    }
}

/// Boundary to the remote managed document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read of a single document. `Ok(None)` when absent.
    async fn get_one(&self, collection: CollectionKind, id: &str) -> Result<Option<Document>>;

    /// Full replace, create-or-overwrite.
    async fn set_one(&self, collection: CollectionKind, id: &str, doc: Value) -> Result<()>;

    /// Merge-patch of the named fields only. Errors if the document is absent.
    async fn update_fields(
        &self,
        collection: CollectionKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()>;

    /// Create with a generated id; returns the id.
    async fn add_one(&self, collection: CollectionKind, doc: Value) -> Result<String>;

    /// Opens a realtime subscription to a collection. The current contents
    /// are delivered as the first snapshot.
    fn subscribe(&self, collection: CollectionKind) -> Result<Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert_eq!(CollectionKind::Users.name(), "users");
        assert_eq!(CollectionKind::Config.to_string(), "config");
        assert_eq!(CollectionKind::ALL.len(), 5);
    }

    #[test]
    fn test_subscription_try_next_empty() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(CollectionKind::Posts, rx);
        assert!(sub.try_next().is_none());

        tx.send(StoreEvent::Error("boom".to_string())).unwrap();
        assert!(matches!(sub.try_next(), Some(StoreEvent::Error(_))));
    }
}
