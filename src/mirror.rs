//! In-memory mirror of the remote collections.
//!
//! `RelationStore` holds the client's local view of profiles, posts,
//! collections, reports, and the configuration singleton, kept current by
//! the realtime subscriptions. Each snapshot delivery wholesale-replaces the
//! mirror's view of one collection; no incremental diffing happens here.
//!
//! ## Indexing
//!
//! Alongside the primary id-keyed maps the store keeps per-collection
//! delivery-order indexes, so feed derivation can preserve the order
//! documents arrived in. Both are rebuilt together on every snapshot.
//!
//! The mirror is also the target of the optimistic patches applied by
//! [`crate::interact`] while a remote write is in flight; the next snapshot
//! is the sole reconciliation mechanism for those patches.

use crate::config::GlobalConfig;
use crate::constants::CONFIG_DOC_ID;
use crate::post::{Post, PostCollection};
use crate::profile::Profile;
use crate::report::Report;
use crate::store::{CollectionKind, Snapshot};
use crate::types::ProfileId;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::warn;

/// Local mirror of the remote document store.
#[derive(Debug, Default)]
pub struct RelationStore {
    profiles: HashMap<String, Profile>,
    profile_order: Vec<String>,
    posts: HashMap<String, Post>,
    post_order: Vec<String>,
    collections: HashMap<String, PostCollection>,
    collection_order: Vec<String>,
    reports: HashMap<String, Report>,
    report_order: Vec<String>,
    config: GlobalConfig,
}

impl RelationStore {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a snapshot, wholesale-replacing the view of its collection.
    ///
    /// Documents that fail to decode are logged and skipped; one bad
    /// document never discards the rest of the delivery.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        match snapshot.collection {
            CollectionKind::Users => {
                let (map, order) = decode_all::<Profile>(&snapshot, |p, id| p.uid = id);
                self.profiles = map;
                self.profile_order = order;
            }
            CollectionKind::Posts => {
                let (map, order) = decode_all::<Post>(&snapshot, |p, id| p.id = id);
                self.posts = map;
                self.post_order = order;
            }
            CollectionKind::Collections => {
                let (map, order) = decode_all::<PostCollection>(&snapshot, |c, id| c.id = id);
                self.collections = map;
                self.collection_order = order;
            }
            CollectionKind::Reports => {
                let (map, order) = decode_all::<Report>(&snapshot, |r, id| r.id = id);
                self.reports = map;
                self.report_order = order;
            }
            CollectionKind::Config => {
                if let Some(doc) = snapshot.docs.iter().find(|d| d.id == CONFIG_DOC_ID) {
                    match serde_json::from_value::<GlobalConfig>(doc.data.clone()) {
                        Ok(config) => self.config = config,
                        Err(err) => {
                            warn!(error = %err, "skipping undecodable config document")
                        }
                    }
                }
            }
        }
    }

    /// Clears the whole mirror. Called on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // =========================================================================
    // Typed Accessors
    // =========================================================================

    /// Gets a profile by id.
    pub fn profile(&self, uid: &str) -> Option<&Profile> {
        self.profiles.get(uid)
    }

    /// All profiles, in delivery order.
    pub fn profiles(&self) -> Vec<&Profile> {
        self.profile_order
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .collect()
    }

    /// Gets a post by id.
    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.get(id)
    }

    /// All posts, in delivery order.
    pub fn posts(&self) -> Vec<&Post> {
        self.post_order
            .iter()
            .filter_map(|id| self.posts.get(id))
            .collect()
    }

    /// Gets a collection by id.
    pub fn collection(&self, id: &str) -> Option<&PostCollection> {
        self.collections.get(id)
    }

    /// All collections, in delivery order.
    pub fn collections(&self) -> Vec<&PostCollection> {
        self.collection_order
            .iter()
            .filter_map(|id| self.collections.get(id))
            .collect()
    }

    /// Gets a report by id.
    pub fn report(&self, id: &str) -> Option<&Report> {
        self.reports.get(id)
    }

    /// All reports, in delivery order.
    pub fn reports(&self) -> Vec<&Report> {
        self.report_order
            .iter()
            .filter_map(|id| self.reports.get(id))
            .collect()
    }

    /// The configuration singleton (default until the first config snapshot).
    pub fn global_config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Followers of a profile, derived from all profiles' `following` sets.
    ///
    /// The stored `followers` field is never consulted; this projection is
    /// the single source of truth for the follower side of the relation.
    pub fn followers_of(&self, uid: &str) -> Vec<ProfileId> {
        self.profile_order
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .filter(|p| p.is_following(uid))
            .map(|p| p.uid.clone())
            .collect()
    }

    /// Number of posts in the mirror.
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    // =========================================================================
    // Optimistic Patches
    // =========================================================================

    /// Patches a profile in place, pending reconciliation by the next
    /// `users` snapshot. No-op if the profile is not mirrored.
    pub fn patch_profile<F: FnOnce(&mut Profile)>(&mut self, uid: &str, patch: F) {
        if let Some(profile) = self.profiles.get_mut(uid) {
            patch(profile);
        }
    }

    /// Patches a post in place, pending reconciliation by the next `posts`
    /// snapshot. No-op if the post is not mirrored.
    pub fn patch_post<F: FnOnce(&mut Post)>(&mut self, id: &str, patch: F) {
        if let Some(post) = self.posts.get_mut(id) {
            patch(post);
        }
    }

    /// Patches a collection in place. No-op if not mirrored.
    pub fn patch_collection<F: FnOnce(&mut PostCollection)>(&mut self, id: &str, patch: F) {
        if let Some(collection) = self.collections.get_mut(id) {
            patch(collection);
        }
    }

    /// Patches a report in place. No-op if not mirrored.
    pub fn patch_report<F: FnOnce(&mut Report)>(&mut self, id: &str, patch: F) {
        if let Some(report) = self.reports.get_mut(id) {
            patch(report);
        }
    }

    /// Replaces the local configuration value. Used by the badge authority
    /// after a successful config write.
    pub fn set_global_config(&mut self, config: GlobalConfig) {
        self.config = config;
    }
}

/// Decodes every document of a snapshot into `T`, stamping the envelope id
/// into the value via `set_id`. Undecodable documents are skipped.
fn decode_all<T: DeserializeOwned>(
    snapshot: &Snapshot,
    set_id: impl Fn(&mut T, String),
) -> (HashMap<String, T>, Vec<String>) {
    let mut map = HashMap::with_capacity(snapshot.docs.len());
    let mut order = Vec::with_capacity(snapshot.docs.len());
    for doc in &snapshot.docs {
        match serde_json::from_value::<T>(doc.data.clone()) {
            Ok(mut value) => {
                set_id(&mut value, doc.id.clone());
                order.push(doc.id.clone());
                map.insert(doc.id.clone(), value);
            }
            Err(err) => {
                warn!(
                    collection = %snapshot.collection,
                    doc = %doc.id,
                    error = %err,
                    "skipping undecodable document"
                );
            }
        }
    }
    (map, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use serde_json::json;

    fn profile_doc(uid: &str, following: Vec<&str>) -> Document {
        Document::new(
            uid,
            json!({
                "uid": uid,
                "name": uid,
                "username": uid,
                "profilePic": "x",
                "following": following,
                "createdAt": 1u64
            }),
        )
    }

    fn post_doc(id: &str, title: &str) -> Document {
        Document::new(
            id,
            json!({
                "type": "image",
                "userId": "author",
                "url": "u",
                "title": title,
                "createdAt": 1u64
            }),
        )
    }

    #[test]
    fn test_snapshot_replaces_wholesale() {
        let mut mirror = RelationStore::new();
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Posts,
            docs: vec![post_doc("p1", "a"), post_doc("p2", "b")],
        });
        assert_eq!(mirror.post_count(), 2);

        // Next delivery no longer contains p1: it must vanish locally.
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Posts,
            docs: vec![post_doc("p2", "b")],
        });
        assert_eq!(mirror.post_count(), 1);
        assert!(mirror.post("p1").is_none());
        assert!(mirror.post("p2").is_some());
    }

    #[test]
    fn test_delivery_order_preserved() {
        let mut mirror = RelationStore::new();
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Posts,
            docs: vec![post_doc("p2", "b"), post_doc("p1", "a"), post_doc("p3", "c")],
        });
        let ids: Vec<&str> = mirror.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p1", "p3"]);
    }

    #[test]
    fn test_undecodable_document_skipped() {
        let mut mirror = RelationStore::new();
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Posts,
            docs: vec![
                post_doc("p1", "a"),
                Document::new("bad", json!({"nonsense": true})),
            ],
        });
        assert_eq!(mirror.post_count(), 1);
    }

    #[test]
    fn test_envelope_id_wins() {
        let mut mirror = RelationStore::new();
        // Body carries no id at all; the envelope id must be stamped in.
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Posts,
            docs: vec![post_doc("p9", "t")],
        });
        assert_eq!(mirror.post("p9").unwrap().id, "p9");
    }

    #[test]
    fn test_followers_projection() {
        let mut mirror = RelationStore::new();
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Users,
            docs: vec![
                profile_doc("a", vec!["admin-uid", "b"]),
                profile_doc("b", vec!["admin-uid"]),
                profile_doc("c", vec!["admin-uid", "b"]),
            ],
        });

        assert_eq!(mirror.followers_of("b"), vec!["a".to_string(), "c".to_string()]);
        assert!(mirror.followers_of("a").is_empty());
        assert_eq!(mirror.followers_of("admin-uid").len(), 3);
    }

    #[test]
    fn test_config_snapshot() {
        let mut mirror = RelationStore::new();
        assert!(mirror.global_config().forbidden_words.is_empty());

        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Config,
            docs: vec![Document::new(
                "global",
                json!({"forbiddenWords": ["idiot"], "version": 3}),
            )],
        });
        assert_eq!(mirror.global_config().forbidden_words, vec!["idiot"]);
        assert_eq!(mirror.global_config().version, 3);
    }

    #[test]
    fn test_patch_and_clear() {
        let mut mirror = RelationStore::new();
        mirror.apply_snapshot(Snapshot {
            collection: CollectionKind::Users,
            docs: vec![profile_doc("a", vec![])],
        });

        mirror.patch_profile("a", |p| p.liked_posts.push("p1".to_string()));
        assert!(mirror.profile("a").unwrap().has_liked_post("p1"));

        // Patching something unmirrored is a silent no-op.
        mirror.patch_post("missing", |p| p.likes.push("a".to_string()));

        mirror.clear();
        assert!(mirror.profile("a").is_none());
    }
}
