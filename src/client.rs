//! The engine's top-level client.
//!
//! `FeedClient` owns the store handle, the session, the local mirror, and
//! the realtime subscriptions, and exposes the engine's operations behind
//! one surface. Everything runs on the caller's task: subscription events
//! are buffered by the channels and drained by [`FeedClient::pump`], so no
//! background task or locking is involved.

use crate::config::EngineConfig;
use crate::constants::MAX_PULSE_SIZE;
use crate::error::{HeartfyError, Result};
use crate::feed;
use crate::identity::AuthIdentity;
use crate::interact::{self, FollowResult, LikeResult};
use crate::mirror::RelationStore;
use crate::post::Post;
use crate::report::ReportTarget;
use crate::sanitize::sanitize;
use crate::session::Session;
use crate::store::{CollectionKind, DocumentStore, StoreEvent, Subscription};
use crate::types::Notice;
use tracing::{debug, info, warn};

/// A client engine bound to one document store.
pub struct FeedClient<S: DocumentStore> {
    store: S,
    config: EngineConfig,
    session: Option<Session>,
    mirror: RelationStore,
    subscriptions: Vec<Subscription>,
}

impl<S: DocumentStore> FeedClient<S> {
    /// Creates a logged-out client.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            session: None,
            mirror: RelationStore::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Establishes a session for the identity and subscribes to every
    /// collection. Any previous session is torn down first.
    pub async fn login(&mut self, identity: AuthIdentity) -> Result<&Session> {
        self.logout();

        let session = Session::establish(&self.store, identity, self.config.clone()).await;
        info!(uid = %session.uid(), degraded = session.is_degraded(), "session established");

        for kind in CollectionKind::ALL {
            match self.store.subscribe(kind) {
                Ok(sub) => self.subscriptions.push(sub),
                Err(err) => warn!(collection = %kind, error = %err, "subscription failed"),
            }
        }

        self.session = Some(session);
        self.session.as_ref().ok_or(HeartfyError::AuthRequired)
    }

    /// Tears down the session: cancels every subscription and clears the
    /// mirror. Idempotent.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(uid = %session.uid(), "session ended");
        }
        // Dropping a subscription closes its channel.
        self.subscriptions.clear();
        self.mirror.clear();
    }

    /// Drains every buffered subscription event into the mirror without
    /// blocking. Returns the number of events processed.
    ///
    /// After draining, the session's cached profile is refreshed from the
    /// mirror so interaction guards see the latest remote state.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        for sub in &mut self.subscriptions {
            while let Some(event) = sub.try_next() {
                processed += 1;
                match event {
                    StoreEvent::Snapshot(snapshot) => {
                        debug!(collection = %snapshot.collection, docs = snapshot.docs.len(), "snapshot applied");
                        self.mirror.apply_snapshot(snapshot);
                    }
                    StoreEvent::Error(message) => {
                        warn!(collection = %sub.collection(), %message, "subscription error; serving stale data");
                    }
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            if let Some(profile) = self.mirror.profile(session.uid()).cloned() {
                session.refresh_profile(profile);
            }
        }
        processed
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Read access to the mirrored state.
    pub fn mirror(&self) -> &RelationStore {
        &self.mirror
    }

    /// The store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The ranked image feed for the current viewer and search term.
    pub fn home_feed(&self, search_term: &str) -> Vec<&Post> {
        let interests = self
            .session
            .as_ref()
            .and_then(|s| s.profile())
            .map(|p| p.interests.clone())
            .unwrap_or_default();
        feed::rank(&self.mirror.posts(), search_term, &interests)
    }

    /// The pulse timeline, newest first.
    pub fn pulse_feed(&self) -> Vec<&Post> {
        feed::pulse_timeline(&self.mirror.posts())
    }

    /// Publishes a pulse, sanitizing its body against the current
    /// forbidden-word list. Returns the new post id and a notice.
    pub async fn publish_pulse(&mut self, text: &str) -> Result<(String, Notice)> {
        let profile = self.current_session()?.require_interactive()?;
        let uid = profile.uid.clone();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(HeartfyError::validation("pulse must not be empty"));
        }
        if trimmed.len() > MAX_PULSE_SIZE {
            return Err(HeartfyError::validation(format!(
                "pulse exceeds {MAX_PULSE_SIZE} bytes"
            )));
        }

        let clean = sanitize(trimmed, &self.mirror.global_config().forbidden_words);
        let post = Post::new_pulse(uid, clean);
        let body = serde_json::to_value(&post)?;
        let id = self.store.add_one(CollectionKind::Posts, body).await?;

        debug!(post = %id, "pulse published");
        Ok((id, Notice::success("Pulse enviado!")))
    }

    /// Toggles a like on a post. See [`interact::toggle_like`].
    pub async fn toggle_like(&mut self, post_id: &str) -> Result<LikeResult> {
        let session = self.session.as_mut().ok_or(HeartfyError::AuthRequired)?;
        interact::toggle_like(session, &mut self.mirror, &self.store, post_id).await
    }

    /// Toggles a like on a collection.
    pub async fn toggle_collection_like(&mut self, collection_id: &str) -> Result<LikeResult> {
        let session = self.session.as_mut().ok_or(HeartfyError::AuthRequired)?;
        interact::toggle_collection_like(session, &mut self.mirror, &self.store, collection_id)
            .await
    }

    /// Toggles following a profile. See [`interact::toggle_follow`].
    pub async fn toggle_follow(&mut self, target_uid: &str) -> Result<FollowResult> {
        let session = self.session.as_mut().ok_or(HeartfyError::AuthRequired)?;
        interact::toggle_follow(session, &mut self.mirror, &self.store, target_uid).await
    }

    /// Records the viewer's declared interests, ending onboarding.
    pub async fn complete_onboarding(&mut self, interests: Vec<String>) -> Result<()> {
        let session = self.session.as_mut().ok_or(HeartfyError::AuthRequired)?;
        session.complete_onboarding(&self.store, interests).await
    }

    /// Files a report against a post, profile, or collection.
    pub async fn file_report(&self, target: ReportTarget, reason: &str) -> Result<String> {
        let session = self.current_session()?;
        crate::moderation::file_report(session, &self.store, target, reason).await
    }

    /// The open moderation queue. Admin-only.
    pub fn open_reports(&self) -> Result<Vec<&crate::report::Report>> {
        let session = self.current_session()?;
        crate::moderation::open_reports(session, &self.mirror)
    }

    /// Resolves a report. Admin-only.
    pub async fn resolve_report(
        &mut self,
        report_id: &str,
        accept: bool,
    ) -> Result<crate::report::ReportStatus> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::moderation::resolve(session, &mut self.mirror, &self.store, report_id, accept).await
    }

    /// Defines a new catalog badge. Admin-only.
    pub async fn define_badge(
        &mut self,
        label: &str,
        tier: crate::types::BadgeTier,
    ) -> Result<Notice> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::badges::define_badge(session, &mut self.mirror, &self.store, label, tier).await
    }

    /// Grants a catalog badge to a profile. Admin-only.
    pub async fn grant_badge(&mut self, target_uid: &str, badge_def_id: &str) -> Result<Notice> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::badges::grant_badge(session, &mut self.mirror, &self.store, target_uid, badge_def_id)
            .await
    }

    /// Clears a profile's badges. Admin-only.
    pub async fn revoke_all_badges(&mut self, target_uid: &str) -> Result<Notice> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::badges::revoke_all_badges(session, &mut self.mirror, &self.store, target_uid).await
    }

    /// Adds a word to the forbidden list. Admin-only.
    pub async fn block_word(&mut self, word: &str) -> Result<Notice> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::badges::block_word(session, &mut self.mirror, &self.store, word).await
    }

    /// Removes a word from the forbidden list. Admin-only.
    pub async fn unblock_word(&mut self, word: &str) -> Result<Notice> {
        let session = self.session.as_ref().ok_or(HeartfyError::AuthRequired)?;
        crate::badges::unblock_word(session, &mut self.mirror, &self.store, word).await
    }

    fn current_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(HeartfyError::AuthRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn identity(uid: &str, email: &str) -> AuthIdentity {
        AuthIdentity::new(uid).with_email(email)
    }

    async fn logged_in_client(uid: &str) -> FeedClient<MemoryStore> {
        let mut client = FeedClient::new(MemoryStore::new(), EngineConfig::default());
        client
            .login(identity(uid, &format!("{uid}@example.com")))
            .await
            .unwrap();
        client.pump();
        client
    }

    #[tokio::test]
    async fn test_login_subscribes_everything() {
        let client = logged_in_client("u1").await;
        for kind in CollectionKind::ALL {
            assert_eq!(client.store().subscriber_count(kind), 1);
        }
        // The initial users snapshot already carries our own profile.
        assert!(client.mirror().profile("u1").is_some());
    }

    #[tokio::test]
    async fn test_logout_cancels_subscriptions_and_clears_mirror() {
        let mut client = logged_in_client("u1").await;
        client.logout();

        assert!(client.session().is_none());
        assert!(client.mirror().profile("u1").is_none());
        // Dropped receivers are pruned on the next broadcast attempt.
        for kind in CollectionKind::ALL {
            assert_eq!(client.store().subscriber_count(kind), 0);
        }
    }

    #[tokio::test]
    async fn test_relogin_replaces_subscriptions() {
        let mut client = logged_in_client("u1").await;
        client
            .login(identity("u2", "u2@example.com"))
            .await
            .unwrap();
        client.pump();

        for kind in CollectionKind::ALL {
            assert_eq!(client.store().subscriber_count(kind), 1);
        }
        assert_eq!(client.session().unwrap().uid(), "u2");
    }

    #[tokio::test]
    async fn test_publish_pulse_sanitizes() {
        let mut admin = FeedClient::new(MemoryStore::new(), EngineConfig::default());
        admin
            .login(identity("admin-uid", "admin@heartfy.com"))
            .await
            .unwrap();
        admin.pump();
        admin.block_word("idiota").await.unwrap();
        admin.pump();

        let (id, notice) = admin
            .publish_pulse("veja https://spam.example agora, idiota")
            .await
            .unwrap();
        assert_eq!(notice.message, "Pulse enviado!");

        admin.pump();
        let post = admin.mirror().post(&id).unwrap();
        match &post.kind {
            crate::post::PostKind::Pulse { content } => {
                assert_eq!(content, "veja [Link Removido] agora, ***");
            }
            _ => panic!("expected pulse"),
        }
    }

    #[tokio::test]
    async fn test_publish_pulse_validation() {
        let mut client = logged_in_client("u1").await;
        assert!(client.publish_pulse("   ").await.is_err());
        let long = "x".repeat(MAX_PULSE_SIZE + 1);
        assert!(client.publish_pulse(&long).await.is_err());
    }

    #[tokio::test]
    async fn test_home_feed_uses_viewer_interests() {
        let mut client = logged_in_client("u1").await;
        client
            .store()
            .set_one(
                CollectionKind::Posts,
                "p1",
                json!({
                    "type": "image", "userId": "a", "url": "u",
                    "title": "Serra", "tags": ["natureza"], "createdAt": 1u64
                }),
            )
            .await
            .unwrap();
        client
            .store()
            .set_one(
                CollectionKind::Posts,
                "p2",
                json!({
                    "type": "image", "userId": "a", "url": "u",
                    "title": "Moda", "tags": ["estilo"], "createdAt": 2u64
                }),
            )
            .await
            .unwrap();
        client
            .complete_onboarding(vec![
                "natureza".to_string(),
                "fé".to_string(),
                "arte".to_string(),
            ])
            .await
            .unwrap();
        client.pump();

        let feed = client.home_feed("");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "p1");
    }

    #[tokio::test]
    async fn test_pump_refreshes_session_profile() {
        let mut client = logged_in_client("u1").await;
        // A remote write (another client granting a badge, say) must show up
        // in the session after a pump.
        let mut fields = serde_json::Map::new();
        fields.insert("bio".to_string(), json!("nova bio"));
        client
            .store()
            .update_fields(CollectionKind::Users, "u1", fields)
            .await
            .unwrap();

        assert_eq!(client.session().unwrap().profile().unwrap().bio, "");
        assert!(client.pump() > 0);
        assert_eq!(
            client.session().unwrap().profile().unwrap().bio,
            "nova bio"
        );
    }

    #[tokio::test]
    async fn test_subscription_error_is_survivable() {
        let mut client = logged_in_client("u1").await;
        client
            .store()
            .emit_error(CollectionKind::Posts, "stream reset");
        // The error is logged and drained; stale data keeps serving.
        assert!(client.pump() > 0);
        assert!(client.mirror().profile("u1").is_some());
    }

    #[tokio::test]
    async fn test_operations_require_login() {
        let mut client = FeedClient::new(MemoryStore::new(), EngineConfig::default());
        assert!(matches!(
            client.toggle_like("p1").await.unwrap_err(),
            HeartfyError::AuthRequired
        ));
        assert!(matches!(
            client.publish_pulse("oi").await.unwrap_err(),
            HeartfyError::AuthRequired
        ));
    }
}
