//! Session establishment and lifecycle.
//!
//! A [`Session`] binds an authenticated identity to its profile document.
//! Establishment is infallible by contract: when the store is unreachable
//! the session comes up degraded (no profile, interaction denied) rather
//! than failing, so the embedding application can still render read paths.

use crate::config::EngineConfig;
use crate::constants::MIN_INTERESTS;
use crate::error::{HeartfyError, Result};
use crate::identity::AuthIdentity;
use crate::profile::Profile;
use crate::store::{CollectionKind, DocumentStore};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// One authenticated user's live session state.
#[derive(Debug, Clone)]
pub struct Session {
    identity: AuthIdentity,
    profile: Option<Profile>,
    needs_onboarding: bool,
    config: EngineConfig,
}

impl Session {
    /// Establishes a session for an identity.
    ///
    /// First sight creates the profile document with its defaults; a
    /// returning identity has its document loaded. A loaded profile that
    /// has lost the admin follow gets it written back. Store failures at
    /// any point degrade the session instead of failing it.
    pub async fn establish<S: DocumentStore>(
        store: &S,
        identity: AuthIdentity,
        config: EngineConfig,
    ) -> Session {
        let profile = match store.get_one(CollectionKind::Users, &identity.uid).await {
            Ok(Some(doc)) => match serde_json::from_value::<Profile>(doc.data) {
                Ok(mut profile) => {
                    profile.uid = identity.uid.clone();
                    repair_admin_follow(store, &mut profile, &config).await;
                    Some(profile)
                }
                Err(err) => {
                    warn!(uid = %identity.uid, error = %err, "profile document undecodable; session degraded");
                    None
                }
            },
            Ok(None) => create_profile(store, &identity, &config).await,
            Err(err) => {
                warn!(uid = %identity.uid, error = %err, "profile fetch failed; session degraded");
                None
            }
        };

        let needs_onboarding = match &profile {
            Some(p) => !p.is_admin && !identity.is_anonymous && p.interests.is_empty(),
            None => false,
        };

        Session {
            identity,
            profile,
            needs_onboarding,
            config,
        }
    }

    /// The authenticated identity this session belongs to.
    pub fn identity(&self) -> &AuthIdentity {
        &self.identity
    }

    /// The authenticated uid.
    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    /// The session's profile, absent when degraded.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Mutable access for optimistic patches applied by interactions.
    pub(crate) fn profile_mut(&mut self) -> Option<&mut Profile> {
        self.profile.as_mut()
    }

    /// True when establishment could not load or create a profile.
    pub fn is_degraded(&self) -> bool {
        self.profile.is_none()
    }

    /// True until the user has declared any interests.
    pub fn needs_onboarding(&self) -> bool {
        self.needs_onboarding
    }

    /// The engine configuration this session was established under.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the cached profile with a fresher mirrored copy.
    pub(crate) fn refresh_profile(&mut self, profile: Profile) {
        self.needs_onboarding = !profile.is_admin
            && !self.identity.is_anonymous
            && profile.interests.is_empty();
        self.profile = Some(profile);
    }

    /// Records the user's declared interests, ending onboarding.
    ///
    /// At least [`MIN_INTERESTS`] distinct interests are required.
    pub async fn complete_onboarding<S: DocumentStore>(
        &mut self,
        store: &S,
        interests: Vec<String>,
    ) -> Result<()> {
        self.require_interactive()?;

        let mut distinct = interests.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < MIN_INTERESTS {
            return Err(HeartfyError::validation(format!(
                "at least {MIN_INTERESTS} interests are required"
            )));
        }

        let mut fields = Map::new();
        fields.insert("interests".to_string(), json!(interests));
        store
            .update_fields(CollectionKind::Users, &self.identity.uid, fields)
            .await?;

        if let Some(profile) = self.profile.as_mut() {
            profile.interests = interests;
        }
        self.needs_onboarding = false;
        info!(uid = %self.identity.uid, "onboarding complete");
        Ok(())
    }

    /// Requires a non-degraded, non-anonymous session (anonymous admins are
    /// let through). Returns the profile.
    pub fn require_interactive(&self) -> Result<&Profile> {
        let profile = self.profile.as_ref().ok_or(HeartfyError::AuthRequired)?;
        if self.identity.is_anonymous && !profile.is_admin {
            return Err(HeartfyError::AuthRequired);
        }
        Ok(profile)
    }

    /// Requires an interactive session whose profile carries the admin flag.
    pub fn require_admin(&self) -> Result<&Profile> {
        let profile = self.require_interactive()?;
        if !profile.is_admin {
            return Err(HeartfyError::permission(
                "administrator privilege required",
            ));
        }
        Ok(profile)
    }
}

/// Writes the first-sight profile. Failure degrades rather than aborts.
async fn create_profile<S: DocumentStore>(
    store: &S,
    identity: &AuthIdentity,
    config: &EngineConfig,
) -> Option<Profile> {
    let profile = Profile::from_identity(identity, config);
    let body = match serde_json::to_value(&profile) {
        Ok(body) => body,
        Err(err) => {
            warn!(uid = %identity.uid, error = %err, "profile serialization failed; session degraded");
            return None;
        }
    };
    match store.set_one(CollectionKind::Users, &identity.uid, body).await {
        Ok(()) => {
            info!(uid = %identity.uid, "created first-sight profile");
            Some(profile)
        }
        Err(err) => {
            warn!(uid = %identity.uid, error = %err, "profile creation failed; session degraded");
            None
        }
    }
}

/// Restores the admin follow on a loaded profile that has lost it.
///
/// The admin's own profile is left alone; nobody follows themselves. A
/// failed write keeps the local repair so the session still sees the
/// invariant hold.
async fn repair_admin_follow<S: DocumentStore>(
    store: &S,
    profile: &mut Profile,
    config: &EngineConfig,
) {
    if profile.uid == config.admin_uid || profile.is_following(&config.admin_uid) {
        return;
    }
    profile.following.push(config.admin_uid.clone());

    let mut fields = Map::new();
    fields.insert(
        "following".to_string(),
        Value::from(profile.following.clone()),
    );
    if let Err(err) = store
        .update_fields(CollectionKind::Users, &profile.uid, fields)
        .await
    {
        warn!(uid = %profile.uid, error = %err, "admin follow repair write failed");
    } else {
        info!(uid = %profile.uid, "restored admin follow");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{FailOp, MemoryStore};

    fn identity(uid: &str, email: &str) -> AuthIdentity {
        AuthIdentity::new(uid).with_email(email)
    }

    #[tokio::test]
    async fn test_first_sight_creates_profile() {
        let store = MemoryStore::new();
        let session =
            Session::establish(&store, identity("u1", "u1@example.com"), EngineConfig::default())
                .await;

        assert!(!session.is_degraded());
        assert!(session.needs_onboarding());
        assert!(session.profile().unwrap().is_following("admin-uid"));

        let doc = store.get_one(CollectionKind::Users, "u1").await.unwrap();
        assert!(doc.is_some());
    }

    #[tokio::test]
    async fn test_returning_identity_loads_profile() {
        let store = MemoryStore::new();
        let id = identity("u1", "u1@example.com");
        let first = Session::establish(&store, id.clone(), EngineConfig::default()).await;
        let created_at = first.profile().unwrap().created_at;

        let second = Session::establish(&store, id, EngineConfig::default()).await;
        assert_eq!(second.profile().unwrap().created_at, created_at);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_session() {
        let store = MemoryStore::new();
        store.fail_next(FailOp::Get, CollectionKind::Users, "u1");
        let session =
            Session::establish(&store, identity("u1", "u1@example.com"), EngineConfig::default())
                .await;

        assert!(session.is_degraded());
        assert!(!session.needs_onboarding());
        assert!(matches!(
            session.require_interactive(),
            Err(HeartfyError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_admin_follow_repaired_on_load() {
        let store = MemoryStore::new();
        let id = identity("u1", "u1@example.com");
        Session::establish(&store, id.clone(), EngineConfig::default()).await;

        // Strip the follow out from under the session.
        let mut fields = Map::new();
        fields.insert("following".to_string(), json!(Vec::<String>::new()));
        store
            .update_fields(CollectionKind::Users, "u1", fields)
            .await
            .unwrap();

        let session = Session::establish(&store, id, EngineConfig::default()).await;
        assert!(session.profile().unwrap().is_following("admin-uid"));

        let doc = store
            .get_one(CollectionKind::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        let stored: Profile = serde_json::from_value(doc.data).unwrap();
        assert!(stored.is_following("admin-uid"));
    }

    #[tokio::test]
    async fn test_admin_profile_not_self_followed() {
        let store = MemoryStore::new();
        let session = Session::establish(
            &store,
            identity("admin-uid", "admin@heartfy.com"),
            EngineConfig::default(),
        )
        .await;

        // Seeded with itself by first-sight defaults is acceptable for the
        // admin account, but the repair path must not add a second entry.
        let again = Session::establish(
            &store,
            identity("admin-uid", "admin@heartfy.com"),
            EngineConfig::default(),
        )
        .await;
        let follows: Vec<_> = again
            .profile()
            .unwrap()
            .following
            .iter()
            .filter(|f| *f == "admin-uid")
            .collect();
        assert_eq!(follows.len(), 1);
        assert!(!session.needs_onboarding());
    }

    #[tokio::test]
    async fn test_onboarding_requires_three_interests() {
        let store = MemoryStore::new();
        let mut session =
            Session::establish(&store, identity("u1", "u1@example.com"), EngineConfig::default())
                .await;

        let err = session
            .complete_onboarding(&store, vec!["arte".to_string(), "arte".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, HeartfyError::Validation(_)));
        assert!(session.needs_onboarding());

        let picks: Vec<String> = crate::constants::INTEREST_OPTIONS[..3]
            .iter()
            .map(|i| i.to_string())
            .collect();
        session.complete_onboarding(&store, picks).await.unwrap();
        assert!(!session.needs_onboarding());
        assert_eq!(session.profile().unwrap().interests.len(), 3);
    }

    #[tokio::test]
    async fn test_any_declared_interest_skips_onboarding() {
        let store = MemoryStore::new();
        let id = identity("u1", "u1@example.com");
        Session::establish(&store, id.clone(), EngineConfig::default()).await;

        // A profile with fewer than three interests (written by an older
        // client) is still past onboarding: the gate is on having none.
        let mut fields = Map::new();
        fields.insert("interests".to_string(), json!(["arte"]));
        store
            .update_fields(CollectionKind::Users, "u1", fields)
            .await
            .unwrap();

        let session = Session::establish(&store, id, EngineConfig::default()).await;
        assert!(!session.needs_onboarding());
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let store = MemoryStore::new();
        let user =
            Session::establish(&store, identity("u1", "u1@example.com"), EngineConfig::default())
                .await;
        assert!(matches!(
            user.require_admin(),
            Err(HeartfyError::Permission(_))
        ));

        let admin = Session::establish(
            &store,
            identity("admin-uid", "admin@heartfy.com"),
            EngineConfig::default(),
        )
        .await;
        assert!(admin.require_admin().is_ok());
    }

    #[tokio::test]
    async fn test_anonymous_identity_denied_interaction() {
        let store = MemoryStore::new();
        let session =
            Session::establish(&store, AuthIdentity::anonymous("anon"), EngineConfig::default())
                .await;
        assert!(matches!(
            session.require_interactive(),
            Err(HeartfyError::AuthRequired)
        ));
        // Anonymous browsers are never pushed into onboarding.
        assert!(!session.needs_onboarding());
    }
}
