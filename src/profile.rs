//! Profile document: one per authenticated identity.
//!
//! A profile is created exactly once per identity, on first session after
//! authentication (see [`crate::session`]), and never deleted by this engine.
//! The `following` set always contains the platform admin id after sync.
//!
//! Field names follow the wire documents (camelCase). Vec-valued relation
//! fields (`following`, `likedPosts`, ...) carry set semantics: toggle logic
//! never inserts duplicates.

use crate::config::EngineConfig;
use crate::constants::{
    ADMIN_BIO, AVATAR_URL_PREFIX, DEFAULT_DISPLAY_NAME, DEFAULT_HEADER_PIC, HANDLE_PREFIX,
    HANDLE_SUFFIX_LEN, OFFICIAL_BADGE_ID, OFFICIAL_BADGE_LABEL,
};
use crate::identity::AuthIdentity;
use crate::types::{current_timestamp_millis, Badge, BadgeTier, CollectionId, PostId, ProfileId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The stored record representing one user's identity-derived social state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique id, equal to the identity uid.
    pub uid: ProfileId,
    /// Display name.
    pub name: String,
    /// Handle. Unique-ish; uniqueness is not enforced.
    pub username: String,
    #[serde(default)]
    pub bio: String,
    /// Avatar URI.
    pub profile_pic: String,
    /// Header image URI.
    #[serde(default)]
    pub header_pic: String,
    /// Follower ids. Accepted from older documents but never written by this
    /// engine; the live value is the derived projection in
    /// [`crate::mirror::RelationStore::followers_of`].
    #[serde(default)]
    pub followers: Vec<ProfileId>,
    /// Ids of profiles this user follows.
    #[serde(default)]
    pub following: Vec<ProfileId>,
    /// Ids of liked posts.
    #[serde(default)]
    pub liked_posts: Vec<PostId>,
    /// Ids of liked collections.
    #[serde(default)]
    pub liked_collections: Vec<CollectionId>,
    /// Badge grants.
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_private: bool,
    /// Declared interest tags, set once during onboarding.
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub email: String,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Profile {
    /// Builds the first-sight profile for an identity.
    ///
    /// Defaults: handle from the email local part (or a random suffix when
    /// no email is present), deterministic generated avatar keyed by uid,
    /// `following` seeded with the admin id. An identity whose email matches
    /// the configured admin email additionally gets the admin flag, the
    /// verified flag, the official bio, and a pre-granted gold badge.
    pub fn from_identity(identity: &AuthIdentity, config: &EngineConfig) -> Self {
        let is_admin = config.is_admin_email(identity.email.as_deref());

        let username = identity
            .email_local_part()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", HANDLE_PREFIX, random_handle_suffix()));

        let profile_pic = identity
            .photo_url
            .clone()
            .unwrap_or_else(|| format!("{}{}", AVATAR_URL_PREFIX, identity.uid));

        Self {
            uid: identity.uid.clone(),
            name: identity
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            username,
            bio: if is_admin {
                ADMIN_BIO.to_string()
            } else {
                String::new()
            },
            profile_pic,
            header_pic: DEFAULT_HEADER_PIC.to_string(),
            followers: Vec::new(),
            following: vec![config.admin_uid.clone()],
            liked_posts: Vec::new(),
            liked_collections: Vec::new(),
            badges: if is_admin {
                vec![Badge::new(
                    OFFICIAL_BADGE_ID,
                    OFFICIAL_BADGE_LABEL,
                    BadgeTier::Gold,
                )]
            } else {
                Vec::new()
            },
            is_admin,
            is_verified: is_admin,
            is_private: false,
            interests: Vec::new(),
            email: identity.email.clone().unwrap_or_default(),
            created_at: current_timestamp_millis(),
        }
    }

    /// Returns true if this profile follows the given id.
    pub fn is_following(&self, uid: &str) -> bool {
        self.following.iter().any(|f| f == uid)
    }

    /// Returns true if this profile has liked the given post.
    pub fn has_liked_post(&self, post_id: &str) -> bool {
        self.liked_posts.iter().any(|p| p == post_id)
    }

    /// Returns true if this profile has liked the given collection.
    pub fn has_liked_collection(&self, collection_id: &str) -> bool {
        self.liked_collections.iter().any(|c| c == collection_id)
    }
}

/// Generates the random suffix used for handles when no email is present.
fn random_handle_suffix() -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..HANDLE_SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_first_sight_profile_defaults() {
        let identity = AuthIdentity::new("uid-1")
            .with_display_name("Ana")
            .with_email("ana@example.com")
            .with_photo_url("https://example.com/ana.png");
        let profile = Profile::from_identity(&identity, &engine_config());

        assert_eq!(profile.uid, "uid-1");
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.username, "ana");
        assert_eq!(profile.profile_pic, "https://example.com/ana.png");
        assert_eq!(profile.following, vec!["admin-uid".to_string()]);
        assert!(!profile.is_admin);
        assert!(!profile.is_verified);
        assert!(profile.badges.is_empty());
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn test_first_sight_profile_without_claims() {
        let identity = AuthIdentity::new("uid-2");
        let profile = Profile::from_identity(&identity, &engine_config());

        assert_eq!(profile.name, "Inspirador(a)");
        assert!(profile.username.starts_with("user_"));
        assert_eq!(profile.username.len(), "user_".len() + 5);
        assert!(profile.profile_pic.ends_with("uid-2"));
    }

    #[test]
    fn test_admin_first_sight_profile() {
        let identity = AuthIdentity::new("admin-uid").with_email("admin@heartfy.com");
        let profile = Profile::from_identity(&identity, &engine_config());

        assert!(profile.is_admin);
        assert!(profile.is_verified);
        assert_eq!(profile.bio, "Canal Oficial do Heartfy");
        assert_eq!(profile.badges.len(), 1);
        assert_eq!(profile.badges[0].label, "Canal Oficial");
        assert_eq!(profile.badges[0].tier, BadgeTier::Gold);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let identity = AuthIdentity::new("uid-3").with_email("x@example.com");
        let profile = Profile::from_identity(&identity, &engine_config());
        let json = serde_json::to_value(&profile).unwrap();

        assert!(json.get("likedPosts").is_some());
        assert!(json.get("profilePic").is_some());
        assert!(json.get("isAdmin").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_membership_helpers() {
        let identity = AuthIdentity::new("uid-4");
        let mut profile = Profile::from_identity(&identity, &engine_config());
        profile.liked_posts.push("p1".to_string());

        assert!(profile.has_liked_post("p1"));
        assert!(!profile.has_liked_post("p2"));
        assert!(profile.is_following("admin-uid"));
        assert!(!profile.is_following("other"));
    }
}
