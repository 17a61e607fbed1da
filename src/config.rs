//! Engine and platform configuration.
//!
//! Two configuration layers exist:
//! - [`EngineConfig`]: local, immutable per client session (admin identity,
//!   duplicate-grant policy). Supplied by the embedding application.
//! - [`GlobalConfig`]: the remote configuration singleton (forbidden words,
//!   badge catalog). Mutated only through [`crate::badges`] under admin
//!   privilege and refreshed via the subscription channel. It is an
//!   explicitly versioned value object: every admin write bumps `version`,
//!   and it is always passed into consumers rather than read from ambient
//!   state.

use crate::constants::{ADMIN_EMAIL, ADMIN_UID};
use crate::types::Badge;
use serde::{Deserialize, Serialize};

/// Local engine configuration, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Email address designating the platform administrator.
    pub admin_email: String,
    /// Profile id of the platform administrator.
    pub admin_uid: String,
    /// Whether the same badge definition may be granted to a profile more
    /// than once. Defaults to `true`, matching the platform's historical
    /// behavior; set to `false` to make grants idempotent.
    pub allow_duplicate_grants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_email: ADMIN_EMAIL.to_string(),
            admin_uid: ADMIN_UID.to_string(),
            allow_duplicate_grants: true,
        }
    }
}

impl EngineConfig {
    /// Returns true if the given email claim designates the administrator.
    /// The comparison is case-sensitive and exact.
    pub fn is_admin_email(&self, email: Option<&str>) -> bool {
        email == Some(self.admin_email.as_str())
    }
}

/// The remote configuration singleton (document `config/global`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Forbidden words, lower-cased on insert.
    #[serde(default)]
    pub forbidden_words: Vec<String>,
    /// Admin-curated badge catalog.
    #[serde(default)]
    pub custom_badges: Vec<Badge>,
    /// Monotonic version, bumped on every admin write.
    #[serde(default)]
    pub version: u64,
}

impl GlobalConfig {
    /// Bumps the version counter. Called once per admin mutation.
    pub fn bump(&mut self) {
        self.version += 1;
    }

    /// Looks up a badge definition by id.
    pub fn badge_def(&self, id: &str) -> Option<&Badge> {
        self.custom_badges.iter().find(|b| b.id == id)
    }

    /// Returns true if the (already lower-cased) word is blocked.
    pub fn is_blocked(&self, word: &str) -> bool {
        self.forbidden_words.iter().any(|w| w == word)
    }
}
