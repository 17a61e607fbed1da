//! Core value types shared across the engine: document ids, badge values,
//! user-facing notices, and timestamp helpers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Id of a profile document (equal to the identity uid).
pub type ProfileId = String;

/// Id of a post document.
pub type PostId = String;

/// Id of a collection document.
pub type CollectionId = String;

/// Returns the current timestamp in milliseconds since the Unix epoch.
pub fn current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Visual tier of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// Gold star badge, reserved for official channels.
    Gold,
    /// Blue shield badge, the default for custom badges.
    Blue,
    /// Custom badge rendered with deployment-specific styling.
    Custom,
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeTier::Gold => write!(f, "gold"),
            BadgeTier::Blue => write!(f, "blue"),
            BadgeTier::Custom => write!(f, "custom"),
        }
    }
}

/// A badge definition or grant.
///
/// The same shape is used in two places: the admin-curated catalog in
/// [`crate::config::GlobalConfig::custom_badges`], and the grants copied
/// onto a profile's `badges` list. The stored field name for the tier is
/// `type`, matching the wire documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Unique id of the badge definition.
    pub id: String,
    /// Human-readable label shown on hover.
    pub label: String,
    /// Visual tier.
    #[serde(rename = "type")]
    pub tier: BadgeTier,
}

impl Badge {
    /// Creates a new badge value.
    pub fn new(id: impl Into<String>, label: impl Into<String>, tier: BadgeTier) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tier,
        }
    }
}

/// Kind of a transient user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The action completed (as far as the initiating write is concerned).
    Success,
    /// The action failed and nothing user-visible happened.
    Error,
}

/// A transient, non-blocking user-facing notification ("toast").
///
/// Every mutation boundary converts its outcome into one of these instead of
/// letting failures escape into the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Notice kind.
    pub kind: NoticeKind,
    /// Message shown to the user.
    pub message: String,
}

impl Notice {
    /// Creates a success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Creates an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}
