//! Post and collection documents.
//!
//! Two post variants exist: image posts (the masonry feed) and pulses
//! (short text posts on their own timeline). The variant travels in the
//! document's `type` field. A post's `likes` set and the liker profile's
//! `likedPosts` set are kept consistent by [`crate::interact`]: membership
//! of a viewer in `likes` always equals membership of the post id in the
//! viewer's `likedPosts` once both writes of a toggle have landed.

use crate::types::{current_timestamp_millis, PostId, ProfileId};
use serde::{Deserialize, Serialize};

/// User-authored content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Document id. Defaults to empty on decode; the mirror overwrites it
    /// with the envelope id.
    #[serde(default)]
    pub id: PostId,
    /// Author id.
    pub user_id: ProfileId,
    /// Ids of profiles that liked this post. Set semantics.
    #[serde(default)]
    pub likes: Vec<ProfileId>,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Pins the post to the top of the feed and bypasses interest filtering.
    #[serde(default)]
    pub is_admin_post: bool,
    /// Variant payload.
    #[serde(flatten)]
    pub kind: PostKind,
}

/// Post variant payload, tagged by the document's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostKind {
    /// An image post.
    #[serde(rename_all = "camelCase")]
    Image {
        /// Image URI.
        url: String,
        /// Title.
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        category: String,
    },
    /// A short text-only post.
    Pulse {
        /// Sanitized body text.
        content: String,
    },
}

impl Post {
    /// Creates a new pulse. The content must already be sanitized.
    pub fn new_pulse(author: impl Into<ProfileId>, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: author.into(),
            likes: Vec::new(),
            created_at: current_timestamp_millis(),
            is_admin_post: false,
            kind: PostKind::Pulse {
                content: content.into(),
            },
        }
    }

    /// Returns true for image posts.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, PostKind::Image { .. })
    }

    /// Returns true for pulses.
    pub fn is_pulse(&self) -> bool {
        matches!(self.kind, PostKind::Pulse { .. })
    }

    /// Returns true if the given profile has liked this post.
    pub fn liked_by(&self, uid: &str) -> bool {
        self.likes.iter().any(|l| l == uid)
    }
}

/// A named, ordered grouping of post references with its own like set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCollection {
    /// Document id. Overwritten with the envelope id on decode.
    #[serde(default)]
    pub id: String,
    /// Owner id.
    pub owner_id: ProfileId,
    /// Display name.
    pub name: String,
    /// Referenced posts, in display order.
    #[serde(default)]
    pub post_ids: Vec<PostId>,
    /// Ids of profiles that liked this collection. Set semantics.
    #[serde(default)]
    pub likes: Vec<ProfileId>,
    #[serde(default)]
    pub is_private: bool,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl PostCollection {
    /// Returns true if the given profile has liked this collection.
    pub fn liked_by(&self, uid: &str) -> bool {
        self.likes.iter().any(|l| l == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pulse_wire_format() {
        let post = Post::new_pulse("uid-1", "hello");
        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["type"], "pulse");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["userId"], "uid-1");
        assert_eq!(json["likes"], json!([]));
        assert_eq!(json["isAdminPost"], false);
    }

    #[test]
    fn test_image_post_decode() {
        let doc = json!({
            "type": "image",
            "userId": "uid-1",
            "url": "https://example.com/a.jpg",
            "title": "Fusca azul",
            "tags": ["Carros"],
            "createdAt": 1_730_000_000_000u64
        });
        let post: Post = serde_json::from_value(doc).unwrap();

        assert!(post.is_image());
        assert!(!post.is_pulse());
        match &post.kind {
            PostKind::Image { title, tags, description, .. } => {
                assert_eq!(title, "Fusca azul");
                assert_eq!(tags, &["Carros".to_string()]);
                assert!(description.is_empty());
            }
            _ => panic!("expected image post"),
        }
        assert!(post.likes.is_empty());
        assert!(!post.is_admin_post);
    }

    #[test]
    fn test_liked_by() {
        let mut post = Post::new_pulse("author", "x");
        post.likes.push("uid-1".to_string());
        assert!(post.liked_by("uid-1"));
        assert!(!post.liked_by("uid-2"));
    }

    #[test]
    fn test_collection_decode_with_defaults() {
        let doc = json!({
            "ownerId": "uid-1",
            "name": "Inspira",
            "createdAt": 1_730_000_000_000u64
        });
        let collection: PostCollection = serde_json::from_value(doc).unwrap();
        assert!(collection.post_ids.is_empty());
        assert!(!collection.is_private);
        assert!(!collection.liked_by("anyone"));
    }
}
