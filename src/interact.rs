//! Like and follow toggles.
//!
//! Every interaction is an idempotent set-toggle applied optimistically to
//! the session profile and the local mirror, with the matching remote
//! writes issued in a fixed order: profile side first, content side second.
//! No two-phase commit is attempted between the two writes; a failure on
//! the content side is reported as a partial outcome and reconciled by the
//! next snapshot delivery.

use crate::error::{HeartfyError, Result};
use crate::mirror::RelationStore;
use crate::post::Post;
use crate::session::Session;
use crate::store::{CollectionKind, DocumentStore};
use crate::types::Notice;
use serde_json::{json, Map};
use tracing::{debug, warn};

/// Outcome of a like toggle.
#[derive(Debug, Clone)]
pub struct LikeResult {
    /// Whether the actor likes the target after the toggle.
    pub now_liked: bool,
    /// Set when the profile-side write landed but the content side did not.
    pub partial: Option<String>,
    /// Transient user-facing message.
    pub notice: Notice,
}

/// Outcome of a follow toggle.
#[derive(Debug, Clone)]
pub struct FollowResult {
    /// Whether the actor follows the target after the toggle.
    pub now_following: bool,
    /// False when the toggle was suppressed (admin unfollow).
    pub changed: bool,
    /// Transient user-facing message, absent for suppressed toggles.
    pub notice: Option<Notice>,
}

/// Toggles the actor's like on a post.
///
/// The profile-side write must land for the call to succeed; the
/// content-side counter write is best-effort and reported through
/// [`LikeResult::partial`] when it fails.
pub async fn toggle_like<S: DocumentStore>(
    session: &mut Session,
    mirror: &mut RelationStore,
    store: &S,
    post_id: &str,
) -> Result<LikeResult> {
    let profile = session.require_interactive()?;
    let uid = profile.uid.clone();
    let was_liked = profile.has_liked_post(post_id);

    let liked_posts = toggled(&profile.liked_posts, post_id, !was_liked);
    let mut fields = Map::new();
    fields.insert("likedPosts".to_string(), json!(liked_posts));
    store
        .update_fields(CollectionKind::Users, &uid, fields)
        .await?;

    if let Some(profile) = session.profile_mut() {
        profile.liked_posts = liked_posts.clone();
    }
    mirror.patch_profile(&uid, |p| p.liked_posts = liked_posts.clone());

    let partial = match write_post_likes(store, post_id, &uid, !was_liked).await {
        Ok(likes) => {
            mirror.patch_post(post_id, |p| p.likes = likes.clone());
            None
        }
        Err(err) => {
            warn!(post = post_id, error = %err, "content-side like write failed");
            Some(err.to_string())
        }
    };

    debug!(actor = %uid, post = post_id, now_liked = !was_liked, "like toggled");
    Ok(LikeResult {
        now_liked: !was_liked,
        partial,
        notice: if was_liked {
            Notice::success("Removido do coração")
        } else {
            Notice::success("Adicionado ao coração!")
        },
    })
}

/// Toggles the actor's like on a collection. Same shape as [`toggle_like`]
/// with the content side pointed at the collections collection.
pub async fn toggle_collection_like<S: DocumentStore>(
    session: &mut Session,
    mirror: &mut RelationStore,
    store: &S,
    collection_id: &str,
) -> Result<LikeResult> {
    let profile = session.require_interactive()?;
    let uid = profile.uid.clone();
    let was_liked = profile.has_liked_collection(collection_id);

    let liked = toggled(&profile.liked_collections, collection_id, !was_liked);
    let mut fields = Map::new();
    fields.insert("likedCollections".to_string(), json!(liked));
    store
        .update_fields(CollectionKind::Users, &uid, fields)
        .await?;

    if let Some(profile) = session.profile_mut() {
        profile.liked_collections = liked.clone();
    }
    mirror.patch_profile(&uid, |p| p.liked_collections = liked.clone());

    let partial = match write_collection_likes(store, collection_id, &uid, !was_liked).await {
        Ok(likes) => {
            mirror.patch_collection(collection_id, |c| c.likes = likes.clone());
            None
        }
        Err(err) => {
            warn!(
                collection = collection_id,
                error = %err,
                "content-side like write failed"
            );
            Some(err.to_string())
        }
    };

    Ok(LikeResult {
        now_liked: !was_liked,
        partial,
        notice: if was_liked {
            Notice::success("Removido do coração")
        } else {
            Notice::success("Adicionado ao coração!")
        },
    })
}

/// Toggles the actor following a profile.
///
/// Only the actor's `following` set is written; the target's follower list
/// is a derived projection (see [`RelationStore::followers_of`]). For
/// non-admin actors an unfollow of the platform admin is suppressed.
pub async fn toggle_follow<S: DocumentStore>(
    session: &mut Session,
    mirror: &mut RelationStore,
    store: &S,
    target_uid: &str,
) -> Result<FollowResult> {
    let profile = session.require_interactive()?;
    let uid = profile.uid.clone();
    let was_following = profile.is_following(target_uid);

    if was_following && target_uid == session.config().admin_uid && !profile.is_admin {
        debug!(actor = %uid, "admin unfollow suppressed");
        return Ok(FollowResult {
            now_following: true,
            changed: false,
            notice: None,
        });
    }

    let following = toggled(&profile.following, target_uid, !was_following);
    let mut fields = Map::new();
    fields.insert("following".to_string(), json!(following));
    store
        .update_fields(CollectionKind::Users, &uid, fields)
        .await?;

    if let Some(profile) = session.profile_mut() {
        profile.following = following.clone();
    }
    mirror.patch_profile(&uid, |p| p.following = following.clone());

    debug!(actor = %uid, target = target_uid, now_following = !was_following, "follow toggled");
    Ok(FollowResult {
        now_following: !was_following,
        changed: true,
        notice: Some(if was_following {
            Notice::success("Deixou de seguir")
        } else {
            Notice::success("Seguindo agora!")
        }),
    })
}

/// Set-toggle on a membership list: never inserts a duplicate, removes all
/// occurrences on the way out.
fn toggled(current: &[String], member: &str, insert: bool) -> Vec<String> {
    let mut next: Vec<String> = current.iter().filter(|m| *m != member).cloned().collect();
    if insert {
        next.push(member.to_string());
    }
    next
}

/// Reads the post's current likes and writes the toggled set back.
async fn write_post_likes<S: DocumentStore>(
    store: &S,
    post_id: &str,
    uid: &str,
    insert: bool,
) -> Result<Vec<String>> {
    let doc = store
        .get_one(CollectionKind::Posts, post_id)
        .await?
        .ok_or_else(|| HeartfyError::not_found(format!("post {post_id}")))?;
    let post: Post = serde_json::from_value(doc.data)?;
    let likes = toggled(&post.likes, uid, insert);

    let mut fields = Map::new();
    fields.insert("likes".to_string(), json!(likes));
    store
        .update_fields(CollectionKind::Posts, post_id, fields)
        .await
        .map_err(|err| HeartfyError::partial_mutation(err.to_string()))?;
    Ok(likes)
}

/// Reads the collection's current likes and writes the toggled set back.
async fn write_collection_likes<S: DocumentStore>(
    store: &S,
    collection_id: &str,
    uid: &str,
    insert: bool,
) -> Result<Vec<String>> {
    let doc = store
        .get_one(CollectionKind::Collections, collection_id)
        .await?
        .ok_or_else(|| HeartfyError::not_found(format!("collection {collection_id}")))?;
    let likes = doc
        .data
        .get("likes")
        .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok())
        .unwrap_or_default();
    let likes = toggled(&likes, uid, insert);

    let mut fields = Map::new();
    fields.insert("likes".to_string(), json!(likes));
    store
        .update_fields(CollectionKind::Collections, collection_id, fields)
        .await
        .map_err(|err| HeartfyError::partial_mutation(err.to_string()))?;
    Ok(likes)
}
