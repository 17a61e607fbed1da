//! Feed derivation.
//!
//! Pure functions over mirrored posts: no state of their own, re-derivable
//! at any time from the current [`crate::mirror::RelationStore`] contents
//! plus the caller's filter inputs.

use crate::post::{Post, PostKind};

/// Ranks the image feed.
///
/// A post is included iff it is an image post, matches the search term
/// (case-insensitive substring against title or any tag; empty term matches
/// everything), and is interest-relevant: admin posts always are, a viewer
/// with no declared interests sees everything, otherwise the post's tags or
/// category must intersect the viewer's interests.
///
/// Admin posts sort first; the sort is stable, so delivery order is kept
/// within each group.
pub fn rank<'a>(posts: &[&'a Post], search_term: &str, viewer_interests: &[String]) -> Vec<&'a Post> {
    let needle = search_term.trim().to_lowercase();
    let mut ranked: Vec<&Post> = posts
        .iter()
        .copied()
        .filter(|post| match &post.kind {
            PostKind::Image {
                title,
                tags,
                category,
                ..
            } => {
                matches_search(&needle, title, tags)
                    && matches_interests(post, tags, category, viewer_interests)
            }
            PostKind::Pulse { .. } => false,
        })
        .collect();
    ranked.sort_by_key(|post| !post.is_admin_post);
    ranked
}

/// The pulse timeline: pulse posts only, newest first.
pub fn pulse_timeline<'a>(posts: &[&'a Post]) -> Vec<&'a Post> {
    let mut pulses: Vec<&Post> = posts.iter().copied().filter(|p| p.is_pulse()).collect();
    pulses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pulses
}

fn matches_search(needle: &str, title: &str, tags: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    title.to_lowercase().contains(needle)
        || tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn matches_interests(
    post: &Post,
    tags: &[String],
    category: &str,
    viewer_interests: &[String],
) -> bool {
    if post.is_admin_post || viewer_interests.is_empty() {
        return true;
    }
    tags.iter().any(|t| viewer_interests.iter().any(|i| i == t))
        || viewer_interests.iter().any(|i| i == category)
}
