//! Badge catalog and forbidden-word administration.
//!
//! Every operation here is gated on the session's admin flag. Catalog and
//! word-list mutations rewrite the configuration singleton wholesale with a
//! bumped version; grants and revocations write the target profile's badge
//! set. The local mirror is patched immediately after each successful write.

use crate::config::GlobalConfig;
use crate::constants::{CONFIG_DOC_ID, MAX_BADGE_LABEL_SIZE};
use crate::error::{HeartfyError, Result};
use crate::mirror::RelationStore;
use crate::session::Session;
use crate::store::{CollectionKind, DocumentStore};
use crate::types::{Badge, BadgeTier, Notice};
use serde_json::{json, Map};
use tracing::info;
use uuid::Uuid;

/// Defines a new badge in the catalog.
///
/// The label must be non-empty and at most [`MAX_BADGE_LABEL_SIZE`] bytes;
/// the definition id is freshly generated.
pub async fn define_badge<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    label: &str,
    tier: BadgeTier,
) -> Result<Notice> {
    session.require_admin()?;

    let label = label.trim();
    if label.is_empty() {
        return Err(HeartfyError::validation("badge label must not be empty"));
    }
    if label.len() > MAX_BADGE_LABEL_SIZE {
        return Err(HeartfyError::validation(format!(
            "badge label exceeds {MAX_BADGE_LABEL_SIZE} bytes"
        )));
    }

    let mut config = mirror.global_config().clone();
    config
        .custom_badges
        .push(Badge::new(Uuid::new_v4().to_string(), label, tier));
    write_config(store, mirror, config).await?;

    info!(label, "badge defined");
    Ok(Notice::success("Selo criado!"))
}

/// Grants a catalog badge to a profile.
///
/// Duplicate grants are permitted by default; with
/// `allow_duplicate_grants` off, a grant the target already holds is a
/// silent no-op.
pub async fn grant_badge<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    target_uid: &str,
    badge_def_id: &str,
) -> Result<Notice> {
    session.require_admin()?;

    let badge = mirror
        .global_config()
        .badge_def(badge_def_id)
        .cloned()
        .ok_or_else(|| HeartfyError::not_found(format!("badge definition {badge_def_id}")))?;

    let mut badges = current_badges(store, target_uid).await?;
    if !session.config().allow_duplicate_grants && badges.iter().any(|b| b.id == badge.id) {
        return Ok(Notice::success("Concedido!"));
    }
    badges.push(badge);

    write_badges(store, target_uid, &badges).await?;
    mirror.patch_profile(target_uid, |p| p.badges = badges.clone());

    info!(target = target_uid, badge = badge_def_id, "badge granted");
    Ok(Notice::success("Concedido!"))
}

/// Clears a profile's badge set entirely.
pub async fn revoke_all_badges<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    target_uid: &str,
) -> Result<Notice> {
    session.require_admin()?;

    write_badges(store, target_uid, &[]).await?;
    mirror.patch_profile(target_uid, |p| p.badges.clear());

    info!(target = target_uid, "badges revoked");
    Ok(Notice::success("Selos removidos"))
}

/// Adds a word to the forbidden list, lower-casing it on insert.
pub async fn block_word<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    word: &str,
) -> Result<Notice> {
    session.require_admin()?;

    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(HeartfyError::validation("word must not be empty"));
    }

    let mut config = mirror.global_config().clone();
    if !config.is_blocked(&word) {
        config.forbidden_words.push(word.clone());
        write_config(store, mirror, config).await?;
    }

    info!(%word, "word blocked");
    Ok(Notice::success("Palavra bloqueada"))
}

/// Removes a word from the forbidden list.
pub async fn unblock_word<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    word: &str,
) -> Result<Notice> {
    session.require_admin()?;

    let word = word.trim().to_lowercase();
    let mut config = mirror.global_config().clone();
    if config.is_blocked(&word) {
        config.forbidden_words.retain(|w| *w != word);
        write_config(store, mirror, config).await?;
    }

    info!(%word, "word unblocked");
    Ok(Notice::success("Palavra desbloqueada"))
}

/// Writes the configuration singleton with a bumped version and mirrors it.
async fn write_config<S: DocumentStore>(
    store: &S,
    mirror: &mut RelationStore,
    mut config: GlobalConfig,
) -> Result<()> {
    config.bump();
    let body = serde_json::to_value(&config)?;
    store
        .set_one(CollectionKind::Config, CONFIG_DOC_ID, body)
        .await?;
    mirror.set_global_config(config);
    Ok(())
}

async fn current_badges<S: DocumentStore>(store: &S, uid: &str) -> Result<Vec<Badge>> {
    let doc = store
        .get_one(CollectionKind::Users, uid)
        .await?
        .ok_or_else(|| HeartfyError::not_found(format!("profile {uid}")))?;
    Ok(doc
        .data
        .get("badges")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default())
}

async fn write_badges<S: DocumentStore>(store: &S, uid: &str, badges: &[Badge]) -> Result<()> {
    let mut fields = Map::new();
    fields.insert("badges".to_string(), json!(badges));
    store.update_fields(CollectionKind::Users, uid, fields).await
}
