//! Report filing and the admin moderation queue.
//!
//! Any interactive user may file a report; reading the queue and resolving
//! entries is admin-only. Resolution is a status transition written onto the
//! report document, never a deletion.

use crate::constants::MAX_REPORT_REASON_SIZE;
use crate::error::{HeartfyError, Result};
use crate::mirror::RelationStore;
use crate::report::{Report, ReportStatus, ReportTarget};
use crate::session::Session;
use crate::store::{CollectionKind, DocumentStore};
use serde_json::Map;
use tracing::info;

/// Files a report against a post, profile, or collection.
///
/// Returns the id assigned by the store. The reason must be non-empty and
/// at most [`MAX_REPORT_REASON_SIZE`] bytes.
pub async fn file_report<S: DocumentStore>(
    session: &Session,
    store: &S,
    target: ReportTarget,
    reason: &str,
) -> Result<String> {
    let profile = session.require_interactive()?;

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(HeartfyError::validation("report reason must not be empty"));
    }
    if reason.len() > MAX_REPORT_REASON_SIZE {
        return Err(HeartfyError::validation(format!(
            "report reason exceeds {MAX_REPORT_REASON_SIZE} bytes"
        )));
    }

    let report = Report::new(reason, &profile.uid, &profile.name, target);
    let body = serde_json::to_value(&report)?;
    let id = store.add_one(CollectionKind::Reports, body).await?;

    info!(report = %id, reporter = %profile.uid, "report filed");
    Ok(id)
}

/// The open reports, in delivery order. Admin-only.
pub fn open_reports<'a>(session: &Session, mirror: &'a RelationStore) -> Result<Vec<&'a Report>> {
    session.require_admin()?;
    Ok(mirror.reports().into_iter().filter(|r| r.is_open()).collect())
}

/// Resolves an open report by accepting or dismissing it. Admin-only.
///
/// Resolving an already-resolved report is rejected.
pub async fn resolve<S: DocumentStore>(
    session: &Session,
    mirror: &mut RelationStore,
    store: &S,
    report_id: &str,
    accept: bool,
) -> Result<ReportStatus> {
    session.require_admin()?;

    let report = mirror
        .report(report_id)
        .ok_or_else(|| HeartfyError::not_found(format!("report {report_id}")))?;
    if !report.is_open() {
        return Err(HeartfyError::validation(format!(
            "report {report_id} is already {}",
            report.status
        )));
    }

    let status = if accept {
        ReportStatus::Accepted
    } else {
        ReportStatus::Dismissed
    };
    let mut fields = Map::new();
    fields.insert("status".to_string(), serde_json::to_value(status)?);
    store
        .update_fields(CollectionKind::Reports, report_id, fields)
        .await?;
    mirror.patch_report(report_id, |r| r.status = status);

    info!(report = report_id, %status, "report resolved");
    Ok(status)
}
