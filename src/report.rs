//! Report documents for moderation triage.
//!
//! Reports are append-only: users file them, the admin resolves them with a
//! single status transition (see [`crate::moderation`]). Nothing else in the
//! engine reacts to a resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{current_timestamp_millis, ProfileId};

/// What a report points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTarget {
    /// Kind of the reported entity.
    pub kind: TargetKind,
    /// Id of the reported entity in its collection.
    pub id: String,
}

impl ReportTarget {
    /// Creates a target pointing at a post.
    pub fn post(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Post,
            id: id.into(),
        }
    }

    /// Creates a target pointing at a profile.
    pub fn profile(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Profile,
            id: id.into(),
        }
    }

    /// Creates a target pointing at a collection.
    pub fn collection(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Collection,
            id: id.into(),
        }
    }
}

/// Kind of entity a report targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Profile,
    Collection,
}

/// Triage status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Filed and awaiting admin triage.
    Open,
    /// Accepted by the admin.
    Accepted,
    /// Dismissed by the admin.
    Dismissed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Open => write!(f, "open"),
            ReportStatus::Accepted => write!(f, "accepted"),
            ReportStatus::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// A user-filed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Document id. Overwritten with the envelope id on decode.
    #[serde(default)]
    pub id: String,
    /// Free-form reason supplied by the reporter.
    pub reason: String,
    /// Id of the reporting profile.
    pub reporter_id: ProfileId,
    /// Display name of the reporter at filing time.
    pub reporter_name: String,
    /// The reported entity.
    pub target: ReportTarget,
    /// Triage status.
    pub status: ReportStatus,
    /// Filing timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Report {
    /// Creates a freshly filed report. The id is assigned by the store.
    pub fn new(
        reason: impl Into<String>,
        reporter_id: impl Into<String>,
        reporter_name: impl Into<String>,
        target: ReportTarget,
    ) -> Self {
        Self {
            id: String::new(),
            reason: reason.into(),
            reporter_id: reporter_id.into(),
            reporter_name: reporter_name.into(),
            target,
            status: ReportStatus::Open,
            created_at: current_timestamp_millis(),
        }
    }

    /// Returns true if the report is still awaiting triage.
    pub fn is_open(&self) -> bool {
        self.status == ReportStatus::Open
    }
}
