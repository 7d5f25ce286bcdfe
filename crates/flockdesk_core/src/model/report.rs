//! Field-service report inbox model.
//!
//! # Responsibility
//! - Hold submitted monthly reports until a human processes them.
//!
//! # Invariants
//! - The inbox is append-and-remove only; entries are never edited in place.
//! - `member_name` is a snapshot at submission time; the roster record may
//!   change or disappear afterwards.

use crate::model::member::MemberId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an inbox entry.
pub type ReportId = Uuid;

/// One submitted monthly field-service report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub id: ReportId,
    /// `None` for reports submitted by someone not (yet) in the roster.
    pub member_id: Option<MemberId>,
    pub member_name: String,
    /// Service month in `YYYY-MM` form.
    pub month: String,
    pub hours: Option<u32>,
    pub bible_studies: u32,
    /// Submission time in epoch milliseconds.
    pub submitted_at_ms: i64,
}

impl FieldReport {
    pub fn new(
        member_id: Option<MemberId>,
        member_name: impl Into<String>,
        month: impl Into<String>,
        submitted_at_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            member_name: member_name.into(),
            month: month.into(),
            hours: None,
            bible_studies: 0,
            submitted_at_ms,
        }
    }
}
