//! Member roster model.
//!
//! # Responsibility
//! - Define the canonical member record referenced by schedules, duties,
//!   territories and reports.
//! - Provide the name-resolution rule used by reminder scanning.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - Name matching is exact and case-insensitive; it never trims or fuzzes
//!   input, so a trailing-space mismatch is a miss (compatibility rule).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a member record.
pub type MemberId = Uuid;

/// Privilege level used for assignment eligibility display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    Publisher,
    Assistant,
    Elder,
}

/// Canonical member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable global ID used for linking and audit attribution.
    pub id: MemberId,
    /// Full display name as entered in the roster.
    pub full_name: String,
    /// Free-form phone input; digits are extracted at link-building time.
    pub phone: Option<String>,
    pub privilege: Privilege,
    /// Inactive members stay in the roster but stop receiving reminders
    /// only when schedules stop naming them; scanning itself does not
    /// filter on this flag.
    pub is_active: bool,
}

impl Member {
    /// Creates a new member with a generated stable ID.
    pub fn new(full_name: impl Into<String>, privilege: Privilege) -> Self {
        Self::with_id(Uuid::new_v4(), full_name, privilege)
    }

    /// Creates a member with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: MemberId, full_name: impl Into<String>, privilege: Privilege) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            phone: None,
            privilege,
            is_active: true,
        }
    }

    /// Exact case-insensitive full-name comparison.
    ///
    /// This is the documented compatibility fallback for schedule entries
    /// that carry only a typed name. It deliberately does not trim: a
    /// whitespace mismatch is a miss, not an error.
    pub fn matches_name(&self, raw: &str) -> bool {
        self.full_name.to_lowercase() == raw.to_lowercase()
    }
}
