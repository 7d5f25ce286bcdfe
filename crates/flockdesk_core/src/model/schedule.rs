//! Meeting and duty schedule model.
//!
//! # Responsibility
//! - Define the schedule-like entities scanned for reminders.
//! - Expose one extraction seam (`ReminderSource`) so scanning stays
//!   independent of the concrete schedule shape.
//!
//! # Invariants
//! - A program or roster belongs to exactly one calendar date.
//! - Assignments may carry an explicit member reference; the typed name is
//!   kept verbatim either way for display and fallback matching.

use crate::model::member::MemberId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Meeting occurrence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    Midweek,
    Weekend,
}

/// One assigned part inside a meeting program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPart {
    /// Role label shown on the printed program ("Reading", "Opening Prayer").
    pub role: String,
    /// Assignee name exactly as typed by the scheduler.
    pub assignee_name: String,
    /// Preferred resolution path; `None` for entries created before member
    /// references existed.
    pub assignee_id: Option<MemberId>,
}

/// One meeting occurrence with its ordered parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingProgram {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: MeetingKind,
    pub parts: Vec<ProgramPart>,
}

impl MeetingProgram {
    pub fn new(date: NaiveDate, kind: MeetingKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            parts: Vec::new(),
        }
    }
}

/// One duty entry (cleaning, attendant) inside a roster occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyEntry {
    pub task: String,
    pub assignee_name: String,
    pub assignee_id: Option<MemberId>,
}

/// One duty-roster occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyRoster {
    pub id: Uuid,
    pub date: NaiveDate,
    pub duties: Vec<DutyEntry>,
}

impl DutyRoster {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            duties: Vec::new(),
        }
    }
}

/// One (assignee, role) pair extracted from a source for a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub assignee_name: String,
    pub assignee_id: Option<MemberId>,
    pub description: String,
}

/// Extraction seam between schedule collections and reminder scanning.
///
/// A source is a whole collection (all meeting programs, all duty rosters),
/// not a single occurrence: per-source-occurrence duplication semantics in
/// scanning depend on sources staying distinct.
pub trait ReminderSource {
    /// Stable category label carried into emitted reminder items.
    fn category(&self) -> &'static str;

    /// Every (assignee, role) pair assigned on `date`, in source order.
    fn assignments_on(&self, date: NaiveDate) -> Vec<RoleAssignment>;
}

impl ReminderSource for Vec<MeetingProgram> {
    fn category(&self) -> &'static str {
        "meeting"
    }

    fn assignments_on(&self, date: NaiveDate) -> Vec<RoleAssignment> {
        self.iter()
            .filter(|program| program.date == date)
            .flat_map(|program| {
                program.parts.iter().map(|part| RoleAssignment {
                    assignee_name: part.assignee_name.clone(),
                    assignee_id: part.assignee_id,
                    description: part.role.clone(),
                })
            })
            .collect()
    }
}

impl ReminderSource for Vec<DutyRoster> {
    fn category(&self) -> &'static str {
        "duty"
    }

    fn assignments_on(&self, date: NaiveDate) -> Vec<RoleAssignment> {
        self.iter()
            .filter(|roster| roster.date == date)
            .flat_map(|roster| {
                roster.duties.iter().map(|duty| RoleAssignment {
                    assignee_name: duty.assignee_name.clone(),
                    assignee_id: duty.assignee_id,
                    description: duty.task.clone(),
                })
            })
            .collect()
    }
}
