//! Rolling-window reminder scanning.
//!
//! # Responsibility
//! - Derive reminder items for every assignment inside the window.
//! - Resolve typed assignee names to roster members.
//!
//! # Invariants
//! - The window is the closed interval `today ..= today + window_days`.
//! - Resolution prefers an explicit member reference; the name fallback is
//!   exact case-insensitive, and a miss emits nothing (never an error).
//! - Output is ordered by date, then member display name; re-scanning
//!   unchanged inputs yields identical ids in identical order.

use crate::model::member::{Member, MemberId};
use crate::model::schedule::{ReminderSource, RoleAssignment};
use crate::notify::id::reminder_id;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;

/// One derived reminder. Never persisted; only its id is recorded once a
/// human has actioned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: String,
    pub member_id: MemberId,
    pub member_name: String,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
}

/// Scans every source over the window and emits one item per resolved
/// (assignee, role) pair.
///
/// The same logical assignment appearing in two sources yields two items
/// with the same id; see [`dedupe_by_id`] for per-logical-assignment
/// uniqueness.
pub fn scan(
    window_days: u32,
    today: NaiveDate,
    members: &[Member],
    sources: &[&dyn ReminderSource],
) -> Vec<ReminderItem> {
    let mut items = Vec::new();

    for offset in 0..=window_days {
        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            continue;
        };
        for source in sources {
            for assignment in source.assignments_on(date) {
                let Some(member) = resolve_member(members, &assignment) else {
                    continue;
                };
                items.push(ReminderItem {
                    id: reminder_id(date, member.id, &assignment.description),
                    member_id: member.id,
                    member_name: member.full_name.clone(),
                    date,
                    category: source.category().to_string(),
                    description: assignment.description,
                });
            }
        }
    }

    // Stable sort: equal (date, name) keys keep source order.
    items.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.member_name.cmp(&b.member_name))
    });
    items
}

/// Keeps the first item per id, preserving order.
pub fn dedupe_by_id(items: Vec<ReminderItem>) -> Vec<ReminderItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

fn resolve_member<'a>(members: &'a [Member], assignment: &RoleAssignment) -> Option<&'a Member> {
    if let Some(id) = assignment.assignee_id {
        if let Some(member) = members.iter().find(|member| member.id == id) {
            return Some(member);
        }
        // A dangling reference degrades to the name fallback below rather
        // than dropping the assignment outright.
    }
    members
        .iter()
        .find(|member| member.matches_name(&assignment.assignee_name))
}
