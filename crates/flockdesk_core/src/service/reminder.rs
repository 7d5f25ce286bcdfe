//! Reminder digest orchestration.
//!
//! # Responsibility
//! - Join scan output against the acknowledged set and prepare message
//!   links for the reminders still awaiting action.
//!
//! # Invariants
//! - Acknowledgement only partitions the output; it never feeds back into
//!   scanning.
//! - An item whose member has no usable phone still appears, just without
//!   a link.

use crate::messaging::message_link;
use crate::notify::scan::ReminderItem;
use crate::service::congregation::CongregationStore;
use chrono::NaiveDate;

/// One reminder awaiting action, with a prepared deep link when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    pub item: ReminderItem,
    pub message_link: Option<String>,
}

/// Scan output partitioned against the acknowledged set.
#[derive(Debug, Clone, Default)]
pub struct ReminderDigest {
    pub pending: Vec<PendingReminder>,
    /// Items suppressed because their id was already acknowledged.
    pub suppressed: usize,
}

/// Builds the digest for the given window.
///
/// The same logical assignment appearing in two sources stays duplicated
/// here; acknowledging its id suppresses every occurrence on the next
/// digest build.
pub fn build_digest(
    store: &CongregationStore,
    window_days: u32,
    today: NaiveDate,
) -> ReminderDigest {
    let items = store.scan_reminders(window_days, today);
    let mut digest = ReminderDigest::default();

    for item in items {
        if store.acknowledged().contains(&item.id) {
            digest.suppressed += 1;
            continue;
        }
        let link = store
            .members()
            .iter()
            .find(|member| member.id == item.member_id)
            .and_then(|member| member.phone.as_deref())
            .and_then(|phone| message_link(phone, &reminder_text(&item)).ok());
        digest.pending.push(PendingReminder {
            item,
            message_link: link,
        });
    }

    digest
}

fn reminder_text(item: &ReminderItem) -> String {
    format!(
        "Hello {}, a reminder for {}: {} on {}.",
        item.member_name, item.category, item.description, item.date
    )
}
