//! Deterministic reminder identity.
//!
//! # Responsibility
//! - Encode (date, member, description) into one stable id and back.
//!
//! # Invariants
//! - The encoding is reversible, not a hash: the acknowledged-set pruning
//!   path decodes the date back out of stored ids.
//! - Identical inputs always produce the identical id; changing any field
//!   changes the id.

use crate::model::member::MemberId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;

const FIELD_SEPARATOR: char = '|';

/// Builds the stable id for one derived reminder.
pub fn reminder_id(date: NaiveDate, member_id: MemberId, description: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!(
        "{date}{FIELD_SEPARATOR}{member_id}{FIELD_SEPARATOR}{description}"
    ))
}

/// Recovers (date, member, description) from an id.
///
/// Returns `None` for ids not produced by [`reminder_id`]; descriptions may
/// themselves contain the separator, so only the first two are structural.
pub fn decode_reminder_id(id: &str) -> Option<(NaiveDate, MemberId, String)> {
    let raw = URL_SAFE_NO_PAD.decode(id).ok()?;
    let text = String::from_utf8(raw).ok()?;
    let mut fields = text.splitn(3, FIELD_SEPARATOR);
    let date: NaiveDate = fields.next()?.parse().ok()?;
    let member_id: MemberId = fields.next()?.parse().ok()?;
    let description = fields.next()?.to_string();
    Some((date, member_id, description))
}
