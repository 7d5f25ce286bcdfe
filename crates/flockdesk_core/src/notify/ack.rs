//! Acknowledged-reminder tracking.
//!
//! # Responsibility
//! - Remember which reminder ids a human has already actioned.
//! - Bound growth by pruning ids whose date fell out of reach.
//!
//! # Invariants
//! - Membership here never influences scanning; suppression is the
//!   caller's join of scan output against this set.
//! - Insertion is idempotent and keeps first-seen order.

use crate::notify::id::decode_reminder_id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted set of actioned reminder ids. Stored wholesale as one slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AckSet {
    ids: Vec<String>,
}

impl AckSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id as actioned. Returns `false` when already present.
    pub fn acknowledge(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drops ids dated before `cutoff`, plus ids that do not decode at all:
    /// scanning can never produce them again, so keeping them only leaks.
    ///
    /// Returns the number of dropped ids.
    pub fn prune_older_than(&mut self, cutoff: NaiveDate) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| {
            decode_reminder_id(id).is_some_and(|(date, _, _)| date >= cutoff)
        });
        before - self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::AckSet;
    use crate::notify::id::reminder_id;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn acknowledge_is_idempotent() {
        let mut set = AckSet::new();
        assert!(set.acknowledge("abc"));
        assert!(!set.acknowledge("abc"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn prune_drops_old_and_undecodable_ids() {
        let member = Uuid::new_v4();
        let old = reminder_id(date(2025, 1, 5), member, "Reading");
        let recent = reminder_id(date(2025, 3, 3), member, "Prayer");

        let mut set = AckSet::new();
        set.acknowledge(&old);
        set.acknowledge(&recent);
        set.acknowledge("opaque-garbage");

        let dropped = set.prune_older_than(date(2025, 2, 1));
        assert_eq!(dropped, 2);
        assert!(set.contains(&recent));
        assert!(!set.contains(&old));
        assert_eq!(set.len(), 1);
    }
}
