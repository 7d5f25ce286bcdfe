//! Write coalescing for rapid state changes.
//!
//! # Responsibility
//! - Collapse bursts of changes into one pending write per slice.
//! - Release writes only after a quiet period with no further changes.
//!
//! # Invariants
//! - At most one pending write per slice; re-noting reschedules it, it
//!   never duplicates.
//! - Time is injected by the caller, so behavior is deterministic under
//!   test and there is no background timer thread.

use crate::store::slice::SliceName;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Quiet period applied when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);

struct PendingWrite {
    value: serde_json::Value,
    due_at: Instant,
}

/// Per-slice pending-write buffer with a fixed quiet period.
pub struct WriteCoalescer {
    quiet_period: Duration,
    pending: BTreeMap<SliceName, PendingWrite>,
}

impl WriteCoalescer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: BTreeMap::new(),
        }
    }

    /// Records a changed slice value, replacing any pending write for the
    /// same slice and restarting its quiet period from `now`.
    pub fn note_change(&mut self, slice: &SliceName, value: serde_json::Value, now: Instant) {
        self.pending.insert(
            slice.clone(),
            PendingWrite {
                value,
                due_at: now + self.quiet_period,
            },
        );
    }

    /// Removes and returns every write whose quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(SliceName, serde_json::Value)> {
        let due_names: Vec<SliceName> = self
            .pending
            .iter()
            .filter(|(_, write)| write.due_at <= now)
            .map(|(name, _)| name.clone())
            .collect();

        due_names
            .into_iter()
            .filter_map(|name| {
                self.pending
                    .remove(&name)
                    .map(|write| (name, write.value))
            })
            .collect()
    }

    /// Removes and returns everything, due or not (shutdown flush).
    pub fn drain(&mut self) -> Vec<(SliceName, serde_json::Value)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(name, write)| (name, write.value))
            .collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|write| write.due_at).min()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for WriteCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::WriteCoalescer;
    use crate::store::slice::SliceName;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn slice(name: &str) -> SliceName {
        SliceName::new(name).unwrap()
    }

    #[test]
    fn nothing_is_due_before_the_quiet_period() {
        let mut coalescer = WriteCoalescer::new(Duration::from_millis(100));
        let start = Instant::now();
        coalescer.note_change(&slice("members"), json!([1]), start);

        assert!(coalescer
            .take_due(start + Duration::from_millis(50))
            .is_empty());
        assert_eq!(coalescer.pending_len(), 1);
    }

    #[test]
    fn renoting_reschedules_instead_of_duplicating() {
        let mut coalescer = WriteCoalescer::new(Duration::from_millis(100));
        let start = Instant::now();
        coalescer.note_change(&slice("members"), json!([1]), start);
        coalescer.note_change(
            &slice("members"),
            json!([1, 2]),
            start + Duration::from_millis(80),
        );

        // The first deadline has passed, but the write was rescheduled.
        assert!(coalescer
            .take_due(start + Duration::from_millis(120))
            .is_empty());

        let released = coalescer.take_due(start + Duration::from_millis(180));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].1, json!([1, 2]));
        assert!(coalescer.is_idle());
    }

    #[test]
    fn take_due_releases_only_elapsed_slices() {
        let mut coalescer = WriteCoalescer::new(Duration::from_millis(100));
        let start = Instant::now();
        coalescer.note_change(&slice("members"), json!("a"), start);
        coalescer.note_change(
            &slice("duties"),
            json!("b"),
            start + Duration::from_millis(90),
        );

        let released = coalescer.take_due(start + Duration::from_millis(110));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].0.as_str(), "members");
        assert_eq!(coalescer.pending_len(), 1);
    }

    #[test]
    fn drain_flushes_everything_regardless_of_deadline() {
        let mut coalescer = WriteCoalescer::default();
        let start = Instant::now();
        coalescer.note_change(&slice("members"), json!("a"), start);
        coalescer.note_change(&slice("duties"), json!("b"), start);

        let drained = coalescer.drain();
        assert_eq!(drained.len(), 2);
        assert!(coalescer.is_idle());
    }
}
