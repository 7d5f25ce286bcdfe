//! Slice naming and validation.
//!
//! # Responsibility
//! - Define the identity rule for persisted slices.
//!
//! # Invariants
//! - Names are non-empty, lowercase `[a-z0-9_-]`.
//! - Validation happens at construction; a held `SliceName` is always valid.

use crate::store::{StoreError, StoreResult};
use std::fmt::{Display, Formatter};

/// Well-known slice names used by the application services.
pub const MEMBERS_SLICE: &str = "members";
pub const PROGRAMS_SLICE: &str = "programs";
pub const DUTIES_SLICE: &str = "duties";
pub const TERRITORIES_SLICE: &str = "territories";
pub const REPORTS_SLICE: &str = "reports";
pub const ACKNOWLEDGED_SLICE: &str = "acknowledged";
pub const AUDIT_SLICE: &str = "audit";

/// Validated name of one persisted logical table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SliceName(String);

impl SliceName {
    pub fn new(value: &str) -> StoreResult<Self> {
        let trimmed = value.trim();
        if !is_valid_slice_name(trimmed) {
            return Err(StoreError::InvalidSliceName(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SliceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_slice_name(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
