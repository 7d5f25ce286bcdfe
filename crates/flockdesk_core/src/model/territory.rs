//! Field-service territory model.
//!
//! # Responsibility
//! - Track which member holds each numbered territory and since when.
//!
//! # Invariants
//! - A territory is held by at most one member at a time.
//! - Check-out/check-in transitions are explicit; double transitions are
//!   rejected as errors, not silently absorbed.

use crate::model::member::MemberId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a territory record.
pub type TerritoryId = Uuid;

/// Territory state transition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerritoryError {
    AlreadyCheckedOut { number: u32, holder: MemberId },
    NotCheckedOut { number: u32 },
    NotFound(TerritoryId),
}

impl Display for TerritoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyCheckedOut { number, holder } => {
                write!(f, "territory {number} is already checked out to {holder}")
            }
            Self::NotCheckedOut { number } => {
                write!(f, "territory {number} is not checked out")
            }
            Self::NotFound(id) => write!(f, "territory not found: {id}"),
        }
    }
}

impl Error for TerritoryError {}

/// Numbered map area with its current assignment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub number: u32,
    pub locality: String,
    /// Current holder; `None` when the territory is on the shelf.
    pub assigned_to: Option<MemberId>,
    pub checked_out_on: Option<NaiveDate>,
    pub last_returned_on: Option<NaiveDate>,
}

impl Territory {
    pub fn new(number: u32, locality: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            locality: locality.into(),
            assigned_to: None,
            checked_out_on: None,
            last_returned_on: None,
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Assigns this territory to a member.
    pub fn check_out(&mut self, member: MemberId, on: NaiveDate) -> Result<(), TerritoryError> {
        if let Some(holder) = self.assigned_to {
            return Err(TerritoryError::AlreadyCheckedOut {
                number: self.number,
                holder,
            });
        }
        self.assigned_to = Some(member);
        self.checked_out_on = Some(on);
        Ok(())
    }

    /// Returns this territory to the shelf.
    pub fn check_in(&mut self, on: NaiveDate) -> Result<(), TerritoryError> {
        if self.assigned_to.is_none() {
            return Err(TerritoryError::NotCheckedOut {
                number: self.number,
            });
        }
        self.assigned_to = None;
        self.checked_out_on = None;
        self.last_returned_on = Some(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Territory, TerritoryError};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn check_out_then_in_roundtrip() {
        let mut territory = Territory::new(12, "Riverside north");
        let member = Uuid::new_v4();

        territory.check_out(member, date(2025, 4, 1)).unwrap();
        assert!(territory.is_checked_out());
        assert_eq!(territory.assigned_to, Some(member));

        territory.check_in(date(2025, 5, 20)).unwrap();
        assert!(!territory.is_checked_out());
        assert_eq!(territory.last_returned_on, Some(date(2025, 5, 20)));
        assert!(territory.checked_out_on.is_none());
    }

    #[test]
    fn double_check_out_is_rejected() {
        let mut territory = Territory::new(3, "Old town");
        let first = Uuid::new_v4();
        territory.check_out(first, date(2025, 4, 1)).unwrap();

        let err = territory
            .check_out(Uuid::new_v4(), date(2025, 4, 2))
            .unwrap_err();
        assert!(matches!(
            err,
            TerritoryError::AlreadyCheckedOut { number: 3, holder } if holder == first
        ));
    }

    #[test]
    fn check_in_without_holder_is_rejected() {
        let mut territory = Territory::new(7, "Hillside");
        let err = territory.check_in(date(2025, 4, 1)).unwrap_err();
        assert!(matches!(err, TerritoryError::NotCheckedOut { number: 7 }));
    }
}
