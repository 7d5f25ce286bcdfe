//! Congregation domain model.
//!
//! # Responsibility
//! - Define the canonical records persisted by the slice store.
//! - Keep collection shapes JSON-serializable for wholesale slice writes.
//!
//! # Invariants
//! - Every record with external identity carries a stable UUID.
//! - Deletion is removal from the owning collection; there is no tombstone
//!   state or version history.

pub mod audit;
pub mod member;
pub mod report;
pub mod schedule;
pub mod territory;
