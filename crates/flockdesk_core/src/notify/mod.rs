//! Reminder derivation and acknowledgement tracking.
//!
//! # Responsibility
//! - Derive reminder items from schedule sources over a rolling window.
//! - Give every item a deterministic identity so "already handled" state
//!   survives reloads without persisting the items themselves.
//!
//! # Invariants
//! - Scanning is a pure function of its inputs; it never reads a clock and
//!   never consults the acknowledged set.

pub mod ack;
pub mod id;
pub mod scan;
