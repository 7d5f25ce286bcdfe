//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway, coalescer and model collections into the APIs a
//!   UI layer drives.
//! - Keep callers decoupled from storage and envelope details.

pub mod congregation;
pub mod reminder;
