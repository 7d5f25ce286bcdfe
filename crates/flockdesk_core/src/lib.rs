//! Core domain logic for FlockDesk.
//! This crate is the single source of truth for congregation data invariants.

pub mod config;
pub mod crypto;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod notify;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, RemoteEndpoint};
pub use crypto::{EnvelopeCipher, EnvelopeError, SealedEnvelope};
pub use logging::{default_log_level, init_logging, logging_status};
pub use messaging::{message_link, MessagingError};
pub use model::audit::{AuditAction, AuditEntry, AuditLog};
pub use model::member::{Member, MemberId, Privilege};
pub use model::report::{FieldReport, ReportId};
pub use model::schedule::{
    DutyEntry, DutyRoster, MeetingKind, MeetingProgram, ProgramPart, ReminderSource,
    RoleAssignment,
};
pub use model::territory::{Territory, TerritoryError, TerritoryId};
pub use notify::ack::AckSet;
pub use notify::id::{decode_reminder_id, reminder_id};
pub use notify::scan::{dedupe_by_id, scan, ReminderItem};
pub use service::congregation::CongregationStore;
pub use service::reminder::{build_digest, PendingReminder, ReminderDigest};
pub use store::backend::{MemoryBackend, SliceBackend};
pub use store::debounce::WriteCoalescer;
pub use store::gateway::{BackendKind, SyncGateway};
pub use store::slice::SliceName;
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
