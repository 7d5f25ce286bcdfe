//! Congregation data store.
//!
//! # Responsibility
//! - Own one in-memory field per persisted slice and the only paths that
//!   mutate them.
//! - Record an audit entry and a pending coalesced write per mutation.
//!
//! # Invariants
//! - Every mutation marks its slice dirty; nothing writes a backend
//!   directly.
//! - Save failures are logged and skipped; in-memory state stays
//!   last-known-good and is never rolled back.

use crate::model::audit::{AuditAction, AuditEntry, AuditLog};
use crate::model::member::{Member, MemberId};
use crate::model::report::{FieldReport, ReportId};
use crate::model::schedule::{DutyRoster, MeetingProgram, ReminderSource};
use crate::model::territory::{Territory, TerritoryError, TerritoryId};
use crate::notify::ack::AckSet;
use crate::notify::scan::{scan, ReminderItem};
use crate::store::debounce::WriteCoalescer;
use crate::store::gateway::{BackendKind, SyncGateway};
use crate::store::slice::{
    SliceName, ACKNOWLEDGED_SLICE, AUDIT_SLICE, DUTIES_SLICE, MEMBERS_SLICE, PROGRAMS_SLICE,
    REPORTS_SLICE, TERRITORIES_SLICE,
};
use crate::store::StoreResult;
use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

struct SliceNames {
    members: SliceName,
    programs: SliceName,
    duties: SliceName,
    territories: SliceName,
    reports: SliceName,
    acknowledged: SliceName,
    audit: SliceName,
}

#[derive(Clone, Copy)]
enum SliceKey {
    Members,
    Programs,
    Duties,
    Territories,
    Reports,
    Acknowledged,
    Audit,
}

/// In-memory application state with slice-backed persistence.
///
/// The gateway (and through it the backend) is injected, so tests run the
/// whole store against [`crate::store::backend::MemoryBackend`].
pub struct CongregationStore {
    gateway: SyncGateway,
    coalescer: WriteCoalescer,
    names: SliceNames,
    members: Vec<Member>,
    programs: Vec<MeetingProgram>,
    duties: Vec<DutyRoster>,
    territories: Vec<Territory>,
    reports: Vec<FieldReport>,
    acknowledged: AckSet,
    audit: AuditLog,
}

impl CongregationStore {
    pub fn new(gateway: SyncGateway) -> StoreResult<Self> {
        Self::with_coalescer(gateway, WriteCoalescer::default())
    }

    pub fn with_coalescer(gateway: SyncGateway, coalescer: WriteCoalescer) -> StoreResult<Self> {
        Ok(Self {
            gateway,
            coalescer,
            names: SliceNames {
                members: SliceName::new(MEMBERS_SLICE)?,
                programs: SliceName::new(PROGRAMS_SLICE)?,
                duties: SliceName::new(DUTIES_SLICE)?,
                territories: SliceName::new(TERRITORIES_SLICE)?,
                reports: SliceName::new(REPORTS_SLICE)?,
                acknowledged: SliceName::new(ACKNOWLEDGED_SLICE)?,
                audit: SliceName::new(AUDIT_SLICE)?,
            },
            members: Vec::new(),
            programs: Vec::new(),
            duties: Vec::new(),
            territories: Vec::new(),
            reports: Vec::new(),
            acknowledged: AckSet::new(),
            audit: AuditLog::new(),
        })
    }

    /// Loads every slice that has a stored value.
    ///
    /// A slice that fails to load keeps its current in-memory value; the
    /// failure is logged and the session continues.
    pub fn load_all(&mut self) {
        if let Some(value) = self.try_load::<Vec<Member>>(SliceKey::Members) {
            self.members = value;
        }
        if let Some(value) = self.try_load::<Vec<MeetingProgram>>(SliceKey::Programs) {
            self.programs = value;
        }
        if let Some(value) = self.try_load::<Vec<DutyRoster>>(SliceKey::Duties) {
            self.duties = value;
        }
        if let Some(value) = self.try_load::<Vec<Territory>>(SliceKey::Territories) {
            self.territories = value;
        }
        if let Some(value) = self.try_load::<Vec<FieldReport>>(SliceKey::Reports) {
            self.reports = value;
        }
        if let Some(value) = self.try_load::<AckSet>(SliceKey::Acknowledged) {
            self.acknowledged = value;
        }
        if let Some(value) = self.try_load::<AuditLog>(SliceKey::Audit) {
            self.audit = value;
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.gateway.backend_kind()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn programs(&self) -> &[MeetingProgram] {
        &self.programs
    }

    pub fn duties(&self) -> &[DutyRoster] {
        &self.duties
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn reports(&self) -> &[FieldReport] {
        &self.reports
    }

    pub fn acknowledged(&self) -> &AckSet {
        &self.acknowledged
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Derives reminder items from the current programs and duty rosters.
    pub fn scan_reminders(&self, window_days: u32, today: NaiveDate) -> Vec<ReminderItem> {
        let sources: [&dyn ReminderSource; 2] = [&self.programs, &self.duties];
        scan(window_days, today, &self.members, &sources)
    }

    pub fn upsert_member(&mut self, member: Member, actor: &str) {
        let detail = format!("member {}", member.full_name);
        let action = match self.members.iter().position(|known| known.id == member.id) {
            Some(index) => {
                self.members[index] = member;
                AuditAction::Update
            }
            None => {
                self.members.push(member);
                AuditAction::Create
            }
        };
        self.record_audit(actor, "members", action, detail);
        self.touch(SliceKey::Members);
    }

    pub fn remove_member(&mut self, id: MemberId, actor: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.id != id);
        if self.members.len() == before {
            return false;
        }
        self.record_audit(actor, "members", AuditAction::Delete, format!("member {id}"));
        self.touch(SliceKey::Members);
        true
    }

    pub fn upsert_program(&mut self, program: MeetingProgram, actor: &str) {
        let detail = format!("program {}", program.date);
        let action = match self.programs.iter().position(|known| known.id == program.id) {
            Some(index) => {
                self.programs[index] = program;
                AuditAction::Update
            }
            None => {
                self.programs.push(program);
                AuditAction::Create
            }
        };
        self.record_audit(actor, "programs", action, detail);
        self.touch(SliceKey::Programs);
    }

    pub fn remove_program(&mut self, id: Uuid, actor: &str) -> bool {
        let before = self.programs.len();
        self.programs.retain(|program| program.id != id);
        if self.programs.len() == before {
            return false;
        }
        self.record_audit(actor, "programs", AuditAction::Delete, format!("program {id}"));
        self.touch(SliceKey::Programs);
        true
    }

    pub fn upsert_duty_roster(&mut self, roster: DutyRoster, actor: &str) {
        let detail = format!("duty roster {}", roster.date);
        let action = match self.duties.iter().position(|known| known.id == roster.id) {
            Some(index) => {
                self.duties[index] = roster;
                AuditAction::Update
            }
            None => {
                self.duties.push(roster);
                AuditAction::Create
            }
        };
        self.record_audit(actor, "duties", action, detail);
        self.touch(SliceKey::Duties);
    }

    pub fn remove_duty_roster(&mut self, id: Uuid, actor: &str) -> bool {
        let before = self.duties.len();
        self.duties.retain(|roster| roster.id != id);
        if self.duties.len() == before {
            return false;
        }
        self.record_audit(actor, "duties", AuditAction::Delete, format!("duty roster {id}"));
        self.touch(SliceKey::Duties);
        true
    }

    pub fn upsert_territory(&mut self, territory: Territory, actor: &str) {
        let detail = format!("territory {}", territory.number);
        let action = match self
            .territories
            .iter()
            .position(|known| known.id == territory.id)
        {
            Some(index) => {
                self.territories[index] = territory;
                AuditAction::Update
            }
            None => {
                self.territories.push(territory);
                AuditAction::Create
            }
        };
        self.record_audit(actor, "territories", action, detail);
        self.touch(SliceKey::Territories);
    }

    pub fn remove_territory(&mut self, id: TerritoryId, actor: &str) -> bool {
        let before = self.territories.len();
        self.territories.retain(|territory| territory.id != id);
        if self.territories.len() == before {
            return false;
        }
        self.record_audit(
            actor,
            "territories",
            AuditAction::Delete,
            format!("territory {id}"),
        );
        self.touch(SliceKey::Territories);
        true
    }

    pub fn check_out_territory(
        &mut self,
        id: TerritoryId,
        member: MemberId,
        on: NaiveDate,
        actor: &str,
    ) -> Result<(), TerritoryError> {
        let territory = self
            .territories
            .iter_mut()
            .find(|territory| territory.id == id)
            .ok_or(TerritoryError::NotFound(id))?;
        territory.check_out(member, on)?;
        let detail = format!("territory {} to {member}", territory.number);
        self.record_audit(actor, "territories", AuditAction::Update, detail);
        self.touch(SliceKey::Territories);
        Ok(())
    }

    pub fn check_in_territory(
        &mut self,
        id: TerritoryId,
        on: NaiveDate,
        actor: &str,
    ) -> Result<(), TerritoryError> {
        let territory = self
            .territories
            .iter_mut()
            .find(|territory| territory.id == id)
            .ok_or(TerritoryError::NotFound(id))?;
        territory.check_in(on)?;
        let detail = format!("territory {} returned", territory.number);
        self.record_audit(actor, "territories", AuditAction::Update, detail);
        self.touch(SliceKey::Territories);
        Ok(())
    }

    pub fn submit_report(&mut self, report: FieldReport, actor: &str) {
        let detail = format!("report {} for {}", report.member_name, report.month);
        self.reports.push(report);
        self.record_audit(actor, "reports", AuditAction::Create, detail);
        self.touch(SliceKey::Reports);
    }

    pub fn remove_report(&mut self, id: ReportId, actor: &str) -> bool {
        let before = self.reports.len();
        self.reports.retain(|report| report.id != id);
        if self.reports.len() == before {
            return false;
        }
        self.record_audit(actor, "reports", AuditAction::Delete, format!("report {id}"));
        self.touch(SliceKey::Reports);
        true
    }

    /// Marks a reminder id as actioned. Returns `false` when it already
    /// was; scanning output is unaffected either way.
    pub fn acknowledge_reminder(&mut self, id: &str, actor: &str) -> bool {
        if !self.acknowledged.acknowledge(id) {
            return false;
        }
        self.record_audit(
            actor,
            "reminders",
            AuditAction::Acknowledge,
            format!("reminder {id}"),
        );
        self.touch(SliceKey::Acknowledged);
        true
    }

    /// Evicts acknowledged ids dated before `cutoff`.
    pub fn prune_acknowledged(&mut self, cutoff: NaiveDate) -> usize {
        let dropped = self.acknowledged.prune_older_than(cutoff);
        if dropped > 0 {
            self.touch(SliceKey::Acknowledged);
        }
        dropped
    }

    /// Saves every coalesced write whose quiet period elapsed.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let writes = self.coalescer.take_due(now);
        self.push_writes(writes)
    }

    /// Saves everything pending, due or not (shutdown flush).
    pub fn flush_all(&mut self) -> usize {
        let writes = self.coalescer.drain();
        self.push_writes(writes)
    }

    pub fn pending_writes(&self) -> usize {
        self.coalescer.pending_len()
    }

    fn push_writes(&mut self, writes: Vec<(SliceName, serde_json::Value)>) -> usize {
        let mut saved = 0;
        for (slice, value) in writes {
            match self.gateway.save(&slice, &value) {
                Ok(()) => saved += 1,
                Err(err) => {
                    // Memory keeps the last-known-good value; the write is
                    // dropped, not retried.
                    warn!(
                        "event=slice_save module=service status=error slice={slice} error={err}"
                    );
                }
            }
        }
        saved
    }

    fn try_load<T: DeserializeOwned>(&self, key: SliceKey) -> Option<T> {
        let slice = self.slice_name(key);
        match self.gateway.load::<T>(slice) {
            Ok(found) => found,
            Err(err) => {
                warn!("event=slice_load module=service status=error slice={slice} error={err}");
                None
            }
        }
    }

    fn slice_name(&self, key: SliceKey) -> &SliceName {
        match key {
            SliceKey::Members => &self.names.members,
            SliceKey::Programs => &self.names.programs,
            SliceKey::Duties => &self.names.duties,
            SliceKey::Territories => &self.names.territories,
            SliceKey::Reports => &self.names.reports,
            SliceKey::Acknowledged => &self.names.acknowledged,
            SliceKey::Audit => &self.names.audit,
        }
    }

    fn touch(&mut self, key: SliceKey) {
        let (slice, serialized) = match key {
            SliceKey::Members => (
                self.names.members.clone(),
                serde_json::to_value(&self.members),
            ),
            SliceKey::Programs => (
                self.names.programs.clone(),
                serde_json::to_value(&self.programs),
            ),
            SliceKey::Duties => (
                self.names.duties.clone(),
                serde_json::to_value(&self.duties),
            ),
            SliceKey::Territories => (
                self.names.territories.clone(),
                serde_json::to_value(&self.territories),
            ),
            SliceKey::Reports => (
                self.names.reports.clone(),
                serde_json::to_value(&self.reports),
            ),
            SliceKey::Acknowledged => (
                self.names.acknowledged.clone(),
                serde_json::to_value(&self.acknowledged),
            ),
            SliceKey::Audit => (self.names.audit.clone(), serde_json::to_value(&self.audit)),
        };
        match serialized {
            Ok(json) => self.coalescer.note_change(&slice, json, Instant::now()),
            Err(err) => {
                warn!("event=slice_mark module=service status=error slice={slice} error={err}")
            }
        }
    }

    fn record_audit(&mut self, actor: &str, module: &str, action: AuditAction, detail: String) {
        self.audit.record(AuditEntry {
            timestamp_ms: now_epoch_ms(),
            actor: actor.to_string(),
            module: module.to_string(),
            action,
            detail,
        });
        self.touch(SliceKey::Audit);
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
