use chrono::NaiveDate;
use flockdesk_core::{
    build_digest, BackendKind, CongregationStore, EnvelopeCipher, Member, MeetingKind,
    MeetingProgram, MemoryBackend, Privilege, ProgramPart, SyncGateway, Territory, TerritoryError,
    WriteCoalescer,
};
use std::rc::Rc;
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn store_over(backend: &Rc<MemoryBackend>) -> CongregationStore {
    let gateway = SyncGateway::with_backend(
        Box::new(Rc::clone(backend)),
        EnvelopeCipher::embedded(),
        BackendKind::Local,
    );
    CongregationStore::with_coalescer(gateway, WriteCoalescer::new(Duration::ZERO))
        .expect("well-known slice names are valid")
}

#[test]
fn member_crud_survives_flush_and_reload_through_fake_backend() {
    let backend = Rc::new(MemoryBackend::new());

    let mut store = store_over(&backend);
    let mut member = Member::new("Ana Silva", Privilege::Publisher);
    member.phone = Some("+351 912 345 678".to_string());
    store.upsert_member(member.clone(), "secretary");
    assert_eq!(store.flush_all(), 2); // members + audit

    let mut reloaded = store_over(&backend);
    reloaded.load_all();
    assert_eq!(reloaded.members(), &[member]);
    assert_eq!(reloaded.audit().len(), 1);
}

#[test]
fn deleting_a_member_persists_the_smaller_collection() {
    let backend = Rc::new(MemoryBackend::new());
    let mut store = store_over(&backend);

    let keep = Member::new("Ana Silva", Privilege::Publisher);
    let drop = Member::new("Rui Costa", Privilege::Elder);
    store.upsert_member(keep.clone(), "secretary");
    store.upsert_member(drop.clone(), "secretary");
    store.flush_all();

    assert!(store.remove_member(drop.id, "secretary"));
    assert!(!store.remove_member(drop.id, "secretary"));
    store.flush_all();

    let mut reloaded = store_over(&backend);
    reloaded.load_all();
    assert_eq!(reloaded.members(), &[keep]);
}

#[test]
fn territory_checkout_flow_and_errors() {
    let backend = Rc::new(MemoryBackend::new());
    let mut store = store_over(&backend);

    let territory = Territory::new(12, "Riverside north");
    let territory_id = territory.id;
    let holder = Member::new("Ana Silva", Privilege::Publisher);
    store.upsert_member(holder.clone(), "secretary");
    store.upsert_territory(territory, "secretary");

    store
        .check_out_territory(territory_id, holder.id, date(2025, 4, 1), "secretary")
        .unwrap();
    let err = store
        .check_out_territory(territory_id, holder.id, date(2025, 4, 2), "secretary")
        .unwrap_err();
    assert!(matches!(err, TerritoryError::AlreadyCheckedOut { .. }));

    store
        .check_in_territory(territory_id, date(2025, 5, 20), "secretary")
        .unwrap();
    assert!(!store.territories()[0].is_checked_out());

    let missing = store
        .check_in_territory(uuid::Uuid::new_v4(), date(2025, 5, 20), "secretary")
        .unwrap_err();
    assert!(matches!(missing, TerritoryError::NotFound(_)));
}

#[test]
fn audit_trail_is_capped_at_fifty_newest_entries() {
    let backend = Rc::new(MemoryBackend::new());
    let mut store = store_over(&backend);

    let member = Member::new("Ana Silva", Privilege::Publisher);
    store.upsert_member(member.clone(), "secretary");
    for n in 0..59 {
        let mut updated = member.clone();
        updated.phone = Some(format!("91000000{n}"));
        store.upsert_member(updated, "secretary");
    }

    assert_eq!(store.audit().len(), 50);
    // Newest first: the last update is at the front.
    assert_eq!(store.audit().entries()[0].detail, "member Ana Silva");
}

#[test]
fn acknowledgement_partitions_digest_but_never_scan_output() {
    let backend = Rc::new(MemoryBackend::new());
    let mut store = store_over(&backend);

    let mut ana = Member::new("Ana Silva", Privilege::Publisher);
    ana.phone = Some("351912345678".to_string());
    let rui = Member::new("Rui Costa", Privilege::Elder);
    store.upsert_member(ana.clone(), "secretary");
    store.upsert_member(rui.clone(), "secretary");

    let today = date(2025, 3, 3);
    let mut program = MeetingProgram::new(today, MeetingKind::Midweek);
    program.parts.push(ProgramPart {
        role: "Reading".to_string(),
        assignee_name: ana.full_name.clone(),
        assignee_id: Some(ana.id),
    });
    program.parts.push(ProgramPart {
        role: "Prayer".to_string(),
        assignee_name: rui.full_name.clone(),
        assignee_id: Some(rui.id),
    });
    store.upsert_program(program, "secretary");

    let digest = build_digest(&store, 7, today);
    assert_eq!(digest.pending.len(), 2);
    assert_eq!(digest.suppressed, 0);
    let ana_entry = digest
        .pending
        .iter()
        .find(|pending| pending.item.member_id == ana.id)
        .unwrap();
    assert!(ana_entry
        .message_link
        .as_deref()
        .unwrap()
        .starts_with("https://wa.me/351912345678?text="));
    let rui_entry = digest
        .pending
        .iter()
        .find(|pending| pending.item.member_id == rui.id)
        .unwrap();
    assert!(rui_entry.message_link.is_none());

    let acknowledged_id = ana_entry.item.id.clone();
    assert!(store.acknowledge_reminder(&acknowledged_id, "secretary"));
    assert!(!store.acknowledge_reminder(&acknowledged_id, "secretary"));

    // Scan output is unchanged by acknowledgement.
    assert_eq!(store.scan_reminders(7, today).len(), 2);

    let digest = build_digest(&store, 7, today);
    assert_eq!(digest.pending.len(), 1);
    assert_eq!(digest.suppressed, 1);
}

#[test]
fn pruning_acknowledged_ids_drops_out_of_window_dates() {
    let backend = Rc::new(MemoryBackend::new());
    let mut store = store_over(&backend);

    let member_id = uuid::Uuid::new_v4();
    let old = flockdesk_core::reminder_id(date(2025, 1, 5), member_id, "Reading");
    let recent = flockdesk_core::reminder_id(date(2025, 3, 3), member_id, "Prayer");
    store.acknowledge_reminder(&old, "secretary");
    store.acknowledge_reminder(&recent, "secretary");

    assert_eq!(store.prune_acknowledged(date(2025, 2, 1)), 1);
    assert!(store.acknowledged().contains(&recent));
    assert!(!store.acknowledged().contains(&old));
}

#[test]
fn coalesced_writes_release_after_the_quiet_period() {
    let backend = Rc::new(MemoryBackend::new());
    let gateway = SyncGateway::with_backend(
        Box::new(Rc::clone(&backend)),
        EnvelopeCipher::embedded(),
        BackendKind::Local,
    );
    let mut store = CongregationStore::with_coalescer(
        gateway,
        WriteCoalescer::new(Duration::from_secs(3600)),
    )
    .unwrap();

    store.upsert_member(Member::new("Ana Silva", Privilege::Publisher), "secretary");
    assert_eq!(store.pending_writes(), 2);

    // Quiet period has not elapsed: nothing may reach the backend yet.
    assert_eq!(store.flush_due(std::time::Instant::now()), 0);
    assert!(backend.is_empty());

    // Shutdown flush pushes everything regardless of deadline.
    assert_eq!(store.flush_all(), 2);
    assert_eq!(backend.len(), 2);
}
