//! End-to-end flows over a file-backed registry.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use prereg_core::{
    AcademicAggregator, AccessGate, ActionOutcome, Dataset, EligibilityEngine, Error, FixedClock,
    Grade, RecordStore, RedbStore, Role, SortKey, StudentFilter,
};
use tempfile::TempDir;

fn clock() -> FixedClock {
    FixedClock::on(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
}

fn open(dir: &TempDir) -> RedbStore {
    RedbStore::open(dir.path().join("registry.redb"))
        .unwrap()
        .with_clock(clock())
}

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        assert!(store.seed_if_empty(&Dataset::sample()).unwrap());
        store.register_subject("69000005", "05500101").unwrap();
    }

    let store = open(&dir);
    assert!(!store.seed_if_empty(&Dataset::sample()).unwrap());
    assert_eq!(store.count_students().unwrap(), 11);
    assert_eq!(store.count_registrations().unwrap(), 8);

    let registration = store.find_registration("69000005", "05500101").unwrap().unwrap();
    assert_eq!(registration.grade, Grade::InProgress);
}

#[test]
fn student_registers_admin_grades_transcript_follows() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.load_dataset(&Dataset::sample()).unwrap();

    let principal = AccessGate::new(&store)
        .authenticate("69000001", "password123")
        .unwrap()
        .unwrap();
    assert_eq!(principal.role, Role::Student);

    // 05500102 requires 05500101, which this student passed with B+.
    let clock = clock();
    let engine = EligibilityEngine::new(&store, &clock);
    let outcome =
        ActionOutcome::from_result(engine.register_for_subject(&principal.user_id, "05500102"))
            .unwrap();
    assert!(outcome.success, "{}", outcome.message);

    // 05500201 requires 05500102, now in progress.
    let blocked =
        ActionOutcome::from_result(engine.register_for_subject(&principal.user_id, "05500201"))
            .unwrap();
    assert!(!blocked.success);
    assert!(blocked.message.contains("05500102"), "{}", blocked.message);
    assert!(blocked.message.contains("IP"), "{}", blocked.message);

    let admin = AccessGate::new(&store)
        .authenticate("admin", "admin123")
        .unwrap()
        .unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(store.enter_grade("69000001", "05500102", "A").unwrap());

    let transcript = AcademicAggregator::new(&store).transcript("69000001").unwrap();
    assert_eq!(transcript.subjects.len(), 4);
    assert_eq!(transcript.completed_credits, 12);
    assert_eq!(
        transcript.subjects.last().map(|s| s.subject.code.as_str()),
        Some("05500102")
    );

    assert!(engine.register_for_subject("69000001", "05500201").is_ok());
}

#[test]
fn invalid_grade_leaves_row_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.load_dataset(&Dataset::sample()).unwrap();

    let err = store.enter_grade("69000001", "05500101", "E").unwrap_err();
    assert!(matches!(err, Error::InvalidGrade(_)));
    let registration = store.find_registration("69000001", "05500101").unwrap().unwrap();
    assert_eq!(registration.grade, Grade::BPlus);
}

#[test]
fn export_then_import_reproduces_registry() {
    let source = RedbStore::in_memory().unwrap().with_clock(clock());
    source.load_dataset(&Dataset::sample()).unwrap();
    source.register_subject("69000010", "05500101").unwrap();
    let exported = source.export_dataset().unwrap();

    let target = RedbStore::in_memory().unwrap();
    target.load_dataset(&exported).unwrap();

    assert_eq!(target.export_dataset().unwrap(), exported);
    assert_eq!(
        target.list_registered_subjects("69000010").unwrap(),
        source.list_registered_subjects("69000010").unwrap()
    );
}

#[test]
fn roster_and_listing_orders() {
    let store = RedbStore::in_memory().unwrap().with_clock(clock());
    store.load_dataset(&Dataset::sample()).unwrap();

    let roster = store.list_subject_registrations("05500101").unwrap();
    let names: Vec<_> = roster.iter().map(|e| e.student.first_name.as_str()).collect();
    assert_eq!(names, ["Somchai", "Somying", "Wichai"]);

    let youngest_first = store
        .list_students(&StudentFilter::all().sorted_by(SortKey::Age))
        .unwrap();
    assert!(
        youngest_first
            .windows(2)
            .all(|pair| pair[0].birth_date >= pair[1].birth_date)
    );

    let schools = store.list_schools().unwrap();
    assert_eq!(schools.len(), 11);

    let filtered = store
        .list_students(&StudentFilter::all().with_search("Som").with_school("School"))
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(
        store
            .list_students(&StudentFilter::all().with_search("som"))
            .unwrap()
            .is_empty()
    );
}
