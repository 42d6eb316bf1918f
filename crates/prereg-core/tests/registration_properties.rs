//! Property tests for the registration rules and aggregates.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::{Days, NaiveDate};
use prereg_core::academics::gpa_of;
use prereg_core::{
    AccessGate, CurriculumSlot, EligibilityEngine, EnrolledSubject, Error, FixedClock, Grade,
    Program, RecordStore, RedbStore, Semester, Student, Subject,
};
use proptest::prelude::*;

const TODAY: (i32, u32, u32) = (2026, 6, 1);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on(today())
}

fn subject(code: &str, credits: u32, prerequisite: Option<&str>) -> Subject {
    Subject {
        code: code.into(),
        name: format!("Subject {code}"),
        credits,
        instructor: "Staff".into(),
        prerequisite: prerequisite.map(str::to_string),
    }
}

fn student(id: &str, birth_date: NaiveDate) -> Student {
    Student {
        id: id.into(),
        prefix: "Mr.".into(),
        first_name: "Test".into(),
        last_name: id.into(),
        birth_date,
        school: "Test School".into(),
        email: format!("{id}@example.com"),
        program_code: "P1".into(),
        password: "secret".into(),
    }
}

/// One program, a base subject "BASE", a follow-up "NEXT" requiring it,
/// and `extra` standalone subjects, all offered in the program.
fn store_with(extra: usize, birth_date: NaiveDate) -> RedbStore {
    let store = RedbStore::in_memory().unwrap().with_clock(clock());
    store
        .insert_program(&Program {
            code: "P1".into(),
            name: "Program".into(),
            department: "Dept".into(),
        })
        .unwrap();
    store.insert_subject(&subject("BASE", 3, None)).unwrap();
    store.insert_subject(&subject("NEXT", 3, Some("BASE"))).unwrap();
    let mut codes = vec!["BASE".to_string(), "NEXT".to_string()];
    for i in 0..extra {
        let code = format!("X{i:03}");
        store.insert_subject(&subject(&code, 3, None)).unwrap();
        codes.push(code);
    }
    for (i, code) in codes.iter().enumerate() {
        let semester = if i % 2 == 0 { Semester::FIRST } else { Semester::SECOND };
        store
            .insert_curriculum_slot(&CurriculumSlot {
                program_code: "P1".into(),
                subject_code: code.clone(),
                semester,
            })
            .unwrap();
    }
    store.insert_student(&student("20000001", birth_date)).unwrap();
    store
}

fn adult() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn grade_strategy() -> impl Strategy<Value = Grade> {
    prop::sample::select(Grade::ALL.to_vec())
}

fn enrolled_strategy() -> impl Strategy<Value = EnrolledSubject> {
    (1u32..=6, grade_strategy(), 0u32..1000).prop_map(|(credits, grade, n)| EnrolledSubject {
        subject: subject(&format!("S{n}"), credits, None),
        grade,
        registered_at: chrono::DateTime::default(),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Subjects without a prerequisite are open to anyone, known or not.
    #[test]
    fn prop_no_prerequisite_is_always_eligible(extra in 0usize..5, who in "[0-9]{8}") {
        let store = store_with(extra, adult());
        let clk = clock();
        let engine = EligibilityEngine::new(&store, &clk);
        let check = engine.check_prerequisite(&who, "BASE").unwrap();
        prop_assert!(check.eligible);
        prop_assert!(check.prerequisite.is_none());
    }

    /// Eligibility for NEXT follows exactly whether BASE was passed.
    #[test]
    fn prop_prerequisite_grade_decides(grade in grade_strategy()) {
        let store = store_with(0, adult());
        store.register_subject("20000001", "BASE").unwrap();
        store.update_grade("20000001", "BASE", grade).unwrap();

        let clk = clock();
        let engine = EligibilityEngine::new(&store, &clk);
        let check = engine.check_prerequisite("20000001", "NEXT").unwrap();
        prop_assert_eq!(check.eligible, grade.is_passing());
        prop_assert_eq!(check.grade, Some(grade));

        let result = engine.register_for_subject("20000001", "NEXT");
        if grade.is_passing() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(Error::PrerequisiteNotMet(_))));
        }
    }

    /// Anyone whose 365-day age is below 15 is refused, whatever the subject.
    #[test]
    fn prop_underage_always_refused(days_old in 0u64..(15 * 365), use_next in any::<bool>()) {
        let birth = today().checked_sub_days(Days::new(days_old)).unwrap();
        let store = store_with(0, birth);
        let clk = clock();
        let engine = EligibilityEngine::new(&store, &clk);
        let code = if use_next { "NEXT" } else { "BASE" };

        let result = engine.register_for_subject("20000001", code);
        prop_assert!(
            matches!(result, Err(Error::AgeTooLow { minimum: 15, .. })),
            "unexpected {:?}",
            result
        );
        prop_assert!(store.find_registration("20000001", code).unwrap().is_none());
    }

    /// A second registration for the same pair never succeeds.
    #[test]
    fn prop_double_registration_is_duplicate(extra in 1usize..5, pick in 0usize..5) {
        let store = store_with(extra, adult());
        let code = format!("X{:03}", pick % extra);
        let clk = clock();
        let engine = EligibilityEngine::new(&store, &clk);

        prop_assert!(engine.register_for_subject("20000001", &code).is_ok());
        let again = engine.register_for_subject("20000001", &code);
        prop_assert!(
            matches!(again, Err(Error::DuplicateRegistration { .. })),
            "unexpected {:?}",
            again
        );
        prop_assert_eq!(store.count_registrations().unwrap(), 1);
    }

    /// GPA stays within the grade-point scale.
    #[test]
    fn prop_gpa_within_bounds(subjects in prop::collection::vec(enrolled_strategy(), 0..20)) {
        let gpa = gpa_of(&subjects);
        prop_assert!((0.0..=4.0).contains(&gpa), "gpa {}", gpa);
        if subjects.iter().all(|s| s.grade == Grade::InProgress) {
            prop_assert!(gpa == 0.0);
        }
    }

    /// The available list and the registered list never overlap.
    #[test]
    fn prop_available_excludes_registered(
        extra in 0usize..6,
        picks in prop::collection::btree_set(0usize..6, 0..6),
    ) {
        let store = store_with(extra, adult());
        for pick in picks.iter().filter(|&&p| p < extra) {
            store.register_subject("20000001", &format!("X{pick:03}")).unwrap();
        }

        let available = store.list_available_subjects("20000001").unwrap();
        let registered = store.list_registered_subjects("20000001").unwrap();
        prop_assert_eq!(available.len() + registered.len(), extra + 2);
        for offer in &available {
            prop_assert!(registered.iter().all(|r| r.subject.code != offer.subject.code));
        }
    }

    /// Empty username or password never authenticates.
    #[test]
    fn prop_empty_credentials_fail(text in ".{0,12}") {
        let store = store_with(0, adult());
        let gate = AccessGate::new(&store);
        prop_assert_eq!(gate.authenticate("", &text).unwrap(), None);
        prop_assert_eq!(gate.authenticate(&text, "").unwrap(), None);
    }
}
