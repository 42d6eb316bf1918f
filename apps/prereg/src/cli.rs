//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each opens the database, runs one
//! core operation and prints the result as text or JSON.
//!
//! Rule violations (unknown student, duplicate registration, age or
//! prerequisite refusal, bad grade) are printed as a failed
//! [`ActionOutcome`] and return `Ok`. Only infrastructure problems return
//! `Err` and end the process with a non-zero status.

use prereg_core::{
    AcademicAggregator, AccessGate, ActionOutcome, Dataset, EligibilityEngine, Error, RecordStore,
    RedbStore, SortKey, StudentFilter,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("database already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("database not found: {} (run `prereg init` first)", .0.display())]
    MissingDatabase(PathBuf),

    #[error("database is not empty: {}", .0.display())]
    NotEmpty(PathBuf),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset in {}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

// =============================================================================
// HELPERS
// =============================================================================

/// Open an existing database.
pub fn open_store(db_path: &Path) -> Result<RedbStore, CliError> {
    if !db_path.exists() {
        return Err(CliError::MissingDatabase(db_path.to_path_buf()));
    }
    debug!(path = %db_path.display(), "opening database");
    Ok(RedbStore::open(db_path)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(json: bool, outcome: &ActionOutcome) -> Result<(), CliError> {
    if json {
        return print_json(outcome);
    }
    if outcome.success {
        println!("OK: {}", outcome.message);
    } else {
        println!("FAILED: {}", outcome.message);
    }
    Ok(())
}

/// Print `value` as JSON, or the text produced by `text`.
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<(), CliError> {
    if json {
        print_json(value)
    } else {
        println!("{}", text());
        Ok(())
    }
}

/// Check that the student exists, printing a failed outcome if not.
fn require_student(store: &RedbStore, json: bool, student_id: &str) -> Result<bool, CliError> {
    if store.find_student(student_id)?.is_some() {
        return Ok(true);
    }
    report(json, &Error::StudentNotFound(student_id.to_string()).into())?;
    Ok(false)
}

// =============================================================================
// DATABASE LIFECYCLE
// =============================================================================

/// Create a database, seeded with the sample data unless `empty`.
pub fn cmd_init(db_path: &Path, force: bool, empty: bool) -> Result<(), CliError> {
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        warn!(path = %db_path.display(), "overwriting existing database");
        fs::remove_file(db_path).map_err(|source| CliError::Io {
            path: db_path.to_path_buf(),
            source,
        })?;
    }

    let store = RedbStore::open(db_path)?;
    if !empty {
        store.seed_if_empty(&Dataset::sample())?;
    }
    info!(
        path = %db_path.display(),
        students = store.count_students()?,
        "database initialized"
    );
    println!("Initialized database at {}", db_path.display());
    Ok(())
}

/// Load a JSON dataset into an empty (or missing) database.
pub fn cmd_import(db_path: &Path, file: &Path) -> Result<(), CliError> {
    let content = fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let dataset: Dataset = serde_json::from_str(&content).map_err(|source| CliError::Dataset {
        path: file.to_path_buf(),
        source,
    })?;

    let store = RedbStore::open(db_path)?;
    if !store.export_dataset()?.is_empty() {
        return Err(CliError::NotEmpty(db_path.to_path_buf()));
    }
    store.load_dataset(&dataset)?;

    info!(
        file = %file.display(),
        students = dataset.students.len(),
        subjects = dataset.subjects.len(),
        registrations = dataset.registrations.len(),
        "dataset imported"
    );
    println!(
        "Imported {} students, {} subjects, {} registrations",
        dataset.students.len(),
        dataset.subjects.len(),
        dataset.registrations.len()
    );
    Ok(())
}

/// Write the whole database to a JSON dataset file.
pub fn cmd_export(db_path: &Path, file: &Path) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let dataset = store.export_dataset()?;
    let content = serde_json::to_string_pretty(&dataset)?;
    fs::write(file, content).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    info!(file = %file.display(), "dataset exported");
    println!("Exported database to {}", file.display());
    Ok(())
}

// =============================================================================
// ACCESS
// =============================================================================

/// Check credentials and print the resolved role.
pub fn cmd_login(
    db_path: &Path,
    json: bool,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let outcome = match AccessGate::new(&store).authenticate(username, password)? {
        Some(principal) => {
            info!(user = %principal.user_id, role = %principal.role, "login succeeded");
            ActionOutcome::success(format!(
                "logged in as {} ({})",
                principal.user_id, principal.role
            ))
        }
        None => {
            warn!(user = %username, "login failed");
            ActionOutcome::failure("invalid username or password")
        }
    };
    report(json, &outcome)
}

// =============================================================================
// LISTINGS
// =============================================================================

/// List students matching the search and school filters.
pub fn cmd_students(
    db_path: &Path,
    json: bool,
    search: Option<&str>,
    school: Option<&str>,
    sort: SortKey,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let mut filter = StudentFilter::all().sorted_by(sort);
    if let Some(search) = search {
        filter = filter.with_search(search);
    }
    if let Some(school) = school {
        filter = filter.with_school(school);
    }

    let students = store.list_students(&filter)?;
    debug!(count = students.len(), "students listed");
    emit(json, &students, || {
        let mut out = format!("{} student(s)", students.len());
        for s in &students {
            out += &format!(
                "\n{}  {:<28} {}  {}",
                s.id,
                s.full_name(),
                s.birth_date,
                s.school
            );
        }
        out
    })
}

/// List distinct school names.
pub fn cmd_schools(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let schools = store.list_schools()?;
    emit(json, &schools, || {
        schools.iter().cloned().collect::<Vec<_>>().join("\n")
    })
}

/// List every subject.
pub fn cmd_subjects(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let subjects = store.list_subjects()?;
    emit(json, &subjects, || {
        let mut out = format!("{} subject(s)", subjects.len());
        for s in &subjects {
            out += &format!(
                "\n{}  {:<28} {} cr  {:<12} prerequisite: {}",
                s.code,
                s.name,
                s.credits,
                s.instructor,
                s.prerequisite.as_deref().unwrap_or("-")
            );
        }
        out
    })
}

/// Show a student with their program.
pub fn cmd_profile(db_path: &Path, json: bool, student_id: &str) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let Some(profile) = store.student_profile(student_id)? else {
        return report(json, &Error::StudentNotFound(student_id.to_string()).into());
    };
    emit(json, &profile, || {
        let s = &profile.student;
        format!(
            "{} {}\nborn {}\nschool {}\nemail {}\nprogram {} ({}, {})",
            s.id,
            s.full_name(),
            s.birth_date,
            s.school,
            s.email,
            profile.program.name,
            profile.program.code,
            profile.program.department
        )
    })
}

/// Subjects the student can still register for, with prerequisite status.
pub fn cmd_available(db_path: &Path, json: bool, student_id: &str) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    if !require_student(&store, json, student_id)? {
        return Ok(());
    }
    let offers = EligibilityEngine::with_system_clock(&store).available_offers(student_id)?;
    emit(json, &offers, || {
        let mut out = format!("{} available subject(s)", offers.len());
        for o in &offers {
            out += &format!(
                "\nsemester {}  {}  {:<28} {}  {}",
                o.semester.get(),
                o.subject.code,
                o.subject.name,
                if o.can_register { "open" } else { "blocked" },
                o.prerequisite_status
            );
        }
        out
    })
}

/// Subjects the student is registered for.
pub fn cmd_registered(db_path: &Path, json: bool, student_id: &str) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    if !require_student(&store, json, student_id)? {
        return Ok(());
    }
    let subjects = store.list_registered_subjects(student_id)?;
    emit(json, &subjects, || {
        let mut out = format!("{} registered subject(s)", subjects.len());
        for e in &subjects {
            out += &format!(
                "\n{}  {:<28} {:<3} {}",
                e.subject.code,
                e.subject.name,
                e.grade,
                e.registered_at.format("%Y-%m-%d %H:%M")
            );
        }
        out
    })
}

/// Students registered for a subject.
pub fn cmd_roster(db_path: &Path, json: bool, subject_code: &str) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    if store.find_subject(subject_code)?.is_none() {
        return report(json, &Error::SubjectNotFound(subject_code.to_string()).into());
    }
    let roster = store.list_subject_registrations(subject_code)?;
    emit(json, &roster, || {
        let mut out = format!("{} student(s) in {}", roster.len(), subject_code);
        for e in &roster {
            out += &format!(
                "\n{}  {:<28} {}",
                e.student.id,
                e.student.full_name(),
                e.grade
            );
        }
        out
    })
}

// =============================================================================
// REGISTRATION AND GRADES
// =============================================================================

/// Register a student for a subject through the eligibility pipeline.
pub fn cmd_register(
    db_path: &Path,
    json: bool,
    student_id: &str,
    subject_code: &str,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let engine = EligibilityEngine::with_system_clock(&store);
    let result = engine.register_for_subject(student_id, subject_code);
    let outcome = ActionOutcome::from_result(result)?;
    if outcome.success {
        info!(student = %student_id, subject = %subject_code, "registered");
    } else {
        info!(
            student = %student_id,
            subject = %subject_code,
            reason = %outcome.message,
            "registration refused"
        );
    }
    report(json, &outcome)
}

/// Record a grade for an existing registration.
pub fn cmd_grade(
    db_path: &Path,
    json: bool,
    student_id: &str,
    subject_code: &str,
    grade: &str,
) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    if store.find_registration(student_id, subject_code)?.is_none() {
        warn!(
            student = %student_id,
            subject = %subject_code,
            "no registration row for grade update"
        );
    }
    let result = store
        .enter_grade(student_id, subject_code, grade)
        .map(|_| format!("grade {grade} recorded for {student_id} in {subject_code}"));
    let outcome = ActionOutcome::from_result(result)?;
    if outcome.success {
        info!(student = %student_id, subject = %subject_code, grade = %grade, "grade recorded");
    }
    report(json, &outcome)
}

// =============================================================================
// AGGREGATES
// =============================================================================

/// Registered subjects with GPA and completed credits.
pub fn cmd_transcript(db_path: &Path, json: bool, student_id: &str) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    if !require_student(&store, json, student_id)? {
        return Ok(());
    }
    let transcript = AcademicAggregator::new(&store).transcript(student_id)?;
    emit(json, &transcript, || {
        let mut out = format!("Transcript for {}", transcript.student_id);
        for e in &transcript.subjects {
            out += &format!(
                "\n{}  {:<28} {} cr  {}",
                e.subject.code, e.subject.name, e.subject.credits, e.grade
            );
        }
        out += &format!(
            "\nGPA {:.2}  completed credits {}",
            transcript.gpa, transcript.completed_credits
        );
        out
    })
}

/// Registry-wide totals and per-subject registration counts.
pub fn cmd_stats(db_path: &Path, json: bool) -> Result<(), CliError> {
    let store = open_store(db_path)?;
    let stats = AcademicAggregator::new(&store).registration_statistics()?;
    emit(json, &stats, || {
        let mut out = format!(
            "subjects {}  students {}  registrations {}",
            stats.total_subjects, stats.total_students, stats.total_registrations
        );
        for (code, count) in &stats.subject_registration_counts {
            out += &format!("\n{code}  {count}");
        }
        out
    })
}
