//! # Redb Record Store
//!
//! [`RecordStore`] on top of redb.
//!
//! ## Layout
//!
//! | table                     | key                          | value              |
//! |---------------------------|------------------------------|--------------------|
//! | `programs`                | program code                 | postcard `Program` |
//! | `subjects`                | subject code                 | postcard `Subject` |
//! | `curriculum`              | (program, subject, semester) | `()`               |
//! | `students`                | student id                   | postcard `Student` |
//! | `student_emails`          | email                        | student id         |
//! | `registrations`           | (student id, subject code)   | postcard `Registration` |
//! | `administrators`          | administrator id             | postcard `Administrator` |
//! | `administrator_usernames` | username                     | administrator id   |
//! | `meta`                    | counter name                 | `u64`              |
//!
//! Composite keys make the uniqueness constraints structural: a second
//! registration for the same pair hits the same key inside the same write
//! transaction and is rejected.

use super::RecordStore;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::formats::{Dataset, prerequisites_first};
use crate::grade::Grade;
use crate::primitives::is_valid_student_id;
use crate::types::{
    Administrator, AvailableSubject, CurriculumSlot, EnrolledSubject, Program, Registration,
    Semester, SortKey, Student, StudentFilter, StudentProfile, Subject, SubjectEnrollee,
};
use redb::backends::InMemoryBackend;
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

// =============================================================================
// TABLE DEFINITIONS
// =============================================================================

const PROGRAMS: TableDefinition<&str, &[u8]> = TableDefinition::new("programs");
const SUBJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("subjects");
const CURRICULUM: TableDefinition<(&str, &str, u8), ()> = TableDefinition::new("curriculum");
const STUDENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("students");
const STUDENT_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("student_emails");
const REGISTRATIONS: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("registrations");
const ADMINISTRATORS: TableDefinition<&str, &[u8]> = TableDefinition::new("administrators");
const ADMIN_USERNAMES: TableDefinition<&str, &str> =
    TableDefinition::new("administrator_usernames");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Last registration sequence number handed out.
const REGISTRATION_SEQUENCE: &str = "registration_sequence";

// =============================================================================
// CODEC
// =============================================================================

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Fetch and decode one record keyed by a string.
fn get_record<T, Tbl>(table: &Tbl, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    table.get(key)?.map(|guard| decode(guard.value())).transpose()
}

/// Decode every record of a string-keyed table, in key order.
fn all_records<T, Tbl>(table: &Tbl) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        records.push(decode(value.value())?);
    }
    Ok(records)
}

/// Registrations of one student, in subject code order.
fn registrations_of<Tbl>(table: &Tbl, student_id: &str) -> Result<Vec<Registration>>
where
    Tbl: ReadableTable<(&'static str, &'static str), &'static [u8]>,
{
    let mut registrations = Vec::new();
    for entry in table.range((student_id, "")..)? {
        let (key, value) = entry?;
        if key.value().0 != student_id {
            break;
        }
        registrations.push(decode(value.value())?);
    }
    Ok(registrations)
}

fn next_registration_sequence(txn: &WriteTransaction) -> Result<u64> {
    let mut meta = txn.open_table(META)?;
    let next = meta
        .get(REGISTRATION_SEQUENCE)?
        .map(|guard| guard.value())
        .unwrap_or(0)
        .saturating_add(1);
    meta.insert(REGISTRATION_SEQUENCE, next)?;
    Ok(next)
}

fn by_name(a: &Student, b: &Student) -> std::cmp::Ordering {
    (&a.first_name, &a.last_name, &a.id).cmp(&(&b.first_name, &b.last_name, &b.id))
}

// =============================================================================
// REDB STORE
// =============================================================================

/// Record store backed by a redb database file (or memory).
pub struct RedbStore {
    db: Database,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open (or create) the database at `path` and make sure every table
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref())?;
        Self::with_database(db)
    }

    /// A fresh database that lives in memory only.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Result<Self> {
        let store = Self {
            db,
            clock: Box::new(SystemClock),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Replace the clock used for registration timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn ensure_schema(&self) -> Result<()> {
        self.write(|txn| {
            txn.open_table(PROGRAMS)?;
            txn.open_table(SUBJECTS)?;
            txn.open_table(CURRICULUM)?;
            txn.open_table(STUDENTS)?;
            txn.open_table(STUDENT_EMAILS)?;
            txn.open_table(REGISTRATIONS)?;
            txn.open_table(ADMINISTRATORS)?;
            txn.open_table(ADMIN_USERNAMES)?;
            txn.open_table(META)?;
            Ok(())
        })
    }

    /// Run `op` in one write transaction; commit on `Ok`, abort on `Err`.
    fn write<T>(&self, op: impl FnOnce(&WriteTransaction) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_write()?;
        match op(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.abort()?;
                Err(err)
            }
        }
    }

    fn read<T>(&self, op: impl FnOnce(&ReadTransaction) -> Result<T>) -> Result<T> {
        let txn = self.db.begin_read()?;
        op(&txn)
    }
}

// =============================================================================
// WRITERS
// =============================================================================
//
// Every writer runs inside a caller-supplied write transaction, so a single
// record and a whole dataset go through the same checks.

fn put_program(txn: &WriteTransaction, program: &Program) -> Result<()> {
    let mut programs = txn.open_table(PROGRAMS)?;
    if programs.get(program.code.as_str())?.is_some() {
        return Err(Error::DuplicateProgram(program.code.clone()));
    }
    programs.insert(program.code.as_str(), encode(program)?.as_slice())?;
    Ok(())
}

fn put_subject(txn: &WriteTransaction, subject: &Subject) -> Result<()> {
    if subject.credits == 0 {
        return Err(Error::InvalidCredits(subject.code.clone()));
    }
    let mut subjects = txn.open_table(SUBJECTS)?;
    if subjects.get(subject.code.as_str())?.is_some() {
        return Err(Error::DuplicateSubject(subject.code.clone()));
    }
    if let Some(prerequisite) = subject.prerequisite.as_deref() {
        if subjects.get(prerequisite)?.is_none() {
            return Err(Error::SubjectNotFound(prerequisite.to_string()));
        }
    }
    subjects.insert(subject.code.as_str(), encode(subject)?.as_slice())?;
    Ok(())
}

fn put_curriculum_slot(txn: &WriteTransaction, slot: &CurriculumSlot) -> Result<()> {
    if txn
        .open_table(PROGRAMS)?
        .get(slot.program_code.as_str())?
        .is_none()
    {
        return Err(Error::ProgramNotFound(slot.program_code.clone()));
    }
    if txn
        .open_table(SUBJECTS)?
        .get(slot.subject_code.as_str())?
        .is_none()
    {
        return Err(Error::SubjectNotFound(slot.subject_code.clone()));
    }

    let mut curriculum = txn.open_table(CURRICULUM)?;
    let key = (
        slot.program_code.as_str(),
        slot.subject_code.as_str(),
        slot.semester.get(),
    );
    if curriculum.get(key)?.is_some() {
        return Err(Error::DuplicateCurriculumSlot {
            program_code: slot.program_code.clone(),
            subject_code: slot.subject_code.clone(),
            semester: slot.semester.get(),
        });
    }
    curriculum.insert(key, ())?;
    Ok(())
}

fn put_student(txn: &WriteTransaction, student: &Student) -> Result<()> {
    if !is_valid_student_id(&student.id) {
        return Err(Error::InvalidStudentId(student.id.clone()));
    }
    if txn
        .open_table(PROGRAMS)?
        .get(student.program_code.as_str())?
        .is_none()
    {
        return Err(Error::ProgramNotFound(student.program_code.clone()));
    }

    let mut students = txn.open_table(STUDENTS)?;
    if students.get(student.id.as_str())?.is_some() {
        return Err(Error::DuplicateStudent(student.id.clone()));
    }
    let mut emails = txn.open_table(STUDENT_EMAILS)?;
    if emails.get(student.email.as_str())?.is_some() {
        return Err(Error::DuplicateEmail(student.email.clone()));
    }

    students.insert(student.id.as_str(), encode(student)?.as_slice())?;
    emails.insert(student.email.as_str(), student.id.as_str())?;
    Ok(())
}

fn put_administrator(txn: &WriteTransaction, admin: &Administrator) -> Result<()> {
    let mut admins = txn.open_table(ADMINISTRATORS)?;
    if admins.get(admin.id.as_str())?.is_some() {
        return Err(Error::DuplicateAdministrator(admin.id.clone()));
    }
    let mut usernames = txn.open_table(ADMIN_USERNAMES)?;
    if usernames.get(admin.username.as_str())?.is_some() {
        return Err(Error::DuplicateAdministrator(admin.username.clone()));
    }

    admins.insert(admin.id.as_str(), encode(admin)?.as_slice())?;
    usernames.insert(admin.username.as_str(), admin.id.as_str())?;
    Ok(())
}

fn put_registration(
    txn: &WriteTransaction,
    mut registration: Registration,
) -> Result<Registration> {
    if txn
        .open_table(STUDENTS)?
        .get(registration.student_id.as_str())?
        .is_none()
    {
        return Err(Error::StudentNotFound(registration.student_id.clone()));
    }
    if txn
        .open_table(SUBJECTS)?
        .get(registration.subject_code.as_str())?
        .is_none()
    {
        return Err(Error::SubjectNotFound(registration.subject_code.clone()));
    }

    registration.sequence = next_registration_sequence(txn)?;

    let mut registrations = txn.open_table(REGISTRATIONS)?;
    let key = (
        registration.student_id.as_str(),
        registration.subject_code.as_str(),
    );
    if registrations.get(key)?.is_some() {
        return Err(Error::DuplicateRegistration {
            student_id: registration.student_id.clone(),
            subject_code: registration.subject_code.clone(),
        });
    }
    registrations.insert(key, encode(&registration)?.as_slice())?;
    Ok(registration)
}

impl RecordStore for RedbStore {
    fn insert_program(&self, program: &Program) -> Result<()> {
        self.write(|txn| put_program(txn, program))
    }

    fn insert_subject(&self, subject: &Subject) -> Result<()> {
        self.write(|txn| put_subject(txn, subject))
    }

    fn insert_curriculum_slot(&self, slot: &CurriculumSlot) -> Result<()> {
        self.write(|txn| put_curriculum_slot(txn, slot))
    }

    fn insert_student(&self, student: &Student) -> Result<()> {
        self.write(|txn| put_student(txn, student))
    }

    fn insert_administrator(&self, admin: &Administrator) -> Result<()> {
        self.write(|txn| put_administrator(txn, admin))
    }

    fn insert_registration(&self, registration: Registration) -> Result<Registration> {
        self.write(|txn| put_registration(txn, registration))
    }

    fn load_dataset(&self, dataset: &Dataset) -> Result<()> {
        let now = self.clock.now();
        self.write(|txn| {
            for program in &dataset.programs {
                put_program(txn, program)?;
            }
            for subject in &prerequisites_first(dataset.subjects.clone()) {
                put_subject(txn, subject)?;
            }
            for slot in &dataset.curriculum {
                put_curriculum_slot(txn, slot)?;
            }
            for student in &dataset.students {
                put_student(txn, student)?;
            }
            for entry in &dataset.registrations {
                put_registration(
                    txn,
                    Registration {
                        student_id: entry.student_id.clone(),
                        subject_code: entry.subject_code.clone(),
                        grade: entry.grade,
                        registered_at: entry.registered_at.unwrap_or(now),
                        sequence: 0,
                    },
                )?;
            }
            for admin in &dataset.administrators {
                put_administrator(txn, admin)?;
            }
            Ok(())
        })
    }

    fn find_student(&self, student_id: &str) -> Result<Option<Student>> {
        self.read(|txn| get_record(&txn.open_table(STUDENTS)?, student_id))
    }

    fn student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>> {
        self.read(|txn| {
            let Some(student) = get_record::<Student, _>(&txn.open_table(STUDENTS)?, student_id)?
            else {
                return Ok(None);
            };
            let program = get_record::<Program, _>(
                &txn.open_table(PROGRAMS)?,
                student.program_code.as_str(),
            )?;
            Ok(program.map(|program| StudentProfile { student, program }))
        })
    }

    fn find_program(&self, program_code: &str) -> Result<Option<Program>> {
        self.read(|txn| get_record(&txn.open_table(PROGRAMS)?, program_code))
    }

    fn find_subject(&self, subject_code: &str) -> Result<Option<Subject>> {
        self.read(|txn| get_record(&txn.open_table(SUBJECTS)?, subject_code))
    }

    fn find_registration(
        &self,
        student_id: &str,
        subject_code: &str,
    ) -> Result<Option<Registration>> {
        self.read(|txn| {
            txn.open_table(REGISTRATIONS)?
                .get((student_id, subject_code))?
                .map(|guard| decode(guard.value()))
                .transpose()
        })
    }

    fn find_administrator_by_username(&self, username: &str) -> Result<Option<Administrator>> {
        self.read(|txn| {
            let id = match txn.open_table(ADMIN_USERNAMES)?.get(username)? {
                Some(guard) => guard.value().to_string(),
                None => return Ok(None),
            };
            get_record(&txn.open_table(ADMINISTRATORS)?, id.as_str())
        })
    }

    fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let mut students: Vec<Student> =
            self.read(|txn| all_records(&txn.open_table(STUDENTS)?))?;
        students.retain(|student| filter.matches(student));
        match filter.sort {
            SortKey::Name => students.sort_by(by_name),
            SortKey::Age => students.sort_by(|a, b| b.birth_date.cmp(&a.birth_date)),
        }
        Ok(students)
    }

    fn list_available_subjects(&self, student_id: &str) -> Result<Vec<AvailableSubject>> {
        self.read(|txn| {
            let Some(student) = get_record::<Student, _>(&txn.open_table(STUDENTS)?, student_id)?
            else {
                return Ok(Vec::new());
            };
            let registered: BTreeSet<String> =
                registrations_of(&txn.open_table(REGISTRATIONS)?, student_id)?
                    .into_iter()
                    .map(|registration| registration.subject_code)
                    .collect();

            let subjects = txn.open_table(SUBJECTS)?;
            let curriculum = txn.open_table(CURRICULUM)?;
            let program = student.program_code.as_str();

            let mut available = Vec::new();
            for entry in curriculum.range((program, "", 0u8)..)? {
                let (key, _) = entry?;
                let (slot_program, subject_code, semester) = key.value();
                if slot_program != program {
                    break;
                }
                if registered.contains(subject_code) {
                    continue;
                }
                if let Some(subject) = get_record::<Subject, _>(&subjects, subject_code)? {
                    available.push(AvailableSubject {
                        subject,
                        semester: Semester::try_from(semester)?,
                    });
                }
            }

            available.sort_by(|a, b| {
                (a.semester, &a.subject.code).cmp(&(b.semester, &b.subject.code))
            });
            Ok(available)
        })
    }

    fn list_registered_subjects(&self, student_id: &str) -> Result<Vec<EnrolledSubject>> {
        self.read(|txn| {
            let mut registrations = registrations_of(&txn.open_table(REGISTRATIONS)?, student_id)?;
            registrations.sort_by_key(|r| (r.registered_at, r.sequence));

            let subjects = txn.open_table(SUBJECTS)?;
            let mut enrolled = Vec::with_capacity(registrations.len());
            for registration in registrations {
                if let Some(subject) =
                    get_record::<Subject, _>(&subjects, registration.subject_code.as_str())?
                {
                    enrolled.push(EnrolledSubject {
                        subject,
                        grade: registration.grade,
                        registered_at: registration.registered_at,
                    });
                }
            }
            Ok(enrolled)
        })
    }

    fn list_subject_registrations(&self, subject_code: &str) -> Result<Vec<SubjectEnrollee>> {
        self.read(|txn| {
            let students = txn.open_table(STUDENTS)?;
            let mut roster = Vec::new();
            for entry in txn.open_table(REGISTRATIONS)?.iter()? {
                let (key, value) = entry?;
                let (student_id, code) = key.value();
                if code != subject_code {
                    continue;
                }
                let registration: Registration = decode(value.value())?;
                if let Some(student) = get_record::<Student, _>(&students, student_id)? {
                    roster.push(SubjectEnrollee {
                        student,
                        grade: registration.grade,
                        registered_at: registration.registered_at,
                    });
                }
            }
            roster.sort_by(|a, b| by_name(&a.student, &b.student));
            Ok(roster)
        })
    }

    fn list_schools(&self) -> Result<BTreeSet<String>> {
        let students: Vec<Student> = self.read(|txn| all_records(&txn.open_table(STUDENTS)?))?;
        Ok(students.into_iter().map(|student| student.school).collect())
    }

    fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.read(|txn| all_records(&txn.open_table(SUBJECTS)?))
    }

    fn list_programs(&self) -> Result<Vec<Program>> {
        self.read(|txn| all_records(&txn.open_table(PROGRAMS)?))
    }

    fn list_curriculum_slots(&self) -> Result<Vec<CurriculumSlot>> {
        self.read(|txn| {
            let mut slots = Vec::new();
            for entry in txn.open_table(CURRICULUM)?.iter()? {
                let (key, _) = entry?;
                let (program_code, subject_code, semester) = key.value();
                slots.push(CurriculumSlot {
                    program_code: program_code.to_string(),
                    subject_code: subject_code.to_string(),
                    semester: Semester::try_from(semester)?,
                });
            }
            Ok(slots)
        })
    }

    fn list_administrators(&self) -> Result<Vec<Administrator>> {
        self.read(|txn| all_records(&txn.open_table(ADMINISTRATORS)?))
    }

    fn list_registrations(&self) -> Result<Vec<Registration>> {
        self.read(|txn| {
            let mut registrations = Vec::new();
            for entry in txn.open_table(REGISTRATIONS)?.iter()? {
                let (_, value) = entry?;
                registrations.push(decode(value.value())?);
            }
            Ok(registrations)
        })
    }

    fn count_students(&self) -> Result<u64> {
        self.read(|txn| Ok(txn.open_table(STUDENTS)?.len()?))
    }

    fn count_registrations(&self) -> Result<u64> {
        self.read(|txn| Ok(txn.open_table(REGISTRATIONS)?.len()?))
    }

    fn register_subject(&self, student_id: &str, subject_code: &str) -> Result<Registration> {
        self.insert_registration(Registration {
            student_id: student_id.to_string(),
            subject_code: subject_code.to_string(),
            grade: Grade::InProgress,
            registered_at: self.clock.now(),
            sequence: 0,
        })
    }

    fn update_grade(&self, student_id: &str, subject_code: &str, grade: Grade) -> Result<bool> {
        self.write(|txn| {
            let mut registrations = txn.open_table(REGISTRATIONS)?;
            let key = (student_id, subject_code);
            let existing: Option<Registration> = registrations
                .get(key)?
                .map(|guard| decode(guard.value()))
                .transpose()?;

            if let Some(mut registration) = existing {
                registration.grade = grade;
                registrations.insert(key, encode(&registration)?.as_slice())?;
            }
            Ok(true)
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
