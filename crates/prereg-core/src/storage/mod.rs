//! # Storage Module
//!
//! Durable storage and query access for every entity.
//!
//! The store owns no business rules beyond referential integrity and the
//! uniqueness constraints of the schema. Lookups return `Ok(None)` or an empty
//! collection when nothing matches; only mutations fail on missing references.
//!
//! Uses redb embedded database for:
//! - ACID transactions (one write transaction per mutation)
//! - Crash safety (copy-on-write B-trees)
//! - Serialized writers, so a uniqueness check and its insert are atomic

mod redb_store;

pub use redb_store::RedbStore;

use crate::error::Result;
use crate::formats::{Dataset, RegistrationEntry, prerequisites_first};
use crate::grade::Grade;
use crate::types::{
    Administrator, AvailableSubject, CurriculumSlot, EnrolledSubject, Program, Registration,
    Student, StudentFilter, StudentProfile, Subject, SubjectEnrollee,
};
use std::collections::BTreeSet;

// =============================================================================
// RECORDSTORE TRAIT
// =============================================================================

/// Query and mutation access to the six tables.
pub trait RecordStore {
    // -------------------------------------------------------------------------
    // Reference data (setup time)
    // -------------------------------------------------------------------------

    /// Insert a program. Fails with `DuplicateProgram` on an existing code.
    fn insert_program(&self, program: &Program) -> Result<()>;

    /// Insert a subject. The prerequisite, if any, must already exist.
    fn insert_subject(&self, subject: &Subject) -> Result<()>;

    /// Insert a curriculum slot. Program and subject must exist.
    fn insert_curriculum_slot(&self, slot: &CurriculumSlot) -> Result<()>;

    /// Insert a student. Id must be well-formed and unused, email unused,
    /// program existing.
    fn insert_student(&self, student: &Student) -> Result<()>;

    /// Insert an administrator. Id and username must be unused.
    fn insert_administrator(&self, admin: &Administrator) -> Result<()>;

    /// Insert a registration as given, assigning the next sequence number.
    ///
    /// Fails with `DuplicateRegistration` if the pair exists.
    fn insert_registration(&self, registration: Registration) -> Result<Registration>;

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    fn find_student(&self, student_id: &str) -> Result<Option<Student>>;

    /// Student joined with their program.
    fn student_profile(&self, student_id: &str) -> Result<Option<StudentProfile>>;

    fn find_program(&self, program_code: &str) -> Result<Option<Program>>;

    fn find_subject(&self, subject_code: &str) -> Result<Option<Subject>>;

    fn find_registration(
        &self,
        student_id: &str,
        subject_code: &str,
    ) -> Result<Option<Registration>>;

    fn find_administrator_by_username(&self, username: &str) -> Result<Option<Administrator>>;

    // -------------------------------------------------------------------------
    // Listings
    // -------------------------------------------------------------------------

    /// Students matching `filter`, ordered by name or youngest first.
    fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>>;

    /// Subjects of the student's curriculum the student has not registered
    /// for, ordered by (semester, subject code).
    fn list_available_subjects(&self, student_id: &str) -> Result<Vec<AvailableSubject>>;

    /// The student's registrations joined with their subjects, oldest first.
    fn list_registered_subjects(&self, student_id: &str) -> Result<Vec<EnrolledSubject>>;

    /// Students registered for a subject, ordered by name.
    fn list_subject_registrations(&self, subject_code: &str) -> Result<Vec<SubjectEnrollee>>;

    /// Distinct school names.
    fn list_schools(&self) -> Result<BTreeSet<String>>;

    /// All subjects, ordered by code.
    fn list_subjects(&self) -> Result<Vec<Subject>>;

    /// All programs, ordered by code.
    fn list_programs(&self) -> Result<Vec<Program>>;

    /// All curriculum slots, ordered by (program, subject, semester).
    fn list_curriculum_slots(&self) -> Result<Vec<CurriculumSlot>>;

    /// All administrators, ordered by id.
    fn list_administrators(&self) -> Result<Vec<Administrator>>;

    /// All registrations, ordered by (student, subject).
    fn list_registrations(&self) -> Result<Vec<Registration>>;

    fn count_students(&self) -> Result<u64>;

    fn count_registrations(&self) -> Result<u64>;

    // -------------------------------------------------------------------------
    // Registration lifecycle
    // -------------------------------------------------------------------------

    /// Register a student for a subject with grade IP, stamped now.
    fn register_subject(&self, student_id: &str, subject_code: &str) -> Result<Registration>;

    /// Set the grade of an existing registration.
    ///
    /// Returns `Ok(true)` even when no registration matched: the affected
    /// row count is not reported. Use [`RecordStore::find_registration`] to
    /// tell the two apart.
    fn update_grade(&self, student_id: &str, subject_code: &str, grade: Grade) -> Result<bool>;

    /// Parse `grade` and delegate to [`RecordStore::update_grade`].
    ///
    /// Fails with `InvalidGrade` before touching storage.
    fn enter_grade(&self, student_id: &str, subject_code: &str, grade: &str) -> Result<bool> {
        let grade = grade.parse::<Grade>()?;
        self.update_grade(student_id, subject_code, grade)
    }

    // -------------------------------------------------------------------------
    // Datasets
    // -------------------------------------------------------------------------

    /// Insert every record of `dataset`, all or nothing.
    ///
    /// Subjects are inserted prerequisites first whatever their order in the
    /// dataset. Registrations without a timestamp are stamped now. If any
    /// record is rejected, nothing is written.
    fn load_dataset(&self, dataset: &Dataset) -> Result<()>;

    /// Load `dataset` only if the store holds no students.
    ///
    /// Returns whether anything was loaded.
    fn seed_if_empty(&self, dataset: &Dataset) -> Result<bool> {
        if self.count_students()? > 0 {
            return Ok(false);
        }
        self.load_dataset(dataset)?;
        Ok(true)
    }

    /// Snapshot the whole store.
    fn export_dataset(&self) -> Result<Dataset> {
        let mut registrations = self.list_registrations()?;
        registrations.sort_by_key(|r| r.sequence);

        Ok(Dataset {
            programs: self.list_programs()?,
            subjects: prerequisites_first(self.list_subjects()?),
            curriculum: self.list_curriculum_slots()?,
            students: self.list_students(&StudentFilter::all())?,
            registrations: registrations
                .into_iter()
                .map(RegistrationEntry::from)
                .collect(),
            administrators: self.list_administrators()?,
        })
    }
}
