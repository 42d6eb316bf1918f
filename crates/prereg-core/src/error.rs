//! # Error Module
//!
//! One error taxonomy for the whole core.
//!
//! Rule violations (`StudentNotFound`, `DuplicateRegistration`, `AgeTooLow`,
//! `PrerequisiteNotMet`, `InvalidGrade`, ...) are recoverable and meant to be
//! shown to an end user. `Storage` and `Codec` are infrastructure faults.

use thiserror::Error;

/// Errors produced by the record store and the rule engines.
#[derive(Debug, Error)]
pub enum Error {
    /// No student with this id.
    #[error("student not found: {0}")]
    StudentNotFound(String),

    /// No subject with this code.
    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    /// No program with this code.
    #[error("program not found: {0}")]
    ProgramNotFound(String),

    /// The (student, subject) pair is already registered.
    #[error("student {student_id} is already registered for subject {subject_code}")]
    DuplicateRegistration {
        student_id: String,
        subject_code: String,
    },

    /// The student is younger than the registration threshold.
    #[error("student must be at least {minimum} years old (age: {age})")]
    AgeTooLow { age: i64, minimum: i64 },

    /// The prerequisite rule rejected the registration.
    #[error("{0}")]
    PrerequisiteNotMet(String),

    /// Grade text outside the enumerated set.
    #[error("invalid grade: {0:?}")]
    InvalidGrade(String),

    /// A student with this id already exists.
    #[error("student already exists: {0}")]
    DuplicateStudent(String),

    /// Another student already uses this email.
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    /// A subject with this code already exists.
    #[error("subject already exists: {0}")]
    DuplicateSubject(String),

    /// A program with this code already exists.
    #[error("program already exists: {0}")]
    DuplicateProgram(String),

    /// The (program, subject, semester) slot already exists.
    #[error("curriculum slot already exists: {program_code}/{subject_code}/semester {semester}")]
    DuplicateCurriculumSlot {
        program_code: String,
        subject_code: String,
        semester: u8,
    },

    /// An administrator with this id or username already exists.
    #[error("administrator already exists: {0}")]
    DuplicateAdministrator(String),

    /// Student id does not have the fixed format.
    #[error("invalid student id: {0:?}")]
    InvalidStudentId(String),

    /// Subject credit value must be positive.
    #[error("subject {0} must carry a positive credit value")]
    InvalidCredits(String),

    /// Semester outside {1, 2}.
    #[error("invalid semester: {0}")]
    InvalidSemester(u8),

    /// Underlying redb failure.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Record (de)serialization failure.
    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),
}

impl Error {
    /// True for business-rule failures a caller reports back to the user.
    ///
    /// False for infrastructure faults (`Storage`, `Codec`).
    #[must_use]
    pub fn is_rule_violation(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Codec(_))
    }
}

/// redb splits its failures across several types; all of them fold into
/// [`Error::Storage`].
macro_rules! storage_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Error {
                fn from(err: $source) -> Self {
                    Self::Storage(redb::Error::from(err))
                }
            }
        )*
    };
}

storage_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rule_violations_are_distinguished() {
        assert!(Error::AgeTooLow { age: 14, minimum: 15 }.is_rule_violation());
        assert!(Error::InvalidGrade("Z".into()).is_rule_violation());
        assert!(!Error::Codec(postcard::Error::DeserializeUnexpectedEnd).is_rule_violation());
    }

    #[test]
    fn prerequisite_message_is_passed_through() {
        let err = Error::PrerequisiteNotMet("must take 05500101 first".into());
        assert_eq!(err.to_string(), "must take 05500101 first");
    }
}
