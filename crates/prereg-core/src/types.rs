//! # Types
//!
//! Typed records for every stored entity and every query result.

use crate::grade::Grade;
use crate::primitives::VALID_SEMESTERS;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// STORED ENTITIES
// =============================================================================

/// A study program students enrol in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: String,
    pub name: String,
    pub department: String,
}

/// A subject that can appear in curricula and be registered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    /// Credit value, always positive.
    pub credits: u32,
    pub instructor: String,
    /// Code of the subject that must be passed first.
    #[serde(default)]
    pub prerequisite: Option<String>,
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Fixed-format id, immutable once created.
    pub id: String,
    pub prefix: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub school: String,
    /// Unique across students.
    pub email: String,
    pub program_code: String,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_password() -> String {
    crate::primitives::DEFAULT_STUDENT_PASSWORD.to_string()
}

impl Student {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Semester tag of a curriculum slot, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    pub const FIRST: Semester = Semester(1);
    pub const SECOND: Semester = Semester(2);

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Semester {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if VALID_SEMESTERS.contains(&value) {
            Ok(Semester(value))
        } else {
            Err(crate::Error::InvalidSemester(value))
        }
    }
}

impl From<Semester> for u8 {
    fn from(semester: Semester) -> Self {
        semester.0
    }
}

/// Places a subject in a program's study plan for one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumSlot {
    pub program_code: String,
    pub subject_code: String,
    pub semester: Semester,
}

/// One (student, subject) registration and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub student_id: String,
    pub subject_code: String,
    #[serde(default)]
    pub grade: Grade,
    pub registered_at: DateTime<Utc>,
    /// Insertion order, breaks ties between equal timestamps.
    #[serde(default)]
    pub sequence: u64,
}

/// A staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: String,
    /// Unique login name.
    pub username: String,
    pub password: String,
}

// =============================================================================
// QUERY RESULTS
// =============================================================================

/// A student joined with the program they are enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student: Student,
    pub program: Program,
}

/// A curriculum subject the student has not registered for yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSubject {
    pub subject: Subject,
    pub semester: Semester,
}

/// An available subject annotated with the prerequisite check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectOffer {
    pub subject: Subject,
    pub semester: Semester,
    pub can_register: bool,
    pub prerequisite_status: String,
}

/// A subject on a student's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledSubject {
    pub subject: Subject,
    pub grade: Grade,
    pub registered_at: DateTime<Utc>,
}

/// A student on a subject's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEnrollee {
    pub student: Student,
    pub grade: Grade,
    pub registered_at: DateTime<Utc>,
}

// =============================================================================
// STUDENT SEARCH
// =============================================================================

/// Ordering applied to student listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// First name, then last name, ascending.
    #[default]
    Name,
    /// Birth date descending, youngest first.
    Age,
}

/// Student search criteria. Empty strings match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFilter {
    /// Case-sensitive substring of first name, last name or id.
    pub search_term: String,
    /// Case-sensitive substring of the school name.
    pub school: String,
    pub sort: SortKey,
}

impl StudentFilter {
    /// Filter that matches every student, sorted by name.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub fn with_school(mut self, school: impl Into<String>) -> Self {
        self.school = school.into();
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Check a student against the search term and school filter.
    #[must_use]
    pub fn matches(&self, student: &Student) -> bool {
        let term = self.search_term.as_str();
        let term_ok = term.is_empty()
            || student.first_name.contains(term)
            || student.last_name.contains(term)
            || student.id.contains(term);
        let school_ok = self.school.is_empty() || student.school.contains(self.school.as_str());
        term_ok && school_ok
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn student(first: &str, last: &str, school: &str) -> Student {
        Student {
            id: "69000001".into(),
            prefix: "Mr.".into(),
            first_name: first.into(),
            last_name: last.into(),
            birth_date: NaiveDate::default(),
            school: school.into(),
            email: "a@example.com".into(),
            program_code: "12345678".into(),
            password: default_password(),
        }
    }

    #[test]
    fn semester_rejects_out_of_range() {
        assert!(Semester::try_from(1).is_ok());
        assert!(Semester::try_from(2).is_ok());
        assert!(Semester::try_from(0).is_err());
        assert!(Semester::try_from(3).is_err());
    }

    #[test]
    fn filter_matches_name_or_id_substring() {
        let s = student("Somchai", "Jaidee", "Somchai School");
        assert!(StudentFilter::all().matches(&s));
        assert!(StudentFilter::all().with_search("mch").matches(&s));
        assert!(StudentFilter::all().with_search("dee").matches(&s));
        assert!(StudentFilter::all().with_search("0001").matches(&s));
        assert!(!StudentFilter::all().with_search("xyz").matches(&s));
    }

    #[test]
    fn filter_is_case_sensitive() {
        let s = student("Somchai", "Jaidee", "Somchai School");
        assert!(!StudentFilter::all().with_search("somchai").matches(&s));
        assert!(!StudentFilter::all().with_school("school").matches(&s));
    }

    #[test]
    fn filter_combines_term_and_school() {
        let s = student("Somchai", "Jaidee", "Somchai School");
        assert!(
            StudentFilter::all()
                .with_search("Jai")
                .with_school("School")
                .matches(&s)
        );
        assert!(
            !StudentFilter::all()
                .with_search("Jai")
                .with_school("Academy")
                .matches(&s)
        );
    }
}
