//! Dataset document.

use crate::grade::Grade;
use crate::types::{Administrator, CurriculumSlot, Program, Registration, Student, Subject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registration as it appears in a dataset.
///
/// `registered_at` may be omitted; the store then stamps it on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEntry {
    pub student_id: String,
    pub subject_code: String,
    #[serde(default)]
    pub grade: Grade,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

impl RegistrationEntry {
    /// An entry stamped at load time.
    #[must_use]
    pub fn new(
        student_id: impl Into<String>,
        subject_code: impl Into<String>,
        grade: Grade,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            subject_code: subject_code.into(),
            grade,
            registered_at: None,
        }
    }
}

impl From<Registration> for RegistrationEntry {
    fn from(registration: Registration) -> Self {
        Self {
            student_id: registration.student_id,
            subject_code: registration.subject_code,
            grade: registration.grade,
            registered_at: Some(registration.registered_at),
        }
    }
}

/// Every table of the registry as plain record lists.
///
/// Records are listed in load order: a subject's prerequisite precedes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub curriculum: Vec<CurriculumSlot>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub registrations: Vec<RegistrationEntry>,
    #[serde(default)]
    pub administrators: Vec<Administrator>,
}

impl Dataset {
    /// Check if the dataset holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
            && self.subjects.is_empty()
            && self.curriculum.is_empty()
            && self.students.is_empty()
            && self.registrations.is_empty()
            && self.administrators.is_empty()
    }
}

/// Reorder subjects so every prerequisite comes before its dependants.
///
/// Relative order is kept otherwise. Subjects whose prerequisite is missing
/// or part of a cycle are appended last, in input order.
#[must_use]
pub fn prerequisites_first(subjects: Vec<Subject>) -> Vec<Subject> {
    let mut placed: BTreeSet<String> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(subjects.len());
    let mut pending = subjects;

    loop {
        let before = pending.len();
        let mut deferred = Vec::new();
        for subject in pending {
            let ready = subject
                .prerequisite
                .as_ref()
                .is_none_or(|code| placed.contains(code));
            if ready {
                placed.insert(subject.code.clone());
                ordered.push(subject);
            } else {
                deferred.push(subject);
            }
        }
        pending = deferred;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    ordered.extend(pending);
    ordered
}
