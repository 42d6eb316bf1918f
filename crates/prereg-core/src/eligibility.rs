//! # Eligibility Engine
//!
//! Decides whether a student may register for a subject.
//!
//! Registration is a short-circuiting pipeline; the first failing step
//! decides the outcome:
//!
//! 1. the student exists (`StudentNotFound`)
//! 2. the student is old enough (`AgeTooLow`)
//! 3. the immediate prerequisite is passed (`PrerequisiteNotMet`)
//! 4. the store accepts the row (`DuplicateRegistration`, `SubjectNotFound`)
//!
//! Only the immediate prerequisite is checked. A chain A → B → C asks about
//! B when registering for C, never about A.

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::grade::Grade;
use crate::primitives::{
    DAYS_PER_YEAR, MIN_REGISTRATION_AGE, MSG_NO_PREREQUISITE, MSG_PREREQUISITE_SATISFIED,
    MSG_REGISTERED,
};
use crate::storage::RecordStore;
use crate::types::SubjectOffer;
use chrono::NaiveDate;

/// Result of a prerequisite check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteCheck {
    pub eligible: bool,
    /// Human-readable explanation, suitable for display.
    pub reason: String,
    /// The prerequisite subject code, if the subject has one.
    pub prerequisite: Option<String>,
    /// The student's grade in the prerequisite, if registered for it.
    pub grade: Option<Grade>,
}

impl PrerequisiteCheck {
    fn no_prerequisite() -> Self {
        Self {
            eligible: true,
            reason: MSG_NO_PREREQUISITE.to_string(),
            prerequisite: None,
            grade: None,
        }
    }
}

/// Age in whole "years" of 365 days between `birth_date` and `today`.
///
/// Floors toward negative infinity, so a birth date in the future yields a
/// negative age.
#[must_use]
pub fn approximate_age(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - birth_date).num_days().div_euclid(DAYS_PER_YEAR)
}

/// Registration rules over a borrowed record store.
pub struct EligibilityEngine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: RecordStore + ?Sized> EligibilityEngine<'a, S> {
    /// Create an engine reading `store` and dating ages with `clock`.
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Create an engine on the wall clock.
    pub fn with_system_clock(store: &'a S) -> Self {
        Self::new(store, &SystemClock)
    }

    /// Check the subject's immediate prerequisite for this student.
    ///
    /// An unknown subject is treated as having no prerequisite; the store
    /// rejects it later if registration is attempted.
    pub fn check_prerequisite(
        &self,
        student_id: &str,
        subject_code: &str,
    ) -> Result<PrerequisiteCheck> {
        let Some(prerequisite) = self
            .store
            .find_subject(subject_code)?
            .and_then(|subject| subject.prerequisite)
        else {
            return Ok(PrerequisiteCheck::no_prerequisite());
        };

        let grade = self
            .store
            .find_registration(student_id, &prerequisite)?
            .map(|registration| registration.grade);

        let (eligible, reason) = match grade {
            None => (false, format!("must take {prerequisite} first")),
            Some(grade) if !grade.is_passing() => (
                false,
                format!("must pass {prerequisite} first (current grade: {grade})"),
            ),
            Some(_) => (true, MSG_PREREQUISITE_SATISFIED.to_string()),
        };

        Ok(PrerequisiteCheck {
            eligible,
            reason,
            prerequisite: Some(prerequisite),
            grade,
        })
    }

    /// Approximate age of a student today, `None` if the student is unknown.
    pub fn age_of(&self, student_id: &str) -> Result<Option<i64>> {
        Ok(self
            .store
            .find_student(student_id)?
            .map(|student| approximate_age(student.birth_date, self.clock.today())))
    }

    /// Whether the student meets the minimum registration age.
    ///
    /// False for unknown students.
    pub fn meets_age_requirement(&self, student_id: &str) -> Result<bool> {
        Ok(self
            .age_of(student_id)?
            .is_some_and(|age| age >= MIN_REGISTRATION_AGE))
    }

    /// Run the full pipeline and, if every rule passes, register.
    ///
    /// Returns the confirmation message.
    pub fn register_for_subject(&self, student_id: &str, subject_code: &str) -> Result<String> {
        let age = self
            .age_of(student_id)?
            .ok_or_else(|| Error::StudentNotFound(student_id.to_string()))?;
        if age < MIN_REGISTRATION_AGE {
            return Err(Error::AgeTooLow {
                age,
                minimum: MIN_REGISTRATION_AGE,
            });
        }

        let check = self.check_prerequisite(student_id, subject_code)?;
        if !check.eligible {
            return Err(Error::PrerequisiteNotMet(check.reason));
        }

        self.store.register_subject(student_id, subject_code)?;
        Ok(MSG_REGISTERED.to_string())
    }

    /// Available subjects annotated with the prerequisite check.
    pub fn available_offers(&self, student_id: &str) -> Result<Vec<SubjectOffer>> {
        self.store
            .list_available_subjects(student_id)?
            .into_iter()
            .map(|available| {
                let check = self.check_prerequisite(student_id, &available.subject.code)?;
                Ok(SubjectOffer {
                    subject: available.subject,
                    semester: available.semester,
                    can_register: check.eligible,
                    prerequisite_status: check.reason,
                })
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
