//! # Academic Aggregator
//!
//! GPA, completed credits and registration statistics.
//!
//! Weighted grade points are accumulated as integers (tenths of a point
//! times credits); the only floating-point step is the final division.

use crate::error::Result;
use crate::storage::RecordStore;
use crate::types::EnrolledSubject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student's record with its aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub student_id: String,
    pub subjects: Vec<EnrolledSubject>,
    pub gpa: f64,
    pub completed_credits: u32,
}

/// Registration counts across the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStats {
    pub total_subjects: usize,
    pub total_students: usize,
    pub total_registrations: usize,
    /// Subject code -> number of registered students.
    pub subject_registration_counts: BTreeMap<String, usize>,
}

/// GPA over already-loaded subjects. 0.0 when nothing is graded.
///
/// IP rows carry neither points nor credits.
#[must_use]
pub fn gpa_of(subjects: &[EnrolledSubject]) -> f64 {
    let (points_tenths, credits) = subjects
        .iter()
        .filter_map(|enrolled| {
            let credits = u64::from(enrolled.subject.credits);
            enrolled
                .grade
                .points_tenths()
                .map(|tenths| (tenths.saturating_mul(credits), credits))
        })
        .fold((0u64, 0u64), |(points, total), (p, c)| {
            (points.saturating_add(p), total.saturating_add(c))
        });

    if credits == 0 {
        return 0.0;
    }
    #[allow(clippy::float_arithmetic)]
    let gpa = points_tenths as f64 / (credits as f64 * 10.0);
    gpa
}

/// Credits of subjects passed (neither F nor IP).
#[must_use]
pub fn completed_credits_of(subjects: &[EnrolledSubject]) -> u32 {
    subjects
        .iter()
        .filter(|enrolled| enrolled.grade.is_passing())
        .fold(0u32, |total, enrolled| {
            total.saturating_add(enrolled.subject.credits)
        })
}

/// Aggregates over a borrowed record store.
pub struct AcademicAggregator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> AcademicAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Credit-weighted GPA of a student. Unknown students yield 0.0.
    pub fn compute_gpa(&self, student_id: &str) -> Result<f64> {
        Ok(gpa_of(&self.store.list_registered_subjects(student_id)?))
    }

    /// Sum of credits of passed subjects.
    pub fn compute_completed_credits(&self, student_id: &str) -> Result<u32> {
        Ok(completed_credits_of(
            &self.store.list_registered_subjects(student_id)?,
        ))
    }

    /// Registered subjects together with GPA and completed credits.
    pub fn transcript(&self, student_id: &str) -> Result<Transcript> {
        let subjects = self.store.list_registered_subjects(student_id)?;
        Ok(Transcript {
            student_id: student_id.to_string(),
            gpa: gpa_of(&subjects),
            completed_credits: completed_credits_of(&subjects),
            subjects,
        })
    }

    /// Totals and per-subject registration counts.
    pub fn registration_statistics(&self) -> Result<RegistrationStats> {
        let subjects = self.store.list_subjects()?;
        let mut stats = RegistrationStats {
            total_subjects: subjects.len(),
            total_students: self.store.count_students()? as usize,
            ..RegistrationStats::default()
        };

        for subject in subjects {
            let count = self.store.list_subject_registrations(&subject.code)?.len();
            stats.total_registrations = stats.total_registrations.saturating_add(count);
            stats.subject_registration_counts.insert(subject.code, count);
        }

        Ok(stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::grade::Grade;
    use crate::storage::RedbStore;
    use crate::types::Subject;
    use chrono::{DateTime, NaiveDate, Utc};

    fn enrolled(credits: u32, grade: Grade) -> EnrolledSubject {
        EnrolledSubject {
            subject: Subject {
                code: format!("S{credits}{grade}"),
                name: "Subject".into(),
                credits,
                instructor: "Staff".into(),
                prerequisite: None,
            },
            grade,
            registered_at: DateTime::<Utc>::default(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        #[allow(clippy::float_arithmetic)]
        let diff = (a - b).abs();
        diff < 1e-9
    }

    #[test]
    fn gpa_weighted_by_credits() {
        let gpa = gpa_of(&[enrolled(3, Grade::A), enrolled(3, Grade::B)]);
        assert!(close(gpa, 3.5), "{gpa}");

        let gpa = gpa_of(&[enrolled(4, Grade::A), enrolled(1, Grade::F)]);
        assert!(close(gpa, 3.2), "{gpa}");
    }

    #[test]
    fn gpa_ignores_in_progress() {
        let gpa = gpa_of(&[enrolled(3, Grade::CPlus), enrolled(3, Grade::InProgress)]);
        assert!(close(gpa, 2.5), "{gpa}");
    }

    #[test]
    fn gpa_zero_without_graded_subjects() {
        assert!(close(gpa_of(&[]), 0.0));
        assert!(close(gpa_of(&[enrolled(3, Grade::InProgress)]), 0.0));
    }

    #[test]
    fn gpa_counts_failures() {
        let gpa = gpa_of(&[enrolled(3, Grade::F)]);
        assert!(close(gpa, 0.0));
    }

    #[test]
    fn completed_credits_exclude_f_and_ip() {
        let subjects = [
            enrolled(3, Grade::BPlus),
            enrolled(3, Grade::F),
            enrolled(3, Grade::InProgress),
        ];
        assert_eq!(completed_credits_of(&subjects), 3);
    }

    #[test]
    fn statistics_over_sample_data() {
        let store = RedbStore::in_memory()
            .unwrap()
            .with_clock(FixedClock::on(
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            ));
        store
            .load_dataset(&crate::Dataset::sample())
            .unwrap();

        let stats = AcademicAggregator::new(&store)
            .registration_statistics()
            .unwrap();
        assert_eq!(stats.total_subjects, 11);
        assert_eq!(stats.total_students, 11);
        assert_eq!(stats.total_registrations, 7);
        assert_eq!(stats.subject_registration_counts.get("05500101"), Some(&3));
        assert_eq!(stats.subject_registration_counts.get("05500401"), Some(&0));
    }

    #[test]
    fn transcript_over_sample_student() {
        let store = RedbStore::in_memory().unwrap();
        store
            .load_dataset(&crate::Dataset::sample())
            .unwrap();

        // B+, A, B on three 3-credit subjects.
        let transcript = AcademicAggregator::new(&store)
            .transcript("69000001")
            .unwrap();
        assert_eq!(transcript.subjects.len(), 3);
        assert_eq!(transcript.completed_credits, 9);
        assert!(close(transcript.gpa, 3.5), "{}", transcript.gpa);
    }

    #[test]
    fn unknown_student_has_empty_aggregates() {
        let store = RedbStore::in_memory().unwrap();
        let aggregator = AcademicAggregator::new(&store);
        assert!(close(aggregator.compute_gpa("99999999").unwrap(), 0.0));
        assert_eq!(aggregator.compute_completed_credits("99999999").ok(), Some(0));
    }
}
