//! Bootstrap sample data loaded into an empty registry.

use super::{Dataset, RegistrationEntry};
use crate::grade::Grade;
use crate::primitives::DEFAULT_STUDENT_PASSWORD;
use crate::types::{Administrator, CurriculumSlot, Program, Semester, Student, Subject};
use chrono::NaiveDate;

const PROGRAMS: [(&str, &str, &str); 3] = [
    ("12345678", "Computer Science", "Department of Computer Science"),
    ("12345679", "Software Engineering", "Department of Computer Science"),
    ("12345680", "Applied Mathematics", "Department of Mathematics"),
];

/// (code, name, credits, instructor, prerequisite)
const SUBJECTS: [(&str, &str, u32, &str, Option<&str>); 11] = [
    ("05500101", "Computer Programming I", 3, "Somchai", None),
    ("05500102", "Computer Programming II", 3, "Somying", Some("05500101")),
    ("05500201", "Data Structures", 3, "Wichai", Some("05500102")),
    ("05500301", "Database Systems", 3, "Malee", Some("05500201")),
    ("05500401", "Software Engineering", 3, "Prayoon", Some("05500301")),
    ("90690101", "English I", 3, "John", None),
    ("90690102", "English II", 3, "Mary", Some("90690101")),
    ("90690201", "Mathematics I", 3, "Sutthiphong", None),
    ("90690202", "Mathematics II", 3, "Kamolporn", Some("90690201")),
    ("05500105", "Web Development", 3, "Nanta", Some("05500102")),
    ("05500205", "Algorithms", 3, "Somsak", Some("05500201")),
];

const CURRICULUM: [(&str, &str, Semester); 12] = [
    ("12345678", "05500101", Semester::FIRST),
    ("12345678", "90690101", Semester::FIRST),
    ("12345678", "90690201", Semester::FIRST),
    ("12345678", "05500102", Semester::SECOND),
    ("12345678", "90690102", Semester::SECOND),
    ("12345678", "90690202", Semester::SECOND),
    ("12345678", "05500201", Semester::SECOND),
    ("12345679", "05500101", Semester::FIRST),
    ("12345679", "90690101", Semester::FIRST),
    ("12345679", "05500105", Semester::FIRST),
    ("12345679", "05500102", Semester::SECOND),
    ("12345679", "05500201", Semester::SECOND),
];

/// (id, prefix, first, last, (year, month, day), school, email, program)
type StudentRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    (i32, u32, u32),
    &'static str,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const STUDENTS: [StudentRow; 11] = [
    ("69000001", "Mr.", "Somchai", "Jaidee", (2007, 1, 15), "Somchai School", "somchai@email.com", "12345678"),
    ("69000002", "Ms.", "Somying", "Rakrian", (2007, 3, 20), "Daoden School", "somying@email.com", "12345678"),
    ("69000003", "Mr.", "Wichai", "Kengmak", (2007, 2, 10), "Witthaya School", "wichai@email.com", "12345679"),
    ("69000004", "Ms.", "Malee", "Suayngam", (2006, 12, 5), "Sairung School", "malee@email.com", "12345678"),
    ("69000005", "Mr.", "Prayoon", "Chalat", (2007, 4, 25), "Panya School", "prayoon@email.com", "12345679"),
    ("69000006", "Ms.", "Kamolporn", "Riaprot", (2007, 1, 30), "Khunnatham School", "kamolporn@email.com", "12345680"),
    ("69000007", "Mr.", "Nanta", "Suesat", (2006, 11, 12), "Sucharit School", "nanta@email.com", "12345678"),
    ("69000008", "Ms.", "Sunisa", "Manjai", (2007, 5, 8), "Mankhong School", "sunisa@email.com", "12345679"),
    ("69000009", "Mr.", "Aphichat", "Klahan", (2006, 9, 18), "Hat Yai School", "aphichat@email.com", "12345678"),
    ("69000010", "Ms.", "Wanna", "Onyon", (2007, 7, 3), "Songkhla School", "wanna@email.com", "12345679"),
    ("69000011", "Mr.", "Thanakorn", "Mungman", (2006, 10, 22), "Pattani School", "thanakorn@email.com", "12345680"),
];

const REGISTRATIONS: [(&str, &str, Grade); 7] = [
    ("69000001", "05500101", Grade::BPlus),
    ("69000001", "90690101", Grade::A),
    ("69000001", "90690201", Grade::B),
    ("69000002", "05500101", Grade::A),
    ("69000002", "90690101", Grade::BPlus),
    ("69000003", "05500101", Grade::CPlus),
    ("69000004", "90690101", Grade::A),
];

impl Dataset {
    /// The registry's bootstrap data: three programs, eleven subjects with
    /// prerequisite chains, twelve curriculum slots, eleven students, seven
    /// graded registrations and one `admin` account.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            programs: PROGRAMS
                .iter()
                .map(|&(code, name, department)| Program {
                    code: code.into(),
                    name: name.into(),
                    department: department.into(),
                })
                .collect(),
            subjects: SUBJECTS
                .iter()
                .map(|&(code, name, credits, instructor, prerequisite)| Subject {
                    code: code.into(),
                    name: name.into(),
                    credits,
                    instructor: instructor.into(),
                    prerequisite: prerequisite.map(str::to_string),
                })
                .collect(),
            curriculum: CURRICULUM
                .iter()
                .map(|&(program, subject, semester)| CurriculumSlot {
                    program_code: program.into(),
                    subject_code: subject.into(),
                    semester,
                })
                .collect(),
            students: STUDENTS
                .iter()
                .map(
                    |&(id, prefix, first, last, (y, m, d), school, email, program)| Student {
                        id: id.into(),
                        prefix: prefix.into(),
                        first_name: first.into(),
                        last_name: last.into(),
                        birth_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
                        school: school.into(),
                        email: email.into(),
                        program_code: program.into(),
                        password: DEFAULT_STUDENT_PASSWORD.into(),
                    },
                )
                .collect(),
            registrations: REGISTRATIONS
                .iter()
                .map(|&(student, subject, grade)| RegistrationEntry::new(student, subject, grade))
                .collect(),
            administrators: vec![Administrator {
                id: "admin001".into(),
                username: "admin".into(),
                password: "admin123".into(),
            }],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn sample_sizes() {
        let data = Dataset::sample();
        assert_eq!(data.programs.len(), 3);
        assert_eq!(data.subjects.len(), 11);
        assert_eq!(data.curriculum.len(), 12);
        assert_eq!(data.students.len(), 11);
        assert_eq!(data.registrations.len(), 7);
        assert_eq!(data.administrators.len(), 1);
    }

    #[test]
    fn sample_subjects_are_in_load_order() {
        let data = Dataset::sample();
        let mut seen = BTreeSet::new();
        for subject in &data.subjects {
            if let Some(prerequisite) = &subject.prerequisite {
                assert!(seen.contains(prerequisite), "{} before {}", prerequisite, subject.code);
            }
            seen.insert(subject.code.clone());
        }
    }

    #[test]
    fn sample_birth_dates_are_real_dates() {
        let data = Dataset::sample();
        assert!(data.students.iter().all(|s| s.birth_date != NaiveDate::default()));
    }
}
