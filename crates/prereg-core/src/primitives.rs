//! # Primitives
//!
//! Policy constants shared by the store and the rule engines.

/// Minimum age, in approximated whole years, to register for any subject.
pub const MIN_REGISTRATION_AGE: i64 = 15;

/// Length of a "year" in the age approximation.
///
/// Age is `floor(days_since_birth / 365)`; leap days are not accounted for.
pub const DAYS_PER_YEAR: i64 = 365;

/// Student ids are exactly this many ASCII digits.
pub const STUDENT_ID_LEN: usize = 8;

/// Password assigned to students whose dataset entry omits one.
pub const DEFAULT_STUDENT_PASSWORD: &str = "password123";

/// Semesters a curriculum slot may be tagged with.
pub const VALID_SEMESTERS: [u8; 2] = [1, 2];

// =============================================================================
// PIPELINE MESSAGES
// =============================================================================

/// Reason reported when a subject has no prerequisite.
pub const MSG_NO_PREREQUISITE: &str = "no prerequisite";

/// Reason reported when the prerequisite has been passed.
pub const MSG_PREREQUISITE_SATISFIED: &str = "prerequisite satisfied";

/// Confirmation returned by a successful registration.
pub const MSG_REGISTERED: &str = "registration successful";

/// Check whether `id` has the fixed student id format.
#[must_use]
pub fn is_valid_student_id(id: &str) -> bool {
    id.len() == STUDENT_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn student_id_format() {
        assert!(is_valid_student_id("69000001"));
        assert!(!is_valid_student_id("6900001"));
        assert!(!is_valid_student_id("69000001 "));
        assert!(!is_valid_student_id("6900000a"));
        assert!(!is_valid_student_id(""));
    }
}
