//! # Response Module
//!
//! The structured "success flag + message" report handed back to callers.
//!
//! Every operation that can be refused for a business reason ends up here,
//! so the presentation layer never has to match on error variants to show
//! something sensible.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a user-facing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A refused outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Fold a rule-checked result into an outcome.
    ///
    /// Rule violations become failures carrying the error message.
    /// Infrastructure faults are passed through as `Err`.
    pub fn from_result(result: Result<String>) -> Result<Self> {
        match result {
            Ok(message) => Ok(Self::success(message)),
            Err(err) if err.is_rule_violation() => Ok(Self::failure(err.to_string())),
            Err(err) => Err(err),
        }
    }
}

impl From<Error> for ActionOutcome {
    fn from(err: Error) -> Self {
        Self::failure(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_message() {
        let outcome = ActionOutcome::from_result(Ok("registration successful".into()));
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::success("registration successful"))
        );
    }

    #[test]
    fn rule_violation_becomes_failure() {
        let outcome = ActionOutcome::from_result(Err(Error::AgeTooLow { age: 14, minimum: 15 }));
        let outcome = outcome.ok();
        assert_eq!(outcome.as_ref().map(|o| o.success), Some(false));
        assert!(
            outcome
                .map(|o| o.message.contains("at least 15"))
                .unwrap()
        );
    }

    #[test]
    fn infrastructure_fault_is_propagated() {
        let fault = Error::Codec(postcard::Error::DeserializeUnexpectedEnd);
        let outcome = ActionOutcome::from_result(Err(fault));
        assert!(outcome.is_err());
    }
}
