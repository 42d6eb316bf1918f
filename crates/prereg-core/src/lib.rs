//! # Prereg Core
//!
//! The registration engine behind student pre-registration.
//!
//! Students browse and register for subjects subject to an age rule and a
//! single-level prerequisite rule; staff search student records and enter
//! grades. Everything here is synchronous and silent: the core returns typed
//! results and never logs or prints.
//!
//! ## Components
//!
//! ```text
//! caller ─┬─► AccessGate ──────────┐
//!         ├─► EligibilityEngine ───┼──► RecordStore (redb)
//!         └─► AcademicAggregator ──┘
//! ```
//!
//! - [`storage`]: durable tables and query access ([`RecordStore`], [`RedbStore`])
//! - [`eligibility`]: the age + prerequisite registration pipeline
//! - [`academics`]: GPA, completed credits and registration statistics
//! - [`access`]: credential check and role classification
//!
//! Each component borrows the store handle it is constructed with; there is
//! no process-wide connection.

pub mod academics;
pub mod access;
pub mod clock;
pub mod eligibility;
pub mod error;
pub mod formats;
pub mod grade;
pub mod primitives;
pub mod response;
pub mod storage;
pub mod types;

pub use academics::{AcademicAggregator, RegistrationStats, Transcript};
pub use access::{AccessGate, Principal, Role};
pub use clock::{Clock, FixedClock, SystemClock};
pub use eligibility::{EligibilityEngine, PrerequisiteCheck};
pub use error::{Error, Result};
pub use formats::Dataset;
pub use grade::Grade;
pub use response::ActionOutcome;
pub use storage::{RecordStore, RedbStore};
pub use types::*;
