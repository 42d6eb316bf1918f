//! # Formats Module
//!
//! Serializable dataset documents for bulk loading and export.
//!
//! This module contains:
//! - The [`Dataset`] document (every table as a list of records)
//! - The bootstrap sample data
//!
//! Note: file I/O and the concrete encoding (JSON) stay in the app layer.
//! This module only handles pure transformations.

mod dataset;
mod sample;

pub use dataset::{Dataset, RegistrationEntry, prerequisites_first};
