//! # Grade
//!
//! The enumerated letter grades a registration can carry.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a registration.
///
/// `InProgress` ("IP") is the default for fresh registrations and contributes
/// neither points nor credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
    #[default]
    #[serde(rename = "IP")]
    InProgress,
}

impl Grade {
    /// Every grade, best first.
    pub const ALL: [Grade; 9] = [
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::CPlus,
        Grade::C,
        Grade::DPlus,
        Grade::D,
        Grade::F,
        Grade::InProgress,
    ];

    /// Text form used on the wire and in storage exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::F => "F",
            Grade::InProgress => "IP",
        }
    }

    /// Grade points in tenths (A = 40, B+ = 35, ... F = 0).
    ///
    /// `None` for IP, which is excluded from GPA entirely.
    #[must_use]
    pub const fn points_tenths(self) -> Option<u64> {
        match self {
            Grade::A => Some(40),
            Grade::BPlus => Some(35),
            Grade::B => Some(30),
            Grade::CPlus => Some(25),
            Grade::C => Some(20),
            Grade::DPlus => Some(15),
            Grade::D => Some(10),
            Grade::F => Some(0),
            Grade::InProgress => None,
        }
    }

    /// True when the subject counts as passed (anything but F and IP).
    #[must_use]
    pub const fn is_passing(self) -> bool {
        !matches!(self, Grade::F | Grade::InProgress)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|grade| grade.as_str() == s)
            .ok_or_else(|| Error::InvalidGrade(s.to_string()))
    }
}
