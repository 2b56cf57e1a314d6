//! Failed rule reports

use std::fmt;

use serde::Serialize;

use crate::RequiredHeader;

/// Why a header failed its rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// No value supplied
    Missing,
    /// Value supplied but not equal to the shared secret
    Incorrect,
}

/// A single failed rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Header that failed
    pub header: RequiredHeader,
    /// Failure reason
    pub kind: ViolationKind,
}

impl Violation {
    /// Header had no value
    #[must_use]
    pub const fn missing(header: RequiredHeader) -> Self {
        Self {
            header,
            kind: ViolationKind::Missing,
        }
    }

    /// Header value did not match the shared secret
    #[must_use]
    pub const fn incorrect(header: RequiredHeader) -> Self {
        Self {
            header,
            kind: ViolationKind::Incorrect,
        }
    }

    /// Human-readable reason reported to the caller
    #[must_use]
    pub fn reason(&self) -> String {
        match self.kind {
            ViolationKind::Missing => format!("{} metadata missing", self.header),
            ViolationKind::Incorrect => format!("{} is incorrect", self.header),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}
