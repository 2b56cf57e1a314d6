//! Required header table

use std::fmt;

use serde::Serialize;

/// Headers every call must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum RequiredHeader {
    /// Stable identifier of the calling device
    DeviceId,
    /// Shared-secret client token
    AccessToken,
    /// Client platform (e.g. `ios`, `android`)
    Platform,
    /// Operating system version of the device
    SystemVersion,
    /// Device model
    Model,
}

impl RequiredHeader {
    /// Metadata key as read from the call
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceId => "device-id",
            Self::AccessToken => "access-token",
            Self::Platform => "platform",
            Self::SystemVersion => "system-version",
            Self::Model => "model",
        }
    }
}

impl From<RequiredHeader> for &'static str {
    fn from(header: RequiredHeader) -> Self {
        header.name()
    }
}

impl fmt::Display for RequiredHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a rule demands of its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// At least one value supplied
    Present,
    /// Present, and the first value equals the configured shared secret
    MatchesSecret,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("must be present"),
            Self::MatchesSecret => f.write_str("must be present and equal the shared secret"),
        }
    }
}

/// One header bound to its requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationRule {
    /// Header checked by this rule
    pub header: RequiredHeader,
    /// Requirement the header must satisfy
    pub requirement: Requirement,
}

/// Rules in evaluation order. Violations are always reported in this order.
pub const RULES: [ValidationRule; 5] = [
    ValidationRule {
        header: RequiredHeader::DeviceId,
        requirement: Requirement::Present,
    },
    ValidationRule {
        header: RequiredHeader::AccessToken,
        requirement: Requirement::MatchesSecret,
    },
    ValidationRule {
        header: RequiredHeader::Platform,
        requirement: Requirement::Present,
    },
    ValidationRule {
        header: RequiredHeader::SystemVersion,
        requirement: Requirement::Present,
    },
    ValidationRule {
        header: RequiredHeader::Model,
        requirement: Requirement::Present,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.header.name()).collect();
        assert_eq!(
            names,
            ["device-id", "access-token", "platform", "system-version", "model"]
        );
    }

    #[test]
    fn test_only_access_token_compares_secret() {
        let secret_rules: Vec<_> = RULES
            .iter()
            .filter(|r| r.requirement == Requirement::MatchesSecret)
            .collect();
        assert_eq!(secret_rules.len(), 1);
        assert_eq!(secret_rules[0].header, RequiredHeader::AccessToken);
    }

    #[test]
    fn test_header_serializes_as_name() {
        let json = serde_json::to_string(&RequiredHeader::SystemVersion).unwrap();
        assert_eq!(json, "\"system-version\"");
    }
}
