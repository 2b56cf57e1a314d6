//! Metadata validation

use std::fmt;

use subtle::ConstantTimeEq;

use crate::{Error, HeaderSet, RULES, RequiredHeader, Requirement, ValidationRule, Violation};

/// Shared secret the `access-token` header must equal
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a secret value
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySecret`] if `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::EmptySecret);
        }
        Ok(Self(value))
    }

    /// Exact comparison in constant time with respect to the candidate's content
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Checks a [`HeaderSet`] against the fixed rule table.
///
/// Every rule is evaluated on every call; a failing rule never hides the
/// ones after it.
#[derive(Debug, Clone)]
pub struct MetadataValidator {
    secret: SharedSecret,
    reject_blank_values: bool,
}

impl MetadataValidator {
    /// Create a validator comparing `access-token` against `secret`
    #[must_use]
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            reject_blank_values: false,
        }
    }

    /// Treat headers whose values are all blank (empty or whitespace) as missing
    #[must_use]
    pub fn reject_blank_values(mut self, reject: bool) -> Self {
        self.reject_blank_values = reject;
        self
    }

    /// Validate one call's headers.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in rule order.
    pub fn validate(&self, headers: &HeaderSet) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> = RULES
            .iter()
            .filter_map(|rule| self.check(rule, headers))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check(&self, rule: &ValidationRule, headers: &HeaderSet) -> Option<Violation> {
        let values = self.present_values(rule.header, headers);
        let Some(first) = values.first() else {
            return Some(Violation::missing(rule.header));
        };

        match rule.requirement {
            Requirement::Present => None,
            Requirement::MatchesSecret if self.secret.matches(first) => None,
            Requirement::MatchesSecret => Some(Violation::incorrect(rule.header)),
        }
    }

    fn present_values<'a>(&self, header: RequiredHeader, headers: &'a HeaderSet) -> Vec<&'a str> {
        headers
            .get_all(header.name())
            .iter()
            .map(String::as_str)
            .filter(|v| !self.reject_blank_values || !v.trim().is_empty())
            .collect()
    }
}
