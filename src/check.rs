//! Offline header check
//!
//! Runs the configured validator over a header set assembled from a file
//! and command-line flags, the way the gate would judge a live call.

use std::fmt::Write as _;
use std::path::Path;

use gate_core::{HeaderSet, RULES, Violation};
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::gate::UNAUTHENTICATED_MESSAGE;
use crate::{Error, Result};

/// Exit status when the headers were rejected
pub const EXIT_REJECTED: u8 = 1;

/// Exit status when the check could not run (config, secret, file errors)
pub const EXIT_ERROR: u8 = 2;

/// Result of one check
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Headers that were validated
    pub headers: HeaderSet,
    /// Violations in rule order, `None` when accepted
    pub violations: Option<Vec<Violation>>,
}

impl CheckOutcome {
    /// Whether the gate would admit the call
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.violations.is_none()
    }

    /// Process exit status for this outcome
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        if self.is_accepted() { 0 } else { EXIT_REJECTED }
    }

    /// Human-readable report
    #[must_use]
    pub fn to_text(&self) -> String {
        match &self.violations {
            None => "✅ accepted".to_string(),
            Some(violations) => {
                let mut out = format!("❌ rejected: {UNAUTHENTICATED_MESSAGE}");
                for violation in violations {
                    let _ = write!(out, "\n   - {violation}");
                }
                out
            }
        }
    }

    /// JSON report
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn to_json(&self) -> Result<String> {
        let document = json!({
            "accepted": self.is_accepted(),
            "headers": self.headers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            "violations": self
                .violations
                .iter()
                .flatten()
                .map(|v| json!({
                    "header": v.header,
                    "kind": v.kind,
                    "reason": v.reason(),
                }))
                .collect::<Vec<_>>(),
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

/// Build the configured validator and run it over the collected headers.
///
/// Headers from `file` are read first; `headers` are appended after them,
/// so a flag adds a value rather than replacing the file's. `access_token`
/// replaces the configured secret.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, no usable secret
/// is configured, or the header file cannot be read.
pub fn evaluate(
    config_path: Option<&Path>,
    headers: Vec<(String, String)>,
    file: Option<&Path>,
    access_token: Option<String>,
) -> Result<CheckOutcome> {
    let mut config = Config::load(config_path)?;
    if let Some(token) = access_token {
        config.gate.access_token = Some(token);
    }
    let validator = config.gate.build_validator()?;

    let mut header_set = match file {
        Some(path) => read_header_file(path)?,
        None => HeaderSet::new(),
    };
    for (name, value) in headers {
        header_set.insert(&name, value);
    }
    debug!(headers = header_set.len(), "Validating headers");

    let violations = validator.validate(&header_set).err();
    Ok(CheckOutcome {
        headers: header_set,
        violations,
    })
}

/// The rule table in evaluation order, one header per line
#[must_use]
pub fn rules_table() -> String {
    let mut out = String::from("Rules (evaluated in order, all reported):\n");
    for rule in &RULES {
        let _ = write!(out, "\n  {:<16} {}", rule.header.name(), rule.requirement);
    }
    out
}

/// Read a header map from YAML (JSON is accepted as YAML)
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_header_file(path: &Path) -> Result<HeaderSet> {
    let raw = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&raw).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_file(dir: &TempDir, token: &str) -> std::path::PathBuf {
        let path = dir.path().join("gate.yaml");
        std::fs::write(&path, format!("gate:\n  access_token: {token}\n")).unwrap();
        path
    }

    fn flags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
            .collect()
    }

    const COMPLETE: [(&str, &str); 5] = [
        ("device-id", "d1"),
        ("access-token", "from-flag"),
        ("platform", "android"),
        ("system-version", "14"),
        ("model", "Pixel 8"),
    ];

    #[test]
    fn test_access_token_override_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_file(&dir, "from-config");

        let configured = evaluate(Some(&config), flags(&COMPLETE), None, None).unwrap();
        assert!(!configured.is_accepted());
        assert_eq!(
            configured
                .violations
                .unwrap()
                .iter()
                .map(Violation::reason)
                .collect::<Vec<_>>(),
            ["access-token is incorrect"]
        );

        let overridden = evaluate(
            Some(&config),
            flags(&COMPLETE),
            None,
            Some("from-flag".to_string()),
        )
        .unwrap();
        assert!(overridden.is_accepted());
        assert_eq!(overridden.exit_status(), 0);
    }

    #[test]
    fn test_file_headers_merge_with_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_file(&dir, "secret");
        let file = dir.path().join("headers.yaml");
        std::fs::write(
            &file,
            "Device-Id: [d1]\nplatform: [ios]\nmodel: [iPhone 15]\n",
        )
        .unwrap();

        let outcome = evaluate(
            Some(&config),
            flags(&[
                ("access-token", "secret"),
                ("system-version", "17.4"),
                ("platform", "ipados"),
            ]),
            Some(&file),
            None,
        )
        .unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(outcome.headers.len(), 5);
        assert_eq!(outcome.headers.get_all("platform"), ["ios", "ipados"]);
        assert_eq!(outcome.headers.first("device-id"), Some("d1"));
    }

    #[test]
    fn test_rejected_outcome_reports_every_violation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_file(&dir, "secret");

        let outcome = evaluate(
            Some(&config),
            flags(&[("access-token", "wrong"), ("model", "m")]),
            None,
            None,
        )
        .unwrap();

        assert!(!outcome.is_accepted());
        assert_eq!(outcome.exit_status(), EXIT_REJECTED);
        assert_eq!(
            outcome.to_text(),
            "❌ rejected: caller is not authenticated\n   \
             - device-id metadata missing\n   \
             - access-token is incorrect\n   \
             - platform metadata missing\n   \
             - system-version metadata missing"
        );

        let report: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(report["accepted"], false);
        assert_eq!(report["violations"].as_array().unwrap().len(), 4);
        assert_eq!(report["violations"][1]["reason"], "access-token is incorrect");
        assert_eq!(report["headers"], json!(["access-token", "model"]));
    }

    #[test]
    fn test_accepted_outcome_reports() {
        let outcome = CheckOutcome {
            headers: HeaderSet::new().with("device-id", "d1"),
            violations: None,
        };
        assert_eq!(outcome.exit_status(), 0);
        assert_eq!(outcome.to_text(), "✅ accepted");

        let report: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(report["accepted"], true);
        assert_eq!(report["violations"], json!([]));
    }

    #[test]
    fn test_setup_failures_are_errors_not_rejections() {
        let missing = evaluate(
            Some(Path::new("/nonexistent/device-gate.yaml")),
            Vec::new(),
            None,
            Some("t".to_string()),
        )
        .unwrap_err();
        assert!(matches!(missing, Error::Config(_)));

        let dir = tempfile::tempdir().unwrap();
        let config = config_file(&dir, "secret");
        let unreadable = evaluate(
            Some(&config),
            Vec::new(),
            Some(&dir.path().join("absent.yaml")),
            None,
        )
        .unwrap_err();
        assert!(matches!(unreadable, Error::Io(_)));

        assert_ne!(EXIT_ERROR, EXIT_REJECTED);
    }

    #[test]
    fn test_rules_table_lists_rules_in_order() {
        let table = rules_table();
        let headers: Vec<&str> = table
            .lines()
            .skip(2)
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(
            headers,
            ["device-id", "access-token", "platform", "system-version", "model"]
        );
        assert_eq!(table.lines().count(), 2 + RULES.len());
    }

    #[test]
    fn test_read_header_file_accepts_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("headers.json");
        std::fs::write(&file, r#"{"Model": ["m1", "m2"]}"#).unwrap();

        let headers = read_header_file(&file).unwrap();
        assert_eq!(headers.get_all("model"), ["m1", "m2"]);
    }
}
