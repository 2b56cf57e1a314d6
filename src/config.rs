//! Configuration management

use std::{env, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use gate_core::{MetadataValidator, SharedSecret};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before resolving secrets.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    /// Variables are set into the process environment for `env:VAR` resolution.
    pub env_files: Vec<String>,
    /// Metadata gate configuration
    pub gate: GateConfig,
}

/// Metadata gate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Shared secret the `access-token` header must equal.
    /// Supports: literal value or `env:VAR_NAME`
    pub access_token: Option<String>,

    /// Count empty or whitespace-only header values as missing
    pub reject_blank_values: bool,
}

impl GateConfig {
    /// Resolve the access token (expand `env:` references)
    #[must_use]
    pub fn resolve_access_token(&self) -> Option<String> {
        self.access_token.as_ref().map(|token| {
            if let Some(var_name) = token.strip_prefix("env:") {
                env::var(var_name).unwrap_or_default()
            } else {
                token.clone()
            }
        })
    }

    /// Build the validator this configuration describes
    ///
    /// # Errors
    ///
    /// Returns an error if no access token is configured or it resolves to
    /// an empty string.
    pub fn build_validator(&self) -> Result<MetadataValidator> {
        let token = self
            .resolve_access_token()
            .ok_or_else(|| Error::Config("gate.access_token is not set".to_string()))?;
        if token.is_empty() {
            return Err(Error::Config(
                "gate.access_token resolved to an empty value".to_string(),
            ));
        }
        let secret = SharedSecret::new(token)?;

        Ok(MetadataValidator::new(secret).reject_blank_values(self.reject_blank_values))
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (DEVICE_GATE_ prefix)
        figment = figment.merge(Env::prefixed("DEVICE_GATE_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Load env files into process environment (before secret resolution)
        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_core::HeaderSet;
    use std::io::Write;

    #[test]
    fn test_load_env_files_sets_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "DEVICE_GATE_TEST_KEY_A=hello_from_env_file").unwrap();
        writeln!(f, "DEVICE_GATE_TEST_KEY_B=42").unwrap();
        drop(f);

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            ..Default::default()
        };
        config.load_env_files();

        assert_eq!(
            env::var("DEVICE_GATE_TEST_KEY_A").unwrap(),
            "hello_from_env_file"
        );
        assert_eq!(env::var("DEVICE_GATE_TEST_KEY_B").unwrap(), "42");
    }

    #[test]
    fn test_load_env_files_skips_missing() {
        let config = Config {
            env_files: vec!["/nonexistent/path/.env".to_string()],
            ..Default::default()
        };
        config.load_env_files();
    }

    #[test]
    fn test_access_token_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("secrets.env");
        std::fs::write(&env_path, "DEVICE_GATE_TEST_TOKEN=from-file\n").unwrap();

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            gate: GateConfig {
                access_token: Some("env:DEVICE_GATE_TEST_TOKEN".to_string()),
                reject_blank_values: false,
            },
        };
        config.load_env_files();

        assert_eq!(
            config.gate.resolve_access_token().as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_literal_access_token() {
        let gate = GateConfig {
            access_token: Some("literal".to_string()),
            reject_blank_values: false,
        };
        assert_eq!(gate.resolve_access_token().as_deref(), Some("literal"));
    }

    #[test]
    fn test_build_validator_requires_token() {
        let err = GateConfig::default().build_validator().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let unset = GateConfig {
            access_token: Some("env:DEVICE_GATE_TEST_NEVER_SET".to_string()),
            reject_blank_values: false,
        };
        assert_eq!(
            unset.build_validator().unwrap_err().to_string(),
            "Configuration error: gate.access_token resolved to an empty value"
        );

        let empty = GateConfig {
            access_token: Some(String::new()),
            reject_blank_values: false,
        };
        assert!(matches!(empty.build_validator().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_build_validator_applies_blank_policy() {
        let gate = GateConfig {
            access_token: Some("t".to_string()),
            reject_blank_values: true,
        };
        let headers = HeaderSet::new()
            .with("device-id", " ")
            .with("access-token", "t")
            .with("platform", "ios")
            .with("system-version", "1")
            .with("model", "m");

        let violations = gate.build_validator().unwrap().validate(&headers).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason(), "device-id metadata missing");
    }

    #[test]
    fn test_gate_config_deserialized_from_yaml() {
        let yaml = r#"
env_files:
  - ~/.config/device-gate/secrets.env
gate:
  access_token: "env:GATE_TOKEN"
  reject_blank_values: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.env_files.len(), 1);
        assert_eq!(config.gate.access_token.as_deref(), Some("env:GATE_TOKEN"));
        assert!(config.gate.reject_blank_values);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/device-gate.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.yaml");
        std::fs::write(&path, "gate:\n  access_token: from-yaml\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config.gate.resolve_access_token().as_deref(),
            Some("from-yaml")
        );
        assert!(!config.gate.reject_blank_values);
    }
}
