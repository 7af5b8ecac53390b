//! Client configuration: defaults, then a YAML or JSON file, then
//! `HELPDESK_*` environment variables, then a command-line override.

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";
const DEFAULT_CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
const DEFAULT_CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while resolving the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file extension is neither YAML nor JSON.
    #[error("unsupported configuration format. Use 'yaml' or 'json'.")]
    UnsupportedFormat,
    /// The YAML file did not parse.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
    /// The JSON file did not parse.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A field or environment variable holds an unusable value.
    #[error("invalid {name} value: {reason}")]
    InvalidValue {
        /// Field or variable name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Configuration for talking to the helpdesk backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the backend, e.g. `http://localhost:8000`.
    pub base_url: Url,

    /// Path of the endpoint that sets the CSRF cookie.
    pub csrf_cookie_path: String,

    /// Name of the cookie carrying the CSRF token.
    pub csrf_cookie_name: String,

    /// Header echoing the CSRF token on mutating requests.
    pub csrf_header_name: String,

    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Optional whole-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never in practice: the default origin is a constant valid URL.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            csrf_cookie_path: DEFAULT_CSRF_COOKIE_PATH.to_string(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE_NAME.to_string(),
            csrf_header_name: DEFAULT_CSRF_HEADER_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_secs: None,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Values from the file win over the environment; the environment only
    /// fills fields that still hold their default. `base_url_override` wins
    /// over everything.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, if an
    /// environment variable holds an invalid value, or if validation fails.
    pub fn load_config(
        config_path: Option<PathBuf>,
        base_url_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, base_url_override, |name| env::var(name).ok())
    }

    /// [`ClientConfig::load_config`] with `HELPDESK_*` variables read through
    /// `lookup` instead of the process environment.
    ///
    /// # Errors
    /// Same as [`ClientConfig::load_config`].
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        base_url_override: Option<Url>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::read_file(&path)?,
            None => ClientConfig::with_defaults(),
        };

        config.apply_env_overrides(lookup)?;

        if let Some(base_url) = base_url_override {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat),
        }
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let defaults = ClientConfig::with_defaults();

        if self.base_url == defaults.base_url
            && let Some(value) = lookup("HELPDESK_BASE_URL")
        {
            self.base_url = Url::parse(&value).map_err(|err| ConfigError::InvalidValue {
                name: "HELPDESK_BASE_URL",
                reason: err.to_string(),
            })?;
        }
        if self.csrf_cookie_path == defaults.csrf_cookie_path
            && let Some(value) = lookup("HELPDESK_CSRF_COOKIE_PATH")
        {
            self.csrf_cookie_path = value;
        }
        if self.log_level == defaults.log_level
            && let Some(value) = lookup("HELPDESK_LOG_LEVEL")
        {
            self.log_level = value;
        }
        if self.request_timeout_secs.is_none()
            && let Some(value) = lookup("HELPDESK_REQUEST_TIMEOUT")
        {
            let secs = value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "HELPDESK_REQUEST_TIMEOUT",
                reason: "must be a whole number of seconds".to_string(),
            })?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "base_url",
                reason: format!("unsupported scheme '{}'", self.base_url.scheme()),
            });
        }
        if self.base_url.cannot_be_a_base() || self.base_url.host().is_none() {
            return Err(ConfigError::InvalidValue {
                name: "base_url",
                reason: "must be an absolute origin".to_string(),
            });
        }
        if self.csrf_cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "csrf_cookie_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.csrf_header_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "csrf_header_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "request_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn load(
        path: Option<PathBuf>,
        base_url_override: Option<Url>,
        pairs: &[(&str, &str)],
    ) -> Result<ClientConfig, ConfigError> {
        ClientConfig::load_with_env(path, base_url_override, env_of(pairs))
    }

    #[test]
    fn test_config_with_defaults() {
        let config = ClientConfig::with_defaults();

        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.csrf_cookie_path, "/sanctum/csrf-cookie");
        assert_eq!(config.csrf_cookie_name, "XSRF-TOKEN");
        assert_eq!(config.csrf_header_name, "X-XSRF-TOKEN");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let config = load(None, None, &[]).unwrap();
        assert_eq!(config, ClientConfig::with_defaults());
    }

    #[test]
    fn test_load_config_with_environment_variables() {
        let config = load(
            None,
            None,
            &[
                ("HELPDESK_BASE_URL", "https://helpdesk.example.com"),
                ("HELPDESK_LOG_LEVEL", "debug"),
                ("HELPDESK_REQUEST_TIMEOUT", "15"),
            ],
        )
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://helpdesk.example.com/");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout_secs, Some(15));
    }

    #[test]
    fn test_invalid_timeout_environment() {
        let result = load(None, None, &[("HELPDESK_REQUEST_TIMEOUT", "soon")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "HELPDESK_REQUEST_TIMEOUT",
                ..
            })
        ));
    }

    #[test]
    fn test_override_takes_precedence() {
        let override_url = Url::parse("https://cli.example.com").unwrap();
        let config = load(
            None,
            Some(override_url.clone()),
            &[("HELPDESK_BASE_URL", "https://env.example.com")],
        )
        .unwrap();
        assert_eq!(config.base_url, override_url);
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("helpdesk.yaml");
        fs::write(
            &path,
            "base_url: \"http://127.0.0.1:9000\"\nlog_level: \"warn\"\n",
        )
        .unwrap();

        let config = load(Some(path), None, &[]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.csrf_cookie_name, "XSRF-TOKEN");
    }

    #[test]
    fn test_file_values_win_over_environment() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("helpdesk.yaml");
        fs::write(&path, "log_level: \"warn\"\n").unwrap();

        let config = load(
            Some(path),
            None,
            &[
                ("HELPDESK_LOG_LEVEL", "trace"),
                ("HELPDESK_CSRF_COOKIE_PATH", "/csrf"),
            ],
        )
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.csrf_cookie_path, "/csrf");
    }

    #[test]
    fn test_load_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("helpdesk.json");
        fs::write(
            &path,
            r#"{"base_url":"https://desk.example.org","request_timeout_secs":30}"#,
        )
        .unwrap();

        let config = load(Some(path), None, &[]).unwrap();
        assert_eq!(config.base_url.host_str(), Some("desk.example.org"));
        assert_eq!(config.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("helpdesk.toml");
        fs::write(&path, "base_url = 'x'").unwrap();

        let result = load(Some(path), None, &[]);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::with_defaults();
        config.base_url = Url::parse("ftp://files.example.com").unwrap();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_defaults();
        config.csrf_cookie_name = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_defaults();
        config.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        assert!(ClientConfig::with_defaults().validate().is_ok());
    }
}
