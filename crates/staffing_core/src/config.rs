//! Runtime configuration.
//!
//! # Responsibility
//! - Load client settings from a TOML file with per-field defaults.
//! - Apply `STAFFING_*` environment overrides on top of the file.
//!
//! # Invariants
//! - A returned `StaffingConfig` has passed `validate()`.
//! - Missing sections and fields fall back to defaults; unknown fields are
//!   rejected so typos surface early.

use crate::service::wire::{PageRequest, SortDir};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "STAFFING_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "STAFFING_LOG_LEVEL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_SORT_BY: &str = "fullName";

/// Configuration loading/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Remote assignment service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Employee directory listing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub page_size: u32,
    pub sort_by: String,
    pub sort_dir: SortDir,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_dir: SortDir::Asc,
        }
    }
}

impl DirectoryConfig {
    /// First page request used when the editor loads the directory.
    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size, self.sort_by.as_str(), self.sort_dir)
    }
}

/// Logging settings; `dir = None` leaves logging uninitialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaffingConfig {
    pub service: ServiceConfig,
    pub directory: DirectoryConfig,
    pub logging: LoggingConfig,
}

impl StaffingConfig {
    /// Reads a TOML file, applies environment overrides and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML without applying overrides or validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.service.base_url = base_url.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.service.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("service.base_url cannot be empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "service.base_url must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.service.timeout_ms == 0 {
            return Err(ConfigError::Invalid("service.timeout_ms must be positive".to_string()));
        }
        if self.directory.page_size == 0 {
            return Err(ConfigError::Invalid("directory.page_size must be positive".to_string()));
        }
        if self.directory.sort_by.trim().is_empty() {
            return Err(ConfigError::Invalid("directory.sort_by cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StaffingConfig, ENV_BASE_URL, ENV_LOG_LEVEL};
    use crate::service::wire::SortDir;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = StaffingConfig::from_toml_str("").unwrap();
        assert_eq!(config, StaffingConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = StaffingConfig::from_toml_str(
            r#"
            [service]
            base_url = "https://staffing.example.org/api"

            [directory]
            sort_dir = "desc"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "https://staffing.example.org/api");
        assert_eq!(config.service.timeout_ms, 10_000);
        assert_eq!(config.directory.sort_dir, SortDir::Desc);
        assert_eq!(config.directory.page_size, 100);
    }

    #[test]
    fn unknown_fields_and_bad_sort_dir_are_rejected() {
        let err = StaffingConfig::from_toml_str("[service]\nbase_uri = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = StaffingConfig::from_toml_str("[directory]\nsort_dir = \"up\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = StaffingConfig::default();
        config.apply_env(|key| match key {
            ENV_BASE_URL => Some(" https://override.example.org ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            _ => None,
        });

        assert_eq!(config.service.base_url, "https://override.example.org");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn validation_rejects_zero_limits() {
        let mut config = StaffingConfig::default();
        config.service.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StaffingConfig::default();
        config.directory.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StaffingConfig::default();
        config.service.base_url = "ftp://nope".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[directory]\npage_size = 25").unwrap();

        let config = StaffingConfig::load(file.path()).unwrap();
        assert_eq!(config.directory.page_size, 25);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = StaffingConfig::load("/nonexistent/staffing.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
