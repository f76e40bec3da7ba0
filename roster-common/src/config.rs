//! Configuration loading and sheet source resolution
//!
//! Settings are resolved once at startup in priority order:
//! 1. Command-line argument / environment variable (handled by the binary's clap layer)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error. A missing sheet source is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default HTTP port for the API service
pub const DEFAULT_PORT: u16 = 8001;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Sheet tab exported when only a spreadsheet id is configured
pub const DEFAULT_SHEET_GID: &str = "542375196";

/// Upper bound on a single upstream request
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Spreadsheet source settings
    #[serde(default)]
    pub sheet: SheetConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Record normalization settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[sheet]` table
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SheetConfig {
    pub spreadsheet_id: Option<String>,
    pub gid: Option<String>,
    /// Fully formed CSV export URL; wins over `spreadsheet_id`
    pub csv_url: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    /// Fixed refresh period; absent or 0 disables interval refresh
    pub refresh_interval_secs: Option<u64>,
}

/// `[server]` table
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// `[normalize]` table
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub progress_fallback: ProgressFallbackConfig,
}

/// What `progress` becomes when the sheet has no usable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ProgressFallbackConfig {
    /// Always the same value (deterministic)
    Fixed {
        #[serde(default)]
        value: i64,
    },
    /// Pseudo-random in `[0, 100)`; seeded when `seed` is set
    Random { seed: Option<u64> },
}

impl Default for ProgressFallbackConfig {
    fn default() -> Self {
        ProgressFallbackConfig::Fixed { value: 0 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load the TOML config file
    ///
    /// An explicit path must exist. Without one, the platform default
    /// (`~/.config/roster/config.toml`) is read when present, otherwise
    /// compiled defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No config file found, using compiled defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))?;

        info!("Loaded config file: {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roster").join("config.toml"))
}

/// Values supplied on the command line or through the environment
///
/// These win over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub spreadsheet_id: Option<String>,
    pub sheet_gid: Option<String>,
    pub csv_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub fetch_timeout_secs: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// CSV export URL the fetcher polls
    pub csv_url: String,
    /// Spreadsheet id, when the URL was derived from one
    pub spreadsheet_id: Option<String>,
    pub host: String,
    pub port: u16,
    pub fetch_timeout: Duration,
    pub refresh_interval: Option<Duration>,
    pub progress_fallback: ProgressFallbackConfig,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let sheet = toml.sheet;

        let spreadsheet_id = non_empty(overrides.spreadsheet_id).or(non_empty(sheet.spreadsheet_id));
        let explicit_url = non_empty(overrides.csv_url).or(non_empty(sheet.csv_url));
        let gid = non_empty(overrides.sheet_gid)
            .or(non_empty(sheet.gid))
            .unwrap_or_else(|| DEFAULT_SHEET_GID.to_string());

        let csv_url = match (explicit_url, spreadsheet_id.as_deref()) {
            (Some(url), _) => url,
            (None, Some(id)) => sheet_export_url(id, &gid),
            (None, None) => {
                return Err(Error::Config(
                    "No sheet source configured. Set one of:\n\
                     1. --csv-url / ENROLLMENT_CSV_URL\n\
                     2. --spreadsheet-id / GOOGLE_SPREADSHEET_ID\n\
                     3. [sheet] csv_url or spreadsheet_id in config.toml"
                        .to_string(),
                ))
            }
        };

        reqwest::Url::parse(&csv_url)
            .map_err(|e| Error::Config(format!("Invalid CSV URL '{}': {}", csv_url, e)))?;

        let fetch_timeout_secs = overrides
            .fetch_timeout_secs
            .or(sheet.fetch_timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if fetch_timeout_secs == 0 {
            return Err(Error::Config("fetch timeout must be at least 1 second".to_string()));
        }

        let refresh_interval = overrides
            .refresh_interval_secs
            .or(sheet.refresh_interval_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            csv_url,
            spreadsheet_id,
            host: non_empty(overrides.host)
                .or(non_empty(toml.server.host))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.server.port).unwrap_or(DEFAULT_PORT),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            refresh_interval,
            progress_fallback: toml.normalize.progress_fallback,
            log_level: non_empty(overrides.log_level).unwrap_or(toml.logging.level),
        })
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CSV export URL for one tab of a published spreadsheet
pub fn sheet_export_url(spreadsheet_id: &str, gid: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        spreadsheet_id, gid
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_from_id() {
        assert_eq!(
            sheet_export_url("abc", "7"),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=7"
        );
    }

    #[test]
    fn test_explicit_url_overrides_spreadsheet_id() {
        let overrides = ConfigOverrides {
            spreadsheet_id: Some("abc".to_string()),
            csv_url: Some("http://localhost:9000/sheet.csv".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(overrides, TomlConfig::default()).unwrap();
        assert_eq!(config.csv_url, "http://localhost:9000/sheet.csv");
        assert_eq!(config.spreadsheet_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_defaults_applied() {
        let overrides = ConfigOverrides {
            spreadsheet_id: Some("abc".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(overrides, TomlConfig::default()).unwrap();
        assert!(config.csv_url.ends_with("gid=542375196"));
        assert_eq!(config.bind_addr(), "127.0.0.1:8001");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.refresh_interval.is_none());
        assert_eq!(config.progress_fallback, ProgressFallbackConfig::Fixed { value: 0 });
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let err = ServiceConfig::resolve(ConfigOverrides::default(), TomlConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blank_override_does_not_mask_toml() {
        let toml = TomlConfig::from_toml_str("[sheet]\nspreadsheet_id = \"from-toml\"\n").unwrap();
        let overrides = ConfigOverrides {
            spreadsheet_id: Some("   ".to_string()),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(overrides, toml).unwrap();
        assert_eq!(config.spreadsheet_id.as_deref(), Some("from-toml"));
    }

    #[test]
    fn test_zero_refresh_interval_disables_refresh() {
        let overrides = ConfigOverrides {
            spreadsheet_id: Some("abc".to_string()),
            refresh_interval_secs: Some(0),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(overrides, TomlConfig::default()).unwrap();
        assert!(config.refresh_interval.is_none());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let overrides = ConfigOverrides {
            csv_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(ServiceConfig::resolve(overrides, TomlConfig::default()).is_err());
    }
}
