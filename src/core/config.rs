//! Configuration management for site-health
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/site-health/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{HealthError, Result};
use crate::core::types::Role;
use crate::inspect::ClassificationRule;

/// Main configuration for site-health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application under test
    #[serde(default)]
    pub target: TargetConfig,
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Per-page inspection tuning
    #[serde(default)]
    pub inspection: InspectionConfig,
    /// Run selection
    #[serde(default)]
    pub run: RunConfig,
    /// Page registry file; the built-in catalogue is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
    /// Classifier rules replacing the built-in table when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifier_rules: Vec<ClassificationRule>,
}

/// Application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL every route is appended to
    pub base_url: String,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Timeout for a single browser command in ms
    pub timeout_ms: u64,
}

/// Per-page inspection tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Settle time after navigating to a regular page, in seconds
    pub settle_secs: f64,
    /// Settle time for login, registration, error and device-selection pages
    pub quick_settle_secs: f64,
    /// Pause after each click, in seconds
    pub post_action_secs: f64,
    /// Maximum buttons clicked per page
    pub max_clicks: usize,
    /// Maximum inputs filled per page
    pub max_fills: usize,
    /// Collapse identical console errors within one page
    pub dedup_console_errors: bool,
    /// Synthetic username typed into login forms
    pub username: String,
    /// Synthetic password typed into login and registration forms
    pub password: String,
}

/// Which pages a run covers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Roles to run, in order
    pub roles: Vec<Role>,
    /// Skip the unauthenticated pass
    pub skip_common: bool,
    /// Keep going after a failed page
    pub continue_on_error: bool,
    /// Only pages in these categories (empty = all)
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            browser: BrowserConfig::default(),
            inspection: InspectionConfig::default(),
            run: RunConfig::default(),
            registry_path: None,
            classifier_rules: Vec::new(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("SITE_HEALTH_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("SITE_HEALTH_BROWSER_SESSION")
                .unwrap_or_else(|_| "site-health".to_string()),
            headed: env::var("SITE_HEALTH_BROWSER_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            timeout_ms: 30000,
        }
    }
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            settle_secs: 3.0,
            quick_settle_secs: 2.0,
            post_action_secs: 0.5,
            max_clicks: 5,
            max_fills: 3,
            dedup_console_errors: false,
            username: "admin".to_string(),
            password: "123456".to_string(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            roles: Role::AUTHENTICATED.to_vec(),
            skip_common: false,
            continue_on_error: env::var("SITE_HEALTH_CONTINUE_ON_ERROR")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            categories: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("site-health")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A missing config file means defaults; a file that exists but does not
    /// parse or validate is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_path(path).map_err(|e| match e {
            HealthError::Config(msg) => HealthError::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| HealthError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| HealthError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail mid-run
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.target.base_url).map_err(|e| {
            HealthError::config(format!("Invalid base URL '{}': {}", self.target.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HealthError::config(format!(
                "Base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let intervals = [
            ("settle_secs", self.inspection.settle_secs),
            ("quick_settle_secs", self.inspection.quick_settle_secs),
            ("post_action_secs", self.inspection.post_action_secs),
        ];
        for (key, value) in intervals {
            if !value.is_finite() || value < 0.0 {
                return Err(HealthError::config(format!(
                    "inspection.{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| HealthError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| HealthError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| HealthError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        self.save()?;
        Ok(Self::config_file())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.target.base_url.trim_end_matches('/')
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.inspection.max_clicks, 5);
        assert_eq!(config.inspection.settle_secs, 3.0);
        assert_eq!(config.browser.timeout_ms, 30000);
        assert_eq!(config.run.roles.len(), 4);
        assert!(!config.run.skip_common);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = Config::default_config_toml();
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("max_clicks"));

        let parsed = Config::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.inspection.max_fills, 3);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = Config::default();
        config.target.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(HealthError::Config(_))));

        config.target.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_interval() {
        let mut config = Config::default();
        config.inspection.post_action_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml_str = r#"
            [target]
            base_url = "https://staging.example.com/"

            [browser]
            session_name = "ci"
            headed = false
            timeout_ms = 10000

            [run]
            roles = ["teacher", "parent"]
            skip_common = true
            continue_on_error = false
        "#;

        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.base_url(), "https://staging.example.com");
        assert_eq!(config.run.roles, vec![Role::Teacher, Role::Parent]);
        assert!(config.run.categories.is_empty());
        assert_eq!(config.inspection.max_clicks, 5);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml_str = r#"
            [inspection]
            max_clicks = 2

            [browser]
            headed = true
        "#;

        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.inspection.max_clicks, 2);
        assert_eq!(config.inspection.settle_secs, 3.0);
        assert_eq!(config.inspection.password, "123456");
        assert!(config.browser.headed);
        assert_eq!(config.browser.timeout_ms, 30000);
        assert_eq!(config.run.roles.len(), 4);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.inspection.max_clicks, 5);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[inspection]\nmax_clicks = \"many\"\n").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(matches!(err, HealthError::Config(_)));
        assert!(err.to_string().contains("config.toml"));

        fs::write(&path, "[target]\nbase_url = \"ftp://example.com\"\n").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, Config::default_config_toml()).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.inspection.username, "admin");
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("site-health"));
    }
}
