//! Custom error types for site-health
//!
//! Setup failures propagate as `HealthError`. Failures observed while
//! inspecting a page never do: the inspector folds them into a `PageStatus`.

use thiserror::Error;

/// Main error type for site-health operations
#[derive(Error, Debug)]
pub enum HealthError {
    /// Browser driver command failed
    #[error("Driver error: {0}")]
    Driver(String),

    /// A driver command exceeded its timeout
    #[error("Timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    /// Navigation to a page failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page registry errors
    #[error("Registry error: {0}")]
    Registry(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for site-health operations
pub type Result<T> = std::result::Result<T, HealthError>;

impl HealthError {
    /// Create a driver error
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(command: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            command: command.into(),
            timeout_ms,
        }
    }

    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}
