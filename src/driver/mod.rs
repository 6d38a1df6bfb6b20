//! Browser driver abstraction
//!
//! The inspector consumes a browser session only through [`Driver`]. One
//! implementation is injected per run: [`AgentBrowserDriver`] for real
//! browsers, [`ScriptedDriver`] for tests and dry runs.

mod agent_browser;
mod scripted;
mod snapshot;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Result, Role};

pub use agent_browser::{AgentBrowserDriver, AgentBrowserFactory};
pub use scripted::{DriverCall, PageScript, ScriptedDriver, ScriptedFactory};
pub use snapshot::{parse_tree, AgentBrowserSnapshot, RefInfo, SnapshotData, SnapshotNode};

/// Severity of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl ConsoleLevel {
    /// Map a browser console type string (`error`, `warn`, `log`, ...)
    pub fn from_console_type(kind: &str) -> Self {
        match kind.to_lowercase().as_str() {
            "error" | "pageerror" | "assert" => ConsoleLevel::Error,
            "warn" | "warning" => ConsoleLevel::Warning,
            "debug" | "trace" => ConsoleLevel::Debug,
            _ => ConsoleLevel::Info,
        }
    }
}

impl std::fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleLevel::Error => write!(f, "error"),
            ConsoleLevel::Warning => write!(f, "warning"),
            ConsoleLevel::Info => write!(f, "info"),
            ConsoleLevel::Debug => write!(f, "debug"),
        }
    }
}

/// A console message captured since the last navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ConsoleMessage {
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Warning, message)
    }
}

/// A single browser session
///
/// Methods take `&mut self`: navigating invalidates the refs of earlier
/// snapshots, so a session serves one inspection at a time. Every call
/// may fail; timeouts are the implementation's responsibility and surface
/// as errors.
#[async_trait]
pub trait Driver: Send {
    /// Load a URL
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Pause to let the page settle
    async fn wait(&mut self, duration: Duration) -> Result<()>;

    /// Current accessibility tree, `None` when the page did not render
    async fn snapshot(&mut self) -> Result<Option<SnapshotNode>>;

    /// Click the element behind `reference`
    async fn click(&mut self, element: &str, reference: &str) -> Result<()>;

    /// Type `text` into the element behind `reference`
    async fn type_text(&mut self, element: &str, reference: &str, text: &str) -> Result<()>;

    /// Console messages of `level` since the last navigation
    async fn console_messages(&mut self, level: ConsoleLevel) -> Result<Vec<ConsoleMessage>>;

    /// Get the driver name
    fn name(&self) -> &str;
}

/// Creates independent browser sessions for concurrent role runs
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Open a fresh session for `role`
    async fn create(&self, role: Role) -> Result<Box<dyn Driver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_mapping() {
        assert_eq!(ConsoleLevel::from_console_type("error"), ConsoleLevel::Error);
        assert_eq!(ConsoleLevel::from_console_type("WARN"), ConsoleLevel::Warning);
        assert_eq!(ConsoleLevel::from_console_type("log"), ConsoleLevel::Info);
        assert_eq!(ConsoleLevel::from_console_type("trace"), ConsoleLevel::Debug);
    }
}
