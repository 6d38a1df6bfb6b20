//! Browser driver - wraps agent-browser CLI
//!
//! Every command runs under the session's timeout; an expired timeout is
//! reported as [`HealthError::Timeout`].

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::core::config::BrowserConfig;
use crate::core::{HealthError, Result, Role};
use crate::driver::snapshot::{AgentBrowserSnapshot, SnapshotNode};
use crate::driver::{ConsoleLevel, ConsoleMessage, Driver, DriverFactory};

/// Driver for browser automation via agent-browser CLI
pub struct AgentBrowserDriver {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Per-command timeout in ms
    timeout_ms: u64,
    /// Executable to run
    program: String,
    /// Console entries left over from earlier pages after a failed clear
    console_baseline: usize,
    /// Page errors left over from earlier pages after a failed clear
    errors_baseline: usize,
}

impl AgentBrowserDriver {
    /// Create a new driver for a session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
            timeout_ms: 30000,
            program: "agent-browser".to_string(),
            console_baseline: 0,
            errors_baseline: 0,
        }
    }

    /// Create a driver from browser configuration
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            headed: config.headed,
            timeout_ms: config.timeout_ms,
            ..Self::new(config.session_name.clone())
        }
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    /// Set the per-command timeout
    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    /// Run a different agent-browser executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(session = %self.session_name, "agent-browser {}", args.join(" "));

        let output = tokio::time::timeout(Duration::from_millis(self.timeout_ms), cmd.output())
            .await
            .map_err(|_| HealthError::timeout(args.join(" "), self.timeout_ms))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HealthError::AgentBrowserNotFound
                } else {
                    HealthError::driver(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(HealthError::driver(format!(
                "agent-browser {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )))
        }
    }

    /// Run a command and return JSON output
    async fn run_json_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("--json");
        self.run_command(&full_args).await
    }

    /// Clear one history channel (`console` or `errors`)
    ///
    /// Returns how many entries must be skipped on later reads: 0 after a
    /// clear, the current history length when the clear is refused.
    async fn reset_history(&self, channel: &str) -> Result<usize> {
        let clear_error = match self.run_command(&[channel, "--clear"]).await {
            Ok(_) => return Ok(0),
            Err(e) => e,
        };
        tracing::warn!(
            session = %self.session_name,
            channel,
            error = %clear_error,
            "could not clear browser history, skipping earlier entries instead"
        );

        let output = self.run_json_command(&[channel]).await.map_err(|e| {
            HealthError::driver(format!(
                "{} history could not be cleared ({}) or read ({})",
                channel, clear_error, e
            ))
        })?;
        Ok(parse_console_output(&output)?.len())
    }

    /// Close the browser session
    pub async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await.map(|_| ())
    }
}

/// agent-browser refs are addressed with an `@` prefix
fn at_ref(reference: &str) -> String {
    format!("@{}", reference.trim_start_matches('@'))
}

#[async_trait]
impl Driver for AgentBrowserDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.run_command(&["open", url])
            .await
            .map_err(|e| match e {
                HealthError::Driver(message) => HealthError::navigation(url, message),
                other => other,
            })?;

        // Best effort: slow pages still get the settle wait afterwards
        let _ = self.run_command(&["wait", "--load", "networkidle"]).await;

        // Console history is per navigation
        self.console_baseline = self.reset_history("console").await?;
        self.errors_baseline = self.reset_history("errors").await?;
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) -> Result<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<Option<SnapshotNode>> {
        let output = self.run_json_command(&["snapshot"]).await?;
        let snapshot: AgentBrowserSnapshot = serde_json::from_str(&output)?;
        Ok(snapshot.into_tree())
    }

    async fn click(&mut self, element: &str, reference: &str) -> Result<()> {
        if reference.is_empty() {
            return Err(HealthError::driver(format!("'{}' has no element ref", element)));
        }
        self.run_command(&["click", &at_ref(reference)]).await.map(|_| ())
    }

    async fn type_text(&mut self, element: &str, reference: &str, text: &str) -> Result<()> {
        if reference.is_empty() {
            return Err(HealthError::driver(format!("'{}' has no element ref", element)));
        }
        self.run_command(&["fill", &at_ref(reference), text])
            .await
            .map(|_| ())
    }

    async fn console_messages(&mut self, level: ConsoleLevel) -> Result<Vec<ConsoleMessage>> {
        let output = self.run_json_command(&["console"]).await?;
        let mut messages: Vec<ConsoleMessage> = parse_console_output(&output)?
            .into_iter()
            .skip(self.console_baseline)
            .filter(|m| m.level == level)
            .collect();

        // Uncaught page exceptions are reported separately from console.error
        if level == ConsoleLevel::Error {
            let output = self.run_json_command(&["errors"]).await?;
            messages.extend(
                parse_console_output(&output)?
                    .into_iter()
                    .skip(self.errors_baseline)
                    .map(|m| ConsoleMessage {
                        level: ConsoleLevel::Error,
                        ..m
                    }),
            );
        }

        Ok(messages)
    }

    fn name(&self) -> &str {
        "agent-browser"
    }
}

/// Parse `console --json` / `errors --json` output
///
/// Accepts `{"data": {"messages": [..]}}`, `{"data": [..]}` or a bare array.
/// Entries carry `type`/`level` and `text`/`message`; a missing type means error.
pub(crate) fn parse_console_output(output: &str) -> Result<Vec<ConsoleMessage>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let entries: &[Value] = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match value.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(data) => ["messages", "errors", "logs"]
                .iter()
                .find_map(|key| data.get(*key).and_then(Value::as_array))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &[],
        },
        _ => &[],
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let message = entry
                .get("text")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str)?;
            let level = entry
                .get("type")
                .or_else(|| entry.get("level"))
                .and_then(Value::as_str)
                .map(ConsoleLevel::from_console_type)
                .unwrap_or(ConsoleLevel::Error);
            let location = entry.get("location").and_then(|loc| match loc {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => loc
                    .get("url")
                    .and_then(Value::as_str)
                    .map(|url| match loc.get("lineNumber").and_then(Value::as_u64) {
                        Some(line) => format!("{}:{}", url, line),
                        None => url.to_string(),
                    }),
                _ => None,
            });

            Some(ConsoleMessage {
                level,
                message: message.to_string(),
                location,
            })
        })
        .collect())
}

/// Opens one agent-browser session per role
pub struct AgentBrowserFactory {
    config: BrowserConfig,
}

impl AgentBrowserFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for AgentBrowserFactory {
    async fn create(&self, role: Role) -> Result<Box<dyn Driver>> {
        if !AgentBrowserDriver::is_available().await {
            return Err(HealthError::AgentBrowserNotFound);
        }
        let mut config = self.config.clone();
        config.session_name = format!("{}-{}", config.session_name, role);
        Ok(Box::new(AgentBrowserDriver::from_config(&config)))
    }
}

impl Default for AgentBrowserDriver {
    fn default() -> Self {
        Self::new("site-health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_creation() {
        let driver = AgentBrowserDriver::new("test-session");
        assert_eq!(driver.session_name, "test-session");
        assert!(!driver.headed);
        assert_eq!(driver.name(), "agent-browser");
    }

    #[test]
    fn test_at_ref() {
        assert_eq!(at_ref("e5"), "@e5");
        assert_eq!(at_ref("@e5"), "@e5");
    }

    #[test]
    fn test_parse_console_envelope() {
        let output = r#"{
            "success": true,
            "data": {
                "messages": [
                    {"type": "error", "text": "Uncaught TypeError: x is undefined",
                     "location": {"url": "http://localhost:5173/src/main.ts", "lineNumber": 12}},
                    {"type": "warning", "text": "[Vue warn]: missing prop"},
                    {"type": "log", "text": "mounted"}
                ]
            }
        }"#;

        let messages = parse_console_output(output).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].level, ConsoleLevel::Error);
        assert_eq!(
            messages[0].location.as_deref(),
            Some("http://localhost:5173/src/main.ts:12")
        );
        assert_eq!(messages[1].level, ConsoleLevel::Warning);
        assert_eq!(messages[2].level, ConsoleLevel::Info);
    }

    #[test]
    fn test_parse_page_errors_default_to_error() {
        let output = r#"[{"message": "ResizeObserver loop limit exceeded"}]"#;
        let messages = parse_console_output(output).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, ConsoleLevel::Error);
    }

    /// Stand-in agent-browser that refuses `--clear` and replays a fixed history
    #[cfg(unix)]
    fn fake_agent_browser(dir: &std::path::Path, history_readable: bool) -> String {
        use std::os::unix::fs::PermissionsExt;

        let history = if history_readable {
            r#"echo '[{"type":"error","text":"stale error from the previous page"}]'"#
        } else {
            "echo 'history unavailable' >&2; exit 1"
        };
        let script = format!(
            r#"#!/bin/sh
shift 2
case "$1 $2" in
  "console --clear"|"errors --clear") echo "clear not supported" >&2; exit 1 ;;
  "console --json") {history} ;;
  "errors --json") echo '[]' ;;
  *) exit 0 ;;
esac
"#
        );

        let path = dir.join("agent-browser");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_clear_does_not_leak_earlier_errors() {
        let readable_dir = tempfile::tempdir().unwrap();
        let unreadable_dir = tempfile::tempdir().unwrap();
        let readable = fake_agent_browser(readable_dir.path(), true);
        let unreadable = fake_agent_browser(unreadable_dir.path(), false);

        let mut driver = AgentBrowserDriver::new("fake").with_program(readable);
        driver.navigate("http://app/next").await.unwrap();
        assert_eq!(driver.console_baseline, 1);
        assert_eq!(driver.errors_baseline, 0);
        let errors = driver.console_messages(ConsoleLevel::Error).await.unwrap();
        assert!(errors.is_empty(), "{:?}", errors);

        let mut driver = AgentBrowserDriver::new("fake").with_program(unreadable);
        let err = driver.navigate("http://app/next").await.unwrap_err();
        assert!(matches!(err, HealthError::Driver(_)));
        assert!(err.to_string().contains("console history"));
    }

    #[test]
    fn test_parse_console_empty_and_invalid() {
        assert!(parse_console_output("  ").unwrap().is_empty());
        assert!(parse_console_output(r#"{"success": true}"#).unwrap().is_empty());
        assert!(matches!(
            parse_console_output("not json"),
            Err(HealthError::Json(_))
        ));
    }
}
