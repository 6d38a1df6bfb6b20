//! Scripted driver
//!
//! Deterministic in-memory [`Driver`] that replays per-route page scripts
//! and records every call. Used by the test suite and by `--dry-run`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{HealthError, Result, Role};
use crate::driver::snapshot::SnapshotNode;
use crate::driver::{ConsoleLevel, ConsoleMessage, Driver, DriverFactory};

/// What a route looks like to the scripted driver
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// Snapshot returned after navigating here; `None` = render failure
    pub snapshot: Option<SnapshotNode>,
    /// Console messages reported for the page
    pub console: Vec<ConsoleMessage>,
    /// Navigation fails with this message
    pub navigate_error: Option<String>,
    /// Snapshot calls fail with this message
    pub snapshot_error: Option<String>,
    /// Refs whose click/type calls fail
    pub failing_refs: HashSet<String>,
}

impl PageScript {
    /// A page rendering `snapshot`
    pub fn rendered(snapshot: SnapshotNode) -> Self {
        Self {
            snapshot: Some(snapshot),
            ..Default::default()
        }
    }

    /// A page that produces no snapshot
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn with_console_error(mut self, message: impl Into<String>) -> Self {
        self.console.push(ConsoleMessage::error(message));
        self
    }

    pub fn with_console_warning(mut self, message: impl Into<String>) -> Self {
        self.console.push(ConsoleMessage::warning(message));
        self
    }

    pub fn failing_navigation(mut self, message: impl Into<String>) -> Self {
        self.navigate_error = Some(message.into());
        self
    }

    pub fn failing_snapshot(mut self, message: impl Into<String>) -> Self {
        self.snapshot_error = Some(message.into());
        self
    }

    pub fn failing_ref(mut self, reference: impl Into<String>) -> Self {
        self.failing_refs.insert(reference.into());
        self
    }
}

/// A call observed by the scripted driver
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Navigate(String),
    Wait(Duration),
    Snapshot,
    Click(String),
    Type { reference: String, text: String },
    Console(ConsoleLevel),
}

/// In-memory driver replaying [`PageScript`]s keyed by route
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    base_url: String,
    scripts: HashMap<String, PageScript>,
    fallback: PageScript,
    current: Option<String>,
    calls: Vec<DriverCall>,
}

impl ScriptedDriver {
    /// Create a driver for routes under `base_url`; unknown routes render nothing
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            scripts: HashMap::new(),
            fallback: PageScript::blank(),
            current: None,
            calls: Vec::new(),
        }
    }

    /// Script a route
    pub fn with_page(mut self, route: impl Into<String>, script: PageScript) -> Self {
        self.scripts.insert(route.into(), script);
        self
    }

    /// Script every route without an explicit entry
    pub fn with_fallback(mut self, script: PageScript) -> Self {
        self.fallback = script;
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Navigated URLs, in order
    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Navigate(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Clicked refs, in order
    pub fn clicks(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Click(reference) => Some(reference.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Typed `(ref, text)` pairs, in order
    pub fn typed(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Type { reference, text } => Some((reference.as_str(), text.as_str())),
                _ => None,
            })
            .collect()
    }

    fn route_of(&self, url: &str) -> String {
        let route = url.strip_prefix(&self.base_url).unwrap_or(url);
        if route.is_empty() {
            "/".to_string()
        } else {
            route.to_string()
        }
    }

    fn script_for(&self, route: &str) -> &PageScript {
        self.scripts.get(route).unwrap_or(&self.fallback)
    }

    fn current_script(&self) -> Option<&PageScript> {
        self.current.as_deref().map(|route| self.script_for(route))
    }

    fn check_ref(&self, element: &str, reference: &str) -> Result<()> {
        let failing = self
            .current_script()
            .is_some_and(|script| script.failing_refs.contains(reference));
        if failing || reference.is_empty() {
            return Err(HealthError::driver(format!(
                "element '{}' ({}) is not interactive",
                element, reference
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.calls.push(DriverCall::Navigate(url.to_string()));
        let route = self.route_of(url);
        if let Some(message) = &self.script_for(&route).navigate_error {
            let err = HealthError::navigation(url, message.clone());
            self.current = None;
            return Err(err);
        }
        self.current = Some(route);
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) -> Result<()> {
        self.calls.push(DriverCall::Wait(duration));
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<Option<SnapshotNode>> {
        self.calls.push(DriverCall::Snapshot);
        match self.current_script() {
            Some(script) => match &script.snapshot_error {
                Some(message) => Err(HealthError::driver(message.clone())),
                None => Ok(script.snapshot.clone()),
            },
            None => Ok(None),
        }
    }

    async fn click(&mut self, element: &str, reference: &str) -> Result<()> {
        self.calls.push(DriverCall::Click(reference.to_string()));
        self.check_ref(element, reference)
    }

    async fn type_text(&mut self, element: &str, reference: &str, text: &str) -> Result<()> {
        self.calls.push(DriverCall::Type {
            reference: reference.to_string(),
            text: text.to_string(),
        });
        self.check_ref(element, reference)
    }

    async fn console_messages(&mut self, level: ConsoleLevel) -> Result<Vec<ConsoleMessage>> {
        self.calls.push(DriverCall::Console(level));
        Ok(self
            .current_script()
            .map(|script| {
                script
                    .console
                    .iter()
                    .filter(|m| m.level == level)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Hands out clones of a template [`ScriptedDriver`]
#[derive(Debug, Clone)]
pub struct ScriptedFactory {
    template: ScriptedDriver,
    unavailable: HashSet<Role>,
}

impl ScriptedFactory {
    pub fn new(template: ScriptedDriver) -> Self {
        Self {
            template,
            unavailable: HashSet::new(),
        }
    }

    /// Make session creation fail for `role`
    pub fn unavailable_for(mut self, role: Role) -> Self {
        self.unavailable.insert(role);
        self
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn create(&self, role: Role) -> Result<Box<dyn Driver>> {
        if self.unavailable.contains(&role) {
            return Err(HealthError::driver(format!(
                "no browser session available for {}",
                role
            )));
        }
        Ok(Box::new(self.template.clone()))
    }
}
