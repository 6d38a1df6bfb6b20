//! Shared types used across site-health modules
//!
//! Contains the page catalogue model, the per-page status state machine,
//! classified element handles and the run aggregates.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::HealthError;

/// User persona whose page subset is exercised
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Pages reachable without authentication
    Common,
    Admin,
    Principal,
    Teacher,
    Parent,
}

impl Role {
    /// The authenticated roles, in default run order
    pub const AUTHENTICATED: [Role; 4] = [Role::Admin, Role::Principal, Role::Teacher, Role::Parent];

    /// Lowercase identifier used in config files and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Common => "common",
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "common" | "public" => Ok(Role::Common),
            "admin" => Ok(Role::Admin),
            "principal" => Ok(Role::Principal),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(HealthError::config(format!(
                "Unknown role '{}'. Available: common, admin, principal, teacher, parent",
                other
            ))),
        }
    }
}

/// Category of a route: its first path segment, `home` for the root
pub fn category_of(route: &str) -> String {
    route
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_lowercase())
        .unwrap_or_else(|| "home".to_string())
}

/// A page the crawler is expected to visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Route relative to the base URL, e.g. `/system/roles`
    pub route: String,
    /// Human-readable page name
    pub name: String,
    /// Role whose session visits the page
    pub role: Role,
    /// Module the page belongs to
    pub category: String,
}

impl PageDescriptor {
    /// Create a descriptor whose category is derived from the route
    pub fn new(route: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        let route = route.into();
        let category = category_of(&route);
        Self {
            route,
            name: name.into(),
            role,
            category,
        }
    }

    /// Override the derived category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Lifecycle of a single page inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    Pending,
    Testing,
    Completed,
    Failed,
}

impl PageState {
    /// Whether the state ends the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, PageState::Completed | PageState::Failed)
    }
}

impl std::fmt::Display for PageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageState::Pending => write!(f, "pending"),
            PageState::Testing => write!(f, "testing"),
            PageState::Completed => write!(f, "completed"),
            PageState::Failed => write!(f, "failed"),
        }
    }
}

/// Result record for one page of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStatus {
    pub route: String,
    pub name: String,
    pub category: String,
    pub state: PageState,
    /// Driver failures + interaction failures + console errors
    pub error_count: usize,
    /// Warning-level console messages seen on the page
    pub warning_count: usize,
    /// Console errors that survived filtering
    pub console_error_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_details: Vec<String>,
}

impl PageStatus {
    /// Create a pending status for a descriptor
    pub fn pending(descriptor: &PageDescriptor) -> Self {
        Self {
            route: descriptor.route.clone(),
            name: descriptor.name.clone(),
            category: descriptor.category.clone(),
            state: PageState::Pending,
            error_count: 0,
            warning_count: 0,
            console_error_count: 0,
            timestamp: None,
            error_details: Vec::new(),
        }
    }

    /// Move `Pending` to `Testing`. Returns false if the status was not pending.
    pub fn begin(&mut self) -> bool {
        if self.state != PageState::Pending {
            tracing::warn!(route = %self.route, state = %self.state, "ignoring begin on non-pending page");
            return false;
        }
        self.state = PageState::Testing;
        true
    }

    /// Move `Testing` to `Completed`
    pub fn complete(&mut self) -> bool {
        if !self.can_finish() {
            return false;
        }
        self.state = PageState::Completed;
        self.error_count = 0;
        self.timestamp = Some(Utc::now());
        true
    }

    /// Move `Testing` to `Failed`
    pub fn fail(&mut self, error_count: usize, details: Vec<String>) -> bool {
        if !self.can_finish() {
            return false;
        }
        self.state = PageState::Failed;
        self.error_count = error_count;
        self.error_details = details;
        self.timestamp = Some(Utc::now());
        true
    }

    fn can_finish(&self) -> bool {
        if self.state != PageState::Testing {
            tracing::warn!(route = %self.route, state = %self.state, "ignoring finish on page not under test");
            return false;
        }
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_failed(&self) -> bool {
        self.state == PageState::Failed
    }
}

/// Category of a classified snapshot node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Button,
    Input,
    Card,
    Table,
    Stat,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Button => write!(f, "button"),
            ElementKind::Input => write!(f, "input"),
            ElementKind::Card => write!(f, "card"),
            ElementKind::Table => write!(f, "table"),
            ElementKind::Stat => write!(f, "stat"),
        }
    }
}

/// Handle to an element of one snapshot
///
/// `reference` is only valid against the snapshot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub description: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub kind: ElementKind,
}

impl ElementRef {
    pub fn new(description: impl Into<String>, reference: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            description: description.into(),
            reference: reference.into(),
            kind,
        }
    }
}

/// Aggregate over one role's run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResult {
    pub role: Role,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Descriptors never attempted after an early stop
    pub skipped: usize,
    pub pages: Vec<PageStatus>,
}

impl RoleResult {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            total: 0,
            completed: 0,
            failed: 0,
            skipped: 0,
            pages: Vec::new(),
        }
    }

    /// Fold a terminal status into the aggregate. Non-terminal statuses are rejected.
    pub fn record(&mut self, status: PageStatus) -> bool {
        match status.state {
            PageState::Completed => self.completed += 1,
            PageState::Failed => self.failed += 1,
            state => {
                tracing::warn!(route = %status.route, %state, "refusing to aggregate non-terminal page");
                return false;
            }
        }
        self.total += 1;
        self.pages.push(status);
        true
    }

    /// Routes of failed pages, in inspection order
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageStatus> {
        self.pages.iter().filter(|p| p.is_failed())
    }

    pub fn is_consistent(&self) -> bool {
        self.completed + self.failed == self.total && self.total == self.pages.len()
    }
}

/// Aggregate over every role of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total_pages: usize,
    pub completed_pages: usize,
    pub failed_pages: usize,
    pub per_role: BTreeMap<Role, RoleResult>,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    /// Start an empty report
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            total_pages: 0,
            completed_pages: 0,
            failed_pages: 0,
            per_role: BTreeMap::new(),
            started_at: now,
            generated_at: now,
        }
    }

    /// Merge a role's result. A role merged twice has its counters summed.
    pub fn merge(&mut self, result: RoleResult) {
        self.total_pages += result.total;
        self.completed_pages += result.completed;
        self.failed_pages += result.failed;

        match self.per_role.get_mut(&result.role) {
            Some(existing) => {
                existing.total += result.total;
                existing.completed += result.completed;
                existing.failed += result.failed;
                existing.skipped += result.skipped;
                existing.pages.extend(result.pages);
            }
            None => {
                self.per_role.insert(result.role, result);
            }
        }
    }

    /// Stamp the generation time
    pub fn finish(&mut self) {
        self.generated_at = Utc::now();
    }

    pub fn skipped_pages(&self) -> usize {
        self.per_role.values().map(|r| r.skipped).sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.completed_pages + self.failed_pages == self.total_pages
            && self.per_role.values().all(RoleResult::is_consistent)
            && self.per_role.values().map(|r| r.total).sum::<usize>() == self.total_pages
    }
}

impl Default for HealthReport {
    fn default() -> Self {
        Self::new()
    }
}
