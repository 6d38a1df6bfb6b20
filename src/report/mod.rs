//! Run statistics and the final report
//!
//! [`HealthSummary::from_report`] is a pure view over a finished
//! [`HealthReport`]: rates, per-role and per-module breakdowns, the failed
//! pages and a list of recommendations.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{HealthReport, PageStatus, Role};
use crate::inspect::FailureKind;

/// Roles below this success rate get a recommendation
const ROLE_RATE_THRESHOLD: f64 = 80.0;

/// `completed / total` as a percentage, `None` for an empty run
pub fn success_rate(completed: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(completed as f64 / total as f64 * 100.0)
    }
}

/// Two decimals and a percent sign, `N/A` when there is no rate
pub fn format_success_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleBreakdown {
    pub role: Role,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub success_rate: Option<f64>,
}

/// Pages grouped by category across every role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleBreakdown {
    pub category: String,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedPage {
    pub route: String,
    pub name: String,
    pub error_count: usize,
    pub error_details: Vec<String>,
}

impl From<&PageStatus> for FailedPage {
    fn from(status: &PageStatus) -> Self {
        Self {
            route: status.route.clone(),
            name: status.name.clone(),
            error_count: status.error_count,
            error_details: status.error_details.clone(),
        }
    }
}

/// Failed pages of one role, in inspection order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleFailures {
    pub role: Role,
    pub pages: Vec<FailedPage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(
        priority: Priority,
        category: &str,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            category: category.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Pages with at least one failure of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    pub render: usize,
    pub interaction: usize,
    pub driver: usize,
    /// Console errors summed over every page
    pub console_errors: usize,
}

impl FailureCounts {
    fn tally<'a>(pages: impl Iterator<Item = &'a PageStatus>) -> Self {
        let mut counts = Self::default();
        for page in pages {
            counts.console_errors += page.console_error_count;
            let has = |kind| page.error_details.iter().any(|d| FailureKind::of(d) == kind);
            if has(FailureKind::Render) {
                counts.render += 1;
            }
            if has(FailureKind::Interaction) {
                counts.interaction += 1;
            }
            if has(FailureKind::Driver) {
                counts.driver += 1;
            }
        }
        counts
    }
}

/// Everything the final report shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub total_pages: usize,
    pub completed_pages: usize,
    pub failed_pages: usize,
    pub skipped_pages: usize,
    pub success_rate: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub roles: Vec<RoleBreakdown>,
    pub modules: Vec<ModuleBreakdown>,
    pub failures: Vec<RoleFailures>,
    pub failure_counts: FailureCounts,
    pub recommendations: Vec<Recommendation>,
}

impl HealthSummary {
    pub fn from_report(report: &HealthReport) -> Self {
        let roles: Vec<RoleBreakdown> = report
            .per_role
            .values()
            .map(|r| RoleBreakdown {
                role: r.role,
                total: r.total,
                completed: r.completed,
                failed: r.failed,
                skipped: r.skipped,
                success_rate: success_rate(r.completed, r.total),
            })
            .collect();

        let mut modules: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for page in report.per_role.values().flat_map(|r| &r.pages) {
            let entry = modules.entry(page.category.as_str()).or_default();
            if page.is_failed() {
                entry.1 += 1;
            } else {
                entry.0 += 1;
            }
        }
        let modules = modules
            .into_iter()
            .map(|(category, (completed, failed))| ModuleBreakdown {
                category: category.to_string(),
                total: completed + failed,
                completed,
                failed,
                success_rate: success_rate(completed, completed + failed),
            })
            .collect();

        let failures = report
            .per_role
            .values()
            .filter(|r| r.failed > 0)
            .map(|r| RoleFailures {
                role: r.role,
                pages: r.failed_pages().map(FailedPage::from).collect(),
            })
            .collect();

        let failure_counts =
            FailureCounts::tally(report.per_role.values().flat_map(|r| r.pages.iter()));
        let skipped_pages = report.skipped_pages();
        let recommendations = recommend(report.failed_pages, skipped_pages, &failure_counts, &roles);

        Self {
            total_pages: report.total_pages,
            completed_pages: report.completed_pages,
            failed_pages: report.failed_pages,
            skipped_pages,
            success_rate: success_rate(report.completed_pages, report.total_pages),
            started_at: report.started_at,
            generated_at: report.generated_at,
            roles,
            modules,
            failures,
            failure_counts,
            recommendations,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed_pages > 0
    }

    /// Console report
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Site health report");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Total pages:   {}", self.total_pages);
        let _ = writeln!(out, "Completed:     {}", self.completed_pages);
        let _ = writeln!(out, "Failed:        {}", self.failed_pages);
        if self.skipped_pages > 0 {
            let _ = writeln!(out, "Skipped:       {}", self.skipped_pages);
        }
        let _ = writeln!(
            out,
            "Success rate:  {}",
            format_success_rate(self.success_rate)
        );
        let duration = (self.generated_at - self.started_at).num_seconds().max(0);
        let _ = writeln!(out, "Duration:      {}s", duration);

        let _ = writeln!(out, "\nBy role:");
        for role in self.roles.iter().filter(|r| r.total > 0 || r.skipped > 0) {
            let _ = write!(
                out,
                "  {:<10} {}/{} ({})",
                role.role,
                role.completed,
                role.total,
                format_success_rate(role.success_rate)
            );
            if role.skipped > 0 {
                let _ = write!(out, ", {} skipped", role.skipped);
            }
            out.push('\n');
        }

        if !self.modules.is_empty() {
            let _ = writeln!(out, "\nBy module:");
            for module in &self.modules {
                let _ = writeln!(
                    out,
                    "  {:<24} {}/{} ({})",
                    module.category,
                    module.completed,
                    module.total,
                    format_success_rate(module.success_rate)
                );
            }
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\nFailures:");
            for group in &self.failures {
                for page in &group.pages {
                    let _ = writeln!(
                        out,
                        "  [{}] {} ({}) - {} error(s)",
                        group.role, page.name, page.route, page.error_count
                    );
                    for detail in &page.error_details {
                        let _ = writeln!(out, "      - {}", detail);
                    }
                }
            }
        }

        if !self.recommendations.is_empty() {
            let _ = writeln!(out, "\nRecommendations:");
            for rec in &self.recommendations {
                let _ = writeln!(out, "  [{}] {}: {}", rec.priority, rec.title, rec.description);
            }
        }

        let _ = writeln!(out, "{}", rule);
        out
    }
}

fn recommend(
    failed_pages: usize,
    skipped_pages: usize,
    counts: &FailureCounts,
    roles: &[RoleBreakdown],
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if failed_pages > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "stability",
            "Fix failing pages",
            format!("{} page(s) failed inspection; start with the failures listed above", failed_pages),
        ));
    }
    if counts.render > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "rendering",
            "Pages do not render",
            format!(
                "{} page(s) produced no accessibility tree; check routing, lazy-loaded chunks and permission guards",
                counts.render
            ),
        ));
    }
    if counts.console_errors > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "console",
            "Console errors",
            format!(
                "{} console error(s) were reported; resolve uncaught exceptions and failed requests",
                counts.console_errors
            ),
        ));
    }
    if counts.driver > 0 {
        recs.push(Recommendation::new(
            Priority::High,
            "availability",
            "Pages unreachable",
            format!(
                "{} page(s) failed to load or timed out; check that the application is running and reachable",
                counts.driver
            ),
        ));
    }
    if counts.interaction > 0 {
        recs.push(Recommendation::new(
            Priority::Medium,
            "interaction",
            "Broken interactions",
            format!(
                "{} page(s) had clicks or inputs that failed; check disabled, hidden or detached controls",
                counts.interaction
            ),
        ));
    }
    for role in roles {
        if let Some(rate) = role.success_rate.filter(|rate| *rate < ROLE_RATE_THRESHOLD) {
            recs.push(Recommendation::new(
                Priority::Medium,
                "role",
                format!("Low success rate for {}", role.role),
                format!(
                    "{} pages passed {}; review permissions and menu configuration for this role",
                    role.role,
                    format_success_rate(Some(rate))
                ),
            ));
        }
    }
    if skipped_pages > 0 {
        recs.push(Recommendation::new(
            Priority::Low,
            "coverage",
            "Pages skipped",
            format!(
                "{} page(s) were not inspected because the run stopped on error; rerun without --stop-on-error for full coverage",
                skipped_pages
            ),
        ));
    }

    recs.sort_by_key(|r| r.priority);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PageDescriptor, RoleResult};
    use crate::inspect::{CONSOLE_ERROR_PREFIX, RENDER_FAILURE};

    fn page(route: &str, role: Role, failure: Option<Vec<String>>) -> PageStatus {
        let mut status = PageStatus::pending(&PageDescriptor::new(route, route, role));
        status.begin();
        match failure {
            Some(details) => {
                status.console_error_count = details
                    .iter()
                    .filter(|d| d.starts_with(CONSOLE_ERROR_PREFIX))
                    .count();
                status.fail(details.len(), details);
            }
            None => {
                status.complete();
            }
        }
        status
    }

    fn report() -> HealthReport {
        let mut admin = RoleResult::new(Role::Admin);
        admin.record(page("/system/roles", Role::Admin, None));
        admin.record(page("/centers/A", Role::Admin, Some(vec![RENDER_FAILURE.to_string()])));
        admin.record(page(
            "/centers/B",
            Role::Admin,
            Some(vec![
                "点击失败: 保存 - Driver error: detached".to_string(),
                format!("{}boom", CONSOLE_ERROR_PREFIX),
            ]),
        ));

        let mut common = RoleResult::new(Role::Common);
        common.record(page("/login", Role::Common, None));

        let mut report = HealthReport::new();
        report.merge(admin);
        report.merge(common);
        report.finish();
        report
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), None);
        assert_eq!(format_success_rate(success_rate(0, 0)), "N/A");
        assert_eq!(format_success_rate(success_rate(1, 3)), "33.33%");
        assert_eq!(format_success_rate(success_rate(4, 4)), "100.00%");
    }

    #[test]
    fn test_summary_counts() {
        let summary = HealthSummary::from_report(&report());
        assert_eq!(summary.total_pages, 4);
        assert_eq!(summary.completed_pages, 2);
        assert_eq!(summary.failed_pages, 2);
        assert_eq!(summary.success_rate, Some(50.0));
        assert!(summary.has_failures());

        // Role order follows the role enum
        let roles: Vec<Role> = summary.roles.iter().map(|r| r.role).collect();
        assert_eq!(roles, vec![Role::Common, Role::Admin]);

        let centers = summary.modules.iter().find(|m| m.category == "centers").unwrap();
        assert_eq!((centers.total, centers.failed), (2, 2));
        assert_eq!(centers.success_rate, Some(0.0));

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].role, Role::Admin);
        assert_eq!(summary.failures[0].pages[0].route, "/centers/A");

        assert_eq!(
            summary.failure_counts,
            FailureCounts {
                render: 1,
                interaction: 1,
                driver: 0,
                console_errors: 1,
            }
        );
    }

    #[test]
    fn test_recommendations() {
        let summary = HealthSummary::from_report(&report());
        let titles: Vec<&str> = summary.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Fix failing pages",
                "Pages do not render",
                "Console errors",
                "Broken interactions",
                "Low success rate for admin",
            ]
        );
        assert!(summary
            .recommendations
            .windows(2)
            .all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_skipped_pages_recommended() {
        let mut teacher = RoleResult::new(Role::Teacher);
        teacher.record(page("/t/1", Role::Teacher, None));
        teacher.skipped = 3;
        let mut report = HealthReport::new();
        report.merge(teacher);

        let summary = HealthSummary::from_report(&report);
        assert_eq!(summary.skipped_pages, 3);
        assert_eq!(summary.recommendations.len(), 1);
        assert_eq!(summary.recommendations[0].priority, Priority::Low);
        assert!(summary.render_text().contains("1/1 (100.00%), 3 skipped"));
    }

    #[test]
    fn test_empty_report() {
        let summary = HealthSummary::from_report(&HealthReport::new());
        assert_eq!(summary.success_rate, None);
        assert!(summary.recommendations.is_empty());
        assert!(summary.render_text().contains("Success rate:  N/A"));
    }

    #[test]
    fn test_render_text_lists_failures() {
        let text = HealthSummary::from_report(&report()).render_text();
        assert!(text.contains("Success rate:  50.00%"));
        assert!(text.contains("[admin] /centers/A (/centers/A) - 1 error(s)"));
        assert!(text.contains(&format!("      - {}", RENDER_FAILURE)));
        assert!(text.contains("[HIGH] Fix failing pages"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(HealthSummary::from_report(&report())).unwrap();
        assert_eq!(json["success_rate"], 50.0);
        assert_eq!(json["roles"][0]["role"], "common");
        assert_eq!(json["recommendations"][0]["priority"], "high");
    }
}
