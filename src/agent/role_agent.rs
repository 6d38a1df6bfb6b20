//! Role agent
//!
//! Inspects one role's pages in registry order on a single driver session
//! and folds the statuses into a [`RoleResult`].

use tracing::{info, warn};

use crate::core::{PageDescriptor, Role, RoleResult};
use crate::driver::Driver;
use crate::inspect::PageInspector;
use crate::registry::PageRegistry;

/// Per-role run switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRunOptions {
    /// Only pages in these categories; empty means all
    pub categories: Vec<String>,
    /// Keep going after a failed page
    pub continue_on_error: bool,
}

impl Default for RoleRunOptions {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            continue_on_error: true,
        }
    }
}

/// Runs the pages of one role
pub struct RoleAgent<'a> {
    registry: &'a PageRegistry,
    inspector: &'a PageInspector,
}

impl<'a> RoleAgent<'a> {
    pub fn new(registry: &'a PageRegistry, inspector: &'a PageInspector) -> Self {
        Self {
            registry,
            inspector,
        }
    }

    /// Pages the agent would visit for `role`
    pub fn plan(&self, role: Role, options: &RoleRunOptions) -> Vec<&'a PageDescriptor> {
        self.registry.select(role, &options.categories).collect()
    }

    /// Inspect every selected page of `role`
    ///
    /// With `continue_on_error` off, the first failed page ends the run and
    /// the remaining pages are counted as skipped.
    pub async fn run(
        &self,
        base_url: &str,
        role: Role,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        let pages = self.plan(role, options);
        let mut result = RoleResult::new(role);

        info!(%role, pages = pages.len(), driver = driver.name(), "Starting role");

        for (index, page) in pages.iter().enumerate() {
            let status = self.inspector.inspect(base_url, page, driver).await;
            let failed = status.is_failed();
            result.record(status);

            if failed && !options.continue_on_error {
                result.skipped = pages.len() - index - 1;
                warn!(%role, route = %page.route, skipped = result.skipped, "Stopping after failed page");
                break;
            }
        }

        log_summary(&result);
        result
    }
}

fn log_summary(result: &RoleResult) {
    let rate = if result.total == 0 {
        "N/A".to_string()
    } else {
        format!("{:.2}%", result.completed as f64 / result.total as f64 * 100.0)
    };

    info!(
        role = %result.role,
        total = result.total,
        completed = result.completed,
        failed = result.failed,
        skipped = result.skipped,
        success_rate = %rate,
        "Role finished"
    );

    for page in result.failed_pages() {
        warn!(
            role = %result.role,
            route = %page.route,
            name = %page.name,
            "Failed page: {}",
            page.error_details.join("; ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{PageScript, ScriptedDriver, SnapshotNode};
    use crate::inspect::InspectionSettings;

    fn fixture() -> (PageRegistry, PageInspector) {
        let registry = (1..=5)
            .map(|i| PageDescriptor::new(format!("/teacher-center/p{}", i), format!("页面{}", i), Role::Teacher))
            .chain(std::iter::once(PageDescriptor::new("/mobile/x", "移动", Role::Teacher)))
            .collect();
        let inspector =
            PageInspector::default().with_settings(InspectionSettings::default().without_waits());
        (registry, inspector)
    }

    #[test]
    fn test_plan_respects_categories() {
        let (registry, inspector) = fixture();
        let agent = RoleAgent::new(&registry, &inspector);

        assert_eq!(agent.plan(Role::Teacher, &RoleRunOptions::default()).len(), 6);
        let options = RoleRunOptions {
            categories: vec!["mobile".to_string()],
            ..Default::default()
        };
        assert_eq!(agent.plan(Role::Teacher, &options).len(), 1);
        assert!(agent.plan(Role::Parent, &RoleRunOptions::default()).is_empty());
    }

    #[test]
    fn test_plan_outlives_options() {
        let (registry, inspector) = fixture();
        let agent = RoleAgent::new(&registry, &inspector);

        let plan = {
            let options = RoleRunOptions {
                categories: vec!["teacher-center".to_string()],
                ..Default::default()
            };
            agent.plan(Role::Teacher, &options)
        };
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[0].route, "/teacher-center/p1");
    }

    #[tokio::test]
    async fn test_empty_role() {
        let (registry, inspector) = fixture();
        let agent = RoleAgent::new(&registry, &inspector);
        let mut driver = ScriptedDriver::new("http://app");

        let result = agent
            .run("http://app", Role::Admin, &RoleRunOptions::default(), &mut driver)
            .await;
        assert_eq!(result.total, 0);
        assert!(result.pages.is_empty());
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_pages_visited_in_order() {
        let (registry, inspector) = fixture();
        let agent = RoleAgent::new(&registry, &inspector);
        let mut driver = ScriptedDriver::new("http://app")
            .with_fallback(PageScript::rendered(SnapshotNode::new("document")));

        let result = agent
            .run("http://app", Role::Teacher, &RoleRunOptions::default(), &mut driver)
            .await;
        assert_eq!(result.total, 6);
        assert_eq!(result.completed, 6);
        assert!(result.is_consistent());
        assert_eq!(driver.navigations()[0], "http://app/teacher-center/p1");
        assert_eq!(driver.navigations()[5], "http://app/mobile/x");
    }
}
