//! Site health master - coordinates the role agents of a run
//!
//! The unauthenticated pages go first, then each requested role. Failures
//! are data in the resulting [`HealthReport`]; only setup problems (config,
//! registry, browser sessions) are errors.

use futures::future::{join_all, try_join_all};
use tracing::info;

use crate::agent::role_agent::{RoleAgent, RoleRunOptions};
use crate::core::config::RunConfig;
use crate::core::{Config, HealthReport, Result, Role, RoleResult};
use crate::driver::{Driver, DriverFactory};
use crate::inspect::PageInspector;
use crate::registry::PageRegistry;

/// What a full run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Authenticated roles, in run order
    pub roles: Vec<Role>,
    /// Skip the unauthenticated pages
    pub skip_common: bool,
    /// Keep going within a role after a failed page
    pub continue_on_error: bool,
    /// Only pages in these categories; empty means all
    pub categories: Vec<String>,
}

impl RunOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            roles: config.roles.clone(),
            skip_common: config.skip_common,
            continue_on_error: config.continue_on_error,
            categories: config.categories.clone(),
        }
    }

    /// Roles in the order they are run; the common pass first, each role once
    pub fn passes(&self) -> Vec<Role> {
        let mut passes = Vec::with_capacity(self.roles.len() + 1);
        if !self.skip_common {
            passes.push(Role::Common);
        }
        for role in &self.roles {
            if *role != Role::Common && !passes.contains(role) {
                passes.push(*role);
            }
        }
        passes
    }

    /// Options for one pass. The common pass always visits every page.
    pub fn for_role(&self, role: Role) -> RoleRunOptions {
        RoleRunOptions {
            categories: self.categories.clone(),
            continue_on_error: role == Role::Common || self.continue_on_error,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            roles: Role::AUTHENTICATED.to_vec(),
            skip_common: false,
            continue_on_error: true,
            categories: Vec::new(),
        }
    }
}

/// Runs role agents over a page registry
pub struct SiteHealthMaster {
    registry: PageRegistry,
    inspector: PageInspector,
}

impl SiteHealthMaster {
    pub fn new(registry: PageRegistry, inspector: PageInspector) -> Self {
        Self {
            registry,
            inspector,
        }
    }

    /// Registry from `registry_path` (built-in catalogue otherwise) and an inspector from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = match &config.registry_path {
            Some(path) => PageRegistry::load(path)?,
            None => PageRegistry::builtin(),
        };
        Ok(Self::new(registry, PageInspector::from_config(config)?))
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn inspector(&self) -> &PageInspector {
        &self.inspector
    }

    fn agent(&self) -> RoleAgent<'_> {
        RoleAgent::new(&self.registry, &self.inspector)
    }

    /// Run one role's pages
    pub async fn run_role_agent(
        &self,
        base_url: &str,
        role: Role,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.agent().run(base_url, role, options, driver).await
    }

    pub async fn run_common_agent(
        &self,
        base_url: &str,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.run_role_agent(base_url, Role::Common, options, driver).await
    }

    pub async fn run_admin_agent(
        &self,
        base_url: &str,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.run_role_agent(base_url, Role::Admin, options, driver).await
    }

    pub async fn run_principal_agent(
        &self,
        base_url: &str,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.run_role_agent(base_url, Role::Principal, options, driver).await
    }

    pub async fn run_teacher_agent(
        &self,
        base_url: &str,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.run_role_agent(base_url, Role::Teacher, options, driver).await
    }

    pub async fn run_parent_agent(
        &self,
        base_url: &str,
        options: &RoleRunOptions,
        driver: &mut dyn Driver,
    ) -> RoleResult {
        self.run_role_agent(base_url, Role::Parent, options, driver).await
    }

    /// Run every pass sequentially on one driver session
    pub async fn run_site_health_master(
        &self,
        base_url: &str,
        options: &RunOptions,
        driver: &mut dyn Driver,
    ) -> HealthReport {
        let passes = options.passes();
        info!(
            base_url,
            passes = ?passes,
            continue_on_error = options.continue_on_error,
            "Starting site health run"
        );

        let mut report = HealthReport::new();
        for role in passes {
            let result = self
                .run_role_agent(base_url, role, &options.for_role(role), driver)
                .await;
            report.merge(result);
        }
        report.finish();

        log_report(&report);
        report
    }

    /// Run every pass concurrently, each on its own session from `factory`
    ///
    /// All sessions are opened before any page is visited; a session that
    /// cannot be opened aborts the run.
    pub async fn run_concurrent(
        &self,
        base_url: &str,
        options: &RunOptions,
        factory: &dyn DriverFactory,
    ) -> Result<HealthReport> {
        let passes = options.passes();
        info!(base_url, passes = ?passes, "Starting concurrent site health run");

        let mut drivers = try_join_all(passes.iter().map(|role| factory.create(*role))).await?;
        let role_options: Vec<RoleRunOptions> =
            passes.iter().map(|role| options.for_role(*role)).collect();

        let agent = self.agent();
        let runs = passes
            .iter()
            .zip(&role_options)
            .zip(drivers.iter_mut())
            .map(|((role, opts), driver)| agent.run(base_url, *role, opts, driver.as_mut()));
        let results = join_all(runs).await;

        let mut report = HealthReport::new();
        for result in results {
            report.merge(result);
        }
        report.finish();

        log_report(&report);
        Ok(report)
    }
}

fn log_report(report: &HealthReport) {
    info!(
        total = report.total_pages,
        completed = report.completed_pages,
        failed = report.failed_pages,
        skipped = report.skipped_pages(),
        "Site health run finished"
    );
}
