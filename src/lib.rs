//! Site Health - UI health-check crawler
//!
//! Visits every route of a multi-role web application through a browser
//! driver, exercises a bounded set of interactive elements per page and
//! aggregates pass/fail results with captured console errors.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Registry**: The page catalogue, grouped by role and category
//! - **Driver**: Browser session abstraction with agent-browser and scripted implementations
//! - **Inspect**: Element classifier, interaction strategies and the page inspector
//! - **Agent**: Role agents and the run coordinator
//! - **Report**: Statistics, recommendations and report rendering
//!
//! # Usage
//!
//! ```rust,no_run
//! use site_health::agent::{RunOptions, SiteHealthMaster};
//! use site_health::driver::AgentBrowserDriver;
//! use site_health::report::HealthSummary;
//! use site_health::Config;
//!
//! #[tokio::main]
//! async fn main() -> site_health::Result<()> {
//!     let config = Config::load()?;
//!     let master = SiteHealthMaster::from_config(&config)?;
//!     let mut driver = AgentBrowserDriver::from_config(&config.browser);
//!
//!     let report = master
//!         .run_site_health_master(config.base_url(), &RunOptions::default(), &mut driver)
//!         .await;
//!     println!("{}", HealthSummary::from_report(&report).render_text());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod core;
pub mod driver;
pub mod inspect;
pub mod registry;
pub mod report;

// Re-export commonly used items
pub use agent::{RoleAgent, RunOptions, SiteHealthMaster};
pub use core::{Config, HealthError, HealthReport, Result, Role};
pub use registry::PageRegistry;
pub use report::HealthSummary;
