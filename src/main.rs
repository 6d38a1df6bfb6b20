//! Site Health - UI health-check crawler
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use site_health::driver::{
    AgentBrowserDriver, AgentBrowserFactory, PageScript, ScriptedDriver, ScriptedFactory,
    SnapshotNode,
};
use site_health::{Config, HealthError, HealthSummary, Role, RunOptions, SiteHealthMaster};
use tracing::{info, warn};

/// Site Health - crawl every page of every role and report what breaks
#[derive(Parser, Debug)]
#[command(name = "site-health")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the application under test
    #[arg(long, short = 'u')]
    base_url: Option<String>,

    /// Role to inspect (repeatable): admin, principal, teacher, parent
    #[arg(long = "role", short = 'r')]
    roles: Vec<Role>,

    /// Only inspect pages in this category (repeatable), e.g. centers, mobile
    #[arg(long = "category", short = 'c')]
    categories: Vec<String>,

    /// Skip the unauthenticated pages
    #[arg(long)]
    skip_common: bool,

    /// Stop a role at its first failed page
    #[arg(long)]
    stop_on_error: bool,

    /// Run roles concurrently, one browser session each
    #[arg(long)]
    concurrent: bool,

    /// Page registry TOML file (defaults to the built-in catalogue)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Browser session name
    #[arg(long)]
    session: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// List the pages that would be inspected and exit
    #[arg(long)]
    list: bool,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Run against a scripted browser where every page renders a single button
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if args.init_config {
        let path = Config::default().save_and_get_path()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(ref base_url) = args.base_url {
        config.target.base_url = base_url.clone();
    }

    if let Some(ref session) = args.session {
        config.browser.session_name = session.clone();
    }

    if args.headed {
        config.browser.headed = true;
    }

    if !args.roles.is_empty() {
        config.run.roles = args.roles.clone();
    }

    if !args.categories.is_empty() {
        config.run.categories = args.categories.clone();
    }

    if args.skip_common {
        config.run.skip_common = true;
    }

    if args.stop_on_error {
        config.run.continue_on_error = false;
    }

    if let Some(ref registry) = args.registry {
        config.registry_path = Some(registry.clone());
    }

    config.validate()?;

    let master = SiteHealthMaster::from_config(&config)?;
    let options = RunOptions::from_config(&config.run);
    let base_url = config.base_url().to_string();

    if args.list {
        for role in options.passes() {
            let pages: Vec<_> = master.registry().select(role, &options.categories).collect();
            println!("{} ({} pages)", role, pages.len());
            for page in pages {
                println!("  {:<48} {:<16} {}", page.route, page.category, page.name);
            }
        }
        return Ok(());
    }

    let report = if args.dry_run {
        let page = SnapshotNode::new("document")
            .child(SnapshotNode::new("button").named("OK").with_ref("e1"));
        let driver = ScriptedDriver::new(&base_url).with_fallback(PageScript::rendered(page));
        if args.concurrent {
            master
                .run_concurrent(&base_url, &options, &ScriptedFactory::new(driver))
                .await?
        } else {
            let mut driver = driver;
            master
                .run_site_health_master(&base_url, &options, &mut driver)
                .await
        }
    } else if args.concurrent {
        let factory = AgentBrowserFactory::new(config.browser.clone());
        master.run_concurrent(&base_url, &options, &factory).await?
    } else {
        if !AgentBrowserDriver::is_available().await {
            return Err(HealthError::AgentBrowserNotFound.into());
        }
        let mut driver = AgentBrowserDriver::from_config(&config.browser);
        info!(session = %config.browser.session_name, "Using agent-browser");

        let report = master
            .run_site_health_master(&base_url, &options, &mut driver)
            .await;

        if let Err(e) = driver.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        report
    };

    let summary = HealthSummary::from_report(&report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render_text());
    }

    if summary.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
