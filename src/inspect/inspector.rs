//! Page inspector
//!
//! Drives one page through `Start → Navigated → Snapshotted → Interacted →
//! ErrorsCollected` and judges it `Completed` or `Failed`. Inspection never
//! returns an error: driver failures become a failed [`PageStatus`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::config::InspectionConfig;
use crate::core::{Config, ElementRef, PageDescriptor, PageStatus, Result};
use crate::driver::{ConsoleLevel, Driver};
use crate::inspect::classifier::{Classification, Classifier, ElementCounts};
use crate::inspect::strategy::{self, markers, InteractionStrategy, StrategyTable};

/// Detail recorded when a page produces no snapshot
pub const RENDER_FAILURE: &str = "页面无法渲染";

/// Prefix of console errors in `error_details`
pub const CONSOLE_ERROR_PREFIX: &str = "控制台错误: ";

const CLICK_FAILURE: &str = "点击失败";
const TYPE_FAILURE: &str = "输入失败";
const RENDER_AFTER_CLICK: &str = "点击后页面无法渲染";
const MISSING_LOGIN_BUTTON: &str = "未找到登录按钮";
const MISSING_REGISTER_BUTTON: &str = "未找到注册按钮";

/// Where a recorded failure detail came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The page produced no snapshot
    Render,
    /// A click, fill or submit went wrong
    Interaction,
    /// An error-level console message
    Console,
    /// Navigation, timeout or another driver error
    Driver,
}

impl FailureKind {
    /// Classify an `error_details` entry
    pub fn of(detail: &str) -> Self {
        if detail == RENDER_FAILURE {
            FailureKind::Render
        } else if detail.starts_with(CONSOLE_ERROR_PREFIX) {
            FailureKind::Console
        } else if [
            CLICK_FAILURE,
            TYPE_FAILURE,
            RENDER_AFTER_CLICK,
            MISSING_LOGIN_BUTTON,
            MISSING_REGISTER_BUTTON,
        ]
        .iter()
        .any(|prefix| detail.starts_with(prefix))
        {
            FailureKind::Interaction
        } else {
            FailureKind::Driver
        }
    }
}

/// Timing and limits for an inspection
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionSettings {
    /// Settle time after navigating to a generic page
    pub settle: Duration,
    /// Settle time for login, registration, error and device pages
    pub quick_settle: Duration,
    /// Pause after each click or submit
    pub post_action: Duration,
    pub max_clicks: usize,
    pub max_fills: usize,
    /// Collapse identical console errors within a page
    pub dedup_console_errors: bool,
    pub username: String,
    pub password: String,
}

impl InspectionSettings {
    pub fn from_config(config: &InspectionConfig) -> Self {
        Self {
            settle: secs(config.settle_secs),
            quick_settle: secs(config.quick_settle_secs),
            post_action: secs(config.post_action_secs),
            max_clicks: config.max_clicks,
            max_fills: config.max_fills,
            dedup_console_errors: config.dedup_console_errors,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Same limits with every wait set to zero
    pub fn without_waits(mut self) -> Self {
        self.settle = Duration::ZERO;
        self.quick_settle = Duration::ZERO;
        self.post_action = Duration::ZERO;
        self
    }

    /// Settle interval after navigation for a strategy
    pub fn settle_for(&self, strategy: InteractionStrategy) -> Duration {
        if strategy.quick_settle() {
            self.quick_settle
        } else {
            self.settle
        }
    }
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self::from_config(&InspectionConfig::default())
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

/// Join a base URL and a route with exactly one slash
pub fn page_url(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

/// Where an inspection got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Navigated,
    Snapshotted,
    Interacted,
    ErrorsCollected,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Start => write!(f, "start"),
            Stage::Navigated => write!(f, "navigated"),
            Stage::Snapshotted => write!(f, "snapshotted"),
            Stage::Interacted => write!(f, "interacted"),
            Stage::ErrorsCollected => write!(f, "errors_collected"),
        }
    }
}

/// What a finished walk through the stages observed
enum Verdict {
    Unrendered,
    Inspected(Findings),
}

struct Findings {
    counts: ElementCounts,
    interaction_errors: Vec<String>,
    console_errors: Vec<String>,
    warning_count: usize,
}

/// Inspects single pages through a [`Driver`]
#[derive(Debug, Clone, Default)]
pub struct PageInspector {
    classifier: Classifier,
    strategies: StrategyTable,
    settings: InspectionSettings,
}

impl PageInspector {
    pub fn new(classifier: Classifier, strategies: StrategyTable, settings: InspectionSettings) -> Self {
        Self {
            classifier,
            strategies,
            settings,
        }
    }

    /// Build from configuration; custom classifier rules replace the built-in table
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Classifier::from_rules_or_builtin(&config.classifier_rules)?,
            StrategyTable::builtin(),
            InspectionSettings::from_config(&config.inspection),
        ))
    }

    pub fn with_settings(mut self, settings: InspectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_strategies(mut self, strategies: StrategyTable) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn settings(&self) -> &InspectionSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Strategy the inspector will use for `route`
    pub fn strategy_for(&self, route: &str) -> InteractionStrategy {
        self.strategies.resolve(route)
    }

    /// Inspect one page. The returned status is always terminal.
    pub async fn inspect(
        &self,
        base_url: &str,
        descriptor: &PageDescriptor,
        driver: &mut dyn Driver,
    ) -> PageStatus {
        let mut status = PageStatus::pending(descriptor);
        status.begin();

        let strategy = self.strategy_for(&descriptor.route);
        let url = page_url(base_url, &descriptor.route);
        let started = Instant::now();
        let mut stage = Stage::Start;

        info!(route = %descriptor.route, name = %descriptor.name, %strategy, "Inspecting page");

        match self.examine(&url, strategy, driver, &mut stage).await {
            Ok(Verdict::Unrendered) => {
                status.fail(1, vec![RENDER_FAILURE.to_string()]);
            }
            Ok(Verdict::Inspected(findings)) => {
                info!(route = %descriptor.route, elements = %findings.counts, "Page inspected");
                self.judge(&mut status, findings);
            }
            Err(e) => {
                debug!(route = %descriptor.route, %stage, "inspection aborted");
                status.fail(1, vec![e.to_string()]);
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_failed() {
            warn!(
                route = %status.route,
                errors = status.error_count,
                elapsed_ms,
                "Page failed: {}",
                status.error_details.join("; ")
            );
        } else {
            info!(route = %status.route, warnings = status.warning_count, elapsed_ms, "Page completed");
        }

        status
    }

    async fn examine(
        &self,
        url: &str,
        strategy: InteractionStrategy,
        driver: &mut dyn Driver,
        stage: &mut Stage,
    ) -> Result<Verdict> {
        driver.navigate(url).await?;
        driver.wait(self.settings.settle_for(strategy)).await?;
        *stage = Stage::Navigated;

        let Some(snapshot) = driver.snapshot().await? else {
            return Ok(Verdict::Unrendered);
        };
        *stage = Stage::Snapshotted;

        let classification = self.classifier.classify(Some(&snapshot));
        let counts = classification.counts();
        debug!(url, elements = %counts, "classified snapshot");

        let mut interaction = Interaction {
            driver: &mut *driver,
            classifier: &self.classifier,
            settings: &self.settings,
            errors: Vec::new(),
        };
        interaction.run(strategy, &classification).await;
        let interaction_errors = interaction.errors;
        *stage = Stage::Interacted;

        let mut console_errors: Vec<String> = driver
            .console_messages(ConsoleLevel::Error)
            .await?
            .into_iter()
            .map(|m| m.message)
            .collect();
        if strategy.filters_expected_status() {
            console_errors.retain(|m| !strategy::is_expected_status(m));
        }
        if self.settings.dedup_console_errors {
            let mut seen = HashSet::new();
            console_errors.retain(|m| seen.insert(m.clone()));
        }

        let warning_count = match driver.console_messages(ConsoleLevel::Warning).await {
            Ok(warnings) => warnings.len(),
            Err(e) => {
                debug!(url, error = %e, "could not read console warnings");
                0
            }
        };
        *stage = Stage::ErrorsCollected;

        Ok(Verdict::Inspected(Findings {
            counts,
            interaction_errors,
            console_errors,
            warning_count,
        }))
    }

    fn judge(&self, status: &mut PageStatus, findings: Findings) {
        status.warning_count = findings.warning_count;
        status.console_error_count = findings.console_errors.len();

        let failures = findings.interaction_errors.len() + findings.console_errors.len();
        if failures == 0 {
            status.complete();
            return;
        }

        let mut details = findings.interaction_errors;
        details.extend(
            findings
                .console_errors
                .iter()
                .map(|m| format!("{}{}", CONSOLE_ERROR_PREFIX, m)),
        );
        status.fail(failures, details);
    }
}

/// One page's interaction pass; click and type failures are collected, not raised
struct Interaction<'a, 'd> {
    driver: &'a mut (dyn Driver + 'd),
    classifier: &'a Classifier,
    settings: &'a InspectionSettings,
    errors: Vec<String>,
}

impl Interaction<'_, '_> {
    async fn run(&mut self, strategy: InteractionStrategy, classification: &Classification) {
        match strategy {
            InteractionStrategy::Generic => {
                self.click_through(classification.buttons.clone(), |c| c.buttons.clone())
                    .await
            }
            InteractionStrategy::Login => self.login(classification).await,
            InteractionStrategy::Registration => self.register(classification).await,
            InteractionStrategy::ErrorPage => self.leave_error_page(classification).await,
            InteractionStrategy::DeviceSelection => self.select_device(classification).await,
        }
    }

    async fn click(&mut self, element: &ElementRef) -> bool {
        match self.driver.click(&element.description, &element.reference).await {
            Ok(()) => {
                debug!(element = %element.description, reference = %element.reference, "clicked");
                true
            }
            Err(e) => {
                self.errors
                    .push(format!("{}: {} - {}", CLICK_FAILURE, element.description, e));
                false
            }
        }
    }

    async fn fill(&mut self, element: &ElementRef, text: &str) -> bool {
        match self
            .driver
            .type_text(&element.description, &element.reference, text)
            .await
        {
            Ok(()) => {
                debug!(element = %element.description, reference = %element.reference, "filled");
                true
            }
            Err(e) => {
                self.errors
                    .push(format!("{}: {} - {}", TYPE_FAILURE, element.description, e));
                false
            }
        }
    }

    async fn pause(&mut self) {
        if let Err(e) = self.driver.wait(self.settings.post_action).await {
            debug!(error = %e, "post-action wait failed");
        }
    }

    /// Click `candidates[0]`, then index 1 of a fresh snapshot's candidates, and so on
    async fn click_through<F>(&mut self, initial: Vec<ElementRef>, select: F)
    where
        F: Fn(&Classification) -> Vec<ElementRef>,
    {
        let mut candidates = initial;

        for index in 0..self.settings.max_clicks {
            let Some(target) = candidates.get(index).cloned() else {
                break;
            };
            if !self.click(&target).await {
                continue;
            }
            self.pause().await;

            match self.driver.snapshot().await {
                Ok(Some(snapshot)) => {
                    candidates = select(&self.classifier.classify(Some(&snapshot)));
                }
                Ok(None) => {
                    self.errors
                        .push(format!("{}: {}", RENDER_AFTER_CLICK, target.description));
                    break;
                }
                Err(e) => {
                    self.errors
                        .push(format!("{}: {} - {}", RENDER_AFTER_CLICK, target.description, e));
                    break;
                }
            }
        }
    }

    async fn login(&mut self, classification: &Classification) {
        let settings = self.settings;
        let mut filled = 0;

        for input in &classification.inputs {
            if filled >= settings.max_fills {
                break;
            }
            let Some(value) = strategy::login_value(input, &settings.username, &settings.password)
            else {
                continue;
            };
            self.fill(input, value).await;
            filled += 1;
        }

        let submit = strategy::find_by_markers(&classification.buttons, markers::LOGIN_SUBMIT)
            .or_else(|| classification.buttons.first());
        match submit {
            Some(button) => {
                if self.click(button).await {
                    self.pause().await;
                }
            }
            None => self.errors.push(MISSING_LOGIN_BUTTON.to_string()),
        }
    }

    async fn register(&mut self, classification: &Classification) {
        let settings = self.settings;

        for input in classification.inputs.iter().take(settings.max_fills) {
            let value = strategy::registration_value(input, &settings.password);
            self.fill(input, &value).await;
        }

        let submit = strategy::find_by_markers(&classification.buttons, markers::REGISTER_SUBMIT)
            .or_else(|| classification.buttons.first());
        match submit {
            Some(button) => {
                if self.click(button).await {
                    self.pause().await;
                }
            }
            None => self.errors.push(MISSING_REGISTER_BUTTON.to_string()),
        }
    }

    async fn leave_error_page(&mut self, classification: &Classification) {
        if self.settings.max_clicks == 0 {
            return;
        }
        if let Some(button) = strategy::find_by_markers(&classification.buttons, markers::BACK) {
            if self.click(button).await {
                self.pause().await;
            }
        }
    }

    async fn select_device(&mut self, classification: &Classification) {
        let devices = device_options(classification);
        if devices.is_empty() {
            self.click_through(classification.buttons.clone(), |c| c.buttons.clone())
                .await
        } else {
            self.click_through(devices, device_options).await
        }
    }
}

/// Buttons and cards naming a device or layout, without repeated refs
fn device_options(classification: &Classification) -> Vec<ElementRef> {
    let mut seen = HashSet::new();
    classification
        .buttons
        .iter()
        .chain(&classification.cards)
        .filter(|e| strategy::has_marker(&e.description, markers::DEVICE))
        .filter(|e| e.reference.is_empty() || seen.insert(e.reference.clone()))
        .cloned()
        .collect()
}
