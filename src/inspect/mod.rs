//! Page inspection
//!
//! Snapshot classification, the route → strategy table and the per-page
//! inspector state machine.

pub mod classifier;
pub mod inspector;
pub mod strategy;

pub use classifier::{
    builtin_rules, Classification, ClassificationRule, Classifier, ElementCounts, Matcher,
};
pub use inspector::{
    page_url, FailureKind, InspectionSettings, PageInspector, CONSOLE_ERROR_PREFIX, RENDER_FAILURE,
};
pub use strategy::{InteractionStrategy, RoutePattern, RouteRule, StrategyTable};
