//! Interaction strategies
//!
//! A route is mapped to an [`InteractionStrategy`] through an ordered table
//! of [`RouteRule`]s; the first matching rule wins and unmatched routes get
//! [`InteractionStrategy::Generic`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::ElementRef;

/// How the inspector exercises a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStrategy {
    /// Click the first few buttons
    Generic,
    /// Fill credentials and submit
    Login,
    /// Fill the form with synthetic values and submit
    Registration,
    /// Expected 403/404/500 content; status text is not an error
    ErrorPage,
    /// Pick a device/layout entry point
    DeviceSelection,
}

impl InteractionStrategy {
    /// Whether the page uses the shorter settle interval
    pub fn quick_settle(&self) -> bool {
        !matches!(self, InteractionStrategy::Generic)
    }

    /// Whether expected status text is stripped from console errors
    pub fn filters_expected_status(&self) -> bool {
        matches!(self, InteractionStrategy::ErrorPage)
    }
}

impl std::fmt::Display for InteractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionStrategy::Generic => write!(f, "generic"),
            InteractionStrategy::Login => write!(f, "login"),
            InteractionStrategy::Registration => write!(f, "registration"),
            InteractionStrategy::ErrorPage => write!(f, "error_page"),
            InteractionStrategy::DeviceSelection => write!(f, "device_selection"),
        }
    }
}

/// Route matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoutePattern {
    /// Whole route equals the value
    Exact(String),
    /// Final path segment equals the value
    LastSegment(String),
    /// Route starts with the value
    Prefix(String),
}

impl RoutePattern {
    pub fn matches(&self, route: &str) -> bool {
        let path = route.split(['?', '#']).next().unwrap_or(route);
        match self {
            RoutePattern::Exact(expected) => path == expected,
            RoutePattern::LastSegment(segment) => path
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .is_some_and(|last| last.eq_ignore_ascii_case(segment)),
            RoutePattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub pattern: RoutePattern,
    pub strategy: InteractionStrategy,
}

impl RouteRule {
    pub fn new(pattern: RoutePattern, strategy: InteractionStrategy) -> Self {
        Self { pattern, strategy }
    }
}

/// Route → strategy dispatch table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    rules: Vec<RouteRule>,
}

impl StrategyTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Login, registration, error and device-selection pages
    pub fn builtin() -> Self {
        use InteractionStrategy::*;
        use RoutePattern::*;

        Self::new(vec![
            RouteRule::new(Exact("/".to_string()), DeviceSelection),
            RouteRule::new(LastSegment("login".to_string()), Login),
            RouteRule::new(LastSegment("register".to_string()), Registration),
            RouteRule::new(LastSegment("403".to_string()), ErrorPage),
            RouteRule::new(LastSegment("404".to_string()), ErrorPage),
            RouteRule::new(LastSegment("500".to_string()), ErrorPage),
        ])
    }

    /// Add a rule that takes precedence over existing ones
    pub fn prepend(&mut self, rule: RouteRule) {
        self.rules.insert(0, rule);
    }

    /// Strategy for a route
    pub fn resolve(&self, route: &str) -> InteractionStrategy {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(route))
            .map(|rule| rule.strategy)
            .unwrap_or(InteractionStrategy::Generic)
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Name markers the page-specific strategies look for
pub mod markers {
    pub const USERNAME: &[&str] = &["用户名", "账号", "username", "user", "email", "手机"];
    pub const PASSWORD: &[&str] = &["密码", "password"];
    pub const EMAIL: &[&str] = &["邮箱", "email"];
    pub const PHONE: &[&str] = &["手机", "电话", "phone", "mobile"];
    pub const LOGIN_SUBMIT: &[&str] = &["登录", "sign in", "login", "log in"];
    pub const REGISTER_SUBMIT: &[&str] = &["注册", "register", "sign up"];
    pub const BACK: &[&str] = &["返回", "首页", "home", "back"];
    pub const DEVICE: &[&str] = &["设备", "电脑", "pc", "移动", "mobile", "desktop"];
    /// Console text that is page content on an error page, matched as whole words
    pub const EXPECTED_STATUS: &[&str] = &["403", "404", "500", "not found", "forbidden"];
}

/// Whether `text` contains any marker, ignoring case
pub fn has_marker(text: &str, markers: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    markers.iter().any(|m| lowered.contains(&m.to_lowercase()))
}

/// Whether a console message reports the status an error page is expected to show
///
/// Codes and phrases must stand as whole ASCII words, so `404 Not Found`
/// matches and `app.js:4041` does not.
pub fn is_expected_status(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    markers::EXPECTED_STATUS.iter().any(|phrase| {
        let phrase: Vec<&str> = phrase.split(' ').collect();
        words.windows(phrase.len()).any(|w| w == phrase.as_slice())
    })
}

/// First element whose description carries a marker
pub fn find_by_markers<'a>(elements: &'a [ElementRef], markers: &[&str]) -> Option<&'a ElementRef> {
    elements.iter().find(|e| has_marker(&e.description, markers))
}

/// What to type into a login input, `None` for unrelated fields
pub fn login_value<'a>(input: &ElementRef, username: &'a str, password: &'a str) -> Option<&'a str> {
    if has_marker(&input.description, markers::PASSWORD) {
        Some(password)
    } else if has_marker(&input.description, markers::USERNAME) {
        Some(username)
    } else {
        None
    }
}

/// Synthetic registration value chosen from the field's name
pub fn registration_value(input: &ElementRef, password: &str) -> String {
    let suffix: u32 = rand::rng().random_range(1000..10000);
    let description = &input.description;

    if has_marker(description, markers::PASSWORD) {
        password.to_string()
    } else if has_marker(description, markers::EMAIL) {
        format!("healthcheck{}@example.com", suffix)
    } else if has_marker(description, markers::PHONE) {
        format!("1380000{}", suffix)
    } else {
        format!("healthcheck{}", suffix)
    }
}
