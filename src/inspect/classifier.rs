//! Element classifier
//!
//! Walks a snapshot tree once, in pre-order, and sorts nodes into element
//! kinds using a table of [`ClassificationRule`]s. Rules are plain data so
//! another locale is a config change:
//!
//! ```toml
//! [[classifier_rules]]
//! kind = "button"
//! label = "bouton"
//! matchers = [
//!     { match = "role_in", roles = ["button", "link"] },
//!     { match = "role_and_name_contains", role = "text", markers = ["bouton"] },
//! ]
//! ```
//!
//! Classification is non-exclusive: a node lands in every kind it matches.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{ElementKind, ElementRef, HealthError, Result};
use crate::driver::SnapshotNode;

/// One test a node can pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum Matcher {
    /// Role is one of `roles`
    RoleIn { roles: Vec<String> },
    /// `type` attribute equals `value`
    TypeIs { value: String },
    /// Role equals `role` and the name contains one of `markers`
    RoleAndNameContains { role: String, markers: Vec<String> },
    /// Name contains one of `markers`
    NameContains { markers: Vec<String> },
    /// Name or description matches the regex `pattern`
    TextMatches { pattern: String },
}

/// Nodes passing any matcher are classified as `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub kind: ElementKind,
    /// Description used when a node has neither name nor description
    pub label: String,
    pub matchers: Vec<Matcher>,
}

impl ClassificationRule {
    pub fn new(kind: ElementKind, label: impl Into<String>, matchers: Vec<Matcher>) -> Self {
        Self {
            kind,
            label: label.into(),
            matchers,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The built-in rule table (zh-CN application with English fallbacks)
pub fn builtin_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            ElementKind::Button,
            "按钮",
            vec![
                Matcher::RoleIn {
                    roles: strings(&["button", "link"]),
                },
                Matcher::TypeIs {
                    value: "button".to_string(),
                },
                Matcher::RoleAndNameContains {
                    role: "text".to_string(),
                    markers: strings(&["按钮"]),
                },
            ],
        ),
        ClassificationRule::new(
            ElementKind::Input,
            "输入框",
            vec![
                Matcher::RoleIn {
                    roles: strings(&[
                        "textbox",
                        "searchbox",
                        "combobox",
                        "radio",
                        "checkbox",
                        "spinbutton",
                    ]),
                },
                Matcher::TypeIs {
                    value: "text".to_string(),
                },
            ],
        ),
        ClassificationRule::new(
            ElementKind::Card,
            "卡片",
            vec![
                Matcher::RoleIn {
                    roles: strings(&["group", "section"]),
                },
                Matcher::NameContains {
                    markers: strings(&["卡片", "card"]),
                },
            ],
        ),
        ClassificationRule::new(
            ElementKind::Table,
            "表格",
            vec![
                Matcher::RoleIn {
                    roles: strings(&["table"]),
                },
                Matcher::NameContains {
                    markers: strings(&["表格", "table", "列表"]),
                },
            ],
        ),
        ClassificationRule::new(
            ElementKind::Stat,
            "统计",
            vec![Matcher::TextMatches {
                pattern: r"\d+".to_string(),
            }],
        ),
    ]
}

#[derive(Debug, Clone)]
enum CompiledMatcher {
    RoleIn(Vec<String>),
    TypeIs(String),
    RoleAndNameContains { role: String, markers: Vec<String> },
    NameContains(Vec<String>),
    TextMatches(Regex),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    kind: ElementKind,
    label: String,
    matchers: Vec<CompiledMatcher>,
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

impl CompiledMatcher {
    fn compile(matcher: &Matcher) -> Result<Self> {
        Ok(match matcher {
            Matcher::RoleIn { roles } => CompiledMatcher::RoleIn(lowercase_all(roles)),
            Matcher::TypeIs { value } => CompiledMatcher::TypeIs(value.to_lowercase()),
            Matcher::RoleAndNameContains { role, markers } => CompiledMatcher::RoleAndNameContains {
                role: role.to_lowercase(),
                markers: lowercase_all(markers),
            },
            Matcher::NameContains { markers } => {
                CompiledMatcher::NameContains(lowercase_all(markers))
            }
            Matcher::TextMatches { pattern } => {
                let regex = Regex::new(pattern).map_err(|e| {
                    HealthError::config(format!("Invalid classifier pattern '{}': {}", pattern, e))
                })?;
                CompiledMatcher::TextMatches(regex)
            }
        })
    }

    fn matches(&self, node: &NodeView<'_>) -> bool {
        match self {
            CompiledMatcher::RoleIn(roles) => roles.iter().any(|r| *r == node.role),
            CompiledMatcher::TypeIs(value) => *value == node.node_type,
            CompiledMatcher::RoleAndNameContains { role, markers } => {
                *role == node.role && contains_any(&node.name, markers)
            }
            CompiledMatcher::NameContains(markers) => contains_any(&node.name, markers),
            CompiledMatcher::TextMatches(regex) => {
                node.raw.name.as_deref().is_some_and(|n| regex.is_match(n))
                    || node.raw.description.as_deref().is_some_and(|d| regex.is_match(d))
            }
        }
    }
}

fn contains_any(haystack: &str, markers: &[String]) -> bool {
    !haystack.is_empty() && markers.iter().any(|m| haystack.contains(m.as_str()))
}

/// Lowercased view of the fields the matchers read
struct NodeView<'a> {
    raw: &'a SnapshotNode,
    role: String,
    node_type: String,
    name: String,
}

impl<'a> NodeView<'a> {
    fn of(node: &'a SnapshotNode) -> Self {
        Self {
            raw: node,
            role: node.role.as_deref().unwrap_or("").to_lowercase(),
            node_type: node.node_type.as_deref().unwrap_or("").to_lowercase(),
            name: node.name.as_deref().unwrap_or("").to_lowercase(),
        }
    }

    fn describe(&self, label: &str) -> String {
        self.raw
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.raw.description.as_deref().filter(|d| !d.is_empty()))
            .unwrap_or(label)
            .to_string()
    }
}

/// Classified elements of one snapshot, in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub buttons: Vec<ElementRef>,
    pub inputs: Vec<ElementRef>,
    pub cards: Vec<ElementRef>,
    pub tables: Vec<ElementRef>,
    pub stats: Vec<ElementRef>,
}

impl Classification {
    /// Elements of one kind
    pub fn get(&self, kind: ElementKind) -> &[ElementRef] {
        match kind {
            ElementKind::Button => &self.buttons,
            ElementKind::Input => &self.inputs,
            ElementKind::Card => &self.cards,
            ElementKind::Table => &self.tables,
            ElementKind::Stat => &self.stats,
        }
    }

    fn list_mut(&mut self, kind: ElementKind) -> &mut Vec<ElementRef> {
        match kind {
            ElementKind::Button => &mut self.buttons,
            ElementKind::Input => &mut self.inputs,
            ElementKind::Card => &mut self.cards,
            ElementKind::Table => &mut self.tables,
            ElementKind::Stat => &mut self.stats,
        }
    }

    pub fn counts(&self) -> ElementCounts {
        ElementCounts {
            buttons: self.buttons.len(),
            inputs: self.inputs.len(),
            cards: self.cards.len(),
            tables: self.tables.len(),
            stats: self.stats.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

/// Per-kind element totals, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCounts {
    pub buttons: usize,
    pub inputs: usize,
    pub cards: usize,
    pub tables: usize,
    pub stats: usize,
}

impl ElementCounts {
    pub fn total(&self) -> usize {
        self.buttons + self.inputs + self.cards + self.tables + self.stats
    }
}

impl std::fmt::Display for ElementCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "buttons={} inputs={} cards={} tables={} stats={}",
            self.buttons, self.inputs, self.cards, self.tables, self.stats
        )
    }
}

static BUILTIN: Lazy<Classifier> = Lazy::new(|| Classifier::compile_lenient(&builtin_rules()));

/// Rule-table classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CompiledRule>,
}

impl Classifier {
    /// Compile a rule table
    pub fn new(rules: &[ClassificationRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    kind: rule.kind,
                    label: rule.label.clone(),
                    matchers: rule
                        .matchers
                        .iter()
                        .map(CompiledMatcher::compile)
                        .collect::<Result<Vec<_>>>()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Classifier over [`builtin_rules`], compiled once per process
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Compile what compiles; a bad matcher is logged and left out
    fn compile_lenient(rules: &[ClassificationRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                kind: rule.kind,
                label: rule.label.clone(),
                matchers: rule
                    .matchers
                    .iter()
                    .filter_map(|m| match CompiledMatcher::compile(m) {
                        Ok(compiled) => Some(compiled),
                        Err(e) => {
                            tracing::error!(kind = %rule.kind, error = %e, "dropping classifier matcher");
                            None
                        }
                    })
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Use `rules` when given, the built-in table otherwise
    pub fn from_rules_or_builtin(rules: &[ClassificationRule]) -> Result<Self> {
        if rules.is_empty() {
            Ok(Self::builtin())
        } else {
            Self::new(rules)
        }
    }

    /// Classify every node of `snapshot`; an absent snapshot yields empty lists
    pub fn classify(&self, snapshot: Option<&SnapshotNode>) -> Classification {
        let mut result = Classification::default();
        let Some(root) = snapshot else {
            return result;
        };

        let mut stack = vec![root];
        let mut matched: Vec<ElementKind> = Vec::with_capacity(self.rules.len());

        while let Some(node) = stack.pop() {
            let view = NodeView::of(node);
            matched.clear();

            for rule in &self.rules {
                if matched.contains(&rule.kind) {
                    continue;
                }
                if rule.matchers.iter().any(|m| m.matches(&view)) {
                    matched.push(rule.kind);
                    result.list_mut(rule.kind).push(ElementRef::new(
                        view.describe(&rule.label),
                        node.reference.clone().unwrap_or_default(),
                        rule.kind,
                    ));
                }
            }

            stack.extend(node.children.iter().rev());
        }

        result
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::builtin()
    }
}
