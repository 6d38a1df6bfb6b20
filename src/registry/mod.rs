//! Page registry - the pages each role is expected to reach
//!
//! A [`PageRegistry`] is a plain value handed to the coordinator. It comes
//! from the built-in catalogue or from a TOML file:
//!
//! ```toml
//! [[pages]]
//! route = "/centers/FinanceCenter"
//! name = "财务中心"
//! role = "admin"
//! category = "finance"   # optional, defaults to the first path segment
//! ```

mod catalogue;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{HealthError, PageDescriptor, Result, Role};

/// Ordered collection of page descriptors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRegistry {
    pages: Vec<PageDescriptor>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RegistryFile {
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
struct PageEntry {
    route: String,
    name: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl PageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The full page catalogue for every role
    pub fn builtin() -> Self {
        let tables = [
            (Role::Admin, catalogue::ADMIN_PAGES),
            (Role::Principal, catalogue::PRINCIPAL_PAGES),
            (Role::Teacher, catalogue::TEACHER_PAGES),
            (Role::Parent, catalogue::PARENT_PAGES),
            (Role::Common, catalogue::COMMON_PAGES),
        ];

        let pages = tables
            .iter()
            .flat_map(|(role, pages)| {
                pages
                    .iter()
                    .map(move |(route, name)| PageDescriptor::new(*route, *name, *role))
            })
            .collect();
        Self { pages }
    }

    /// Parse a `[[pages]]` TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        let mut registry = Self::new();
        for entry in file.pages {
            let descriptor = PageDescriptor::new(entry.route, entry.name, entry.role);
            let descriptor = match entry.category {
                Some(category) => descriptor.with_category(category),
                None => descriptor,
            };
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Load a registry file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HealthError::registry(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| HealthError::with_context(format!("registry {}", path.display()), e))
    }

    /// Serialize back to the `[[pages]]` format
    pub fn to_toml_string(&self) -> Result<String> {
        let file = RegistryFile {
            pages: self
                .pages
                .iter()
                .map(|page| PageEntry {
                    route: page.route.clone(),
                    name: page.name.clone(),
                    role: page.role,
                    category: Some(page.category.clone()),
                })
                .collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| HealthError::registry(e.to_string()))
    }

    /// Append a page. Routes must start with `/` and be unique within a role.
    pub fn register(&mut self, descriptor: PageDescriptor) -> Result<()> {
        if !descriptor.route.starts_with('/') {
            return Err(HealthError::registry(format!(
                "route '{}' must start with '/'",
                descriptor.route
            )));
        }
        if self
            .pages
            .iter()
            .any(|p| p.role == descriptor.role && p.route == descriptor.route)
        {
            return Err(HealthError::registry(format!(
                "duplicate route '{}' for role {}",
                descriptor.route, descriptor.role
            )));
        }
        self.pages.push(descriptor);
        Ok(())
    }

    /// Pages of `role` whose category is in `categories` (all when empty), in registry order
    pub fn select<'a, 'c>(
        &'a self,
        role: Role,
        categories: &'c [String],
    ) -> impl Iterator<Item = &'a PageDescriptor> + 'c
    where
        'a: 'c,
    {
        self.pages.iter().filter(move |page| {
            page.role == role
                && (categories.is_empty()
                    || categories
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(&page.category)))
        })
    }

    /// Every page of `role`
    pub fn for_role(&self, role: Role) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter().filter(move |page| page.role == role)
    }

    /// Roles that own at least one page, in role order
    pub fn roles(&self) -> Vec<Role> {
        let present: HashSet<Role> = self.pages.iter().map(|p| p.role).collect();
        let mut roles: Vec<Role> = present.into_iter().collect();
        roles.sort();
        roles
    }

    /// Categories used by `role`, in first-seen order
    pub fn categories(&self, role: Role) -> Vec<&str> {
        let mut seen = Vec::new();
        for page in self.for_role(role) {
            if !seen.contains(&page.category.as_str()) {
                seen.push(page.category.as_str());
            }
        }
        seen
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromIterator<PageDescriptor> for PageRegistry {
    /// Collect without validation; later duplicates are kept
    fn from_iter<I: IntoIterator<Item = PageDescriptor>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
