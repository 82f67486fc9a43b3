//! YAML page declarations.
//!
//! A pages file declares forms and pages:
//!
//! ```yaml
//! forms:
//!   name_form:
//!     fields:
//!       - { name: email, kind: email, label: E-Mail }
//! pages:
//!   - path: /test/
//!     template: tests/dashboard.html
//!     context: { page_context: content of page_context }
//!     panels:
//!       panel1: { kind: template, template: tests/view1.html }
//!       panel2: template
//!       panel3: { kind: form, form: name_form }
//! ```
//!
//! A panel entry is either a bare kind name or a mapping whose optional
//! `kind` (default `template`) selects the factory; the remaining keys are
//! the kind's options. Panel identifiers are YAML keys and so may be any
//! scalar; every one is checked to be a non-empty, unique string before any
//! factory is resolved.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value as YamlValue};

use super::PageDefinition;
use crate::error::ConfigError;
use crate::forms::{FormDecl, FormSchema};
use crate::panel::Context;
use crate::registry::{Component, Registry, TEMPLATE_KIND};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesFile {
    #[serde(default)]
    pub forms: indexmap::IndexMap<String, FormDecl>,
    #[serde(default)]
    pub pages: Vec<PageDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDecl {
    pub path: String,
    pub template: String,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub panels: Mapping,
}

impl PagesFile {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Register the declared forms into `registry`, then build every page.
    pub fn build(self, registry: &mut Registry) -> Result<Vec<PageDefinition>, ConfigError> {
        for (name, decl) in self.forms {
            registry.register_form(FormSchema::from_decl(name, decl)?)?;
        }

        let mut paths = HashSet::new();
        let mut pages = Vec::with_capacity(self.pages.len());
        for decl in self.pages {
            if !is_plain_path(&decl.path) {
                return Err(ConfigError::InvalidPath(decl.path));
            }
            if !paths.insert(decl.path.clone()) {
                return Err(ConfigError::DuplicatePath(decl.path));
            }
            pages.push(PageDefinition::from_decl(decl, registry)?);
        }
        Ok(pages)
    }
}

/// Absolute, with no `{capture}`, `*wildcard` or legacy `:capture` segments.
pub(crate) fn is_plain_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(['{', '}'])
        && path.split('/').all(|segment| !segment.starts_with([':', '*']))
}

/// YAML type name used in identifier errors.
fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged",
    }
}

fn yaml_display(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => "~".into(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other).map(|s| s.trim().to_owned()).unwrap_or_default(),
    }
}

/// Validate every identifier in `panels`, in order, without touching the values.
fn validate_keys<'a>(page: &str, panels: &'a Mapping) -> Result<Vec<&'a str>, ConfigError> {
    let mut seen = HashSet::new();
    let mut keys = Vec::with_capacity(panels.len());
    for key in panels.keys() {
        let YamlValue::String(name) = key else {
            return Err(ConfigError::NonStringKey { page: page.to_owned(), kind: yaml_kind(key), value: yaml_display(key) });
        };
        if name.is_empty() {
            return Err(ConfigError::EmptyKey { page: page.to_owned() });
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::DuplicateKey { page: page.to_owned(), key: name.clone() });
        }
        keys.push(name.as_str());
    }
    Ok(keys)
}

/// Split a panel entry into its kind name and the options for that kind.
fn split_entry(entry: &YamlValue) -> (String, YamlValue) {
    match entry {
        YamlValue::String(kind) => (kind.clone(), YamlValue::Null),
        YamlValue::Mapping(map) => {
            let mut options = map.clone();
            let kind = match options.remove("kind") {
                Some(YamlValue::String(kind)) => kind,
                Some(other) => yaml_display(&other),
                None => TEMPLATE_KIND.to_owned(),
            };
            (kind, YamlValue::Mapping(options))
        }
        other => (TEMPLATE_KIND.to_owned(), other.clone()),
    }
}

impl PageDefinition {
    /// Build a page from its declaration. Identifiers are validated first,
    /// then each entry's kind is resolved and its factory prepared.
    pub fn from_decl(decl: PageDecl, registry: &Registry) -> Result<Self, ConfigError> {
        let keys = validate_keys(&decl.path, &decl.panels)?;

        let mut page = PageDefinition::new(decl.path.clone(), decl.template);
        page.context = decl.context;

        for (name, entry) in keys.into_iter().zip(decl.panels.values()) {
            let (kind_name, options) = split_entry(entry);
            let kind = match registry.get(&kind_name) {
                Some(Component::Panel(kind)) => kind,
                Some(other) => {
                    return Err(ConfigError::NotAPanel {
                        page: decl.path,
                        panel: name.to_owned(),
                        component: kind_name,
                        found: other.describe(),
                    });
                }
                None => {
                    return Err(ConfigError::UnknownKind { page: decl.path, panel: name.to_owned(), kind: kind_name });
                }
            };
            let factory = kind(options, registry).map_err(|reason| ConfigError::FactoryRejected {
                factory: kind_name.clone(),
                panel: name.to_owned(),
                reason,
            })?;
            page = page.panel(name, factory)?;
        }

        tracing::debug!(page = %page.path, panels = page.panels.len(), template = %page.template, "page declared");
        Ok(page)
    }
}

#[cfg(test)]
#[path = "decl_test.rs"]
mod tests;
