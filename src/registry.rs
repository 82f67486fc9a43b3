//! Named components page declarations may refer to.
//!
//! DESIGN
//! ======
//! Panel kinds and forms share one namespace. A page declaration names a
//! panel kind; if that name resolves to a form instead, page construction
//! fails with `NotAPanel` rather than silently building something else.
//!
//! A `PanelKind` turns a declaration's options into a `PanelFactory` once,
//! at construction. Options that do not fit the kind are rejected there, so
//! per-request instantiation cannot fail.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::forms::FormSchema;
use crate::panel::PanelFactory;
use crate::panel::builtin::{FormPanel, FormPanelOptions, TemplatePanel, TemplatePanelOptions};

/// Prepares a factory from YAML options. `Err` carries the reason the options were refused.
pub type PanelKind = Arc<dyn Fn(serde_yaml::Value, &Registry) -> Result<PanelFactory, String> + Send + Sync>;

pub const TEMPLATE_KIND: &str = "template";
pub const FORM_KIND: &str = "form";

pub enum Component {
    Panel(PanelKind),
    Form(Arc<FormSchema>),
}

impl Component {
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Panel(_) => "panel kind",
            Self::Form(_) => "form",
        }
    }
}

#[derive(Default)]
pub struct Registry {
    components: HashMap<String, Component>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `template` and `form` panel kinds.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.components.insert(TEMPLATE_KIND.into(), Component::Panel(Arc::new(prepare_template)));
        registry.components.insert(FORM_KIND.into(), Component::Panel(Arc::new(prepare_form)));
        registry
    }

    /// Register a panel kind, replacing any component with the same name.
    pub fn register_panel(&mut self, name: impl Into<String>, kind: PanelKind) {
        self.components.insert(name.into(), Component::Panel(kind));
    }

    /// Register a form. Its name must not already be taken.
    pub fn register_form(&mut self, form: FormSchema) -> Result<(), ConfigError> {
        if let Some(existing) = self.components.get(&form.name) {
            return Err(ConfigError::InvalidForm {
                reason: format!("name already registered as a {}", existing.describe()),
                form: form.name,
            });
        }
        self.components.insert(form.name.clone(), Component::Form(Arc::new(form)));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    #[must_use]
    pub fn form(&self, name: &str) -> Option<Arc<FormSchema>> {
        match self.components.get(name) {
            Some(Component::Form(form)) => Some(Arc::clone(form)),
            _ => None,
        }
    }
}

fn prepare_template(options: serde_yaml::Value, _registry: &Registry) -> Result<PanelFactory, String> {
    let options: TemplatePanelOptions = from_options(options)?;
    Ok(TemplatePanel::factory(options))
}

fn prepare_form(options: serde_yaml::Value, registry: &Registry) -> Result<PanelFactory, String> {
    let options: FormPanelOptions = from_options(options)?;
    let form = registry
        .form(&options.form)
        .ok_or_else(|| ConfigError::UnknownForm(options.form.clone()).to_string())?;
    Ok(FormPanel::factory(options, form))
}

/// Deserialize kind options; a missing mapping means "all defaults".
fn from_options<T: serde::de::DeserializeOwned>(options: serde_yaml::Value) -> Result<T, String> {
    let options = match options {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        other => other,
    };
    serde_yaml::from_value(options).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
