//! Built-in panel kinds declared from YAML.
//!
//! - `template`: renders a template with static context and assets.
//! - `form`: a template panel bound to a registered form; accepts
//!   submissions and answers with field-level errors.

use std::sync::Arc;

use serde::Deserialize;

use super::{Context, PageInfo, Panel, PanelCx, PanelFactory, PanelInit, Reply, WritablePanel};
use crate::assets::Assets;
use crate::error::PageError;
use crate::forms::FormSchema;
use crate::request::{FormData, PageRequest};

// =============================================================================
// TEMPLATE PANEL
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatePanelOptions {
    pub title: Option<String>,
    pub template: Option<String>,
    pub context: Context,
    pub assets: Assets,
    /// Only take part in requests carrying this header.
    pub require_header: Option<String>,
}

pub struct TemplatePanel {
    options: Arc<TemplatePanelOptions>,
}

impl TemplatePanel {
    /// Factory producing a panel per request from shared options.
    #[must_use]
    pub fn factory(options: TemplatePanelOptions) -> PanelFactory {
        let options = Arc::new(options);
        Arc::new(move |_: &PanelInit<'_>| -> Box<dyn Panel> {
            Box::new(TemplatePanel { options: Arc::clone(&options) })
        })
    }
}

fn header_present(required: Option<&str>, request: &PageRequest) -> bool {
    required.is_none_or(|name| request.has_header(name))
}

impl Panel for TemplatePanel {
    fn title(&self) -> Option<&str> {
        self.options.title.as_deref()
    }

    fn template(&self) -> Option<&str> {
        self.options.template.as_deref()
    }

    fn build_context(&self, _cx: &PanelCx<'_>) -> Result<Context, PageError> {
        Ok(self.options.context.clone())
    }

    fn assets(&self) -> Assets {
        self.options.assets.clone()
    }

    fn is_available(&self, _page: &PageInfo<'_>, request: &PageRequest) -> bool {
        header_present(self.options.require_header.as_deref(), request)
    }
}

// =============================================================================
// FORM PANEL
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormPanelOptions {
    /// Name of a registered form.
    pub form: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub assets: Assets,
    #[serde(default)]
    pub require_header: Option<String>,
}

pub struct FormPanel {
    options: Arc<FormPanelOptions>,
    form: Arc<FormSchema>,
}

impl FormPanel {
    #[must_use]
    pub fn factory(options: FormPanelOptions, form: Arc<FormSchema>) -> PanelFactory {
        let options = Arc::new(options);
        Arc::new(move |_: &PanelInit<'_>| -> Box<dyn Panel> {
            Box::new(FormPanel { options: Arc::clone(&options), form: Arc::clone(&form) })
        })
    }
}

impl Panel for FormPanel {
    fn title(&self) -> Option<&str> {
        self.options.title.as_deref()
    }

    fn template(&self) -> Option<&str> {
        self.options.template.as_deref()
    }

    fn build_context(&self, _cx: &PanelCx<'_>) -> Result<Context, PageError> {
        let mut ctx = self.options.context.clone();
        ctx.insert("form".into(), self.form.to_context());
        Ok(ctx)
    }

    fn assets(&self) -> Assets {
        let mut assets = self.options.assets.clone();
        assets.merge(&self.form.assets);
        assets
    }

    fn is_available(&self, _page: &PageInfo<'_>, request: &PageRequest) -> bool {
        header_present(self.options.require_header.as_deref(), request)
    }

    fn writer(&self) -> Option<&dyn WritablePanel> {
        Some(self)
    }
}

impl WritablePanel for FormPanel {
    fn handle_write(&self, cx: &PanelCx<'_>, payload: &FormData) -> Result<Reply, PageError> {
        let errors = self.form.validate(payload);
        tracing::debug!(
            request_id = %cx.request.id,
            panel = cx.panel.name(),
            form = %self.form.name,
            invalid_fields = errors.len(),
            "form submission validated"
        );
        Ok(Reply::Json(serde_json::json!({ "errors": errors })))
    }
}

#[cfg(test)]
#[path = "builtin_test.rs"]
mod tests;
