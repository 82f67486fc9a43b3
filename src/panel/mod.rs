//! Panels: independently addressable units of page content.
//!
//! ARCHITECTURE
//! ============
//! A panel is anything implementing `Panel`. Pages never hold panel values
//! across requests: they hold `PanelFactory`s and instantiate fresh panels
//! during setup, wrapping each in a `BoundPanel` that records the name,
//! title, template and sub-URL the page assigned to it.
//!
//! Rendering goes through `PanelCx`, which ties a bound panel to the current
//! request, the owning page (`PageInfo`, a borrowed handle) and the template
//! engine. A panel cannot render without one, so "render before bind" is not
//! expressible.
//!
//! Write support is a separate capability (`WritablePanel`) exposed through
//! `Panel::writer`. Panels that accept no submissions simply keep the default.

pub mod builtin;

use std::sync::Arc;

use serde_json::Value;

use crate::assets::Assets;
use crate::error::PageError;
use crate::request::{FormData, PageRequest};
use crate::template::{NoPartials, TemplateEngine};

/// Reserved query parameter selecting panel-scoped dispatch.
pub const ROUTING_PARAM: &str = "view";

/// Render context contributed by pages and panels.
pub type Context = serde_json::Map<String, Value>;

/// Builds a fresh panel for one request.
pub type PanelFactory = Arc<dyn Fn(&PanelInit<'_>) -> Box<dyn Panel> + Send + Sync>;

// =============================================================================
// PAGE HANDLE
// =============================================================================

/// What a panel may know about its owning page. Borrowed, never owned.
#[derive(Debug, Clone, Copy)]
pub struct PageInfo<'a> {
    /// Request path the page was set up for.
    pub url: &'a str,
    /// The page's own template reference.
    pub template: &'a str,
}

impl PageInfo<'_> {
    /// `<page url>?view=<name>`, the address of a single panel on this page.
    #[must_use]
    pub fn panel_url(&self, name: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(ROUTING_PARAM, name)
            .finish();
        format!("{}?{query}", self.url)
    }

    /// Template convention for panels without an explicit template: the page
    /// template's file stem gains a `_<name>_panel` suffix.
    #[must_use]
    pub fn derived_template(&self, name: &str) -> String {
        let (dir, file) = match self.template.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, self.template),
        };
        let file = match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{name}_panel.{ext}"),
            _ => format!("{file}_{name}_panel"),
        };
        match dir {
            Some(dir) => format!("{dir}/{file}"),
            None => file,
        }
    }

    #[must_use]
    pub fn to_context(&self) -> Value {
        serde_json::json!({ "url": self.url, "template": self.template })
    }
}

/// Arguments handed to a `PanelFactory`.
#[derive(Debug, Clone, Copy)]
pub struct PanelInit<'a> {
    pub page: PageInfo<'a>,
    pub name: &'a str,
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Successful panel or page output. Always answered with 200.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Html(String),
    Json(Value),
}

pub trait Panel: Send {
    /// Display label; the panel name is used when `None` or empty.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Explicit template reference; derived from the page template when `None`.
    fn template(&self) -> Option<&str> {
        None
    }

    /// Values merged over the base panel context. Must be deterministic.
    fn build_context(&self, _cx: &PanelCx<'_>) -> Result<Context, PageError> {
        Ok(Context::new())
    }

    fn assets(&self) -> Assets {
        Assets::default()
    }

    /// Whether the panel takes part in this request at all.
    fn is_available(&self, _page: &PageInfo<'_>, _request: &PageRequest) -> bool {
        true
    }

    fn handle_read(&self, cx: &PanelCx<'_>) -> Result<Reply, PageError> {
        cx.render().map(Reply::Html)
    }

    fn writer(&self) -> Option<&dyn WritablePanel> {
        None
    }
}

/// Panels that accept submissions.
pub trait WritablePanel: Send {
    /// Handle a submitted payload. Invalid input is reported in the reply,
    /// never as an error.
    fn handle_write(&self, cx: &PanelCx<'_>, payload: &FormData) -> Result<Reply, PageError>;
}

// =============================================================================
// BOUND PANEL
// =============================================================================

/// A live panel, instantiated and named for one request.
pub struct BoundPanel {
    name: String,
    title: String,
    template: String,
    url: String,
    panel: Box<dyn Panel>,
}

impl BoundPanel {
    #[must_use]
    pub fn bind(init: &PanelInit<'_>, panel: Box<dyn Panel>) -> Self {
        let title = panel.title().filter(|title| !title.is_empty()).unwrap_or(init.name).to_owned();
        let template = panel
            .template()
            .map_or_else(|| init.page.derived_template(init.name), str::to_owned);
        Self { name: init.name.to_owned(), title, template, url: init.page.panel_url(init.name), panel }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Sub-URL addressing this panel on its page.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn assets(&self) -> Assets {
        self.panel.assets()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.panel.writer().is_some()
    }

    #[must_use]
    pub fn summary(&self) -> Value {
        serde_json::json!({ "name": self.name, "title": self.title, "url": self.url })
    }

    #[must_use]
    pub fn cx<'a>(&'a self, page: PageInfo<'a>, request: &'a PageRequest, engine: &'a dyn TemplateEngine) -> PanelCx<'a> {
        PanelCx { panel: self, page, request, engine }
    }
}

impl std::fmt::Debug for BoundPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundPanel")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("template", &self.template)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RENDER CONTEXT
// =============================================================================

/// A bound panel plus everything it needs to answer the current request.
pub struct PanelCx<'a> {
    pub panel: &'a BoundPanel,
    pub page: PageInfo<'a>,
    pub request: &'a PageRequest,
    pub engine: &'a dyn TemplateEngine,
}

impl PanelCx<'_> {
    /// `panel`, `view` and the panel's own `assets`.
    #[must_use]
    pub fn base_context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.insert("panel".into(), self.panel.summary());
        ctx.insert("view".into(), self.page.to_context());
        ctx.insert("assets".into(), self.panel.assets().to_context(self.engine.static_url()));
        ctx
    }

    /// Render the panel's template with its base context and `build_context` output.
    pub fn render(&self) -> Result<String, PageError> {
        let mut ctx = self.base_context();
        ctx.extend(self.panel.panel.build_context(self)?);
        let html = self
            .engine
            .render(&self.panel.template, &Value::Object(ctx), self.request, &NoPartials)?;
        Ok(html)
    }

    pub fn read(&self) -> Result<Reply, PageError> {
        self.panel.panel.handle_read(self)
    }

    pub fn write(&self, payload: &FormData) -> Result<Reply, PageError> {
        let Some(writer) = self.panel.panel.writer() else {
            return Err(PageError::WriteUnsupported { panel: self.panel.name.clone() });
        };
        writer.handle_write(self, payload)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
