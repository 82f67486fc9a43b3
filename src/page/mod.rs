//! Pages: composite views that route each request to the page or one panel.
//!
//! ARCHITECTURE
//! ============
//! `PageDefinition` is static configuration: the page template, page-level
//! context and an ordered list of `(identifier, factory)` declarations. It is
//! validated once when built and then shared read-only across requests.
//!
//! Every request calls `PageDefinition::setup`, which instantiates fresh
//! panels, drops unavailable ones and returns a `LivePage` owning the live
//! panel map, url and lazily computed caches for that request alone. Nothing
//! request-scoped is ever written back to the definition, so concurrent
//! requests cannot observe each other's panels or url.
//!
//! DISPATCH
//! ========
//! - `GET` with `?view=<live panel>`: fragment requests get the panel's
//!   reply as-is, full navigations get 400.
//! - `GET` otherwise: the full page render.
//! - `POST`: only fragment requests addressed to a live panel; the rest 400.

pub mod decl;

use std::cell::OnceCell;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::assets::Assets;
use crate::error::{ConfigError, PageError};
use crate::panel::{BoundPanel, Context, PageInfo, PanelFactory, PanelInit, ROUTING_PARAM, Reply};
use crate::request::PageRequest;
use crate::template::{Partials, TemplateEngine, TemplateError, escape_html};

/// Page-level context computed per request, layered over the static context.
pub trait ContextProvider: Send + Sync {
    fn context_data(&self, request: &PageRequest) -> Context;
}

impl<F> ContextProvider for F
where
    F: Fn(&PageRequest) -> Context + Send + Sync,
{
    fn context_data(&self, request: &PageRequest) -> Context {
        self(request)
    }
}

// =============================================================================
// DEFINITION
// =============================================================================

pub struct PageDefinition {
    path: String,
    template: String,
    context: Context,
    provider: Option<Arc<dyn ContextProvider>>,
    panels: Vec<(String, PanelFactory)>,
}

impl PageDefinition {
    #[must_use]
    pub fn new(path: impl Into<String>, template: impl Into<String>) -> Self {
        Self { path: path.into(), template: template.into(), context: Context::new(), provider: None, panels: Vec::new() }
    }

    /// Declare a panel. Identifiers must be non-empty and unique.
    pub fn panel(mut self, name: impl Into<String>, factory: PanelFactory) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyKey { page: self.path });
        }
        if self.panels.iter().any(|(existing, _)| *existing == name) {
            return Err(ConfigError::DuplicateKey { page: self.path, key: name });
        }
        self.panels.push((name, factory));
        Ok(self)
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl ContextProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared identifiers, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|(name, _)| name.as_str())
    }

    /// Build the request-scoped page: instantiate every declared panel, keep
    /// the available ones and bind them under their identifiers.
    pub fn setup<'r>(&'r self, request: &'r PageRequest, engine: &'r dyn TemplateEngine) -> LivePage<'r> {
        let url = request.path.clone();
        let mut panels = IndexMap::with_capacity(self.panels.len());
        {
            let page = PageInfo { url: &url, template: &self.template };
            for (name, factory) in &self.panels {
                let init = PanelInit { page, name: name.as_str() };
                let panel = factory(&init);
                if !panel.is_available(&page, request) {
                    tracing::debug!(request_id = %request.id, page = %self.path, panel = %name, "panel unavailable");
                    continue;
                }
                panels.insert(name.clone(), BoundPanel::bind(&init, panel));
            }
        }
        tracing::debug!(request_id = %request.id, page = %self.path, live = panels.len(), "page set up");

        LivePage {
            definition: self,
            request,
            engine,
            url,
            panels,
            assets: OnceCell::new(),
            context: OnceCell::new(),
        }
    }
}

// =============================================================================
// LIVE PAGE
// =============================================================================

/// Result of attribute-or-panel lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    Attribute(Value),
    Panel(&'a BoundPanel),
}

/// A page set up for exactly one request.
pub struct LivePage<'r> {
    definition: &'r PageDefinition,
    request: &'r PageRequest,
    engine: &'r dyn TemplateEngine,
    url: String,
    panels: IndexMap<String, BoundPanel>,
    assets: OnceCell<Assets>,
    context: OnceCell<Context>,
}

impl LivePage<'_> {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn info(&self) -> PageInfo<'_> {
        PageInfo { url: &self.url, template: &self.definition.template }
    }

    #[must_use]
    pub fn panel(&self, name: &str) -> Option<&BoundPanel> {
        self.panels.get(name)
    }

    /// Live panels in declaration order.
    pub fn panels(&self) -> impl Iterator<Item = &BoundPanel> {
        self.panels.values()
    }

    /// Union of every live panel's asset declarations, computed on first use.
    pub fn assets(&self) -> &Assets {
        self.assets.get_or_init(|| {
            let mut all = Assets::new();
            for panel in self.panels.values() {
                all.merge(&panel.assets());
            }
            all
        })
    }

    /// The live panel the routing parameter names, if any.
    #[must_use]
    pub fn routed_panel(&self) -> Option<&BoundPanel> {
        self.request.query_param(ROUTING_PARAM).and_then(|name| self.panel(name))
    }

    pub fn get(&self) -> Result<Reply, PageError> {
        if let Some(panel) = self.routed_panel() {
            if !self.request.fragment {
                return Err(PageError::BadRequest(format!(
                    "panel `{}` can only be fetched as a fragment",
                    panel.name()
                )));
            }
            tracing::debug!(request_id = %self.request.id, page = %self.definition.path, panel = panel.name(), "panel read");
            return panel.cx(self.info(), self.request, self.engine).read();
        }
        self.render().map(Reply::Html)
    }

    pub fn post(&self) -> Result<Reply, PageError> {
        let Some(panel) = self.routed_panel().filter(|_| self.request.fragment) else {
            return Err(PageError::BadRequest("This View does not support POST".into()));
        };
        tracing::debug!(request_id = %self.request.id, page = %self.definition.path, panel = panel.name(), "panel write");
        panel.cx(self.info(), self.request, self.engine).write(&self.request.form)
    }

    /// Merged page context: base values, then the definition's static
    /// context, then the provider's output. Each layer overrides the last.
    pub fn context(&self) -> &Context {
        self.context.get_or_init(|| {
            let mut ctx = Context::new();
            ctx.insert("view".into(), self.info().to_context());
            ctx.insert("panels".into(), Value::Array(self.panels().map(BoundPanel::summary).collect()));
            ctx.insert("assets".into(), self.assets().to_context(self.engine.static_url()));
            ctx.extend(self.definition.context.clone());
            if let Some(provider) = &self.definition.provider {
                ctx.extend(provider.context_data(self.request));
            }
            ctx
        })
    }

    /// Render the full page template.
    pub fn render(&self) -> Result<String, PageError> {
        let ctx = Value::Object(self.context().clone());
        tracing::debug!(request_id = %self.request.id, page = %self.definition.path, "full page render");
        let html = self.engine.render(&self.definition.template, &ctx, self.request, self)?;
        Ok(html)
    }

    /// Resolve `name` against page attributes first, then live panels.
    pub fn lookup(&self, name: &str) -> Result<Lookup<'_>, PageError> {
        let attribute = match name {
            "url" => Some(Value::String(self.url.clone())),
            "template" => Some(Value::String(self.definition.template.clone())),
            "assets" => Some(self.assets().to_context(self.engine.static_url())),
            other => self.context().get(other).cloned(),
        };
        if let Some(value) = attribute {
            return Ok(Lookup::Attribute(value));
        }
        self.panel(name)
            .map(Lookup::Panel)
            .ok_or_else(|| PageError::Lookup(name.to_owned()))
    }
}

impl Partials for LivePage<'_> {
    /// Attributes render as escaped text, panels as their rendered fragment.
    fn partial(&self, name: &str) -> Result<String, TemplateError> {
        let failed = |err: PageError| TemplateError::Partial { name: name.to_owned(), message: err.to_string() };
        match self.lookup(name).map_err(failed)? {
            Lookup::Attribute(Value::String(text)) => Ok(escape_html(&text)),
            Lookup::Attribute(other) => Ok(escape_html(&other.to_string())),
            Lookup::Panel(panel) => panel.cx(self.info(), self.request, self.engine).render().map_err(failed),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
