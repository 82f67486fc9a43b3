//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Everything in it is immutable after startup: the page definitions keyed
//! by path and the parsed template store. Per-request state lives in the
//! `LivePage` each handler builds, so no locks are needed here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::page::PageDefinition;
use crate::template::{TemplateEngine, TemplateStore};

#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<HashMap<String, Arc<PageDefinition>>>,
    pub templates: Arc<TemplateStore>,
    /// Treat `HX-Request: true` as a fragment request too.
    pub accept_hx: bool,
}

impl AppState {
    #[must_use]
    pub fn new(pages: Vec<PageDefinition>, templates: TemplateStore, accept_hx: bool) -> Self {
        for page in &pages {
            if !templates.contains(page.template()) {
                tracing::warn!(page = %page.path(), template = %page.template(), "page template not loaded");
            }
        }
        let pages = pages
            .into_iter()
            .map(|page| (page.path().to_owned(), Arc::new(page)))
            .collect();
        Self { pages: Arc::new(pages), templates: Arc::new(templates), accept_hx }
    }

    #[must_use]
    pub fn page(&self, path: &str) -> Option<Arc<PageDefinition>> {
        self.pages.get(path).cloned()
    }

    #[must_use]
    pub fn engine(&self) -> &dyn TemplateEngine {
        self.templates.as_ref()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
