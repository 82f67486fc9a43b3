//! CSS/JS asset declarations and their rendered include tags.
//!
//! Panels declare the static resources their markup depends on. The page
//! unions those declarations so the full-page template can emit one
//! consolidated set of includes. Declaration order is kept and duplicates
//! collapse to their first occurrence.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::template::escape_html;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Assets {
    pub css: IndexSet<String>,
    pub js: IndexSet<String>,
}

impl Assets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_css(mut self, path: impl Into<String>) -> Self {
        self.css.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_js(mut self, path: impl Into<String>) -> Self {
        self.js.insert(path.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }

    /// Add every declaration of `other` not already present.
    pub fn merge(&mut self, other: &Assets) {
        self.css.extend(other.css.iter().cloned());
        self.js.extend(other.js.iter().cloned());
    }

    /// `<link>` tags for every stylesheet.
    #[must_use]
    pub fn css_tags(&self, static_url: &str) -> String {
        self.css
            .iter()
            .map(|path| {
                format!(
                    r#"<link href="{}" type="text/css" media="all" rel="stylesheet">"#,
                    escape_html(&absolute_path(static_url, path))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `<script>` tags for every script.
    #[must_use]
    pub fn js_tags(&self, static_url: &str) -> String {
        self.js
            .iter()
            .map(|path| format!(r#"<script src="{}"></script>"#, escape_html(&absolute_path(static_url, path))))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Template-facing view: raw paths plus pre-rendered tags.
    #[must_use]
    pub fn to_context(&self, static_url: &str) -> serde_json::Value {
        let css_tags = self.css_tags(static_url);
        let js_tags = self.js_tags(static_url);
        let all = match (css_tags.is_empty(), js_tags.is_empty()) {
            (false, false) => format!("{css_tags}\n{js_tags}"),
            (false, true) => css_tags.clone(),
            _ => js_tags.clone(),
        };
        serde_json::json!({
            "css": self.css,
            "js": self.js,
            "css_tags": css_tags,
            "js_tags": js_tags,
            "tags": all,
        })
    }
}

/// Resolve a declared path against the static URL prefix. Absolute paths and
/// full URLs are used as declared.
#[must_use]
pub fn absolute_path(static_url: &str, path: &str) -> String {
    if path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    if static_url.ends_with('/') {
        format!("{static_url}{path}")
    } else {
        format!("{static_url}/{path}")
    }
}

#[cfg(test)]
#[path = "assets_test.rs"]
mod tests;
