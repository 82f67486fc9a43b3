//! Template store and a small mustache-style renderer.
//!
//! ARCHITECTURE
//! ============
//! Pages and panels only need "render a template with a context". The
//! `TemplateEngine` trait is that seam. `TemplateStore` is the bundled
//! implementation: templates are parsed once when inserted and kept as node
//! trees keyed by their reference (`tests/dashboard.html`).
//!
//! SYNTAX
//! ======
//! - `{{ path.to.value }}` escaped substitution, `{{{ raw }}}` or `{{& raw }}` unescaped
//! - `{{# list }}...{{/ list }}` section: iterates arrays, renders once for truthy values
//! - `{{^ value }}...{{/ value }}` inverted section
//! - `{{> name }}` partial, resolved by the caller (pages embed panels this way)
//! - `{{! comment }}`
//!
//! Missing values render as the empty string.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::request::PageRequest;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template {template}: {message}")]
    Syntax { template: String, message: String },

    #[error("partial `{name}` failed: {message}")]
    Partial { name: String, message: String },

    #[error("template io error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// SEAMS
// =============================================================================

/// Resolves `{{> name }}` tags. The returned text is inserted unescaped.
pub trait Partials {
    fn partial(&self, name: &str) -> Result<String, TemplateError>;
}

/// Partial resolver for templates rendered outside a page.
pub struct NoPartials;

impl Partials for NoPartials {
    fn partial(&self, name: &str) -> Result<String, TemplateError> {
        Err(TemplateError::Partial { name: name.to_owned(), message: "no partials available here".into() })
    }
}

/// The rendering capability pages and panels consume.
pub trait TemplateEngine: Send + Sync {
    /// Render `template` with `context`. The request feeds request-contextual
    /// values (`request`, `static_url`, `media_url`) the template may use.
    fn render(
        &self,
        template: &str,
        context: &Value,
        request: &PageRequest,
        partials: &dyn Partials,
    ) -> Result<String, TemplateError>;

    fn static_url(&self) -> &str;
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var { path: String, escape: bool },
    Section { path: String, inverted: bool, children: Vec<Node> },
    Partial(String),
}

fn parse(name: &str, source: &str) -> Result<Vec<Node>, TemplateError> {
    let syntax = |message: String| TemplateError::Syntax { template: name.to_owned(), message };

    // Open sections: (path, inverted, nodes collected before the section opened).
    let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
    let mut nodes = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            nodes.push(Node::Text(rest[..start].to_owned()));
        }
        let after = &rest[start + 2..];

        let (tag, consumed, triple) = if let Some(inner) = after.strip_prefix('{') {
            let end = inner.find("}}}").ok_or_else(|| syntax("unclosed `{{{`".into()))?;
            (&inner[..end], 1 + end + 3, true)
        } else {
            let end = after.find("}}").ok_or_else(|| syntax("unclosed `{{`".into()))?;
            (&after[..end], end + 2, false)
        };
        rest = &after[consumed..];

        let tag = tag.trim();
        if triple {
            nodes.push(Node::Var { path: tag.to_owned(), escape: false });
            continue;
        }

        let mut chars = tag.chars();
        match chars.next() {
            Some('!') => {}
            Some('&') => nodes.push(Node::Var { path: chars.as_str().trim().to_owned(), escape: false }),
            Some('>') => nodes.push(Node::Partial(chars.as_str().trim().to_owned())),
            Some(c @ ('#' | '^')) => {
                let path = chars.as_str().trim().to_owned();
                let outer = std::mem::take(&mut nodes);
                stack.push((path, c == '^', outer));
            }
            Some('/') => {
                let closing = chars.as_str().trim();
                let (path, inverted, outer) =
                    stack.pop().ok_or_else(|| syntax(format!("unexpected closing tag `{closing}`")))?;
                if path != closing {
                    return Err(syntax(format!("section `{path}` closed by `{closing}`")));
                }
                let children = std::mem::replace(&mut nodes, outer);
                nodes.push(Node::Section { path, inverted, children });
            }
            Some(_) => nodes.push(Node::Var { path: tag.to_owned(), escape: true }),
            None => return Err(syntax("empty tag".into())),
        }
    }

    if !rest.is_empty() {
        nodes.push(Node::Text(rest.to_owned()));
    }
    if let Some((path, _, _)) = stack.pop() {
        return Err(syntax(format!("unclosed section `{path}`")));
    }
    Ok(nodes)
}

// =============================================================================
// RENDERING
// =============================================================================

fn lookup<'a>(stack: &[&'a Value], path: &str) -> Option<&'a Value> {
    if path == "." {
        return stack.last().copied();
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut value = stack.iter().rev().find_map(|ctx| ctx.get(first))?;
    for segment in segments {
        value = match value {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            other => other.get(segment)?,
        };
    }
    Some(value)
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_nodes(
    nodes: &[Node],
    stack: &mut Vec<&Value>,
    partials: &dyn Partials,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var { path, escape } => {
                let text = lookup(stack, path).map(display).unwrap_or_default();
                if *escape {
                    out.push_str(&escape_html(&text));
                } else {
                    out.push_str(&text);
                }
            }
            Node::Section { path, inverted, children } => {
                let value = lookup(stack, path);
                if *inverted {
                    if !truthy(value) {
                        render_nodes(children, stack, partials, out)?;
                    }
                    continue;
                }
                match value {
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(children, stack, partials, out)?;
                            stack.pop();
                        }
                    }
                    Some(v) if truthy(Some(v)) => {
                        stack.push(v);
                        render_nodes(children, stack, partials, out)?;
                        stack.pop();
                    }
                    _ => {}
                }
            }
            Node::Partial(name) => out.push_str(&partials.partial(name)?),
        }
    }
    Ok(())
}

/// Escape text for HTML element and attribute content.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// STORE
// =============================================================================

/// Parsed templates keyed by reference, plus the URL prefixes every render sees.
pub struct TemplateStore {
    templates: HashMap<String, Arc<Vec<Node>>>,
    static_url: String,
    media_url: String,
}

impl TemplateStore {
    #[must_use]
    pub fn new(static_url: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self { templates: HashMap::new(), static_url: static_url.into(), media_url: media_url.into() }
    }

    /// Parse and register a template under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, source: &str) -> Result<(), TemplateError> {
        let name = name.into();
        let nodes = parse(&name, source)?;
        self.templates.insert(name, Arc::new(nodes));
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load every `.html` file under `root`, keyed by its `/`-separated path relative to `root`.
    pub fn load_dir(&mut self, root: &Path) -> Result<usize, TemplateError> {
        let mut pending = vec![root.to_path_buf()];
        let mut loaded = 0;
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let source = std::fs::read_to_string(&path)?;
                self.insert(name, &source)?;
                loaded += 1;
            }
        }
        tracing::debug!(root = %root.display(), loaded, "templates loaded");
        Ok(loaded)
    }
}

impl TemplateEngine for TemplateStore {
    fn render(
        &self,
        template: &str,
        context: &Value,
        request: &PageRequest,
        partials: &dyn Partials,
    ) -> Result<String, TemplateError> {
        let nodes = self
            .templates
            .get(template)
            .ok_or_else(|| TemplateError::NotFound(template.to_owned()))?;

        // Request-contextual values sit below the caller's context, so callers may shadow them.
        let ambient = serde_json::json!({
            "request": request.to_context(),
            "static_url": self.static_url,
            "media_url": self.media_url,
        });
        let mut stack = vec![&ambient, context];
        let mut out = String::new();
        render_nodes(nodes, &mut stack, partials, &mut out)?;
        Ok(out)
    }

    fn static_url(&self) -> &str {
        &self.static_url
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
