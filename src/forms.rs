//! Form schemas and submitted-data validation.
//!
//! A `FormSchema` is a named, ordered list of typed fields. Validation never
//! fails as an error: it returns a `FieldErrors` map keyed by field name, and
//! an empty map means the submission was valid.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::error::ConfigError;
use crate::request::FormData;
use crate::template::escape_html;

/// Field name -> messages. Ordered so payloads serialize deterministically.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const MSG_INVALID_INTEGER: &str = "Enter a whole number.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Integer,
}

impl FieldKind {
    fn input_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Integer => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), label: None, kind, required: true, max_length: None }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    fn validate(&self, raw: Option<&str>) -> Vec<String> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return if self.required { vec![MSG_REQUIRED.to_owned()] } else { Vec::new() };
        }

        let mut errors = Vec::new();
        if let Some(max) = self.max_length {
            let len = value.chars().count();
            if len > max {
                errors.push(format!("Ensure this value has at most {max} characters (it has {len})."));
            }
        }
        match self.kind {
            FieldKind::Text => {}
            FieldKind::Email if !is_valid_email(value) => errors.push(MSG_INVALID_EMAIL.to_owned()),
            FieldKind::Email => {}
            FieldKind::Integer if value.parse::<i64>().is_err() => errors.push(MSG_INVALID_INTEGER.to_owned()),
            FieldKind::Integer => {}
        }
        errors
    }

    fn input_html(&self) -> String {
        let name = escape_html(&self.name);
        let mut html = format!(
            r#"<label for="id_{name}">{}:</label> <input type="{}" name="{name}" id="id_{name}""#,
            escape_html(self.label()),
            self.kind.input_type(),
        );
        if let Some(max) = self.max_length {
            let _ = write!(html, r#" maxlength="{max}""#);
        }
        if self.required {
            html.push_str(" required");
        }
        html.push('>');
        html
    }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

// =============================================================================
// SCHEMA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub assets: Assets,
}

/// YAML shape of a form declaration; the name comes from its mapping key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormDecl {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub assets: Assets,
}

impl FormSchema {
    /// Build a schema, rejecting empty field lists and repeated field names.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>, assets: Assets) -> Result<Self, ConfigError> {
        let name = name.into();
        if fields.is_empty() {
            return Err(ConfigError::InvalidForm { form: name, reason: "no fields declared".into() });
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(ConfigError::InvalidForm { form: name, reason: "field with empty name".into() });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::InvalidForm { form: name, reason: format!("field `{}` declared twice", field.name) });
            }
        }
        Ok(Self { name, fields, assets })
    }

    pub fn from_decl(name: impl Into<String>, decl: FormDecl) -> Result<Self, ConfigError> {
        Self::new(name, decl.fields, decl.assets)
    }

    /// Validate a submission. Unknown payload keys are ignored.
    #[must_use]
    pub fn validate(&self, payload: &FormData) -> FieldErrors {
        self.fields
            .iter()
            .filter_map(|field| {
                let errors = field.validate(payload.get(&field.name).map(String::as_str));
                (!errors.is_empty()).then(|| (field.name.clone(), errors))
            })
            .collect()
    }

    /// Template-facing view: field metadata plus ready-made input markup.
    #[must_use]
    pub fn to_context(&self) -> serde_json::Value {
        let fields: Vec<_> = self
            .fields
            .iter()
            .map(|f| {
                serde_json::json!({
                    "name": f.name,
                    "label": f.label(),
                    "kind": f.kind,
                    "required": f.required,
                    "html": f.input_html(),
                })
            })
            .collect();
        let html = self
            .fields
            .iter()
            .map(|f| format!("<p>{}</p>", f.input_html()))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::json!({ "name": self.name, "fields": fields, "html": html })
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
