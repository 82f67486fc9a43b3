//! The request view pages and panels dispatch on.
//!
//! `PageRequest` is built once per HTTP request by the route handler and then
//! only borrowed. It carries the method, path, decoded query and form
//! payload, the headers (for availability checks), and the fragment flag.

use std::collections::HashMap;

use axum::http::{HeaderMap, Method, Uri, header};
use uuid::Uuid;

/// Submitted form payload, one value per field (last value wins).
pub type FormData = HashMap<String, String>;

/// Header classic XHR clients send on fragment fetches.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";
pub const REQUESTED_WITH_XHR: &str = "XMLHttpRequest";

/// Header htmx sends on every request it issues.
pub const HX_REQUEST_HEADER: &str = "hx-request";

#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Correlation id for logs.
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub form: FormData,
    /// Set when client code asked for a sub-document rather than a full page.
    pub fragment: bool,
}

impl PageRequest {
    /// Assemble a request from its HTTP parts. JSON bodies with string values
    /// are accepted alongside urlencoded forms; anything else yields an empty
    /// payload.
    #[must_use]
    pub fn from_http(method: Method, uri: &Uri, headers: HeaderMap, body: &[u8], accept_hx: bool) -> Self {
        let query = uri.query().map(parse_urlencoded).unwrap_or_default();
        let form = parse_body(&headers, body);
        let fragment = is_fragment(&headers, accept_hx);

        Self { id: Uuid::new_v4(), method, path: uri.path().to_owned(), query, headers, form, fragment }
    }

    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Template-facing view of the request.
    #[must_use]
    pub fn to_context(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "method": self.method.as_str(),
            "fragment": self.fragment,
            "query": self.query,
        })
    }
}

/// Whether the headers flag a fragment fetch.
#[must_use]
pub fn is_fragment(headers: &HeaderMap, accept_hx: bool) -> bool {
    let header_is = |name: &str, expected: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
    };
    header_is(REQUESTED_WITH_HEADER, REQUESTED_WITH_XHR) || (accept_hx && header_is(HX_REQUEST_HEADER, "true"))
}

fn parse_urlencoded(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

fn parse_body(headers: &HeaderMap, body: &[u8]) -> FormData {
    if body.is_empty() {
        return FormData::new();
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(body) else {
            return FormData::new();
        };
        return map
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                serde_json::Value::Number(n) => Some((k, n.to_string())),
                serde_json::Value::Bool(b) => Some((k, b.to_string())),
                _ => None,
            })
            .collect();
    }

    url::form_urlencoded::parse(body).into_owned().collect()
}

#[cfg(test)]
impl PageRequest {
    pub fn test_get(path: &str) -> Self {
        Self {
            id: Uuid::nil(),
            method: Method::GET,
            path: path.to_owned(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            form: FormData::new(),
            fragment: false,
        }
    }

    pub fn test_post(path: &str) -> Self {
        Self { method: Method::POST, ..Self::test_get(path) }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_form(mut self, key: &str, value: &str) -> Self {
        self.form.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, axum::http::HeaderValue::from_static(value));
        self
    }

    pub fn as_fragment(mut self) -> Self {
        self.fragment = true;
        self
    }
}

#[cfg(test)]
#[path = "request_test.rs"]
mod tests;
