use axum::http::HeaderValue;

use super::*;
use crate::page::decl::PagesFile;
use crate::registry::Registry;
use crate::template::TemplateStore;

const PAGES: &str = r"
forms:
  contact:
    fields:
      - name: email
        kind: email
pages:
  - path: /test/
    template: page.html
    context:
      headline: Überblick
    panels:
      summary:
        template: summary.html
      contact:
        kind: form
        form: contact
        template: contact.html
  - path: /broken/
    template: broken.html
";

fn state() -> AppState {
    let mut templates = TemplateStore::new("/static/", "/media/");
    templates.insert("page.html", "<h1>{{headline}}</h1>{{#panels}}<a href=\"{{url}}\">{{title}}</a>{{/panels}}").unwrap();
    templates.insert("summary.html", "<p>summary of {{view.url}}</p>").unwrap();
    templates.insert("contact.html", "{{{form.html}}}").unwrap();
    templates.insert("broken.html", "{{> nowhere}}").unwrap();

    let mut registry = Registry::with_builtins();
    let pages = PagesFile::parse(PAGES).unwrap().build(&mut registry).unwrap();
    AppState::new(pages, templates, true)
}

fn xhr() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers
}

async fn call(state: AppState, method: Method, uri: &str, headers: HeaderMap, body: &'static str) -> (StatusCode, String) {
    let response = page_handler(State(state), method, uri.parse().unwrap(), headers, Bytes::from_static(body.as_bytes())).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// =============================================================================
// GET
// =============================================================================

#[tokio::test]
async fn full_page_is_200_html() {
    let (status, body) = call(state(), Method::GET, "/test/", HeaderMap::new(), "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Überblick</h1>"));
    assert!(body.contains("/test/?view=summary"));
    assert!(body.contains("/test/?view=contact"));
}

#[tokio::test]
async fn panel_fetch_needs_fragment_header() {
    let (status, _) = call(state(), Method::GET, "/test/?view=summary", HeaderMap::new(), "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(state(), Method::GET, "/test/?view=summary", xhr(), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>summary of /test/</p>");
}

#[tokio::test]
async fn htmx_header_counts_as_fragment() {
    let mut headers = HeaderMap::new();
    headers.insert("hx-request", HeaderValue::from_static("true"));
    let (status, _) = call(state(), Method::GET, "/test/?view=summary", headers, "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn htmx_header_ignored_when_disabled() {
    let mut state = state();
    state.accept_hx = false;
    let mut headers = HeaderMap::new();
    headers.insert("hx-request", HeaderValue::from_static("true"));
    let (status, _) = call(state, Method::GET, "/test/?view=summary", headers, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn template_failure_is_500() {
    let (status, body) = call(state(), Method::GET, "/broken/", HeaderMap::new(), "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("nowhere"));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (status, _) = call(state(), Method::GET, "/elsewhere/", HeaderMap::new(), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// POST
// =============================================================================

#[tokio::test]
async fn post_to_page_is_400() {
    let (status, body) = call(state(), Method::POST, "/test/", xhr(), "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("This View does not support POST"));
}

#[tokio::test]
async fn post_to_read_only_panel_is_405() {
    let (status, _) = call(state(), Method::POST, "/test/?view=summary", xhr(), "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn form_post_answers_json_errors() {
    let mut headers = xhr();
    headers.insert("content-type", HeaderValue::from_static("application/x-www-form-urlencoded"));

    let (status, body) = call(state(), Method::POST, "/test/?view=contact", headers.clone(), "email=invalid").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(value["errors"]["email"].is_array());

    let (status, body) = call(state(), Method::POST, "/test/?view=contact", headers, "email=a%40example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap(), serde_json::json!({ "errors": {} }));
}

#[tokio::test]
async fn form_post_accepts_json_bodies() {
    let mut headers = xhr();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    let (status, body) = call(state(), Method::POST, "/test/?view=contact", headers, r#"{"email": "a@example.com"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""errors":{}"#));
}

// =============================================================================
// ROUTER
// =============================================================================

#[test]
fn router_builds_for_every_static_mount() {
    let mut config = ServerConfig::default();
    assert!(app(state(), &config).is_ok());
    config.static_url = "/".into();
    assert!(app(state(), &config).is_ok());
    config.static_url = "https://cdn.example.com/static/".into();
    assert!(app(state(), &config).is_ok());
}

fn single_page(path: &str) -> AppState {
    AppState::new(vec![PageDefinition::new(path, "page.html")], TemplateStore::new("/static/", "/media/"), true)
}

#[test]
fn colliding_page_paths_are_config_errors() {
    let config = ServerConfig::default();
    for (path, owner) in [("/healthz", "health check"), ("/static", "static files"), ("/static/app/", "static files")] {
        match app(single_page(path), &config) {
            Err(ConfigError::ReservedPath { path: found, owner: found_owner }) => {
                assert_eq!(found, path);
                assert_eq!(found_owner, owner);
            }
            Err(other) => panic!("unexpected error for {path}: {other}"),
            Ok(_) => panic!("{path} should be refused"),
        }
    }
}

#[test]
fn capture_syntax_in_page_paths_is_refused() {
    let config = ServerConfig::default();
    for path in ["/a/:b", "/users/{id}", "/files/*rest"] {
        assert!(matches!(app(single_page(path), &config), Err(ConfigError::InvalidPath(_))), "path {path}");
    }
}

#[test]
fn paths_near_reserved_ones_still_mount() {
    let config = ServerConfig::default();
    for path in ["/healthz/", "/statistics/", "/a/b:c"] {
        assert!(app(single_page(path), &config).is_ok(), "path {path}");
    }

    let root_static = ServerConfig { static_url: "/".into(), ..ServerConfig::default() };
    assert!(app(single_page("/static"), &root_static).is_ok());
}

#[test]
fn reply_maps_to_content_type() {
    let html = Reply::Html("<p>x</p>".into()).into_response();
    assert_eq!(html.status(), StatusCode::OK);
    assert!(html.headers()["content-type"].to_str().unwrap().starts_with("text/html"));

    let json = Reply::Json(serde_json::json!({})).into_response();
    assert_eq!(json.headers()["content-type"], "application/json");
}
