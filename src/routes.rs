//! Router assembly and the HTTP adapter for pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every declared page is mounted at its own path for `GET` and `POST`. The
//! handler turns the raw request into a `PageRequest`, sets the page up for
//! that request and dispatches. Rendering is synchronous: the `LivePage`
//! never crosses an await point. Static files are served from `STATIC_DIR`
//! under `STATIC_URL`; anything else falls through to 404.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{ConfigError, ErrorCode, PageError};
use crate::page::PageDefinition;
use crate::page::decl::is_plain_path;
use crate::panel::Reply;
use crate::request::PageRequest;
use crate::state::AppState;
use crate::template::TemplateEngine;

pub const HEALTH_PATH: &str = "/healthz";

/// Build the router. Page paths that axum cannot mount, or that collide with
/// the health check or the static mount, are refused before any route is added.
pub fn app(state: AppState, config: &ServerConfig) -> Result<Router, ConfigError> {
    let static_mount = Some(config.static_mount()).filter(|mount| mount.starts_with('/') && *mount != "/");
    for path in state.pages.keys() {
        check_page_path(path, static_mount)?;
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new().route(HEALTH_PATH, get(healthz));
    for path in state.pages.keys() {
        router = router.route(path, get(page_handler).post(page_handler));
    }
    let router = router.with_state(state);

    let static_files = ServeDir::new(&config.static_dir);
    let router = match config.static_mount() {
        mount if !mount.starts_with('/') => router,
        "/" => router.fallback_service(static_files),
        mount => router.nest_service(mount, static_files),
    };

    Ok(router.layer(cors).layer(TraceLayer::new_for_http()))
}

fn check_page_path(path: &str, static_mount: Option<&str>) -> Result<(), ConfigError> {
    if !is_plain_path(path) {
        return Err(ConfigError::InvalidPath(path.to_owned()));
    }
    if path == HEALTH_PATH {
        return Err(ConfigError::ReservedPath { path: path.to_owned(), owner: "health check" });
    }
    if let Some(mount) = static_mount {
        if path == mount || path.strip_prefix(mount).is_some_and(|rest| rest.starts_with('/')) {
            return Err(ConfigError::ReservedPath { path: path.to_owned(), owner: "static files" });
        }
    }
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn page_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(page) = state.page(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let request = PageRequest::from_http(method, &uri, headers, &body, state.accept_hx);
    dispatch(&page, &request, state.engine())
}

/// Set `page` up for `request` and answer it.
pub(crate) fn dispatch(page: &PageDefinition, request: &PageRequest, engine: &dyn TemplateEngine) -> Response {
    let live = page.setup(request, engine);
    let result = if request.method == Method::POST { live.post() } else { live.get() };
    match result {
        Ok(reply) => reply.into_response(),
        Err(err) => page_error_response(&err, request, page.path()),
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Html(body) => Html(body).into_response(),
            Reply::Json(value) => Json(value).into_response(),
        }
    }
}

fn page_error_response(err: &PageError, request: &PageRequest, page: &str) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(request_id = %request.id, %page, code = err.error_code(), error = %err, "page request failed");
    } else {
        tracing::debug!(request_id = %request.id, %page, code = err.error_code(), error = %err, "page request rejected");
    }
    (status, err.to_string()).into_response()
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
