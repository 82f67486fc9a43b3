//! Server configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PAGES_FILE: &str = "pages.yaml";
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_STATIC_URL: &str = "/static/";
pub const DEFAULT_MEDIA_URL: &str = "/media/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub pages_file: PathBuf,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
    pub static_url: String,
    pub media_url: String,
    pub accept_hx: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            pages_file: PathBuf::from(DEFAULT_PAGES_FILE),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            static_url: DEFAULT_STATIC_URL.into(),
            media_url: DEFAULT_MEDIA_URL.into(),
            accept_hx: true,
        }
    }
}

impl ServerConfig {
    /// Build typed config from environment variables. Every variable is
    /// optional; unparsable values fall back to the default.
    ///
    /// - `PORT`: default 3000
    /// - `PAGES_FILE`: default `pages.yaml`
    /// - `TEMPLATE_DIR`: default `templates`
    /// - `STATIC_DIR`: default `static`
    /// - `STATIC_URL`: default `/static/`
    /// - `MEDIA_URL`: default `/media/`
    /// - `ACCEPT_HX_REQUEST`: default true
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT", defaults.port),
            pages_file: env_path("PAGES_FILE").unwrap_or(defaults.pages_file),
            template_dir: env_path("TEMPLATE_DIR").unwrap_or(defaults.template_dir),
            static_dir: env_path("STATIC_DIR").unwrap_or(defaults.static_dir),
            static_url: env_url_prefix("STATIC_URL").unwrap_or(defaults.static_url),
            media_url: env_url_prefix("MEDIA_URL").unwrap_or(defaults.media_url),
            accept_hx: env_bool("ACCEPT_HX_REQUEST").unwrap_or(defaults.accept_hx),
        }
    }

    /// `STATIC_URL` as an axum route prefix: no trailing slash, `/` kept as is.
    #[must_use]
    pub fn static_mount(&self) -> &str {
        match self.static_url.trim_end_matches('/') {
            "" => "/",
            mount => mount,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// URL prefixes always end in `/` so templates can write `{{static_url}}file`.
fn env_url_prefix(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(if raw.ends_with('/') { raw.to_owned() } else { format!("{raw}/") })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
