//! Error taxonomy for page construction and request dispatch.
//!
//! DESIGN
//! ======
//! Two families, split by when they can happen:
//! - `ConfigError` surfaces while a page definition is built at startup.
//!   These are programmer errors and abort the process.
//! - `PageError` surfaces while a request is served. Client-shape problems
//!   map to 4xx, everything else to 5xx.
//!
//! Invalid user input (form field errors) is deliberately absent here: it
//! travels as a 200 payload, never as an error.

use axum::http::StatusCode;

use crate::template::TemplateError;

/// Grepable error codes, shared by every error the HTTP layer can surface.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// HTTP status the error maps to when it reaches a client.
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A panel mapping key that is not a string.
    #[error("page {page}: panel identifier must be a string, got {kind} `{value}`")]
    NonStringKey { page: String, kind: &'static str, value: String },

    #[error("page {page}: panel identifier must not be empty")]
    EmptyKey { page: String },

    #[error("page {page}: panel identifier `{key}` is declared twice")]
    DuplicateKey { page: String, key: String },

    #[error("page {page}: panel `{panel}` uses unknown kind `{kind}`")]
    UnknownKind { page: String, panel: String, kind: String },

    /// The name resolves to something registered that cannot act as a panel.
    #[error("page {page}: `{component}` registered for panel `{panel}` is a {found}, not a panel")]
    NotAPanel { page: String, panel: String, component: String, found: &'static str },

    #[error("panel factory `{factory}` rejected options for panel `{panel}`: {reason}")]
    FactoryRejected { factory: String, panel: String, reason: String },

    #[error("unknown form `{0}`")]
    UnknownForm(String),

    #[error("form `{form}`: {reason}")]
    InvalidForm { form: String, reason: String },

    #[error("duplicate page path `{0}`")]
    DuplicatePath(String),

    /// Page paths are mounted verbatim as router paths.
    #[error("page path `{0}` must start with `/` and contain no route captures")]
    InvalidPath(String),

    #[error("page path `{path}` collides with the {owner} route")]
    ReservedPath { path: String, owner: &'static str },

    #[error("yaml parse failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NonStringKey { .. } => "E_NON_STRING_KEY",
            Self::EmptyKey { .. } => "E_EMPTY_KEY",
            Self::DuplicateKey { .. } => "E_DUPLICATE_KEY",
            Self::UnknownKind { .. } => "E_UNKNOWN_KIND",
            Self::NotAPanel { .. } => "E_NOT_A_PANEL",
            Self::FactoryRejected { .. } => "E_FACTORY_REJECTED",
            Self::UnknownForm(_) => "E_UNKNOWN_FORM",
            Self::InvalidForm { .. } => "E_INVALID_FORM",
            Self::DuplicatePath(_) => "E_DUPLICATE_PATH",
            Self::InvalidPath(_) => "E_INVALID_PATH",
            Self::ReservedPath { .. } => "E_RESERVED_PATH",
            Self::Yaml(_) => "E_YAML",
            Self::Io(_) => "E_IO",
        }
    }
}

// =============================================================================
// REQUEST ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The request has the wrong shape for what it addresses.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("panel `{panel}` does not accept submissions")]
    WriteUnsupported { panel: String },

    #[error("`{0}` is neither an attribute nor a panel")]
    Lookup(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ErrorCode for PageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "E_BAD_REQUEST",
            Self::WriteUnsupported { .. } => "E_WRITE_UNSUPPORTED",
            Self::Lookup(_) => "E_LOOKUP",
            Self::Template(_) => "E_TEMPLATE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::WriteUnsupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Lookup(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
