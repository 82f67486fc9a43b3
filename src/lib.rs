//! Panel/page composition for server-rendered HTML.
//!
//! A page is a template plus an ordered set of named panels. Each request
//! sets the page up afresh, then either renders the whole page or routes to
//! one panel (`?view=<name>`) for a fragment read or a form submission.

pub mod assets;
pub mod config;
pub mod error;
pub mod forms;
pub mod page;
pub mod panel;
pub mod registry;
pub mod request;
pub mod routes;
pub mod state;
pub mod template;
