//! Multi-tenant MCP hub.
//!
//! Uploaded OpenAPI documents become namespaces; each enabled namespace is served as its own MCP
//! tool endpoint at `/mcp/{name}`. See [`service::Hub`] for the programmatic surface and
//! [`app::router`] for the HTTP one.

pub mod admin;
pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod namespace;
pub mod registry;
pub mod service;

pub use config::HubConfig;
pub use error::{HubError, Result};
pub use service::Hub;
