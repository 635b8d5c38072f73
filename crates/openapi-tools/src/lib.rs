//! OpenAPI 3.x to MCP tooling for the hub.
//!
//! The pipeline is `load` (text to [`Document`]), `generate` ([`Document`] to [`ToolSet`]) and
//! [`UpstreamInvoker::invoke`] (one tool call to one HTTP request). Nothing in this crate knows
//! about namespaces or tenants; that lives in `mcp-hub`.

pub mod document;
pub mod error;
pub mod generator;
pub mod invoker;
pub mod loader;
mod resolver;

pub use document::{Document, DocumentInfo, Operation, SourceFormat};
pub use error::{OpenApiToolsError, Result};
pub use generator::{GeneratedTool, InvocationSpec, ToolSet, generate};
pub use invoker::{InvokerSettings, ToolResult, UpstreamInvoker};
pub use loader::{ContentHint, load};
