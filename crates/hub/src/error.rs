//! Error types for the hub.

use axum::http::StatusCode;
use mcp_hub_openapi::OpenApiToolsError;
use thiserror::Error;

/// Main error type for the hub.
#[derive(Error, Debug)]
pub enum HubError {
    /// A namespace with this name is already registered.
    #[error("Spec '{0}' already exists")]
    DuplicateName(String),

    /// No namespace with this name is registered.
    #[error("Spec '{0}' not found")]
    NotFound(String),

    /// The name cannot be used as a namespace (and URL path segment).
    #[error("Invalid spec name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Absent and disabled namespaces look the same to a caller.
    #[error("No active MCP endpoint for spec '{0}'")]
    NamespaceNotMounted(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Load, generation and invocation failures, passed through unchanged.
    #[error(transparent)]
    OpenApi(#[from] OpenApiToolsError),
}

impl HubError {
    /// Stable kind name for admin error payloads.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "DuplicateName",
            Self::NotFound(_) => "NotFound",
            Self::InvalidName { .. } => "InvalidName",
            Self::NamespaceNotMounted(_) => "NamespaceNotMounted",
            Self::ToolNotFound(_) => "ToolNotFound",
            Self::OpenApi(e) => e.kind(),
        }
    }

    /// HTTP status used when the error reaches the admin or MCP surface.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateName(_) => StatusCode::CONFLICT,
            Self::NotFound(_) | Self::NamespaceNotMounted(_) => StatusCode::NOT_FOUND,
            Self::InvalidName { .. } | Self::ToolNotFound(_) => StatusCode::BAD_REQUEST,
            Self::OpenApi(e) if e.is_invocation_error() => StatusCode::BAD_GATEWAY,
            Self::OpenApi(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Result type alias for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
