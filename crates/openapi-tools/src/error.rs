//! Error types for `mcp-hub-openapi`.

use thiserror::Error;

/// Everything that can go wrong between receiving spec text and returning an upstream result.
///
/// The first five variants are raised while loading or generating (an upload is rejected),
/// the next three while a tool call is in flight.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    /// Input is neither a JSON nor a YAML object.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The `openapi` field does not name a 3.x version (Swagger 2.0 included).
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// Structurally well-formed document that breaks an OpenAPI 3.x rule we rely on.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Two operations of one document produce the same tool name.
    #[error("Naming collision: tool '{name}' is produced by both {first} and {second}")]
    NamingCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Two inputs of one operation would share an argument name.
    #[error("Parameter collision: {0}")]
    ParamCollision(String),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    /// Connection refused, DNS failure, TLS failure or timeout.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// A response was started but could not be turned into a result.
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// The shared HTTP client could not be built (TLS backend initialization).
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl OpenApiToolsError {
    /// Stable kind name, used in admin error payloads and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "InvalidFormat",
            Self::UnsupportedVersion(_) => "UnsupportedVersion",
            Self::SchemaViolation(_) => "SchemaViolation",
            Self::NamingCollision { .. } => "NamingCollision",
            Self::ParamCollision(_) => "ParamCollision",
            Self::MissingRequiredArgument(_) => "MissingRequiredArgument",
            Self::UpstreamUnreachable(_) => "UpstreamUnreachable",
            Self::UpstreamError(_) => "UpstreamError",
            Self::ClientSetup(_) => "ClientSetup",
        }
    }

    /// True for errors raised by an in-flight call rather than by an upload.
    #[must_use]
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredArgument(_) | Self::UpstreamUnreachable(_) | Self::UpstreamError(_)
        )
    }
}

/// Result type alias for spec loading, generation and invocation.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;
