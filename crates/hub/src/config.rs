//! Process configuration: command-line flags with environment fallbacks.

use clap::{ArgAction, Parser, ValueEnum};
use mcp_hub_openapi::InvokerSettings;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "mcp-hub",
    version,
    about = "Upload OpenAPI specs and expose each one as its own MCP tool namespace"
)]
pub struct HubConfig {
    /// Address the HTTP server listens on.
    #[arg(long, env = "MCP_HUB_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[arg(long, env = "MCP_HUB_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "MCP_HUB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Upstream request timeout in seconds; 0 disables it.
    #[arg(long, env = "MCP_HUB_UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    /// Largest upstream response body accepted, in bytes. Unlimited when unset.
    #[arg(long, env = "MCP_HUB_MAX_RESPONSE_BYTES")]
    pub max_response_bytes: Option<usize>,

    /// Largest accepted spec upload request, in bytes.
    #[arg(long, env = "MCP_HUB_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[arg(
        long,
        env = "MCP_HUB_FOLLOW_REDIRECTS",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub follow_redirects: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            upstream_timeout_secs: 30,
            max_response_bytes: None,
            max_upload_bytes: 10 * 1024 * 1024,
            follow_redirects: true,
        }
    }
}

impl HubConfig {
    #[must_use]
    pub fn invoker_settings(&self) -> InvokerSettings {
        InvokerSettings {
            timeout: (self.upstream_timeout_secs > 0)
                .then(|| Duration::from_secs(self.upstream_timeout_secs)),
            max_response_bytes: self.max_response_bytes,
            follow_redirects: self.follow_redirects,
        }
    }
}
