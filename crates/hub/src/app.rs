//! HTTP application: the management API and the MCP endpoints on one listener.

use crate::config::HubConfig;
use crate::service::Hub;
use crate::{admin, mcp};
use anyhow::Context as _;
use axum::{Extension, Router, extract::DefaultBodyLimit};
use mcp_hub_openapi::UpstreamInvoker;
use std::future::Future;
use std::sync::Arc;

/// Build the full router around an existing hub.
pub fn router(hub: Arc<Hub>, config: &HubConfig) -> Router {
    Router::new()
        .merge(admin::router())
        .merge(mcp::router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(Extension(hub))
}

/// Bind, then serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(
    config: HubConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let invoker =
        UpstreamInvoker::new(config.invoker_settings()).context("build upstream HTTP client")?;
    let hub = Arc::new(Hub::new(invoker));
    let app = router(hub, &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "mcp-hub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;
    tracing::info!("mcp-hub stopped");
    Ok(())
}
