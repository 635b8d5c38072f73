//! Multi-tenant dispatcher: routes tool calls to mounted namespaces.
//!
//! The dispatcher holds nothing but a name-to-route map. Mounting and unmounting are a single
//! insert/remove under a short write lock; lookups clone the `Arc` handler out of a read lock
//! and release it before awaiting the upstream call, so a slow call in one namespace never
//! blocks enable/disable of another.

use crate::error::{HubError, Result};
use async_trait::async_trait;
use mcp_hub_openapi::{ToolResult, ToolSet, UpstreamInvoker};
use parking_lot::RwLock;
use rmcp::model::{JsonObject, Tool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// A tool invocation addressed to one namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: JsonObject,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Handler behind one mounted namespace.
#[async_trait]
pub trait NamespaceRoute: Send + Sync {
    fn list_tools(&self) -> Vec<Tool>;

    async fn call_tool(&self, call: ToolCall) -> Result<ToolResult>;
}

/// Route backed by a generated OpenAPI tool set and the shared upstream invoker.
pub struct OpenApiRoute {
    namespace: String,
    tools: Arc<ToolSet>,
    mcp_tools: Vec<Tool>,
    invoker: Arc<UpstreamInvoker>,
}

impl OpenApiRoute {
    #[must_use]
    pub fn new(namespace: &str, tools: Arc<ToolSet>, invoker: Arc<UpstreamInvoker>) -> Self {
        let mcp_tools = tools.to_mcp_tools();
        Self {
            namespace: namespace.to_string(),
            tools,
            mcp_tools,
            invoker,
        }
    }
}

#[async_trait]
impl NamespaceRoute for OpenApiRoute {
    fn list_tools(&self) -> Vec<Tool> {
        self.mcp_tools.clone()
    }

    async fn call_tool(&self, call: ToolCall) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| HubError::ToolNotFound(call.name.clone()))?;

        let started = Instant::now();
        let result = self
            .invoker
            .invoke(&tool.invocation, &call.arguments)
            .await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => tracing::info!(
                namespace = %self.namespace,
                tool = %call.name,
                elapsed_ms,
                "tool call completed"
            ),
            Err(e) => tracing::warn!(
                namespace = %self.namespace,
                tool = %call.name,
                elapsed_ms,
                kind = e.kind(),
                error = %e,
                "tool call failed"
            ),
        }
        result.map_err(HubError::from)
    }
}

#[derive(Default)]
pub struct Dispatcher {
    routes: RwLock<HashMap<String, Arc<dyn NamespaceRoute>>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `namespace` reachable. Replaces any route already mounted under that name.
    pub fn mount(&self, namespace: &str, route: Arc<dyn NamespaceRoute>) {
        self.routes.write().insert(namespace.to_string(), route);
        tracing::debug!(namespace, "mounted namespace");
    }

    /// Returns whether a route was removed.
    pub fn unmount(&self, namespace: &str) -> bool {
        let removed = self.routes.write().remove(namespace).is_some();
        if removed {
            tracing::debug!(namespace, "unmounted namespace");
        }
        removed
    }

    #[must_use]
    pub fn is_mounted(&self, namespace: &str) -> bool {
        self.routes.read().contains_key(namespace)
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.routes.read().len()
    }

    fn lookup(&self, namespace: &str) -> Result<Arc<dyn NamespaceRoute>> {
        self.routes
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| HubError::NamespaceNotMounted(namespace.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`HubError::NamespaceNotMounted`] if the namespace is absent or disabled.
    pub fn list_tools(&self, namespace: &str) -> Result<Vec<Tool>> {
        Ok(self.lookup(namespace)?.list_tools())
    }

    /// Route one tool call.
    ///
    /// # Errors
    ///
    /// - [`HubError::NamespaceNotMounted`] if the namespace is absent or disabled.
    /// - [`HubError::ToolNotFound`] if the namespace has no such tool.
    /// - [`HubError::OpenApi`] with the invoker's error, unchanged.
    pub async fn route(&self, namespace: &str, call: ToolCall) -> Result<ToolResult> {
        let route = self.lookup(namespace)?;
        route.call_tool(call).await
    }
}
