//! The hub: one registry, one dispatcher, one shared upstream invoker.

use crate::dispatcher::{Dispatcher, ToolCall};
use crate::error::Result;
use crate::namespace::Namespace;
use crate::registry::NamespaceRegistry;
use mcp_hub_openapi::{ContentHint, ToolResult, UpstreamInvoker, load};
use rmcp::model::Tool;
use std::sync::Arc;

pub struct Hub {
    registry: NamespaceRegistry,
    dispatcher: Arc<Dispatcher>,
}

impl Hub {
    #[must_use]
    pub fn new(invoker: UpstreamInvoker) -> Self {
        let dispatcher = Arc::new(Dispatcher::new());
        let registry = NamespaceRegistry::new(Arc::clone(&dispatcher), Arc::new(invoker));
        Self {
            registry,
            dispatcher,
        }
    }

    /// Load, validate and register an uploaded spec. The namespace starts disabled.
    ///
    /// # Errors
    ///
    /// Name errors are reported before the upload is parsed; otherwise the load or generation
    /// error. Nothing is stored on failure.
    pub fn upload(
        &self,
        name: &str,
        raw: &[u8],
        hint: ContentHint,
        base_url_override: Option<String>,
    ) -> Result<Arc<Namespace>> {
        self.registry.check_available(name)?;
        let document = load(raw, hint)?;
        self.registry.register(name, document, base_url_override)
    }

    /// # Errors
    ///
    /// [`crate::error::HubError::NotFound`] for unknown names.
    pub fn enable(&self, name: &str) -> Result<Arc<Namespace>> {
        self.registry.enable(name)
    }

    /// # Errors
    ///
    /// [`crate::error::HubError::NotFound`] for unknown names.
    pub fn disable(&self, name: &str) -> Result<Arc<Namespace>> {
        self.registry.disable(name)
    }

    /// # Errors
    ///
    /// [`crate::error::HubError::NotFound`] for unknown names.
    pub fn delete(&self, name: &str) -> Result<Arc<Namespace>> {
        self.registry.delete(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Namespace>> {
        self.registry.get(name)
    }

    #[must_use]
    pub fn list(&self) -> Vec<Arc<Namespace>> {
        self.registry.list()
    }

    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_mounted(&self, name: &str) -> bool {
        self.dispatcher.is_mounted(name)
    }

    /// # Errors
    ///
    /// [`crate::error::HubError::NamespaceNotMounted`] unless the namespace is enabled.
    pub fn list_tools(&self, namespace: &str) -> Result<Vec<Tool>> {
        self.dispatcher.list_tools(namespace)
    }

    /// # Errors
    ///
    /// See [`Dispatcher::route`].
    pub async fn call_tool(&self, namespace: &str, call: ToolCall) -> Result<ToolResult> {
        self.dispatcher.route(namespace, call).await
    }
}
