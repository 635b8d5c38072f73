//! Namespace registry: the single owner of namespace records.
//!
//! Every state change (register, enable, disable, delete) runs under the registry's write lock,
//! and enable/disable/delete perform the matching dispatcher mount/unmount inside that same
//! critical section. The registry's `enabled` flag and the dispatcher's route map therefore
//! never disagree for longer than one locked operation.

use crate::dispatcher::{Dispatcher, OpenApiRoute};
use crate::error::{HubError, Result};
use crate::namespace::Namespace;
use mcp_hub_openapi::{Document, UpstreamInvoker, generate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 64;

pub struct NamespaceRegistry {
    entries: RwLock<HashMap<String, Arc<Namespace>>>,
    dispatcher: Arc<Dispatcher>,
    invoker: Arc<UpstreamInvoker>,
}

impl NamespaceRegistry {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, invoker: Arc<UpstreamInvoker>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dispatcher,
            invoker,
        }
    }

    /// Fail fast before an upload is parsed.
    ///
    /// # Errors
    ///
    /// [`HubError::InvalidName`] or [`HubError::DuplicateName`].
    pub fn check_available(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if self.entries.read().contains_key(name) {
            return Err(HubError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Generate tools for `document` and store a new, disabled namespace.
    ///
    /// Nothing is stored unless generation succeeds.
    ///
    /// # Errors
    ///
    /// [`HubError::InvalidName`], [`HubError::DuplicateName`], or the generation error.
    pub fn register(
        &self,
        name: &str,
        document: Document,
        base_url_override: Option<String>,
    ) -> Result<Arc<Namespace>> {
        self.check_available(name)?;

        let base_url_override = base_url_override
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let tools = generate(&document, base_url_override.as_deref())?;
        let base_url = document.effective_base_url(base_url_override.as_deref())?;
        let namespace = Arc::new(Namespace::new(
            name.to_string(),
            document,
            tools,
            base_url,
            base_url_override,
        ));

        let mut entries = self.entries.write();
        // A concurrent upload may have taken the name while we were generating.
        if entries.contains_key(name) {
            return Err(HubError::DuplicateName(name.to_string()));
        }
        entries.insert(name.to_string(), Arc::clone(&namespace));
        drop(entries);

        tracing::info!(
            namespace = name,
            tools = namespace.tools().len(),
            base_url = %namespace.base_url(),
            "registered namespace"
        );
        Ok(namespace)
    }

    /// Mount the namespace. Enabling an enabled namespace changes nothing.
    ///
    /// # Errors
    ///
    /// [`HubError::NotFound`] if no such namespace exists.
    pub fn enable(&self, name: &str) -> Result<Arc<Namespace>> {
        let mut entries = self.entries.write();
        let current = entries
            .get(name)
            .ok_or_else(|| HubError::NotFound(name.to_string()))?;
        if current.enabled() {
            return Ok(Arc::clone(current));
        }

        let updated = Arc::new(current.with_enabled(true));
        let route = OpenApiRoute::new(name, Arc::clone(updated.tools()), Arc::clone(&self.invoker));
        self.dispatcher.mount(name, Arc::new(route));
        entries.insert(name.to_string(), Arc::clone(&updated));
        drop(entries);

        tracing::info!(namespace = name, "enabled namespace");
        Ok(updated)
    }

    /// Unmount the namespace. Disabling a disabled namespace changes nothing.
    ///
    /// # Errors
    ///
    /// [`HubError::NotFound`] if no such namespace exists.
    pub fn disable(&self, name: &str) -> Result<Arc<Namespace>> {
        let mut entries = self.entries.write();
        let current = entries
            .get(name)
            .ok_or_else(|| HubError::NotFound(name.to_string()))?;
        if !current.enabled() {
            return Ok(Arc::clone(current));
        }

        let updated = Arc::new(current.with_enabled(false));
        self.dispatcher.unmount(name);
        entries.insert(name.to_string(), Arc::clone(&updated));
        drop(entries);

        tracing::info!(namespace = name, "disabled namespace");
        Ok(updated)
    }

    /// Remove the namespace, unmounting it first if enabled.
    ///
    /// # Errors
    ///
    /// [`HubError::NotFound`] if no such namespace exists.
    pub fn delete(&self, name: &str) -> Result<Arc<Namespace>> {
        let mut entries = self.entries.write();
        let removed = entries
            .remove(name)
            .ok_or_else(|| HubError::NotFound(name.to_string()))?;
        if removed.enabled() {
            self.dispatcher.unmount(name);
        }
        drop(entries);

        tracing::info!(namespace = name, "deleted namespace");
        Ok(removed)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Namespace>> {
        self.entries.read().get(name).cloned()
    }

    /// All namespaces, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<Namespace>> {
        let mut all: Vec<Arc<Namespace>> = self.entries.read().values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.name().cmp(b.name()))
        });
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Names become a URL path segment under `/mcp/`.
fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| HubError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name must be at most 64 characters"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return Err(invalid(
            "only ASCII letters, digits, '.', '_' and '-' are allowed",
        ));
    }
    if name == "." || name == ".." {
        return Err(invalid("name must not be a dot segment"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::ToolCall;
    use mcp_hub_openapi::{ContentHint, InvokerSettings, OpenApiToolsError, load};
    use rmcp::model::JsonObject;

    fn petstore(server: &str) -> Document {
        let raw = format!(
            r#"{{
              "openapi": "3.0.3",
              "info": {{ "title": "Petstore", "version": "1.0.0" }},
              "servers": [{{ "url": "{server}" }}],
              "paths": {{
                "/pets": {{ "get": {{ "operationId": "listPets" }} }},
                "/pets/{{petId}}": {{
                  "get": {{
                    "parameters": [
                      {{ "name": "petId", "in": "path", "required": true, "schema": {{ "type": "string" }} }}
                    ]
                  }}
                }}
              }}
            }}"#
        );
        load(raw.as_bytes(), ContentHint::Json).expect("load")
    }

    fn registry() -> (NamespaceRegistry, Arc<Dispatcher>) {
        let dispatcher = Arc::new(Dispatcher::new());
        let registry = NamespaceRegistry::new(
            Arc::clone(&dispatcher),
            Arc::new(UpstreamInvoker::new(InvokerSettings::default()).expect("build client")),
        );
        (registry, dispatcher)
    }

    #[test]
    fn register_stores_a_disabled_namespace() {
        let (registry, dispatcher) = registry();
        let ns = registry
            .register("pets", petstore("https://api.example.com"), None)
            .expect("register");
        assert!(!ns.enabled());
        assert_eq!(ns.tools().names(), ["listPets", "GET__pets_petId"]);
        assert_eq!(ns.spec_hash().len(), 64);
        assert!(!dispatcher.is_mounted("pets"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registered_tools_match_standalone_generation() {
        let (registry, dispatcher) = registry();
        let document = petstore("https://declared.example.com/v1");
        let override_url = "http://127.0.0.1:9/mock";
        let expected = generate(&document, Some(override_url)).expect("generate");

        registry
            .register("pets", document, Some(override_url.to_string()))
            .expect("register");
        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        let ns = &listed[0];

        assert_eq!(ns.tools().len(), expected.len());
        for (stored, generated) in ns.tools().iter().zip(expected.iter()) {
            assert_eq!(stored.name, generated.name);
            assert_eq!(stored.input_schema, generated.input_schema);
            assert_eq!(stored.invocation, generated.invocation);
            assert_eq!(stored, generated);
        }

        registry.enable("pets").expect("enable");
        let mounted = serde_json::to_value(dispatcher.list_tools("pets").expect("mounted"))
            .expect("serialize mounted tools");
        let standalone =
            serde_json::to_value(expected.to_mcp_tools()).expect("serialize generated tools");
        assert_eq!(mounted, standalone);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let (registry, _) = registry();
        registry
            .register("pets", petstore("https://a.example.com"), None)
            .expect("first");
        let err = registry
            .register("pets", petstore("https://b.example.com"), None)
            .unwrap_err();
        assert!(matches!(err, HubError::DuplicateName(_)));
        assert_eq!(
            registry.get("pets").map(|n| n.base_url().to_string()),
            Some("https://a.example.com/".to_string())
        );
    }

    #[test]
    fn failed_generation_stores_nothing() {
        let (registry, _) = registry();
        let err = registry
            .register("pets", petstore("/relative"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            HubError::OpenApi(OpenApiToolsError::SchemaViolation(_))
        ));
        assert!(registry.get("pets").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn names_must_fit_in_a_path_segment() {
        let (registry, _) = registry();
        let too_long = "x".repeat(65);
        for bad in ["", "a/b", "has space", "..", too_long.as_str()] {
            let err = registry
                .register(bad, petstore("https://api.example.com"), None)
                .unwrap_err();
            assert!(matches!(err, HubError::InvalidName { .. }), "{bad:?}");
        }
        registry
            .register("Pet-Store_v1.2", petstore("https://api.example.com"), None)
            .expect("valid name");
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let (registry, dispatcher) = registry();
        registry
            .register("pets", petstore("https://api.example.com"), None)
            .expect("register");

        assert!(registry.enable("pets").expect("enable").enabled());
        assert!(registry.enable("pets").expect("enable again").enabled());
        assert!(dispatcher.is_mounted("pets"));
        assert_eq!(dispatcher.mounted_count(), 1);

        assert!(!registry.disable("pets").expect("disable").enabled());
        assert!(!registry.disable("pets").expect("disable again").enabled());
        assert!(!dispatcher.is_mounted("pets"));
    }

    #[test]
    fn lifecycle_operations_on_unknown_names_fail() {
        let (registry, _) = registry();
        assert!(matches!(registry.enable("x"), Err(HubError::NotFound(_))));
        assert!(matches!(registry.disable("x"), Err(HubError::NotFound(_))));
        assert!(matches!(registry.delete("x"), Err(HubError::NotFound(_))));
    }

    #[test]
    fn delete_unmounts_an_enabled_namespace() {
        let (registry, dispatcher) = registry();
        registry
            .register("pets", petstore("https://api.example.com"), None)
            .expect("register");
        registry.enable("pets").expect("enable");

        registry.delete("pets").expect("delete");
        assert!(!dispatcher.is_mounted("pets"));
        assert!(registry.get("pets").is_none());
        assert!(matches!(registry.delete("pets"), Err(HubError::NotFound(_))));
    }

    #[test]
    fn list_returns_every_namespace_once() {
        let (registry, _) = registry();
        for name in ["a", "b", "c"] {
            registry
                .register(name, petstore("https://api.example.com"), None)
                .expect("register");
        }
        registry.enable("b").expect("enable");

        let listed: Vec<(String, bool)> = registry
            .list()
            .iter()
            .map(|n| (n.name().to_string(), n.enabled()))
            .collect();
        assert_eq!(listed.len(), 3);
        assert!(listed.contains(&("a".to_string(), false)));
        assert!(listed.contains(&("b".to_string(), true)));
        assert!(listed.contains(&("c".to_string(), false)));
    }

    #[test]
    fn override_is_used_for_invocation() {
        let (registry, _) = registry();
        let ns = registry
            .register(
                "pets",
                petstore("https://declared.example.com"),
                Some(" http://127.0.0.1:9/mock ".to_string()),
            )
            .expect("register");
        assert_eq!(ns.base_url_override(), Some("http://127.0.0.1:9/mock"));
        assert!(
            ns.tools()
                .iter()
                .all(|t| t.invocation.base_url.as_str() == "http://127.0.0.1:9/mock")
        );
    }

    #[tokio::test]
    async fn disabled_namespaces_are_not_routable() {
        let (registry, dispatcher) = registry();
        registry
            .register("a", petstore("https://api.example.com"), None)
            .expect("register a");
        registry
            .register("b", petstore("https://api.example.com"), None)
            .expect("register b");
        registry.enable("a").expect("enable a");

        let err = dispatcher
            .route("b", ToolCall::new("listPets", JsonObject::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::NamespaceNotMounted(_)));

        let err = dispatcher
            .route("a", ToolCall::new("deletePets", JsonObject::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::ToolNotFound(_)));

        let err = dispatcher
            .route("a", ToolCall::new("GET__pets_petId", JsonObject::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HubError::OpenApi(OpenApiToolsError::MissingRequiredArgument(ref arg)) if arg == "petId"
        ));
    }
}
