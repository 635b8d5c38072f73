//! Namespace records and their admin views.

use chrono::{DateTime, Utc};
use mcp_hub_openapi::{Document, DocumentInfo, SourceFormat, ToolSet};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use url::Url;

/// One uploaded spec and the tools derived from it.
///
/// Records are immutable; enable/disable swaps in a copy with the flag flipped, so readers
/// holding an `Arc<Namespace>` always see a consistent snapshot. Tools are generated once at
/// upload and shared (not regenerated) across those copies.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    document: Arc<Document>,
    tools: Arc<ToolSet>,
    base_url: Url,
    enabled: bool,
    base_url_override: Option<String>,
    created_at: DateTime<Utc>,
    spec_hash: String,
}

impl Namespace {
    pub(crate) fn new(
        name: String,
        document: Document,
        tools: ToolSet,
        base_url: Url,
        base_url_override: Option<String>,
    ) -> Self {
        let spec_hash = hex::encode(Sha256::digest(document.raw_text().as_bytes()));
        Self {
            name,
            document: Arc::new(document),
            tools: Arc::new(tools),
            base_url,
            enabled: false,
            base_url_override,
            created_at: Utc::now(),
            spec_hash,
        }
    }

    pub(crate) fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    #[must_use]
    pub fn tools(&self) -> &Arc<ToolSet> {
        &self.tools
    }

    /// Where tool calls of this namespace are sent.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url_override.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Hex SHA-256 of the uploaded text.
    #[must_use]
    pub fn spec_hash(&self) -> &str {
        &self.spec_hash
    }

    /// MCP endpoint path, present only while enabled.
    #[must_use]
    pub fn mcp_path(&self) -> Option<String> {
        self.enabled.then(|| format!("/mcp/{}", self.name))
    }

    #[must_use]
    pub fn summary(&self) -> NamespaceSummary {
        NamespaceSummary {
            name: self.name.clone(),
            enabled: self.enabled,
            title: self.document.title().to_string(),
            version: self.document.api_version().to_string(),
            format: self.document.format(),
            base_url: self.base_url.to_string(),
            base_url_override: self.base_url_override.clone(),
            tool_count: self.tools.len(),
            mcp_path: self.mcp_path(),
            spec_hash: self.spec_hash.clone(),
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn detail(&self) -> NamespaceDetail {
        NamespaceDetail {
            summary: self.summary(),
            info: self.document.info(),
            tools: self
                .tools
                .iter()
                .map(|t| ToolSummary {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    method: t.operation.method.to_string(),
                    path: t.operation.path.clone(),
                    operation_id: t.operation.operation_id.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSummary {
    pub name: String,
    pub enabled: bool,
    pub title: String,
    pub version: String,
    pub format: SourceFormat,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url_override: Option<String>,
    pub tool_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp_path: Option<String>,
    pub spec_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDetail {
    #[serde(flatten)]
    pub summary: NamespaceSummary,
    pub info: DocumentInfo,
    pub tools: Vec<ToolSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}
