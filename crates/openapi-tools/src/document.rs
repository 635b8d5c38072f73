//! Validated, resolved view of an uploaded OpenAPI 3.x document.
//!
//! A [`Document`] is produced by [`crate::loader::load`] and never changes afterwards. It keeps
//! only what tool generation and the admin surface need: metadata, server URLs and a flat list
//! of [`Operation`]s with every local `$ref` already resolved.

use crate::error::{OpenApiToolsError, Result};
use regex::Regex;
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// `{name}` segments of a path template. The name may be empty so that `{}` can be rejected.
pub(crate) static PATH_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}/]*)\}").expect("valid placeholder regex"));

/// Serialization the raw text was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) openapi_version: String,
    pub(crate) title: String,
    pub(crate) api_version: String,
    pub(crate) description: Option<String>,
    pub(crate) server_urls: Vec<String>,
    pub(crate) path_count: usize,
    pub(crate) operations: Vec<Operation>,
    pub(crate) format: SourceFormat,
    pub(crate) raw_text: String,
}

impl Document {
    /// Declared `openapi` version, e.g. `3.0.3`.
    #[must_use]
    pub fn openapi_version(&self) -> &str {
        &self.openapi_version
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `info.version` of the described API.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Server URLs in declaration order, with server variables replaced by their defaults.
    #[must_use]
    pub fn server_urls(&self) -> &[String] {
        &self.server_urls
    }

    /// Operations in document order (paths as declared, then methods in a fixed order).
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// The text exactly as uploaded.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Resolve the base URL tool calls are sent to.
    ///
    /// A non-empty override wins over the first declared server. Whatever is chosen must be an
    /// absolute `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiToolsError::SchemaViolation`] if neither source yields a usable URL.
    pub fn effective_base_url(&self, base_url_override: Option<&str>) -> Result<Url> {
        let overridden = base_url_override.map(str::trim).filter(|s| !s.is_empty());
        let (candidate, origin) = match overridden {
            Some(url) => (url, "base URL override"),
            None => match self.server_urls.first() {
                Some(url) => (url.as_str(), "first server URL"),
                None => {
                    return Err(OpenApiToolsError::SchemaViolation(
                        "document declares no server URL and no base URL override was given"
                            .to_string(),
                    ));
                }
            },
        };

        let url = Url::parse(candidate).map_err(|e| {
            OpenApiToolsError::SchemaViolation(format!(
                "{origin} '{candidate}' is not an absolute URL: {e}"
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OpenApiToolsError::SchemaViolation(format!(
                "{origin} '{candidate}' must use http or https"
            )));
        }
        Ok(url)
    }

    /// Summary used by the admin surface.
    #[must_use]
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.title.clone(),
            version: self.api_version.clone(),
            openapi_version: self.openapi_version.clone(),
            description: self.description.clone(),
            server_urls: self.server_urls.clone(),
            path_count: self.path_count,
            operation_count: self.operations.len(),
            format: self.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    pub openapi_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub server_urls: Vec<String>,
    pub path_count: usize,
    pub operation_count: usize,
    pub format: SourceFormat,
}

/// One (path, method) pair of the document.
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    /// Path template exactly as declared, e.g. `/pets/{petId}`.
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Path-item parameters merged with operation parameters (the latter win).
    /// Header and cookie parameters are already dropped.
    pub parameters: Vec<OperationParameter>,
    /// Present only when the request body declares a JSON media type.
    pub request_body: Option<JsonRequestBody>,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
}

impl ParamLocation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    /// Schema `type` keyword when one could be determined.
    pub type_hint: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRequestBody {
    pub required: bool,
    pub description: Option<String>,
}
