//! Derive MCP tools from a loaded [`Document`].
//!
//! Each operation becomes one [`GeneratedTool`]: a public face (name, description, input
//! schema, annotations) plus a data-only [`InvocationSpec`] that the generic
//! [`crate::invoker::UpstreamInvoker`] executes. No per-operation code is produced.

use crate::document::{Document, Operation, PATH_PLACEHOLDER, ParamLocation};
use crate::error::{OpenApiToolsError, Result};
use regex::Regex;
use reqwest::Method;
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Argument name a JSON request body is bound to.
pub const BODY_FIELD: &str = "body";

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid separator regex"));

/// Primitive JSON Schema type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
}

impl FieldType {
    /// Map a parameter's schema `type` onto the four field types tools expose.
    #[must_use]
    pub fn from_type_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("integer" | "number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("object" | "array") => Self::Object,
            _ => Self::String,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

/// Ordered field list of a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    pub fields: Vec<InputField>,
}

impl InputSchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Required field names in field order.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Render as a JSON Schema object (`type: object` with `properties` and `required`).
    #[must_use]
    pub fn to_json_schema(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        for field in &self.fields {
            let mut prop = json!({ "type": field.field_type.as_str() });
            if let Some(desc) = &field.description {
                prop["description"] = json!(desc);
            }
            properties.insert(field.name.clone(), prop);
        }

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        let required = self.required();
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }
}

/// Where an argument goes in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub name: String,
    pub location: BindingLocation,
    pub required: bool,
}

/// Everything needed to turn tool arguments into one upstream HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    pub method: Method,
    pub path_template: String,
    /// Effective base URL, resolved once when the tool set is generated.
    pub base_url: Url,
    pub bindings: Vec<FieldBinding>,
}

impl InvocationSpec {
    #[must_use]
    pub fn expects_body(&self) -> bool {
        self.bindings
            .iter()
            .any(|b| b.location == BindingLocation::Body)
    }
}

/// Back-reference from a tool to the operation it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(id) = &self.operation_id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTool {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
    pub operation: OperationRef,
    pub invocation: InvocationSpec,
}

impl GeneratedTool {
    /// MCP view of this tool.
    #[must_use]
    pub fn to_mcp_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema.to_json_schema()),
        );
        tool.annotations = Some(annotations_for_method(&self.operation.method));
        tool
    }
}

/// Ordered, name-indexed tools of one namespace.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<GeneratedTool>,
    by_name: HashMap<String, usize>,
}

impl ToolSet {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GeneratedTool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedTool> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[must_use]
    pub fn to_mcp_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(GeneratedTool::to_mcp_tool).collect()
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a GeneratedTool;
    type IntoIter = std::slice::Iter<'a, GeneratedTool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}

/// Generate the tool set of a document.
///
/// Deterministic: the same document and override always give the same names, schemas and
/// order. Either every operation becomes a tool or an error is returned.
///
/// # Errors
///
/// - [`OpenApiToolsError::SchemaViolation`] when no usable base URL exists.
/// - [`OpenApiToolsError::NamingCollision`] when two operations map to one tool name.
/// - [`OpenApiToolsError::ParamCollision`] when two inputs of one operation share a name.
pub fn generate(document: &Document, base_url_override: Option<&str>) -> Result<ToolSet> {
    let base_url = document.effective_base_url(base_url_override)?;

    let mut set = ToolSet::default();
    for op in document.operations() {
        let tool = generate_tool(op, &base_url)?;
        if let Some(&existing) = set.by_name.get(&tool.name) {
            return Err(OpenApiToolsError::NamingCollision {
                name: tool.name,
                first: set.tools[existing].operation.to_string(),
                second: tool.operation.to_string(),
            });
        }
        set.by_name.insert(tool.name.clone(), set.tools.len());
        set.tools.push(tool);
    }

    tracing::debug!(
        title = document.title(),
        tools = set.len(),
        base_url = %base_url,
        "generated tools"
    );
    Ok(set)
}

fn generate_tool(op: &Operation, base_url: &Url) -> Result<GeneratedTool> {
    let mut fields: Vec<InputField> = Vec::new();
    let mut bindings: Vec<FieldBinding> = Vec::new();

    for param in &op.parameters {
        if bindings.iter().any(|b| b.name == param.name) {
            return Err(OpenApiToolsError::ParamCollision(format!(
                "{op}: parameter '{}' is declared in more than one location",
                param.name
            )));
        }
        fields.push(InputField {
            name: param.name.clone(),
            field_type: FieldType::from_type_hint(param.type_hint.as_deref()),
            required: param.required,
            description: param.description.clone(),
        });
        bindings.push(FieldBinding {
            name: param.name.clone(),
            location: match param.location {
                ParamLocation::Path => BindingLocation::Path,
                ParamLocation::Query => BindingLocation::Query,
            },
            required: param.required,
        });
    }

    if let Some(body) = &op.request_body {
        if bindings.iter().any(|b| b.name == BODY_FIELD) {
            return Err(OpenApiToolsError::ParamCollision(format!(
                "{op}: a parameter named '{BODY_FIELD}' clashes with the JSON request body"
            )));
        }
        fields.push(InputField {
            name: BODY_FIELD.to_string(),
            field_type: FieldType::Object,
            required: body.required,
            description: Some(
                body.description
                    .clone()
                    .unwrap_or_else(|| "JSON request body".to_string()),
            ),
        });
        bindings.push(FieldBinding {
            name: BODY_FIELD.to_string(),
            location: BindingLocation::Body,
            required: body.required,
        });
    }

    Ok(GeneratedTool {
        name: tool_name(op),
        description: tool_description(op),
        input_schema: InputSchema { fields },
        operation: OperationRef {
            method: op.method.clone(),
            path: op.path.clone(),
            operation_id: op.operation_id.clone(),
        },
        invocation: InvocationSpec {
            method: op.method.clone(),
            path_template: op.path.clone(),
            base_url: base_url.clone(),
            bindings,
        },
    })
}

fn tool_name(op: &Operation) -> String {
    match op.operation_id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => synthesize_tool_name(&op.method, &op.path),
    }
}

/// Name for an operation without `operationId`: `GET /pets/{petId}` becomes `GET__pets_petId`.
#[must_use]
pub fn synthesize_tool_name(method: &Method, path: &str) -> String {
    let unwrapped = PATH_PLACEHOLDER.replace_all(path, "_${1}_");
    let sanitized = NON_ALNUM.replace_all(&unwrapped, "_");
    let sanitized = sanitized.trim_matches('_');
    let sanitized = if sanitized.is_empty() { "root" } else { sanitized };
    format!("{}__{}", method.as_str().to_ascii_uppercase(), sanitized)
}

fn tool_description(op: &Operation) -> String {
    [op.summary.as_deref(), op.description.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map_or_else(|| format!("Call {op}"), str::to_string)
}

/// MCP tool annotations from HTTP method semantics (RFC 9110).
///
/// Every tool reaches an external system, so `openWorldHint` is always set. Extension methods
/// get no other hints.
#[must_use]
pub fn annotations_for_method(method: &Method) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match method.as_str() {
        "GET" | "HEAD" | "OPTIONS" | "TRACE" => (Some(true), Some(false), Some(true)),
        "POST" => (Some(false), Some(false), Some(false)),
        "PUT" | "DELETE" => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent.
        "PATCH" => (Some(false), Some(true), None),
        _ => (None, None, None),
    };
    ToolAnnotations {
        title: None,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
