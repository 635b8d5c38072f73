//! Turn uploaded spec text into a validated [`Document`].
//!
//! Loading happens in four passes:
//! 1. parse the text as JSON or YAML into a generic value (format detection),
//! 2. check the few top-level rules we depend on,
//! 3. project the value down to what tool generation reads, so that `openapiv3` never sees
//!    responses, callbacks or schema bodies (where 3.1 documents differ from 3.0),
//! 4. walk `paths`, resolve local `$ref`s and flatten every operation.

use crate::document::{
    Document, JsonRequestBody, Operation, OperationParameter, PATH_PLACEHOLDER, ParamLocation,
    SourceFormat,
};
use crate::error::{OpenApiToolsError, Result};
use crate::invoker::is_json_content_type;
use crate::resolver::LocalRefResolver;
use openapiv3::{
    OpenAPI, Parameter, ParameterSchemaOrContent, PathItem, ReferenceOr, RequestBody, Schema,
    SchemaKind, Server, Type,
};
use reqwest::Method;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];
const PRIMITIVE_TYPES: [&str; 6] = ["string", "number", "integer", "boolean", "object", "array"];

/// Caller's belief about the serialization of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentHint {
    Json,
    Yaml,
    #[default]
    Unknown,
}

impl ContentHint {
    /// Guess from an uploaded file name (`.json`, `.yaml`, `.yml`).
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Self::Yaml
        } else {
            Self::Unknown
        }
    }

    /// Guess from a declared media type.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if is_json_content_type(content_type) {
            Self::Json
        } else if content_type.to_ascii_lowercase().contains("yaml") {
            Self::Yaml
        } else {
            Self::Unknown
        }
    }

    /// Keep `self` unless it is `Unknown`.
    #[must_use]
    pub fn or(self, other: ContentHint) -> ContentHint {
        match self {
            Self::Unknown => other,
            known => known,
        }
    }
}

/// Parse, validate and flatten an OpenAPI 3.x document.
///
/// The hint only decides which parser is tried first; if it fails the other one is tried.
/// Without a hint, text whose first non-blank character is `{` is treated as JSON.
///
/// # Errors
///
/// - [`OpenApiToolsError::InvalidFormat`] when the text is neither JSON nor YAML, or is not an
///   object at the top level.
/// - [`OpenApiToolsError::UnsupportedVersion`] for Swagger 2.0 or any non-3.x `openapi` value.
/// - [`OpenApiToolsError::SchemaViolation`] for missing `info`/`paths`, unresolvable `$ref`s,
///   or path placeholders without a matching path parameter.
pub fn load(raw: &[u8], hint: ContentHint) -> Result<Document> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        OpenApiToolsError::InvalidFormat(format!("spec text is not valid UTF-8: {e}"))
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let (mut value, format) = parse_structured(text, hint)?;
    if !value.is_object() {
        return Err(OpenApiToolsError::InvalidFormat(format!(
            "spec must be an object at the top level, got {}",
            value_kind(&value)
        )));
    }
    let openapi_version = normalize_top_level(&mut value)?;
    let view = tool_view(&value);

    let spec: OpenAPI = serde_json::from_value(view.clone()).map_err(|e| {
        OpenApiToolsError::SchemaViolation(format!(
            "document is not a valid OpenAPI 3 description: {e}"
        ))
    })?;

    let resolver = LocalRefResolver::new(&view);
    let operations = collect_operations(&spec, resolver)?;
    let server_urls = spec.servers.iter().map(server_url_with_defaults).collect();

    tracing::debug!(
        title = %spec.info.title,
        format = %format,
        operations = operations.len(),
        "loaded OpenAPI document"
    );

    Ok(Document {
        openapi_version,
        title: spec.info.title.clone(),
        api_version: spec.info.version.clone(),
        description: spec.info.description.clone(),
        server_urls,
        path_count: spec.paths.paths.len(),
        operations,
        format,
        raw_text: text.to_string(),
    })
}

fn parse_structured(text: &str, hint: ContentHint) -> Result<(Value, SourceFormat)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(OpenApiToolsError::InvalidFormat("spec text is empty".to_string()));
    }

    let json_first = match hint {
        ContentHint::Json => true,
        ContentHint::Yaml => false,
        ContentHint::Unknown => trimmed.starts_with('{'),
    };
    let (first, second) = if json_first {
        (SourceFormat::Json, SourceFormat::Yaml)
    } else {
        (SourceFormat::Yaml, SourceFormat::Json)
    };

    match parse_as(trimmed, first) {
        Ok(value) => Ok((value, first)),
        Err(first_err) => match parse_as(trimmed, second) {
            Ok(value) => Ok((value, second)),
            Err(second_err) => Err(OpenApiToolsError::InvalidFormat(format!(
                "not parseable as {first} ({first_err}) nor as {second} ({second_err})"
            ))),
        },
    }
}

fn parse_as(text: &str, format: SourceFormat) -> std::result::Result<Value, String> {
    match format {
        SourceFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        SourceFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn check_version(top: &mut Map<String, Value>) -> Result<String> {
    coerce_scalar_to_string(top, "openapi");
    let version = match top.get("openapi") {
        Some(Value::String(v)) => v.trim().to_string(),
        Some(other) => {
            return Err(OpenApiToolsError::SchemaViolation(format!(
                "field 'openapi' must be a string, got {}",
                value_kind(other)
            )));
        }
        None => {
            if let Some(swagger) = top.get("swagger") {
                let declared = swagger.as_str().map_or_else(|| swagger.to_string(), str::to_string);
                return Err(OpenApiToolsError::UnsupportedVersion(format!(
                    "Swagger {declared} documents are not supported; only OpenAPI 3.x is"
                )));
            }
            return Err(OpenApiToolsError::SchemaViolation(
                "missing required field 'openapi'".to_string(),
            ));
        }
    };

    if version.split('.').next() != Some("3") {
        return Err(OpenApiToolsError::UnsupportedVersion(format!(
            "only OpenAPI 3.x is supported, got '{version}'"
        )));
    }
    Ok(version)
}

fn normalize_top_level(value: &mut Value) -> Result<String> {
    let Some(top) = value.as_object_mut() else {
        return Err(OpenApiToolsError::InvalidFormat(
            "spec must be an object at the top level".to_string(),
        ));
    };

    let openapi_version = check_version(top)?;
    require_object(top, "paths")?;
    top.entry("info").or_insert_with(|| json!({}));
    require_object(top, "info")?;
    if let Some(Value::Object(info)) = top.get_mut("info") {
        coerce_scalar_to_string(info, "version");
        default_string(info, "title", "Untitled");
        default_string(info, "version", "unknown");
    }
    Ok(openapi_version)
}

fn default_string(map: &mut Map<String, Value>, field: &str, fallback: &str) {
    if !map.get(field).is_some_and(Value::is_string) {
        map.insert(field.to_string(), Value::String(fallback.to_string()));
    }
}

/// The part of the document tool generation reads, in a shape `openapiv3` accepts for any 3.x.
///
/// Operations keep identity, docs, parameters and request bodies; responses become empty.
/// Schemas shrink to their primitive `type` (the first non-null entry of a 3.1 type array).
/// Parameters without `schema` or `content` get an empty schema.
fn tool_view(value: &Value) -> Value {
    let Some(top) = value.as_object() else {
        return value.clone();
    };

    let mut view = Map::new();
    copy_if(top, &mut view, "openapi", |_| true);
    if let Some(Value::Object(info)) = top.get("info") {
        let mut slim = Map::new();
        copy_if(info, &mut slim, "title", Value::is_string);
        copy_if(info, &mut slim, "version", Value::is_string);
        copy_if(info, &mut slim, "description", Value::is_string);
        view.insert("info".to_string(), Value::Object(slim));
    }
    if let Some(Value::Array(servers)) = top.get("servers") {
        let servers = servers.iter().filter_map(Value::as_object).map(server_view).collect();
        view.insert("servers".to_string(), Value::Array(servers));
    }
    if let Some(Value::Object(paths)) = top.get("paths") {
        let paths = paths
            .iter()
            .map(|(path, item)| (path.clone(), path_item_view(item)))
            .collect();
        view.insert("paths".to_string(), Value::Object(paths));
    }
    if let Some(Value::Object(components)) = top.get("components") {
        view.insert("components".to_string(), components_view(components));
    }
    Value::Object(view)
}

fn copy_if(from: &Map<String, Value>, to: &mut Map<String, Value>, key: &str, keep: fn(&Value) -> bool) {
    if let Some(v) = from.get(key).filter(|v| keep(v)) {
        to.insert(key.to_string(), v.clone());
    }
}

fn reference_view(value: &Value) -> Option<Value> {
    value.get("$ref").map(|r| json!({ "$ref": r }))
}

fn server_view(server: &Map<String, Value>) -> Value {
    let mut slim = Map::new();
    copy_if(server, &mut slim, "url", Value::is_string);
    if let Some(Value::Object(variables)) = server.get("variables") {
        let variables: Map<String, Value> = variables
            .iter()
            .filter_map(|(name, var)| {
                let default = var.get("default")?.as_str()?;
                Some((name.clone(), json!({ "default": default })))
            })
            .collect();
        slim.insert("variables".to_string(), Value::Object(variables));
    }
    Value::Object(slim)
}

fn path_item_view(item: &Value) -> Value {
    let Some(map) = item.as_object() else {
        return item.clone();
    };
    if let Some(reference) = reference_view(item) {
        return reference;
    }

    let mut slim = Map::new();
    if let Some(params) = map.get("parameters") {
        slim.insert("parameters".to_string(), parameters_view(params));
    }
    for method in METHODS {
        if let Some(Value::Object(op)) = map.get(method) {
            slim.insert(method.to_string(), operation_view(op));
        }
    }
    Value::Object(slim)
}

fn operation_view(op: &Map<String, Value>) -> Value {
    let mut slim = Map::new();
    copy_if(op, &mut slim, "operationId", Value::is_string);
    copy_if(op, &mut slim, "summary", Value::is_string);
    copy_if(op, &mut slim, "description", Value::is_string);
    if let Some(params) = op.get("parameters") {
        slim.insert("parameters".to_string(), parameters_view(params));
    }
    if let Some(body) = op.get("requestBody") {
        slim.insert("requestBody".to_string(), request_body_view(body));
    }
    slim.insert("responses".to_string(), json!({}));
    Value::Object(slim)
}

fn parameters_view(params: &Value) -> Value {
    match params {
        Value::Array(list) => Value::Array(list.iter().map(parameter_view).collect()),
        other => other.clone(),
    }
}

fn parameter_view(param: &Value) -> Value {
    let Some(map) = param.as_object() else {
        return param.clone();
    };
    if let Some(reference) = reference_view(param) {
        return reference;
    }

    let mut slim = Map::new();
    copy_if(map, &mut slim, "name", |_| true);
    copy_if(map, &mut slim, "in", |_| true);
    copy_if(map, &mut slim, "description", Value::is_string);
    let required = map.get("required").and_then(Value::as_bool).unwrap_or(false);
    slim.insert("required".to_string(), Value::Bool(required));
    match (map.get("schema"), map.get("content")) {
        (Some(schema), _) => {
            slim.insert("schema".to_string(), schema_view(schema));
        }
        (None, Some(Value::Object(content))) if !content.is_empty() => {
            slim.insert("content".to_string(), media_types_view(content));
        }
        _ => {
            slim.insert("schema".to_string(), json!({}));
        }
    }
    Value::Object(slim)
}

fn request_body_view(body: &Value) -> Value {
    let Some(map) = body.as_object() else {
        return body.clone();
    };
    if let Some(reference) = reference_view(body) {
        return reference;
    }

    let mut slim = Map::new();
    copy_if(map, &mut slim, "description", Value::is_string);
    copy_if(map, &mut slim, "required", Value::is_boolean);
    let content = match map.get("content") {
        Some(Value::Object(content)) => media_types_view(content),
        _ => json!({}),
    };
    slim.insert("content".to_string(), content);
    Value::Object(slim)
}

// Only the media type names are read.
fn media_types_view(content: &Map<String, Value>) -> Value {
    Value::Object(content.keys().map(|media| (media.clone(), json!({}))).collect())
}

fn schema_view(schema: &Value) -> Value {
    if let Some(reference) = reference_view(schema) {
        return reference;
    }
    let primitive = match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    };
    match primitive.filter(|t| PRIMITIVE_TYPES.contains(t)) {
        Some(t) => json!({ "type": t }),
        None => json!({}),
    }
}

fn components_view(components: &Map<String, Value>) -> Value {
    let section = |key: &str, view: fn(&Value) -> Value| -> Option<Value> {
        let Some(Value::Object(entries)) = components.get(key) else {
            return None;
        };
        Some(Value::Object(
            entries.iter().map(|(name, v)| (name.clone(), view(v))).collect(),
        ))
    };

    let mut slim = Map::new();
    for (key, view) in [
        ("schemas", schema_view as fn(&Value) -> Value),
        ("parameters", parameter_view),
        ("requestBodies", request_body_view),
    ] {
        if let Some(entries) = section(key, view) {
            slim.insert(key.to_string(), entries);
        }
    }
    // Not part of the 3.0 model; only reachable through `$ref`, which reads the view directly.
    if let Some(entries) = section("pathItems", path_item_view) {
        slim.insert("pathItems".to_string(), entries);
    }
    Value::Object(slim)
}

fn require_object(top: &Map<String, Value>, field: &str) -> Result<()> {
    match top.get(field) {
        Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(OpenApiToolsError::SchemaViolation(format!(
            "field '{field}' must be an object, got {}",
            value_kind(other)
        ))),
        None => Err(OpenApiToolsError::SchemaViolation(format!(
            "missing required field '{field}'"
        ))),
    }
}

// YAML reads `version: 1.0` as a float.
fn coerce_scalar_to_string(map: &mut Map<String, Value>, field: &str) {
    if let Some(slot) = map.get_mut(field)
        && let Value::Number(n) = slot
    {
        *slot = Value::String(n.to_string());
    }
}

fn server_url_with_defaults(server: &Server) -> String {
    let mut url = server.url.trim().to_string();
    if let Some(variables) = &server.variables {
        for (name, variable) in variables {
            url = url.replace(&format!("{{{name}}}"), &variable.default);
        }
    }
    url
}

fn collect_operations(spec: &OpenAPI, resolver: LocalRefResolver<'_>) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();

    for (path, item_ref) in &spec.paths.paths {
        let item: PathItem = resolver.resolve(item_ref)?;
        let placeholders: Vec<&str> = PATH_PLACEHOLDER
            .captures_iter(path)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if placeholders.iter().any(|name| name.trim().is_empty()) {
            return Err(OpenApiToolsError::SchemaViolation(format!(
                "path '{path}' has an empty placeholder '{{}}'"
            )));
        }

        let methods = [
            (Method::GET, item.get.as_ref()),
            (Method::PUT, item.put.as_ref()),
            (Method::POST, item.post.as_ref()),
            (Method::DELETE, item.delete.as_ref()),
            (Method::OPTIONS, item.options.as_ref()),
            (Method::HEAD, item.head.as_ref()),
            (Method::PATCH, item.patch.as_ref()),
            (Method::TRACE, item.trace.as_ref()),
        ];

        for (method, op) in methods {
            let Some(op) = op else { continue };
            let label = format!("{method} {path}");

            let parameters = merge_parameters(resolver, &item.parameters, &op.parameters, &label)?;
            for placeholder in &placeholders {
                let declared = parameters
                    .iter()
                    .any(|p| p.location == ParamLocation::Path && p.name == *placeholder);
                if !declared {
                    return Err(OpenApiToolsError::SchemaViolation(format!(
                        "{label}: path placeholder '{{{placeholder}}}' has no matching path parameter"
                    )));
                }
            }

            let request_body = json_request_body(resolver, op.request_body.as_ref())?;

            operations.push(Operation {
                method,
                path: path.clone(),
                operation_id: op.operation_id.clone(),
                summary: op.summary.clone(),
                description: op.description.clone(),
                parameters,
                request_body,
            });
        }
    }

    Ok(operations)
}

/// Merge path-item level parameters with operation level parameters.
///
/// An operation parameter replaces a path-item parameter with the same (location, name).
/// Header and cookie parameters are not exposed as tool inputs and are dropped here.
fn merge_parameters(
    resolver: LocalRefResolver<'_>,
    path_params: &[ReferenceOr<Parameter>],
    op_params: &[ReferenceOr<Parameter>],
    label: &str,
) -> Result<Vec<OperationParameter>> {
    let mut merged: Vec<OperationParameter> = Vec::new();
    let mut index: HashMap<(ParamLocation, String), usize> = HashMap::new();

    for param_ref in path_params {
        let param: Parameter = resolver.resolve(param_ref)?;
        if let Some(extracted) = extract_parameter(resolver, &param, label) {
            index.insert((extracted.location, extracted.name.clone()), merged.len());
            merged.push(extracted);
        }
    }

    for param_ref in op_params {
        let param: Parameter = resolver.resolve(param_ref)?;
        let Some(extracted) = extract_parameter(resolver, &param, label) else {
            continue;
        };
        let key = (extracted.location, extracted.name.clone());
        if let Some(i) = index.get(&key).copied() {
            merged[i] = extracted;
        } else {
            index.insert(key, merged.len());
            merged.push(extracted);
        }
    }

    Ok(merged)
}

fn extract_parameter(
    resolver: LocalRefResolver<'_>,
    param: &Parameter,
    label: &str,
) -> Option<OperationParameter> {
    let (data, location) = match param {
        Parameter::Path { parameter_data, .. } => (parameter_data, ParamLocation::Path),
        Parameter::Query { parameter_data, .. } => (parameter_data, ParamLocation::Query),
        Parameter::Header { parameter_data, .. } | Parameter::Cookie { parameter_data, .. } => {
            tracing::debug!(
                operation = label,
                parameter = %parameter_data.name,
                "skipping header/cookie parameter"
            );
            return None;
        }
    };

    Some(OperationParameter {
        name: data.name.clone(),
        location,
        // Path parameters are always required, whatever the document says.
        required: location == ParamLocation::Path || data.required,
        type_hint: type_hint(resolver, &data.format),
        description: data.description.clone(),
    })
}

fn type_hint(resolver: LocalRefResolver<'_>, format: &ParameterSchemaOrContent) -> Option<String> {
    match format {
        ParameterSchemaOrContent::Schema(schema_ref) => {
            let schema: Schema = resolver.resolve(schema_ref).ok()?;
            schema_type_name(&schema).map(str::to_string)
        }
        ParameterSchemaOrContent::Content(_) => None,
    }
}

fn schema_type_name(schema: &Schema) -> Option<&'static str> {
    match &schema.schema_kind {
        SchemaKind::Type(Type::String(_)) => Some("string"),
        SchemaKind::Type(Type::Number(_)) => Some("number"),
        SchemaKind::Type(Type::Integer(_)) => Some("integer"),
        SchemaKind::Type(Type::Boolean(_)) => Some("boolean"),
        SchemaKind::Type(Type::Object(_)) => Some("object"),
        SchemaKind::Type(Type::Array(_)) => Some("array"),
        _ => None,
    }
}

fn json_request_body(
    resolver: LocalRefResolver<'_>,
    body: Option<&ReferenceOr<RequestBody>>,
) -> Result<Option<JsonRequestBody>> {
    let Some(body_ref) = body else {
        return Ok(None);
    };
    let body: RequestBody = resolver.resolve(body_ref)?;
    if !body.content.keys().any(|media| is_json_content_type(media)) {
        return Ok(None);
    }
    Ok(Some(JsonRequestBody {
        required: body.required,
        description: body.description.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE_JSON: &str = r#"{
      "openapi": "3.0.3",
      "info": { "title": "Petstore", "version": "1.0.0", "description": "Pets." },
      "servers": [{ "url": "https://petstore.example.com/v1" }],
      "paths": {
        "/pets": {
          "get": {
            "operationId": "listPets",
            "summary": "List all pets",
            "parameters": [
              { "name": "limit", "in": "query", "schema": { "type": "integer" } },
              { "name": "X-Trace", "in": "header", "schema": { "type": "string" } }
            ]
          },
          "post": {
            "operationId": "createPet",
            "requestBody": {
              "required": true,
              "content": { "application/json": { "schema": { "type": "object" } } }
            }
          }
        },
        "/pets/{petId}": {
          "get": {
            "operationId": "getPet",
            "parameters": [
              { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } }
            ]
          }
        }
      }
    }"#;

    const PETSTORE_YAML: &str = r"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0
servers:
  - url: https://{region}.petstore.example.com
    variables:
      region:
        default: eu
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
";

    #[test]
    fn loads_json_document() {
        let doc = load(PETSTORE_JSON.as_bytes(), ContentHint::Unknown).expect("load");
        assert_eq!(doc.format(), SourceFormat::Json);
        assert_eq!(doc.title(), "Petstore");
        assert_eq!(doc.openapi_version(), "3.0.3");
        assert_eq!(doc.server_urls(), ["https://petstore.example.com/v1"]);

        let ops: Vec<String> = doc.operations().iter().map(ToString::to_string).collect();
        assert_eq!(ops, ["GET /pets", "POST /pets", "GET /pets/{petId}"]);

        let list = &doc.operations()[0];
        assert_eq!(list.parameters.len(), 1, "header parameter is dropped");
        assert_eq!(list.parameters[0].name, "limit");
        assert_eq!(list.parameters[0].type_hint.as_deref(), Some("integer"));
        assert!(!list.parameters[0].required);

        let create = &doc.operations()[1];
        assert_eq!(
            create.request_body,
            Some(JsonRequestBody {
                required: true,
                description: None
            })
        );
    }

    #[test]
    fn loads_yaml_document_with_server_variables_and_numeric_version() {
        let doc = load(PETSTORE_YAML.as_bytes(), ContentHint::Unknown).expect("load");
        assert_eq!(doc.format(), SourceFormat::Yaml);
        assert_eq!(doc.api_version(), "1.0");
        assert_eq!(doc.server_urls(), ["https://eu.petstore.example.com"]);
        assert_eq!(doc.operations().len(), 1);
    }

    #[test]
    fn wrong_hint_falls_back_to_the_other_parser() {
        let doc = load(PETSTORE_JSON.as_bytes(), ContentHint::Yaml).expect("load");
        assert_eq!(doc.operations().len(), 3);

        let doc = load(PETSTORE_YAML.as_bytes(), ContentHint::Json).expect("load");
        assert_eq!(doc.format(), SourceFormat::Yaml);
    }

    #[test]
    fn keeps_raw_text() {
        let doc = load(PETSTORE_YAML.as_bytes(), ContentHint::Yaml).expect("load");
        assert_eq!(doc.raw_text(), PETSTORE_YAML);
    }

    #[test]
    fn rejects_unparseable_text() {
        let err = load(b"{ not: [valid", ContentHint::Unknown).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::InvalidFormat(_)), "{err}");
    }

    #[test]
    fn rejects_scalar_top_level() {
        let err = load(b"just some words", ContentHint::Unknown).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::InvalidFormat(_)), "{err}");

        let err = load(b"", ContentHint::Unknown).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::InvalidFormat(_)), "{err}");
    }

    #[test]
    fn rejects_swagger_two() {
        let raw = br#"{"swagger": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}}"#;
        let err = load(raw, ContentHint::Json).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::UnsupportedVersion(_)), "{err}");
    }

    #[test]
    fn rejects_other_major_versions() {
        let raw = br#"{"openapi": "4.0.0", "info": {"title": "t", "version": "1"}, "paths": {}}"#;
        let err = load(raw, ContentHint::Json).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::UnsupportedVersion(_)), "{err}");
    }

    #[test]
    fn rejects_missing_paths() {
        let raw = br#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#;
        let err = load(raw, ContentHint::Json).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::SchemaViolation(_)), "{err}");
        assert!(err.to_string().contains("paths"));
    }

    #[test]
    fn missing_info_falls_back_to_placeholders() {
        let raw = br#"{
          "openapi": "3.0.0",
          "servers": [{ "url": "https://api.example.com" }],
          "paths": { "/ping": { "get": {} } }
        }"#;
        let doc = load(raw, ContentHint::Json).expect("load");
        assert_eq!(doc.title(), "Untitled");
        assert_eq!(doc.api_version(), "unknown");
        assert_eq!(doc.operations().len(), 1);

        let raw = br#"{"openapi": "3.0.0", "info": {"version": 2}, "paths": {}}"#;
        let doc = load(raw, ContentHint::Json).expect("load");
        assert_eq!(doc.title(), "Untitled");
        assert_eq!(doc.api_version(), "2");
    }

    #[test]
    fn parameter_without_schema_is_accepted() {
        let raw = br#"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "servers": [{ "url": "https://api.example.com" }],
          "paths": {
            "/pets/{petId}": {
              "get": {
                "parameters": [
                  { "name": "petId", "in": "path", "required": true },
                  { "name": "q", "in": "query", "content": { "application/json": { "schema": { "type": "object" } } } }
                ]
              }
            }
          }
        }"#;
        let doc = load(raw, ContentHint::Json).expect("load");
        let params = &doc.operations()[0].parameters;
        assert_eq!(params[0].name, "petId");
        assert!(params[0].required);
        assert_eq!(params[0].type_hint, None);
        assert_eq!(params[1].name, "q");

        let tools = crate::generator::generate(&doc, None).expect("generate");
        let tool = tools.get("GET__pets_petId").expect("tool");
        assert_eq!(
            tool.input_schema.field("petId").map(|f| f.field_type),
            Some(crate::generator::FieldType::String)
        );
    }

    #[test]
    fn loads_openapi_31_document() {
        let raw = br##"{
          "openapi": "3.1.0",
          "info": { "title": "Modern", "version": "2", "license": { "name": "MIT", "identifier": "MIT" } },
          "servers": [{ "url": "https://api.example.com" }],
          "webhooks": { "petAdded": { "post": { "responses": { "200": { "description": "ok" } } } } },
          "components": {
            "schemas": {
              "Pet": {
                "type": ["object", "null"],
                "properties": { "age": { "type": "integer", "exclusiveMinimum": 0 } },
                "examples": [{ "age": 3 }]
              },
              "Limit": { "type": ["null", "integer"] }
            },
            "responses": { "NotFound": { "content": { "application/json": {} } } }
          },
          "paths": {
            "/pets": {
              "get": {
                "operationId": "listPets",
                "parameters": [
                  { "name": "tag", "in": "query", "schema": { "type": ["string", "null"] } },
                  { "name": "limit", "in": "query", "schema": { "$ref": "#/components/schemas/Limit" } }
                ],
                "responses": {
                  "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } },
                  "404": { "$ref": "#/components/responses/NotFound" }
                }
              },
              "post": {
                "operationId": "addPet",
                "requestBody": {
                  "required": true,
                  "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                },
                "callbacks": { "done": { "{$request.body#/url}": { "post": { "responses": {} } } } }
              }
            }
          }
        }"##;
        let doc = load(raw, ContentHint::Json).expect("load");
        assert_eq!(doc.openapi_version(), "3.1.0");

        let list = &doc.operations()[0];
        let hints: Vec<Option<&str>> = list
            .parameters
            .iter()
            .map(|p| p.type_hint.as_deref())
            .collect();
        assert_eq!(hints, [Some("string"), Some("integer")]);

        let add = &doc.operations()[1];
        assert_eq!(add.operation_id.as_deref(), Some("addPet"));
        assert_eq!(
            add.request_body,
            Some(JsonRequestBody {
                required: true,
                description: None
            })
        );
    }

    #[test]
    fn rejects_empty_placeholder() {
        let raw = br#"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "paths": { "/a/{}": { "get": {} } }
        }"#;
        let err = load(raw, ContentHint::Json).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::SchemaViolation(_)), "{err}");
        assert!(err.to_string().contains("empty placeholder"), "{err}");
    }

    #[test]
    fn rejects_placeholder_without_path_parameter() {
        let raw = br#"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "paths": { "/pets/{petId}": { "get": { "operationId": "getPet" } } }
        }"#;
        let err = load(raw, ContentHint::Json).unwrap_err();
        assert!(matches!(err, OpenApiToolsError::SchemaViolation(_)), "{err}");
        assert!(err.to_string().contains("petId"));
    }

    #[test]
    fn path_item_parameters_are_merged_and_overridden() {
        let raw = br#"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "paths": {
            "/items/{id}": {
              "parameters": [
                { "name": "id", "in": "path", "required": true, "schema": {"type": "string"} },
                { "name": "verbose", "in": "query", "description": "outer", "schema": {"type": "boolean"} }
              ],
              "get": {
                "parameters": [
                  { "name": "verbose", "in": "query", "required": true, "description": "inner", "schema": {"type": "boolean"} }
                ]
              }
            }
          }
        }"#;
        let doc = load(raw, ContentHint::Json).expect("load");
        let params = &doc.operations()[0].parameters;
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "verbose"]);
        assert!(params[1].required);
        assert_eq!(params[1].description.as_deref(), Some("inner"));
    }

    #[test]
    fn resolves_component_references() {
        let raw = br##"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "components": {
            "parameters": {
              "PetId": { "name": "petId", "in": "path", "required": true, "schema": { "$ref": "#/components/schemas/Id" } }
            },
            "schemas": { "Id": { "type": "integer" } },
            "requestBodies": {
              "Pet": { "content": { "application/json": { "schema": { "type": "object" } } } }
            }
          },
          "paths": {
            "/pets/{petId}": {
              "put": {
                "parameters": [ { "$ref": "#/components/parameters/PetId" } ],
                "requestBody": { "$ref": "#/components/requestBodies/Pet" }
              }
            }
          }
        }"##;
        let doc = load(raw, ContentHint::Json).expect("load");
        let op = &doc.operations()[0];
        assert_eq!(op.parameters[0].name, "petId");
        assert_eq!(op.parameters[0].type_hint.as_deref(), Some("integer"));
        assert_eq!(
            op.request_body,
            Some(JsonRequestBody {
                required: false,
                description: None
            })
        );
    }

    #[test]
    fn non_json_request_body_is_not_exposed() {
        let raw = br#"{
          "openapi": "3.0.0",
          "info": {"title": "t", "version": "1"},
          "paths": {
            "/upload": {
              "post": {
                "requestBody": { "content": { "application/octet-stream": {} } }
              }
            }
          }
        }"#;
        let doc = load(raw, ContentHint::Json).expect("load");
        assert!(doc.operations()[0].request_body.is_none());
    }

    #[test]
    fn content_hint_guesses() {
        assert_eq!(ContentHint::from_file_name("petstore.JSON"), ContentHint::Json);
        assert_eq!(ContentHint::from_file_name("api.yml"), ContentHint::Yaml);
        assert_eq!(ContentHint::from_file_name("spec"), ContentHint::Unknown);
        assert_eq!(
            ContentHint::from_content_type("application/x-yaml"),
            ContentHint::Yaml
        );
        assert_eq!(
            ContentHint::Unknown.or(ContentHint::from_content_type("application/json")),
            ContentHint::Json
        );
        assert_eq!(ContentHint::Yaml.or(ContentHint::Json), ContentHint::Yaml);
    }
}
