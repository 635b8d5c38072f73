//! Per-namespace MCP endpoint: stateless JSON-RPC 2.0 over `POST`, one JSON response per request.
//!
//! Each enabled namespace answers at `/mcp/{spec_name}`. Supported methods are `initialize`,
//! `ping`, `tools/list` and `tools/call`; notifications and client responses are acknowledged
//! with `202 Accepted`. A namespace that is absent or disabled answers `404`.

use crate::dispatcher::ToolCall;
use crate::error::HubError;
use crate::service::Hub;
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use mcp_hub_openapi::ToolResult;
use rmcp::model::{
    CallToolResult, Content, ErrorCode, JsonObject, ListToolsResult, ProtocolVersion,
};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn router() -> Router {
    Router::new()
        .route("/mcp/{spec_name}", post(handle))
        .route("/mcp/{spec_name}/mcp", post(handle))
}

async fn handle(
    Extension(hub): Extension<Arc<Hub>>,
    Path(spec_name): Path<String>,
    body: Bytes,
) -> Response {
    if !hub.is_mounted(&spec_name) {
        return not_mounted(&spec_name);
    }

    let msg: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return Json(jsonrpc_err(
                &Value::Null,
                ErrorCode::PARSE_ERROR,
                &format!("invalid JSON: {e}"),
            ))
            .into_response();
        }
    };
    if msg.is_array() {
        return Json(jsonrpc_err(
            &Value::Null,
            ErrorCode::INVALID_REQUEST,
            "batch requests are not supported",
        ))
        .into_response();
    }

    let id = msg.get("id").cloned();
    let Some(method) = msg.get("method").and_then(Value::as_str) else {
        // Responses to server-initiated requests carry `result`/`error` and no `method`.
        if msg.get("result").is_some() || msg.get("error").is_some() {
            return StatusCode::ACCEPTED.into_response();
        }
        return Json(jsonrpc_err(
            &id.unwrap_or(Value::Null),
            ErrorCode::INVALID_REQUEST,
            "missing method",
        ))
        .into_response();
    };
    // Ignore notifications (no `id`).
    let Some(id) = id else {
        tracing::debug!(namespace = %spec_name, method, "notification acknowledged");
        return StatusCode::ACCEPTED.into_response();
    };
    let params = msg.get("params").cloned().unwrap_or(Value::Null);

    let outcome = match method {
        "initialize" => Ok(initialize_result(&spec_name, &params)),
        "ping" => Ok(json!({})),
        "tools/list" => list_tools(&hub, &spec_name),
        "tools/call" => call_tool(&hub, &spec_name, &params).await,
        other => Err(RpcFailure::Error(
            ErrorCode::METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        )),
    };

    match outcome {
        Ok(result) => Json(jsonrpc_ok(&id, &result)).into_response(),
        Err(RpcFailure::NotMounted) => not_mounted(&spec_name),
        Err(RpcFailure::Error(code, message)) => {
            Json(jsonrpc_err(&id, code, &message)).into_response()
        }
    }
}

enum RpcFailure {
    /// The namespace was disabled or deleted while the request was in flight.
    NotMounted,
    Error(ErrorCode, String),
}

fn initialize_result(spec_name: &str, params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .map_or_else(
            || serde_json::to_value(ProtocolVersion::LATEST).unwrap_or(Value::Null),
            |v| Value::String(v.to_string()),
        );

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": spec_name, "version": env!("CARGO_PKG_VERSION") }
    })
}

fn list_tools(hub: &Hub, spec_name: &str) -> Result<Value, RpcFailure> {
    let tools = hub.list_tools(spec_name).map_err(|_| RpcFailure::NotMounted)?;
    let result = ListToolsResult {
        tools,
        ..Default::default()
    };
    to_result_value(&result)
}

async fn call_tool(hub: &Hub, spec_name: &str, params: &Value) -> Result<Value, RpcFailure> {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return Err(RpcFailure::Error(
            ErrorCode::INVALID_PARAMS,
            "tools/call requires a string 'name'".to_string(),
        ));
    };
    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => JsonObject::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(RpcFailure::Error(
                ErrorCode::INVALID_PARAMS,
                "tools/call 'arguments' must be an object".to_string(),
            ));
        }
    };

    let result = match hub.call_tool(spec_name, ToolCall::new(name, arguments)).await {
        Ok(result) => tool_result_to_call_result(result),
        Err(HubError::NamespaceNotMounted(_)) => return Err(RpcFailure::NotMounted),
        Err(HubError::ToolNotFound(tool)) => {
            return Err(RpcFailure::Error(
                ErrorCode::INVALID_PARAMS,
                format!("unknown tool: {tool}"),
            ));
        }
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    };
    to_result_value(&result)
}

/// Text content always carries the serialized result; structured content only a JSON object.
fn tool_result_to_call_result(result: ToolResult) -> CallToolResult {
    let value = result.into_value();
    let text = serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
    let structured_content = value.is_object().then_some(value);
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content,
        is_error: Some(false),
        meta: None,
    }
}

fn to_result_value<T: serde::Serialize>(result: &T) -> Result<Value, RpcFailure> {
    serde_json::to_value(result)
        .map_err(|e| RpcFailure::Error(ErrorCode::INTERNAL_ERROR, e.to_string()))
}

fn not_mounted(spec_name: &str) -> Response {
    let detail = HubError::NamespaceNotMounted(spec_name.to_string()).to_string();
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

fn jsonrpc_ok(id: &Value, result: &Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn jsonrpc_err(id: &Value, code: ErrorCode, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code.0, "message": message } })
}
