#![allow(dead_code)]

use anyhow::Context as _;
use axum::{
    Json, Router,
    extract::Path,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use std::process::{Child, Command};
use std::time::Duration;

pub use mcp_hub_test_support::{KillOnDrop, TestServer};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    mcp_hub_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    mcp_hub_test_support::wait_http_ok(url, timeout_dur).await
}

pub fn spawn_hub(port: u16) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_mcp-hub");
    Command::new(bin)
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .arg("--log-level")
        .arg("info")
        .spawn()
        .context("spawn hub")
}

pub const PETSTORE_YAML: &str = r"openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
servers:
  - url: https://petstore.invalid/v1
paths:
  /pets/{petId}:
    get:
      operationId: getPet
      summary: Fetch one pet
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
  /missing:
    get:
      operationId: missing
  /health:
    get: {}
";

/// Upstream answering the operations of [`PETSTORE_YAML`].
pub fn petstore_upstream() -> Router {
    async fn get_pet(Path(pet_id): Path<String>) -> impl IntoResponse {
        Json(json!({ "id": pet_id, "name": "Rex" }))
    }

    async fn missing() -> impl IntoResponse {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
    }

    async fn health() -> impl IntoResponse {
        ([(header::CONTENT_TYPE, "text/plain")], "ok")
    }

    Router::new()
        .route("/pets/{pet_id}", get(get_pet))
        .route("/missing", get(missing))
        .route("/health", get(health))
}

pub async fn upload_spec(
    client: &reqwest::Client,
    hub_base: &str,
    name: &str,
    file_name: &str,
    spec: &str,
    base_url_override: Option<&str>,
) -> anyhow::Result<reqwest::Response> {
    let file = reqwest::multipart::Part::bytes(spec.as_bytes().to_vec()).file_name(file_name.to_string());
    let mut form = reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .part("file", file);
    if let Some(url) = base_url_override {
        form = form.text("base_url_override", url.to_string());
    }
    client
        .post(format!("{hub_base}/specs/upload"))
        .multipart(form)
        .send()
        .await
        .context("POST /specs/upload")
}

/// Send one JSON-RPC request and return the raw HTTP response.
pub async fn mcp_post(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
) -> anyhow::Result<reqwest::Response> {
    client
        .post(url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("POST {url}"))
}

/// Send one JSON-RPC request and return the decoded response envelope.
pub async fn mcp_request(
    client: &reqwest::Client,
    url: &str,
    id: u64,
    method: &str,
    params: Value,
) -> anyhow::Result<Value> {
    let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
    let resp = mcp_post(client, url, &body).await?;
    anyhow::ensure!(
        resp.status().is_success(),
        "{method} returned HTTP {}",
        resp.status()
    );
    resp.json().await.context("decode JSON-RPC response")
}

/// `result.content[0].text` of a `tools/call` response, parsed as JSON.
pub fn tool_call_text_json(msg: &Value) -> anyhow::Result<Value> {
    let text = msg
        .get("result")
        .and_then(|r| r.get("content"))
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .context("tools/call missing result.content[0].text")?;
    serde_json::from_str(text).context("tools/call text is not JSON")
}
