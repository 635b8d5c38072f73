//! Generic upstream invoker.
//!
//! One [`UpstreamInvoker`] serves every tool of every namespace: it interprets an
//! [`InvocationSpec`] plus the caller's arguments, performs the HTTP request and normalizes the
//! response into a [`ToolResult`]. Non-2xx responses are ordinary results, not errors.

use crate::error::{OpenApiToolsError, Result};
use crate::generator::{BindingLocation, InvocationSpec};
use mime::Mime;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use rmcp::model::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct InvokerSettings {
    /// Whole-request timeout. `None` disables it.
    pub timeout: Option<Duration>,
    /// Largest accepted response body. `None` means unlimited.
    pub max_response_bytes: Option<usize>,
    pub follow_redirects: bool,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            max_response_bytes: None,
            follow_redirects: true,
        }
    }
}

/// Normalized outcome of one upstream call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    /// Parsed body of a JSON response.
    Json(Value),
    /// Any other response, kept as text with its status and declared content type.
    Text(TextResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    pub text: String,
    pub status_code: u16,
    pub content_type: String,
}

impl ToolResult {
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => json!({
                "text": text.text,
                "status_code": text.status_code,
                "content_type": text.content_type,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamInvoker {
    client: Client,
    settings: InvokerSettings,
}

impl UpstreamInvoker {
    /// Build the shared client for `settings`.
    ///
    /// # Errors
    ///
    /// [`OpenApiToolsError::ClientSetup`] if the TLS backend cannot be initialized.
    pub fn new(settings: InvokerSettings) -> Result<Self> {
        let redirect = if settings.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        };
        let client = Client::builder()
            .redirect(redirect)
            .build()
            .map_err(|e| OpenApiToolsError::ClientSetup(sanitize_reqwest_error(&e)))?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }

    /// Perform one upstream call.
    ///
    /// # Errors
    ///
    /// - [`OpenApiToolsError::MissingRequiredArgument`] before any network activity.
    /// - [`OpenApiToolsError::UpstreamUnreachable`] on connect failure or timeout.
    /// - [`OpenApiToolsError::UpstreamError`] when the response body cannot be read or exceeds
    ///   the configured limit.
    pub async fn invoke(&self, spec: &InvocationSpec, arguments: &JsonObject) -> Result<ToolResult> {
        let prepared = prepare_request(spec, arguments)?;
        tracing::debug!(
            method = %spec.method,
            url = %redact_url(&prepared.url),
            has_body = prepared.body.is_some(),
            "calling upstream"
        );

        let mut request = self.client.request(spec.method.clone(), prepared.url);
        if let Some(timeout) = self.settings.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = &prepared.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OpenApiToolsError::UpstreamUnreachable(sanitize_reqwest_error(&e)))?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = read_body_limited(response, self.settings.max_response_bytes).await?;

        Ok(normalize_response(status_code, content_type, &bytes))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedRequest {
    pub(crate) url: Url,
    pub(crate) body: Option<Value>,
}

/// Check arguments against the bindings and build the target URL and body.
pub(crate) fn prepare_request(
    spec: &InvocationSpec,
    arguments: &JsonObject,
) -> Result<PreparedRequest> {
    let present = |name: &str| arguments.get(name).filter(|v| !v.is_null());

    if let Some(missing) = spec
        .bindings
        .iter()
        .find(|b| b.required && present(&b.name).is_none())
    {
        return Err(OpenApiToolsError::MissingRequiredArgument(missing.name.clone()));
    }

    let mut path = spec.path_template.clone();
    let mut query: Vec<(String, String)> = Vec::new();
    let mut body: Option<Value> = None;

    for binding in &spec.bindings {
        let Some(value) = present(&binding.name) else {
            continue;
        };
        match binding.location {
            BindingLocation::Path => {
                let placeholder = format!("{{{}}}", binding.name);
                path = path.replace(&placeholder, &encode_path_segment(&value_to_string(value)));
            }
            BindingLocation::Query => push_query_pairs(&mut query, &binding.name, value),
            BindingLocation::Body => body = Some(value.clone()),
        }
    }

    let joined = format!("{}{}", spec.base_url.as_str().trim_end_matches('/'), path);
    let mut url = Url::parse(&joined).map_err(|e| {
        OpenApiToolsError::UpstreamError(format!("cannot build upstream URL for {path}: {e}"))
    })?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query {
            pairs.append_pair(key, value);
        }
    }

    Ok(PreparedRequest { url, body })
}

fn push_query_pairs(out: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items.iter().filter(|v| !v.is_null()) {
                out.push((name.to_string(), value_to_string(item)));
            }
        }
        other => out.push((name.to_string(), value_to_string(other))),
    }
}

/// Convert a JSON value to a string for URL parameters. Objects and arrays become JSON text.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Percent-encode a value for use as a single path segment.
fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_segment_safe(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

// RFC 3986 pchar minus '%': unreserved, sub-delims, ':' and '@'.
fn is_segment_safe(b: u8) -> bool {
    matches!(
        b,
        b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@'
    )
}

async fn read_body_limited(
    mut response: reqwest::Response,
    max_bytes: Option<usize>,
) -> Result<Vec<u8>> {
    let read_error = |e: reqwest::Error| {
        if e.is_timeout() {
            OpenApiToolsError::UpstreamUnreachable(sanitize_reqwest_error(&e))
        } else {
            OpenApiToolsError::UpstreamError(format!(
                "failed to read response body: {}",
                sanitize_reqwest_error(&e)
            ))
        }
    };

    let Some(max) = max_bytes else {
        let bytes = response.bytes().await.map_err(read_error)?;
        return Ok(bytes.to_vec());
    };

    if let Some(len) = response.content_length()
        && len > max as u64
    {
        return Err(OpenApiToolsError::UpstreamError(format!(
            "response too large: {len} bytes (limit {max})"
        )));
    }

    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(read_error)? {
        if out.len().saturating_add(chunk.len()) > max {
            return Err(OpenApiToolsError::UpstreamError(format!(
                "response too large: exceeded {max} bytes"
            )));
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

pub(crate) fn normalize_response(
    status_code: u16,
    content_type: Option<String>,
    bytes: &[u8],
) -> ToolResult {
    if content_type.as_deref().is_some_and(is_json_content_type) {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => return ToolResult::Json(value),
            Err(e) => tracing::debug!(
                status_code,
                error = %e,
                "JSON content type with unparseable body; returning text"
            ),
        }
    }
    ToolResult::Text(TextResult {
        text: String::from_utf8_lossy(bytes).into_owned(),
        status_code,
        content_type: content_type.unwrap_or_default(),
    })
}

/// `application/json` or any `+json` structured-syntax suffix.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    let Ok(parsed) = content_type.trim().parse::<Mime>() else {
        return false;
    };
    (parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::JSON)
        || parsed
            .suffix()
            .is_some_and(|suffix| suffix.as_str().eq_ignore_ascii_case("json"))
}

/// Drop credentials, query and fragment before a URL reaches logs or callers.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
