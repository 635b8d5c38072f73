//! Management API: upload, inspect, enable, disable and delete namespaces.

use crate::error::HubError;
use crate::namespace::{NamespaceDetail, NamespaceSummary};
use crate::service::Hub;
use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mcp_hub_openapi::ContentHint;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/specs", get(list_specs))
        .route("/specs/upload", post(upload_spec))
        .route("/specs/{name}", get(get_spec).delete(delete_spec))
        .route("/specs/{name}/enable", post(enable_spec))
        .route("/specs/{name}/disable", post(disable_spec))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpecsResponse {
    specs: Vec<NamespaceSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResponse {
    name: String,
    enabled: bool,
    tool_count: usize,
    tool_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mcp_path: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    name: String,
    message: String,
}

fn error_response(e: &HubError) -> Response {
    (
        e.status_code(),
        Json(json!({ "detail": e.to_string(), "kind": e.kind() })),
    )
        .into_response()
}

fn bad_request(detail: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": detail.into(), "kind": "BadRequest" })),
    )
        .into_response()
}

async fn health(Extension(hub): Extension<Arc<Hub>>) -> impl IntoResponse {
    Json(json!({ "status": "healthy", "specsCount": hub.namespace_count() }))
}

async fn list_specs(Extension(hub): Extension<Arc<Hub>>) -> impl IntoResponse {
    Json(SpecsResponse {
        specs: hub.list().iter().map(|ns| ns.summary()).collect(),
    })
}

async fn get_spec(
    Extension(hub): Extension<Arc<Hub>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match hub.get(&name) {
        Some(ns) => Json::<NamespaceDetail>(ns.detail()).into_response(),
        None => error_response(&HubError::NotFound(name)),
    }
}

/// Parts of the upload form.
#[derive(Default)]
struct UploadForm {
    name: Option<String>,
    file: Option<Vec<u8>>,
    hint: ContentHint,
    base_url_override: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(format!("invalid multipart body: {e}"))),
        };
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("invalid 'name' field: {e}")))?;
                form.name = Some(text.trim().to_string());
            }
            "file" => {
                // Capture the hints before the field is consumed.
                let by_name = field
                    .file_name()
                    .map_or(ContentHint::Unknown, ContentHint::from_file_name);
                let by_type = field
                    .content_type()
                    .map_or(ContentHint::Unknown, ContentHint::from_content_type);
                form.hint = by_name.or(by_type);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("invalid 'file' field: {e}")))?;
                form.file = Some(bytes.to_vec());
            }
            "base_url_override" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("invalid 'base_url_override' field: {e}")))?;
                form.base_url_override = Some(text);
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown upload field");
            }
        }
    }
    Ok(form)
}

async fn upload_spec(Extension(hub): Extension<Arc<Hub>>, multipart: Multipart) -> Response {
    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    let Some(name) = form.name else {
        return bad_request("missing form field 'name'");
    };
    let Some(file) = form.file else {
        return bad_request("missing form field 'file'");
    };

    match hub.upload(&name, &file, form.hint, form.base_url_override) {
        Ok(ns) => (StatusCode::CREATED, Json(ns.detail())).into_response(),
        Err(e) => {
            tracing::warn!(namespace = %name, kind = e.kind(), error = %e, "spec upload rejected");
            error_response(&e)
        }
    }
}

async fn enable_spec(
    Extension(hub): Extension<Arc<Hub>>,
    Path(name): Path<String>,
) -> Response {
    match hub.enable(&name) {
        Ok(ns) => Json(ToggleResponse {
            name: ns.name().to_string(),
            enabled: true,
            tool_count: ns.tools().len(),
            tool_names: ns.tools().names().into_iter().map(str::to_string).collect(),
            mcp_path: ns.mcp_path(),
            message: format!("Spec '{name}' enabled"),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn disable_spec(
    Extension(hub): Extension<Arc<Hub>>,
    Path(name): Path<String>,
) -> Response {
    match hub.disable(&name) {
        Ok(ns) => Json(ToggleResponse {
            name: ns.name().to_string(),
            enabled: false,
            tool_count: ns.tools().len(),
            tool_names: ns.tools().names().into_iter().map(str::to_string).collect(),
            mcp_path: None,
            message: format!("Spec '{name}' disabled"),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn delete_spec(
    Extension(hub): Extension<Arc<Hub>>,
    Path(name): Path<String>,
) -> Response {
    match hub.delete(&name) {
        Ok(_) => Json(DeleteResponse {
            message: format!("Spec '{name}' deleted"),
            name,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}
