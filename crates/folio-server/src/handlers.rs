use crate::auth::{enforce_caps, SUPERADMIN};
use crate::create::create_document;
use crate::error::ApiError;
use crate::metrics::{
    CREATE_REJECTED_TOTAL, DOCUMENTS_CREATED_TOTAL, LIST_QUERIES_TOTAL, QUERY_SECONDS,
};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use folio_core::{resource, FolioError, NewDocumentRequest, QueryParams};
use folio_storage::PipelineExecutor;
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        warn!(error = %e, "metrics encode failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (StatusCode::OK, String::from_utf8(buf).unwrap_or_default())
}

pub async fn list(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource::lookup(&kind)?;
    let params = QueryParams::from(pairs);
    let timer = QUERY_SECONDS
        .with_label_values(&[resource.kind])
        .start_timer();
    let result = PipelineExecutor::new(app.store.as_ref())
        .list(resource, &params, app.config.max_page_size)
        .await;
    timer.observe_duration();
    let outcome = match &result {
        Ok(_) => "found",
        Err(FolioError::NotFound(_)) => "empty",
        Err(FolioError::Store(_)) => "store_error",
        Err(_) => "invalid",
    };
    LIST_QUERIES_TOTAL
        .with_label_values(&[resource.kind, outcome])
        .inc();
    let page = result?;
    Ok(Json(json!({
        "success": true,
        "count": page.count,
        "items": page.items,
        "pageSize": page.page_size,
    })))
}

pub async fn detail(
    State(app): State<AppState>,
    Path((kind, title)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource::lookup(&kind)?;
    match app.store.find_by_title(resource.kind, &title).await? {
        Some(item) => Ok(Json(json!({"success": true, "item": item}))),
        None => {
            debug!(kind = resource.kind, %title, "detail lookup missed");
            Err(FolioError::NotFound(format!("{} not found", resource.label)).into())
        }
    }
}

pub async fn create(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let resource = resource::lookup(&kind)?;
    let result = match enforce_caps(&headers, &app.config.caps, SUPERADMIN) {
        // the body is only parsed for authorized callers
        Ok(_claims) => match serde_json::from_slice::<NewDocumentRequest>(&body) {
            Ok(req) => create_document(
                app.store.as_ref(),
                app.uploader.as_ref(),
                resource,
                req,
            )
            .await
            .map_err(ApiError::from),
            Err(e) => Err(FolioError::Invalid(format!("invalid request body: {e}")).into()),
        },
        Err(e) => Err(e),
    };
    match result {
        Ok(item) => {
            DOCUMENTS_CREATED_TOTAL
                .with_label_values(&[resource.kind])
                .inc();
            let message = format!("{} '{}' created successfully", resource.label, item.title);
            Ok((
                StatusCode::CREATED,
                Json(json!({"success": true, "message": message, "item": item})),
            ))
        }
        Err(e) => {
            let reason = match &e {
                ApiError::Domain(FolioError::Conflict(_)) => "conflict",
                ApiError::Domain(FolioError::Store(_)) => "store_error",
                ApiError::Domain(_) => "invalid",
                ApiError::Unauthorized(_) | ApiError::Forbidden(_) => "auth",
            };
            CREATE_REJECTED_TOTAL
                .with_label_values(&[resource.kind, reason])
                .inc();
            Err(e)
        }
    }
}
