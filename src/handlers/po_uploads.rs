use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    commands::po_uploads::{
        AddPoUploadLineCommand, CreatePoUploadCommand, PoUploadLineInput,
        UpdatePoUploadLineCommand,
    },
    entities::po_upload::PoUploadState,
    errors::ApiError,
    services::po_uploads::PoUploadFilter,
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListPoUploadsQuery {
    pub state: Option<PoUploadState>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Create a PO upload, optionally with its lines
pub async fn create_po_upload(
    State(state): State<AppState>,
    Json(payload): Json<CreatePoUploadCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    for line in &payload.lines {
        validate_input(line)?;
    }

    let detail = state
        .po_uploads
        .create_upload(payload)
        .await
        .map_err(map_service_error)?;

    info!("PO upload created: {}", detail.upload.name);
    Ok(created_response(detail))
}

pub async fn list_po_uploads(
    State(state): State<AppState>,
    Query(query): Query<ListPoUploadsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .po_uploads
        .list_uploads(PoUploadFilter {
            state: query.state,
            page: query.page,
            per_page: query.per_page,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

pub async fn get_po_upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .po_uploads
        .get_upload(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

pub async fn delete_po_upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .po_uploads
        .delete_upload(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

pub async fn add_po_upload_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PoUploadLineInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let line = state
        .po_uploads
        .add_line(AddPoUploadLineCommand {
            upload_id: id,
            line: payload,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(line))
}

pub async fn update_po_upload_line(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdatePoUploadLineCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let command = UpdatePoUploadLineCommand {
        upload_id: id,
        line_id,
        ..payload
    };
    let line = state
        .po_uploads
        .update_line(command)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(line))
}

pub async fn remove_po_upload_line(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .po_uploads
        .remove_line(id, line_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Check every line's SKU against the catalog
pub async fn validate_po_upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .po_uploads
        .validate(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Generate draft quotations from a validated upload
pub async fn confirm_po_upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .po_uploads
        .confirm(id)
        .await
        .map_err(map_service_error)?;

    info!(
        "PO upload {} confirmed into {} quotation(s)",
        id,
        summary.quotations.len()
    );
    Ok(success_response(summary))
}

pub async fn cancel_po_upload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .po_uploads
        .cancel(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(result))
}

pub async fn list_po_upload_quotations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let quotations = state
        .po_uploads
        .quotations_for_upload(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(quotations))
}

pub fn po_upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_po_upload).get(list_po_uploads))
        .route("/:id", get(get_po_upload).delete(delete_po_upload))
        .route("/:id/lines", post(add_po_upload_line))
        .route(
            "/:id/lines/:line_id",
            put(update_po_upload_line).delete(remove_po_upload_line),
        )
        .route("/:id/validate", post(validate_po_upload))
        .route("/:id/confirm", post(confirm_po_upload))
        .route("/:id/cancel", post(cancel_po_upload))
        .route("/:id/quotations", get(list_po_upload_quotations))
}
