use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::sheets::models::{CreatedSheet, SheetInput, SheetRow};
use crate::sheets::repository;
use crate::sheets::transfer::{export_all, import_bundle, ImportSummary};
use crate::state::AppState;

/// Request body cap for a single sheet: text fields plus one base64 image.
pub const SHEET_BODY_LIMIT: usize = 8 * 1024 * 1024;
/// Request body cap for a backup bundle, which may carry an image per sheet.
pub const IMPORT_BODY_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/v1/sheets?q=
pub async fn handle_list_sheets(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<SheetRow>>, AppError> {
    let sheets = match params.q.as_deref() {
        Some(q) => repository::search(&state.db, q).await?,
        None => repository::get_all(&state.db).await?,
    };
    Ok(Json(sheets))
}

/// POST /api/v1/sheets
pub async fn handle_create_sheet(
    State(state): State<AppState>,
    Json(input): Json<SheetInput>,
) -> Result<(StatusCode, Json<CreatedSheet>), AppError> {
    let mut input = input.validate()?;
    // Creation time is server-assigned; only imports carry their own.
    input.created_at = None;
    let id = repository::save(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(CreatedSheet { id })))
}

/// GET /api/v1/sheets/:id
pub async fn handle_get_sheet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SheetRow>, AppError> {
    repository::get(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| repository::not_found(id))
}

/// PUT /api/v1/sheets/:id
pub async fn handle_update_sheet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SheetInput>,
) -> Result<Json<SheetRow>, AppError> {
    let input = input.validate()?;
    let row = repository::update(&state.db, id, &input).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/sheets/:id
pub async fn handle_delete_sheet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    repository::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sheets/export
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bundle = export_all(&state.db).await?;
    let disposition = format!("attachment; filename=\"{}\"", bundle.filename());
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(bundle)))
}

/// POST /api/v1/sheets/import
pub async fn handle_import(
    State(state): State<AppState>,
    Json(bundle): Json<Value>,
) -> Result<Json<ImportSummary>, AppError> {
    let summary = import_bundle(&state.db, bundle).await?;
    Ok(Json(summary))
}
