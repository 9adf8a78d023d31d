use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::oracle::TextMetricsOracle;
use crate::layout::sheet_layout::{layout_sheet, LayoutRequest, SheetLayout};
use crate::sheets::repository;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LayoutQuery {
    #[serde(default)]
    pub patient: Option<String>,
}

/// GET /api/v1/sheets/:id/layout?patient=
pub async fn handle_sheet_layout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<LayoutQuery>,
) -> Result<Json<SheetLayout>, AppError> {
    let sheet = repository::get(&state.db, id)
        .await?
        .ok_or_else(|| repository::not_found(id))?;
    let fields = sheet.fields();

    // One oracle per request; it is never shared between plans.
    let mut oracle = TextMetricsOracle::default();
    let request = LayoutRequest {
        fields: &fields,
        hospital: &state.config.hospital,
        patient: params.patient.as_deref(),
        date: Local::now().date_naive(),
    };
    let layout = layout_sheet(&state.planner, request, &mut oracle).await?;
    Ok(Json(layout))
}
