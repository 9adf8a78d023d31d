//! Axum route handler for the Parse API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::parser::section_parser::ParseResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: String,
}

/// POST /api/v1/sheets/parse
///
/// Segments pasted leaflet text into the nine fields. Missing sections come back as warnings,
/// never as errors, so the client can review and complete the form before saving.
pub async fn handle_parse_text(
    State(state): State<AppState>,
    Json(request): Json<ParseTextRequest>,
) -> Result<Json<ParseResult>, AppError> {
    let result = state.parser.parse_text(&request.text);
    info!(
        chars = request.text.len(),
        warnings = result.warnings.len(),
        "Parsed leaflet text"
    );
    Ok(Json(result))
}
