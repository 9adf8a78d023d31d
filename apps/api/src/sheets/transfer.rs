//! JSON backup bundles: export every sheet, import a bundle without duplicating what exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::sheets::models::{SheetInput, SheetRow};
use crate::sheets::repository;

pub const BUNDLE_APP: &str = "HojaInfoPtes";
pub const BUNDLE_VERSION: u32 = 2;
pub const INVALID_BUNDLE: &str = "El fichero no tiene un formato válido.";

#[derive(Debug, Serialize)]
pub struct ExportBundle {
    pub app: &'static str,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub sheets: Vec<SheetRow>,
}

impl ExportBundle {
    pub fn new(sheets: Vec<SheetRow>) -> Self {
        Self {
            app: BUNDLE_APP,
            version: BUNDLE_VERSION,
            exported_at: Utc::now(),
            count: sheets.len(),
            sheets,
        }
    }

    /// Suggested download name, `hojas_informativas_<yyyy-mm-dd>.json`.
    pub fn filename(&self) -> String {
        format!("hojas_informativas_{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Identity of a sheet across installations: ingredient plus creation time.
type SheetIdentity = (String, Option<DateTime<Utc>>);

/// Pulls the `sheets` array out of an uploaded bundle. Other bundle fields are not checked.
pub fn bundle_sheets(bundle: Value) -> Result<Vec<SheetInput>, AppError> {
    let Value::Object(mut map) = bundle else {
        return Err(AppError::Validation(INVALID_BUNDLE.to_string()));
    };
    match map.remove("sheets") {
        Some(sheets @ Value::Array(_)) => serde_json::from_value(sheets)
            .map_err(|e| AppError::Validation(format!("{INVALID_BUNDLE} {e}"))),
        _ => Err(AppError::Validation(INVALID_BUNDLE.to_string())),
    }
}

/// Splits incoming sheets into those to insert and a skipped count. A sheet is a duplicate when
/// an existing one has the same ingredient and creation time. Duplicates are only checked
/// against `existing`, never within the bundle itself.
pub fn partition_import(
    existing: &[SheetIdentity],
    incoming: Vec<SheetInput>,
) -> (Vec<SheetInput>, usize) {
    let mut fresh = Vec::with_capacity(incoming.len());
    let mut skipped = 0;
    for sheet in incoming {
        let duplicate = existing.iter().any(|(principio, created_at)| {
            *principio == sheet.fields.principio_activo && *created_at == sheet.created_at
        });
        if duplicate {
            skipped += 1;
        } else {
            fresh.push(sheet);
        }
    }
    (fresh, skipped)
}

pub async fn export_all(pool: &PgPool) -> Result<ExportBundle, AppError> {
    let sheets = repository::get_all(pool).await?;
    info!(count = sheets.len(), "Exporting sheets");
    Ok(ExportBundle::new(sheets))
}

pub async fn import_bundle(pool: &PgPool, bundle: Value) -> Result<ImportSummary, AppError> {
    let incoming = bundle_sheets(bundle)?;
    let existing: Vec<SheetIdentity> = repository::get_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.principio_activo, Some(row.created_at)))
        .collect();

    let (fresh, skipped) = partition_import(&existing, incoming);

    // All or nothing: a failure rolls back every sheet of this bundle.
    let mut tx = pool.begin().await?;
    let mut imported = 0;
    for sheet in fresh {
        // Imported sheets get a new id; the bundle's id is never read.
        repository::save(&mut *tx, &sheet).await?;
        imported += 1;
    }
    tx.commit().await?;

    if skipped > 0 {
        warn!(skipped, "Skipped duplicate sheets on import");
    }
    info!(imported, skipped, "Import finished");
    Ok(ImportSummary { imported, skipped })
}
