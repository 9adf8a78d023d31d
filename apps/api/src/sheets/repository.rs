//! Sheet persistence on PostgreSQL.

use chrono::Utc;
use sqlx::{Executor, PgPool, Postgres};
use tracing::info;

use crate::errors::AppError;
use crate::sheets::models::{SheetInput, SheetRow};

const SELECT_SHEET: &str = r#"
    SELECT id, principio_activo, que_es_para_que, administracion, olvido_dosis,
           efectos_adversos, interacciones, excipientes, conservacion, observaciones,
           imagen, created_at, updated_at
    FROM sheets
"#;

/// Creates the `sheets` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sheets (
            id                BIGSERIAL PRIMARY KEY,
            principio_activo  TEXT NOT NULL,
            que_es_para_que   TEXT NOT NULL DEFAULT '',
            administracion    TEXT NOT NULL DEFAULT '',
            olvido_dosis      TEXT NOT NULL DEFAULT '',
            efectos_adversos  TEXT NOT NULL DEFAULT '',
            interacciones     TEXT NOT NULL DEFAULT '',
            excipientes       TEXT NOT NULL DEFAULT '',
            conservacion      TEXT NOT NULL DEFAULT '',
            observaciones     TEXT NOT NULL DEFAULT '',
            imagen            TEXT NULL,
            created_at        TIMESTAMPTZ NOT NULL,
            updated_at        TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS sheets_principio_activo_idx ON sheets (lower(principio_activo))",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a sheet. `created_at` is kept when provided (imports), otherwise now.
///
/// Takes any executor so imports can insert inside one transaction.
pub async fn save<'e, E>(executor: E, sheet: &SheetInput) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let now = Utc::now();
    let f = &sheet.fields;
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sheets (
            principio_activo, que_es_para_que, administracion, olvido_dosis,
            efectos_adversos, interacciones, excipientes, conservacion, observaciones,
            imagen, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(&f.principio_activo)
    .bind(&f.que_es_para_que)
    .bind(&f.administracion)
    .bind(&f.olvido_dosis)
    .bind(&f.efectos_adversos)
    .bind(&f.interacciones)
    .bind(&f.excipientes)
    .bind(&f.conservacion)
    .bind(&f.observaciones)
    .bind(&sheet.imagen)
    .bind(sheet.created_at.unwrap_or(now))
    .bind(now)
    .fetch_one(executor)
    .await?;

    info!(id, principio_activo = %f.principio_activo, "Sheet saved");
    Ok(id)
}

/// Replaces a sheet's content. `created_at` never changes.
pub async fn update(pool: &PgPool, id: i64, sheet: &SheetInput) -> Result<SheetRow, AppError> {
    let f = &sheet.fields;
    let row = sqlx::query_as::<_, SheetRow>(
        r#"
        UPDATE sheets SET
            principio_activo = $2, que_es_para_que = $3, administracion = $4,
            olvido_dosis = $5, efectos_adversos = $6, interacciones = $7,
            excipientes = $8, conservacion = $9, observaciones = $10,
            imagen = $11, updated_at = $12
        WHERE id = $1
        RETURNING id, principio_activo, que_es_para_que, administracion, olvido_dosis,
                  efectos_adversos, interacciones, excipientes, conservacion, observaciones,
                  imagen, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&f.principio_activo)
    .bind(&f.que_es_para_que)
    .bind(&f.administracion)
    .bind(&f.olvido_dosis)
    .bind(&f.efectos_adversos)
    .bind(&f.interacciones)
    .bind(&f.excipientes)
    .bind(&f.conservacion)
    .bind(&f.observaciones)
    .bind(&sheet.imagen)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| not_found(id))
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<SheetRow>, AppError> {
    Ok(
        sqlx::query_as::<_, SheetRow>(&format!("{SELECT_SHEET} WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// All sheets, most recently updated first.
pub async fn get_all(pool: &PgPool) -> Result<Vec<SheetRow>, AppError> {
    Ok(
        sqlx::query_as::<_, SheetRow>(&format!("{SELECT_SHEET} ORDER BY updated_at DESC, id DESC"))
            .fetch_all(pool)
            .await?,
    )
}

/// Case-insensitive substring match on the active ingredient. A blank query returns everything.
pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<SheetRow>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return get_all(pool).await;
    }

    Ok(sqlx::query_as::<_, SheetRow>(&format!(
        "{SELECT_SHEET} WHERE strpos(lower(principio_activo), lower($1)) > 0 \
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(query)
    .fetch_all(pool)
    .await?)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM sheets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    info!(id, "Sheet deleted");
    Ok(())
}

pub fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Sheet {id} not found"))
}
