use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::parser::SheetFields;

pub const PRINCIPIO_REQUIRED: &str = "El principio activo es obligatorio.";
pub const INVALID_IMAGE: &str = "La imagen debe ser una imagen codificada como data URL.";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SheetRow {
    pub id: i64,
    pub principio_activo: String,
    pub que_es_para_que: String,
    pub administracion: String,
    pub olvido_dosis: String,
    pub efectos_adversos: String,
    pub interacciones: String,
    pub excipientes: String,
    pub conservacion: String,
    pub observaciones: String,
    pub imagen: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SheetRow {
    pub fn fields(&self) -> SheetFields {
        SheetFields {
            principio_activo: self.principio_activo.clone(),
            que_es_para_que: self.que_es_para_que.clone(),
            administracion: self.administracion.clone(),
            olvido_dosis: self.olvido_dosis.clone(),
            efectos_adversos: self.efectos_adversos.clone(),
            interacciones: self.interacciones.clone(),
            excipientes: self.excipientes.clone(),
            conservacion: self.conservacion.clone(),
            observaciones: self.observaciones.clone(),
        }
    }
}

/// Create/update payload. Also the shape of one sheet inside an import bundle, where `id` and
/// `updated_at` may be present and are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetInput {
    #[serde(flatten)]
    pub fields: SheetFields,
    #[serde(default)]
    pub imagen: Option<String>,
    /// Kept on import so re-importing the same bundle is detected as a duplicate.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SheetInput {
    /// Trims the active ingredient and rejects an empty one or a non-image attachment.
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.fields.principio_activo = self.fields.principio_activo.trim().to_string();
        if self.fields.principio_activo.is_empty() {
            return Err(AppError::Validation(PRINCIPIO_REQUIRED.to_string()));
        }
        self.imagen = self.imagen.filter(|i| !i.is_empty());
        if let Some(imagen) = &self.imagen {
            if !imagen.starts_with("data:image/") {
                return Err(AppError::Validation(INVALID_IMAGE.to_string()));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedSheet {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_accepts_flat_field_json() {
        let input: SheetInput = serde_json::from_value(serde_json::json!({
            "principio_activo": "Ibuprofeno",
            "conservacion": "Temperatura ambiente",
            "created_at": "2025-01-02T10:00:00Z",
            "id": 12
        }))
        .unwrap();
        assert_eq!(input.fields.principio_activo, "Ibuprofeno");
        assert_eq!(input.fields.conservacion, "Temperatura ambiente");
        assert_eq!(input.fields.observaciones, "");
        assert!(input.created_at.is_some());
        assert!(input.imagen.is_none());
    }

    #[test]
    fn test_validate_trims_principio() {
        let mut input = SheetInput::default();
        input.fields.principio_activo = "  Omeprazol ".to_string();
        let input = input.validate().unwrap();
        assert_eq!(input.fields.principio_activo, "Omeprazol");
    }

    #[test]
    fn test_validate_rejects_missing_principio() {
        let mut input = SheetInput::default();
        input.fields.principio_activo = "   ".to_string();
        match input.validate() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, PRINCIPIO_REQUIRED),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_image() {
        let mut input = SheetInput::default();
        input.fields.principio_activo = "Omeprazol".to_string();
        input.imagen = Some("data:image/jpeg;base64,AAAA".to_string());
        assert!(input.clone().validate().is_ok());

        input.imagen = Some("https://example.org/x.png".to_string());
        assert!(matches!(input.clone().validate(), Err(AppError::Validation(_))));

        input.imagen = Some(String::new());
        assert_eq!(input.validate().unwrap().imagen, None);
    }
}
