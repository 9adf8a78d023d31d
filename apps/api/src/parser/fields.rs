//! The fixed field set of a patient information sheet.

use serde::{Deserialize, Serialize};

/// One of the nine content categories of a medication information sheet.
///
/// Declaration order is the canonical field order (parser pattern order, warning order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    PrincipioActivo,
    QueEsParaQue,
    Administracion,
    OlvidoDosis,
    EfectosAdversos,
    Interacciones,
    Excipientes,
    Conservacion,
    Observaciones,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::PrincipioActivo,
        FieldKey::QueEsParaQue,
        FieldKey::Administracion,
        FieldKey::OlvidoDosis,
        FieldKey::EfectosAdversos,
        FieldKey::Interacciones,
        FieldKey::Excipientes,
        FieldKey::Conservacion,
        FieldKey::Observaciones,
    ];

    /// Leaflet body order. `PrincipioActivo` is printed in the header instead.
    pub const LEAFLET_ORDER: [FieldKey; 8] = [
        FieldKey::QueEsParaQue,
        FieldKey::Administracion,
        FieldKey::OlvidoDosis,
        FieldKey::EfectosAdversos,
        FieldKey::Interacciones,
        FieldKey::Excipientes,
        FieldKey::Conservacion,
        FieldKey::Observaciones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::PrincipioActivo => "principio_activo",
            FieldKey::QueEsParaQue => "que_es_para_que",
            FieldKey::Administracion => "administracion",
            FieldKey::OlvidoDosis => "olvido_dosis",
            FieldKey::EfectosAdversos => "efectos_adversos",
            FieldKey::Interacciones => "interacciones",
            FieldKey::Excipientes => "excipientes",
            FieldKey::Conservacion => "conservacion",
            FieldKey::Observaciones => "observaciones",
        }
    }

    /// Human-readable label used in parser warnings.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::PrincipioActivo => "Principio activo",
            FieldKey::QueEsParaQue => "¿Qué es y para qué se utiliza?",
            FieldKey::Administracion => "Administración",
            FieldKey::OlvidoDosis => "Olvido de dosis",
            FieldKey::EfectosAdversos => "Efectos adversos",
            FieldKey::Interacciones => "Interacciones",
            FieldKey::Excipientes => "Excipientes",
            FieldKey::Conservacion => "Conservación",
            FieldKey::Observaciones => "Observaciones",
        }
    }

    /// Section heading printed on the leaflet block.
    pub fn heading(&self) -> &'static str {
        match self {
            FieldKey::PrincipioActivo => "Principio activo",
            FieldKey::QueEsParaQue => "¿Qué es y para qué se utiliza?",
            FieldKey::Administracion => "¿Cómo se administra?",
            FieldKey::OlvidoDosis => "¿Qué hacer si olvida una dosis?",
            FieldKey::EfectosAdversos => "Posibles efectos adversos",
            FieldKey::Interacciones => "Interacciones con otros medicamentos",
            FieldKey::Excipientes => "Excipientes",
            FieldKey::Conservacion => "¿Cómo se debe conservar?",
            FieldKey::Observaciones => "Observaciones importantes",
        }
    }

    pub fn from_key(key: &str) -> Option<FieldKey> {
        FieldKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn from_label(label: &str) -> Option<FieldKey> {
        FieldKey::ALL.into_iter().find(|k| k.label() == label)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nine text fields of a sheet. Always complete: a missing section is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetFields {
    #[serde(default)]
    pub principio_activo: String,
    #[serde(default)]
    pub que_es_para_que: String,
    #[serde(default)]
    pub administracion: String,
    #[serde(default)]
    pub olvido_dosis: String,
    #[serde(default)]
    pub efectos_adversos: String,
    #[serde(default)]
    pub interacciones: String,
    #[serde(default)]
    pub excipientes: String,
    #[serde(default)]
    pub conservacion: String,
    #[serde(default)]
    pub observaciones: String,
}

impl SheetFields {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::PrincipioActivo => &self.principio_activo,
            FieldKey::QueEsParaQue => &self.que_es_para_que,
            FieldKey::Administracion => &self.administracion,
            FieldKey::OlvidoDosis => &self.olvido_dosis,
            FieldKey::EfectosAdversos => &self.efectos_adversos,
            FieldKey::Interacciones => &self.interacciones,
            FieldKey::Excipientes => &self.excipientes,
            FieldKey::Conservacion => &self.conservacion,
            FieldKey::Observaciones => &self.observaciones,
        }
    }

    pub fn set(&mut self, key: FieldKey, value: String) {
        let slot = match key {
            FieldKey::PrincipioActivo => &mut self.principio_activo,
            FieldKey::QueEsParaQue => &mut self.que_es_para_que,
            FieldKey::Administracion => &mut self.administracion,
            FieldKey::OlvidoDosis => &mut self.olvido_dosis,
            FieldKey::EfectosAdversos => &mut self.efectos_adversos,
            FieldKey::Interacciones => &mut self.interacciones,
            FieldKey::Excipientes => &mut self.excipientes,
            FieldKey::Conservacion => &mut self.conservacion,
            FieldKey::Observaciones => &mut self.observaciones,
        };
        *slot = value;
    }

    /// Iterates `(key, value)` in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        FieldKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrips_through_str() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(FieldKey::from_key("posologia"), None);
    }

    #[test]
    fn test_label_lookup_is_bidirectional() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_label(key.label()), Some(key));
        }
        assert_eq!(
            FieldKey::from_label("Olvido de dosis"),
            Some(FieldKey::OlvidoDosis)
        );
    }

    #[test]
    fn test_leaflet_order_skips_principio_activo() {
        assert!(!FieldKey::LEAFLET_ORDER.contains(&FieldKey::PrincipioActivo));
        assert_eq!(FieldKey::LEAFLET_ORDER.len(), 8);
    }

    #[test]
    fn test_sheet_fields_serialize_all_nine_keys() {
        let fields = SheetFields::default();
        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 9);
        for key in FieldKey::ALL {
            assert_eq!(obj[key.as_str()], "");
        }
    }

    #[test]
    fn test_sheet_fields_get_set() {
        let mut fields = SheetFields::default();
        fields.set(FieldKey::Excipientes, "Lactosa".to_string());
        assert_eq!(fields.get(FieldKey::Excipientes), "Lactosa");
        assert_eq!(fields.iter().filter(|(_, v)| !v.is_empty()).count(), 1);
    }

    #[test]
    fn test_field_key_serde_snake_case() {
        let json = serde_json::to_string(&FieldKey::QueEsParaQue).unwrap();
        assert_eq!(json, r#""que_es_para_que""#);
    }
}
