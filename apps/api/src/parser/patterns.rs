//! Section-title keyword table.
//!
//! Order is the ambiguity-resolution contract: the first pattern whose keyword is contained in a
//! cleaned line wins, and within a pattern keywords are tried in declaration order.

use serde::{Deserialize, Serialize};

use crate::parser::fields::FieldKey;

/// A field key plus the keywords that identify its title line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPattern {
    pub key: FieldKey,
    pub keywords: Vec<String>,
}

impl SectionPattern {
    pub fn new(key: FieldKey, keywords: &[&str]) -> Self {
        Self {
            key,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Returns the first keyword contained in `cleaned` (already lower-cased).
    pub fn matches(&self, cleaned: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|kw| cleaned.contains(kw.as_str()))
            .map(String::as_str)
    }
}

/// The default Spanish keyword table.
pub fn default_patterns() -> Vec<SectionPattern> {
    vec![
        SectionPattern::new(
            FieldKey::PrincipioActivo,
            &["principio activo", "principio_activo", "nombre del medicamento"],
        ),
        SectionPattern::new(
            FieldKey::QueEsParaQue,
            &[
                "qué es y para qué",
                "qué es",
                "para qué se utiliza",
                "para qué sirve",
                "indicaciones",
            ],
        ),
        SectionPattern::new(
            FieldKey::Administracion,
            &[
                "administración",
                "cómo se administra",
                "cómo tomar",
                "cómo se toma",
                "posología",
                "forma de administración",
            ],
        ),
        SectionPattern::new(
            FieldKey::OlvidoDosis,
            &[
                "olvido de dosis",
                "olvido dosis",
                "dosis olvidada",
                "si olvida",
                "si se olvida",
                "qué hacer si se olvida",
                "qué hacer si olvida",
            ],
        ),
        SectionPattern::new(
            FieldKey::EfectosAdversos,
            &[
                "efectos adversos",
                "reacciones adversas",
                "efectos secundarios",
                "efectos no deseados",
            ],
        ),
        SectionPattern::new(FieldKey::Interacciones, &["interacciones"]),
        SectionPattern::new(
            FieldKey::Excipientes,
            &["excipientes", "lista de excipientes", "listado de excipientes"],
        ),
        SectionPattern::new(
            FieldKey::Conservacion,
            &[
                "conservación",
                "cómo se debe conservar",
                "cómo se conserva",
                "cómo conservar",
                "condiciones de conservación",
                "almacenamiento",
            ],
        ),
        SectionPattern::new(
            FieldKey::Observaciones,
            &[
                "observaciones",
                "notas importantes",
                "información adicional",
                "otras observaciones",
            ],
        ),
    ]
}
