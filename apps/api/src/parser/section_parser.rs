//! Section Parser: segments free-form (often LLM-generated) leaflet text into the nine fields.
//!
//! # Algorithm
//! 1. Every non-blank, non-rule line is flattened with `strip_markdown` and lower-cased. Lines
//!    longer than 80 characters are prose, never titles.
//! 2. The first pattern (in table order) with a contained keyword claims the line. A key that was
//!    already claimed keeps its first title; later repeats are content.
//! 3. A section spans from the line after its title to the line before the next title.
//! 4. An empty `principio_activo` falls back to the inline value of its title line.
//! 5. Undetected fields become empty strings with one warning each.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::fields::{FieldKey, SheetFields};
use crate::parser::markdown::{clean_content, inline_value, is_rule_line, strip_markdown};
use crate::parser::patterns::{default_patterns, SectionPattern};

const MAX_TITLE_CHARS: usize = 80;

pub const EMPTY_TEXT_WARNING: &str = "El texto está vacío.";
pub const NO_SECTIONS_WARNING: &str =
    "No se detectaron secciones en el texto. Verifique que el texto incluye los títulos de sección.";

/// Output of a parse: always all nine fields, plus informational warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub fields: SheetFields,
    pub warnings: Vec<String>,
}

/// A detected title line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SectionStart {
    line_index: usize,
    key: FieldKey,
}

/// Section parser bound to a keyword table.
#[derive(Debug, Clone)]
pub struct SectionParser {
    patterns: Vec<SectionPattern>,
}

impl Default for SectionParser {
    fn default() -> Self {
        Self::new(default_patterns())
    }
}

impl SectionParser {
    pub fn new(patterns: Vec<SectionPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[SectionPattern] {
        &self.patterns
    }

    /// Parses pasted text into the nine sheet fields. Never fails.
    pub fn parse_text(&self, text: &str) -> ParseResult {
        if text.trim().is_empty() {
            return ParseResult {
                fields: SheetFields::default(),
                warnings: vec![EMPTY_TEXT_WARNING.to_string()],
            };
        }

        let lines: Vec<&str> = text.lines().collect();
        let starts = self.find_section_starts(&lines);
        debug!(
            sections = starts.len(),
            lines = lines.len(),
            "Section titles detected"
        );

        let mut fields = SheetFields::default();
        for (s, current) in starts.iter().enumerate() {
            let end = starts
                .get(s + 1)
                .map(|next| next.line_index)
                .unwrap_or(lines.len());
            let content = clean_content(&lines[current.line_index + 1..end].join("\n"));

            let value = if content.is_empty() && current.key == FieldKey::PrincipioActivo {
                // Title and value on one line, e.g. "PRINCIPIO ACTIVO: Ibuprofeno".
                inline_value(lines[current.line_index]).unwrap_or_default()
            } else {
                content
            };
            fields.set(current.key, value);
        }

        let mut warnings: Vec<String> = FieldKey::ALL
            .into_iter()
            .filter(|key| !starts.iter().any(|s| s.key == *key))
            .map(|key| format!("No se detectó la sección \"{}\".", key.label()))
            .collect();

        if starts.is_empty() {
            warnings.insert(0, NO_SECTIONS_WARNING.to_string());
        }

        ParseResult { fields, warnings }
    }

    /// Returns the key whose title this line is, if any.
    pub fn match_section_title(&self, line: &str) -> Option<FieldKey> {
        let cleaned = strip_markdown(line).to_lowercase();
        if cleaned.is_empty() || cleaned.chars().count() > MAX_TITLE_CHARS {
            return None;
        }

        self.patterns
            .iter()
            .find(|pattern| pattern.matches(&cleaned).is_some())
            .map(|pattern| pattern.key)
    }

    fn find_section_starts(&self, lines: &[&str]) -> Vec<SectionStart> {
        let mut starts: Vec<SectionStart> = Vec::new();

        for (line_index, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() || is_rule_line(line) {
                continue;
            }

            if let Some(key) = self.match_section_title(line) {
                if !starts.iter().any(|s| s.key == key) {
                    starts.push(SectionStart { line_index, key });
                }
            }
        }

        starts
    }
}
