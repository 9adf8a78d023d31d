//! Markdown normalisation for title detection and section content.
//!
//! `strip_markdown` flattens a single line for keyword matching; `clean_content` keeps line
//! structure (paragraphs, bullets) and only removes styling. Rules run in a fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+").unwrap());
static STAR_WRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,3}(.*?)\*{1,3}").unwrap());
static UNDERSCORE_WRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{1,3}(.*?)_{1,3}").unwrap());
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{1F300}-\x{1F9FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{FE00}-\x{FE0F}\x{1FA00}-\x{1FA9F}]",
    )
    .unwrap()
});
static NUMBERING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[.)]\s+").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-–—•*+]\s+").unwrap());
static INTERROGATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[¿?¡!]").unwrap());
static TRAILING_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:：]\s*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*_]{3,}\s*$").unwrap());
static RULE_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*_]{3,}\s*$").unwrap());
static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{2,3}(.*?)\*{2,3}").unwrap());
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,3}(.*?)_{2,3}").unwrap());
static STAR_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\*\s+").unwrap());
static PLUS_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\+\s+").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static INLINE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:：\-–—]\s*").unwrap());

/// True for a horizontal rule line (`---`, `***`, `___`), which is never a title.
pub fn is_rule_line(line: &str) -> bool {
    RULE_LINE.is_match(line)
}

/// Removes all Markdown decoration and decorative punctuation from one line.
///
/// Case is preserved; callers lower-case for matching.
pub fn strip_markdown(line: &str) -> String {
    let s = HEADING.replace(line, "");
    let s = STAR_WRAP.replace_all(&s, "$1");
    let s = UNDERSCORE_WRAP.replace_all(&s, "$1");
    let s = EMOJI.replace_all(&s, "");
    let s = NUMBERING.replace(&s, "");
    let s = BULLET.replace(&s, "");
    let s = INTERROGATION.replace_all(&s, "");
    let s = TRAILING_COLON.replace(&s, "");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Converts Markdown section content to plain text, keeping paragraphs and list structure.
///
/// `*` and `+` bullets become `-`; links keep their label; runs of blank lines collapse to one.
pub fn clean_content(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let s = RULE_LINES.replace_all(text, "");
    let s = BOLD_STARS.replace_all(&s, "$1");
    let s = strip_star_emphasis(&s);
    let s = BOLD_UNDERSCORES.replace_all(&s, "$1");
    let s = strip_underscore_emphasis(&s);
    let s = STAR_BULLET.replace_all(&s, "- ");
    let s = PLUS_BULLET.replace_all(&s, "- ");
    let s = LINK.replace_all(&s, "$1");
    let s = INLINE_CODE.replace_all(&s, "$1");
    let s = EMOJI.replace_all(&s, "");
    let s = BLANK_RUN.replace_all(&s, "\n\n");
    s.trim().to_string()
}

/// Splits an inline `Title: value` line and returns the value part.
///
/// The separator is the first colon or dash-like character; `None` when the line has none.
pub fn inline_value(title_line: &str) -> Option<String> {
    let stripped = strip_markdown(title_line.trim());
    INLINE_SEPARATOR
        .find(&stripped)
        .map(|m| stripped[m.end()..].trim().to_string())
}

/// `*italic*` → `italic`, except when the opening star starts a line (a list bullet).
fn strip_star_emphasis(text: &str) -> String {
    strip_single_emphasis(
        text,
        b'*',
        |bytes, open| open == 0 || bytes[open - 1] != b'\n',
        |_, _| true,
    )
}

/// `_italic_` → `italic`, unless the underscores touch ASCII letters (snake_case words).
fn strip_underscore_emphasis(text: &str) -> String {
    strip_single_emphasis(
        text,
        b'_',
        |bytes, open| open == 0 || !bytes[open - 1].is_ascii_alphabetic(),
        |bytes, close| close + 1 >= bytes.len() || !bytes[close + 1].is_ascii_alphabetic(),
    )
}

/// Single-pass scan for `<m>inner<m>` on one line, with guards on the opening and closing marker.
///
/// Markers are ASCII, so byte offsets always land on char boundaries.
fn strip_single_emphasis(
    text: &str,
    marker: u8,
    open_ok: impl Fn(&[u8], usize) -> bool,
    close_ok: impl Fn(&[u8], usize) -> bool,
) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == marker && open_ok(bytes, i) {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] != marker && bytes[j] != b'\n' {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == marker && j > i + 1 && close_ok(bytes, j) {
                out.push_str(&text[copied..i]);
                out.push_str(&text[i + 1..j]);
                i = j + 1;
                copied = i;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&text[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── strip_markdown ──────────────────────────────────────────────────────

    #[test]
    fn test_strip_heading_and_bold() {
        assert_eq!(strip_markdown("## **Principio activo**"), "Principio activo");
        assert_eq!(strip_markdown("###### Excipientes"), "Excipientes");
    }

    #[test]
    fn test_strip_numbering_bullets_and_trailing_colon() {
        assert_eq!(strip_markdown("3. Olvido de dosis:"), "Olvido de dosis");
        assert_eq!(strip_markdown("2) Interacciones"), "Interacciones");
        assert_eq!(strip_markdown("- Conservación："), "Conservación");
        assert_eq!(strip_markdown("• Observaciones"), "Observaciones");
    }

    #[test]
    fn test_strip_interrogation_and_emoji() {
        assert_eq!(
            strip_markdown("💊 ¿Qué es y para qué se utiliza?"),
            "Qué es y para qué se utiliza"
        );
        assert_eq!(strip_markdown("⚠️ Efectos adversos"), "Efectos adversos");
    }

    #[test]
    fn test_strip_collapses_whitespace() {
        assert_eq!(strip_markdown("  principio    activo  "), "principio activo");
    }

    #[test]
    fn test_strip_keeps_single_underscore_word() {
        assert_eq!(strip_markdown("principio_activo"), "principio_activo");
    }

    #[test]
    fn test_rule_lines() {
        assert!(is_rule_line("---"));
        assert!(is_rule_line("*****"));
        assert!(is_rule_line("___  "));
        assert!(!is_rule_line("--"));
        assert!(!is_rule_line("- item"));
    }

    // ── clean_content ───────────────────────────────────────────────────────

    #[test]
    fn test_clean_normalizes_bullets() {
        let text = "* uno\n+ dos\n- tres";
        assert_eq!(clean_content(text), "- uno\n- dos\n- tres");
    }

    #[test]
    fn test_clean_strips_emphasis_keeps_lines() {
        let text = "Tome **una** cápsula\ncon *agua* o __zumo__";
        assert_eq!(clean_content(text), "Tome una cápsula\ncon agua o zumo");
    }

    #[test]
    fn test_clean_star_bullet_with_italic_inside() {
        assert_eq!(clean_content("intro\n* muy *importante*"), "intro\n- muy importante");
    }

    #[test]
    fn test_clean_underscore_inside_word_is_kept() {
        assert_eq!(clean_content("campo principio_activo_x"), "campo principio_activo_x");
        assert_eq!(clean_content("es _urgente_ hoy"), "es urgente hoy");
    }

    #[test]
    fn test_clean_links_and_inline_code() {
        let text = "Ver [ficha técnica](https://cima.aemps.es) y `150 mg`";
        assert_eq!(clean_content(text), "Ver ficha técnica y 150 mg");
    }

    #[test]
    fn test_clean_removes_rules_and_collapses_blank_lines() {
        let text = "uno\n\n\n\n\ndos\n---\ntres";
        assert_eq!(clean_content(text), "uno\n\ndos\n\ntres");
    }

    #[test]
    fn test_clean_removes_emoji() {
        assert_eq!(clean_content("✅ Conservar en nevera 🧊"), "Conservar en nevera");
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_content(""), "");
        assert_eq!(clean_content("\n\n  \n"), "");
    }

    // ── inline_value ────────────────────────────────────────────────────────

    #[test]
    fn test_inline_value_after_colon() {
        assert_eq!(
            inline_value("PRINCIPIO ACTIVO: Ibuprofeno").as_deref(),
            Some("Ibuprofeno")
        );
        assert_eq!(
            inline_value("**Principio activo** — Metformina 850 mg").as_deref(),
            Some("Metformina 850 mg")
        );
    }

    #[test]
    fn test_inline_value_keeps_later_separators() {
        assert_eq!(
            inline_value("Principio activo: amoxicilina-clavulánico").as_deref(),
            Some("amoxicilina-clavulánico")
        );
    }

    #[test]
    fn test_inline_value_without_separator() {
        assert_eq!(inline_value("## Principio activo"), None);
    }
}
