//! Measurement oracle: how tall a content block renders at a given width.
//!
//! The planner treats the oracle as a single shared drawing surface. `measure` takes `&mut self`,
//! so one oracle can never be driven by two planning runs at once; callers that need parallel
//! planning build one oracle per run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::{FontMetricTable, ARIAL};
use crate::layout::geometry::RenderWidth;

// ────────────────────────────────────────────────────────────────────────────
// Content blocks
// ────────────────────────────────────────────────────────────────────────────

/// How a block is drawn, which decides its vertical chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    /// Boxed leaflet section: icon + uppercase heading + paragraphs and bullets.
    Section,
    /// Unboxed text (page header, advice block).
    Banner,
    /// The administration schedule grid, fixed height.
    Schedule,
}

/// A self-contained unit of leaflet content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub key: String,
    pub label: String,
    pub raw_text: String,
    pub style: BlockStyle,
}

impl ContentBlock {
    pub fn section(key: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            raw_text: text.into(),
            style: BlockStyle::Section,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Oracle contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("render container of {container_px} px leaves no room for text")]
    ColumnTooNarrow { container_px: f64 },

    #[error("render failed: {0}")]
    Render(String),
}

/// Returns the rendered height (mm) of a block at a render width. Must be deterministic for a
/// given block and width.
#[async_trait]
pub trait MeasurementOracle: Send {
    async fn measure(&mut self, block: &ContentBlock, width: RenderWidth)
        -> Result<f64, MeasureError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Text-metrics oracle
// ────────────────────────────────────────────────────────────────────────────

/// CSS-pixel box model of the leaflet templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxModel {
    /// Render container side padding (each side).
    pub container_padding_px: f64,
    /// Section box: horizontal padding (both sides) + left border.
    pub section_inset_px: f64,
    /// Section box: outer margins + inner padding, top and bottom together.
    pub section_chrome_px: f64,
    pub icon_px: f64,
    pub icon_gap_px: f64,
    pub heading_font_px: f64,
    pub heading_gap_px: f64,
    pub body_font_px: f64,
    pub body_line_height: f64,
    pub paragraph_gap_px: f64,
    pub blank_line_px: f64,
    pub bullet_indent_px: f64,
    pub banner_chrome_px: f64,
    pub banner_line_height: f64,
    pub schedule_height_px: f64,
}

impl Default for BoxModel {
    fn default() -> Self {
        Self {
            container_padding_px: 20.0,
            section_inset_px: 32.0,
            section_chrome_px: 36.0,
            icon_px: 22.0,
            icon_gap_px: 8.0,
            heading_font_px: 12.0,
            heading_gap_px: 8.0,
            body_font_px: 11.0,
            body_line_height: 1.6,
            paragraph_gap_px: 2.0,
            blank_line_px: 5.0,
            bullet_indent_px: 16.0,
            banner_chrome_px: 20.0,
            banner_line_height: 1.5,
            schedule_height_px: 244.0,
        }
    }
}

/// Deterministic height estimator built on static font metrics.
///
/// Lays text out the way the leaflet templates do (greedy word wrap inside the section box) and
/// converts the pixel height to millimetres at the render width's scale.
pub struct TextMetricsOracle {
    metrics: &'static FontMetricTable,
    model: BoxModel,
    calls: usize,
}

impl Default for TextMetricsOracle {
    fn default() -> Self {
        Self::new(BoxModel::default())
    }
}

impl TextMetricsOracle {
    pub fn new(model: BoxModel) -> Self {
        Self {
            metrics: &ARIAL,
            model,
            calls: 0,
        }
    }

    /// Number of measurements served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Height in CSS pixels of `block` in a container of `container_px`.
    pub fn height_px(&self, block: &ContentBlock, container_px: f64) -> Result<f64, MeasureError> {
        let m = &self.model;
        let inner_px = container_px - 2.0 * m.container_padding_px;

        match block.style {
            BlockStyle::Schedule => Ok(m.schedule_height_px),
            BlockStyle::Banner => {
                let text_px = self.require_width(inner_px, container_px)?;
                let line_px = m.body_font_px * m.banner_line_height;
                let lines: usize = non_blank_lines(&block.raw_text)
                    .map(|line| self.lines_at(line, text_px, m.body_font_px).max(1))
                    .sum();
                Ok(m.banner_chrome_px + lines as f64 * line_px)
            }
            BlockStyle::Section => {
                let text_px = self.require_width(inner_px - m.section_inset_px, container_px)?;
                let heading_px = text_px - m.icon_px - m.icon_gap_px;
                let heading_lines = self
                    .metrics
                    .wrapped_lines_bold(&block.label.to_uppercase(), heading_px / m.heading_font_px)
                    .max(1);
                let heading_height = (heading_lines as f64 * m.heading_font_px * 1.5).max(m.icon_px);

                let body_line_px = m.body_font_px * m.body_line_height;
                let mut body = 0.0;
                for line in block.raw_text.split('\n') {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        body += m.blank_line_px;
                        continue;
                    }
                    let (text, width) = match strip_bullet(trimmed) {
                        // Bullet glyph + indent.
                        Some(rest) => (rest, text_px - m.bullet_indent_px - m.body_font_px * 0.6),
                        None => (trimmed, text_px),
                    };
                    let lines = self.lines_at(text, width, m.body_font_px).max(1);
                    body += lines as f64 * body_line_px + m.paragraph_gap_px;
                }

                Ok(m.section_chrome_px + heading_height + m.heading_gap_px + body)
            }
        }
    }

    fn require_width(&self, text_px: f64, container_px: f64) -> Result<f64, MeasureError> {
        if text_px <= self.model.body_font_px {
            return Err(MeasureError::ColumnTooNarrow { container_px });
        }
        Ok(text_px)
    }

    fn lines_at(&self, text: &str, width_px: f64, font_px: f64) -> usize {
        self.metrics.wrapped_lines(text, width_px / font_px)
    }
}

#[async_trait]
impl MeasurementOracle for TextMetricsOracle {
    async fn measure(
        &mut self,
        block: &ContentBlock,
        width: RenderWidth,
    ) -> Result<f64, MeasureError> {
        self.calls += 1;
        let px = self.height_px(block, width.container_px)?;
        Ok(px * width.mm_per_px())
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|l| !l.is_empty())
}

/// `- item`, `• item`, `* item`, `+ item` → `item`.
fn strip_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !matches!(first, '-' | '•' | '*' | '+') {
        return None;
    }
    let rest = chars.as_str();
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}
