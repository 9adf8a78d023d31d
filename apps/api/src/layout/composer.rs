//! Places a planned leaflet on physical pages.
//!
//! The planner decides single vs paired rows; the composer walks that plan top to bottom and
//! breaks pages, then appends the schedule and advice blocks and stamps a footer on every page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::geometry::PageGeometry;
use crate::layout::planner::{LayoutError, LayoutPlan, PlacementItem};

pub const FOOTER_PREFIX: &str = "Servicio de Farmacia Hospitalaria";

/// Which horizontal slot a placement occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Full,
    Left,
    Right,
}

/// A block positioned on a page, in millimetres from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub key: String,
    pub column: Column,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub number: usize,
    pub placements: Vec<Placement>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub filename: String,
    pub page_count: usize,
    pub pages: Vec<PageLayout>,
}

/// A measured block placed outside the plan (header, schedule, advice).
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBlock {
    pub key: String,
    pub height: f64,
}

impl FixedBlock {
    pub fn new(key: impl Into<String>, height: f64) -> Self {
        Self {
            key: key.into(),
            height,
        }
    }
}

/// Inputs for the per-page footer line.
#[derive(Debug, Clone)]
pub struct Footer {
    pub hospital_name: Option<String>,
    pub date: NaiveDate,
}

impl Footer {
    /// `Servicio de Farmacia Hospitalaria[. <hospital>] | dd/mm/yyyy | Pag. i/N`
    pub fn text(&self, page: usize, total: usize) -> String {
        let mut text = FOOTER_PREFIX.to_string();
        if let Some(name) = self.hospital_name.as_deref().filter(|n| !n.is_empty()) {
            text.push_str(". ");
            text.push_str(name);
        }
        format!(
            "{text} | {} | Pag. {page}/{total}",
            self.date.format("%d/%m/%Y")
        )
    }
}

/// Everything `compose` places besides the planned content blocks.
#[derive(Debug, Clone)]
pub struct DocumentParts {
    pub filename: String,
    pub header: FixedBlock,
    pub schedule: FixedBlock,
    pub advice: FixedBlock,
    pub footer: Footer,
}

struct PageCursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Vec<Placement>>,
    y: f64,
}

impl<'g> PageCursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Vec::new()],
            y: geometry.margin_top_mm,
        }
    }

    fn bottom(&self) -> f64 {
        self.geometry.content_bottom_mm()
    }

    fn page_is_empty(&self) -> bool {
        self.pages.last().map_or(true, |p| p.is_empty())
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.geometry.margin_top_mm;
    }

    /// Opens a new page if `height` would cross the bottom margin. A block taller than a whole
    /// page is still placed on a fresh page rather than leaving a blank one behind.
    fn ensure_room(&mut self, height: f64) {
        if self.y + height > self.bottom() && !self.page_is_empty() {
            self.new_page();
        }
    }

    fn place(&mut self, key: &str, column: Column, x: f64, width: f64, height: f64) {
        let placement = Placement {
            key: key.to_string(),
            column,
            x,
            y: self.y,
            width,
            height,
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(placement);
        }
    }
}

/// Lays out a plan and its fixed blocks on pages.
pub fn compose(
    geometry: &PageGeometry,
    plan: &LayoutPlan,
    parts: &DocumentParts,
) -> Result<DocumentLayout, LayoutError> {
    let mut cursor = PageCursor::new(geometry);
    let full_width = geometry.page_width_mm;
    let column_width = geometry.half_column_width_mm();

    cursor.place(&parts.header.key, Column::Full, 0.0, full_width, parts.header.height);
    cursor.y += parts.header.height + geometry.header_spacing_mm;

    for item in &plan.items {
        match *item {
            PlacementItem::Single { index } => {
                let block = &plan.measured[index];
                let height = block.height_at_full_width;
                cursor.ensure_room(height);
                cursor.place(&block.block.key, Column::Full, 0.0, full_width, height);
                cursor.y += height;
            }
            PlacementItem::Pair { indices: [left, right] } => {
                let pair = plan
                    .pair_starting_at(left)
                    .ok_or(LayoutError::InconsistentPlan(left))?;
                cursor.ensure_room(pair.paired_height);
                cursor.place(
                    &plan.measured[left].block.key,
                    Column::Left,
                    geometry.margin_left_mm,
                    column_width,
                    pair.left_half_height,
                );
                cursor.place(
                    &plan.measured[right].block.key,
                    Column::Right,
                    geometry.right_column_x_mm(),
                    column_width,
                    pair.right_half_height,
                );
                cursor.y += pair.paired_height;
            }
        }
    }

    // Schedule and advice stay together when both fit in what is left of the page.
    let trailing = parts.schedule.height + geometry.trailing_spacing_mm + parts.advice.height;
    if trailing > cursor.bottom() - cursor.y {
        cursor.new_page();
    }
    cursor.place(&parts.schedule.key, Column::Full, 0.0, full_width, parts.schedule.height);
    cursor.y += parts.schedule.height + geometry.trailing_spacing_mm;

    cursor.ensure_room(parts.advice.height);
    cursor.place(&parts.advice.key, Column::Full, 0.0, full_width, parts.advice.height);
    cursor.y += parts.advice.height;

    let total = cursor.pages.len();
    let pages = cursor
        .pages
        .into_iter()
        .enumerate()
        .map(|(i, placements)| PageLayout {
            number: i + 1,
            placements,
            footer: parts.footer.text(i + 1, total),
        })
        .collect();

    Ok(DocumentLayout {
        filename: parts.filename.clone(),
        page_count: total,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::oracle::ContentBlock;
    use crate::layout::planner::{MeasuredBlock, PairCandidate};

    fn measured(heights: &[f64]) -> Vec<MeasuredBlock> {
        heights
            .iter()
            .enumerate()
            .map(|(i, h)| MeasuredBlock {
                block: ContentBlock::section(format!("b{i}"), "Bloque", "texto"),
                height_at_full_width: *h,
            })
            .collect()
    }

    fn singles(heights: &[f64]) -> LayoutPlan {
        LayoutPlan {
            items: (0..heights.len())
                .map(|index| PlacementItem::Single { index })
                .collect(),
            measured: measured(heights),
            pairs: Vec::new(),
            pages: 1,
            escalated: false,
        }
    }

    fn parts(header: f64, schedule: f64, advice: f64) -> DocumentParts {
        DocumentParts {
            filename: "hoja_test.pdf".to_string(),
            header: FixedBlock::new("header", header),
            schedule: FixedBlock::new("schedule", schedule),
            advice: FixedBlock::new("advice", advice),
            footer: Footer {
                hospital_name: None,
                date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            },
        }
    }

    fn keys(page: &PageLayout) -> Vec<&str> {
        page.placements.iter().map(|p| p.key.as_str()).collect()
    }

    // ── footer ──────────────────────────────────────────────────────────────

    #[test]
    fn test_footer_text() {
        let mut footer = parts(0.0, 0.0, 0.0).footer;
        assert_eq!(
            footer.text(1, 2),
            "Servicio de Farmacia Hospitalaria | 05/03/2026 | Pag. 1/2"
        );
        footer.hospital_name = Some("Hospital Clínico".to_string());
        assert_eq!(
            footer.text(2, 2),
            "Servicio de Farmacia Hospitalaria. Hospital Clínico | 05/03/2026 | Pag. 2/2"
        );
    }

    // ── page breaking ───────────────────────────────────────────────────────

    #[test]
    fn test_single_page_document() {
        let doc = compose(&PageGeometry::a4(), &singles(&[40.0, 30.0]), &parts(20.0, 60.0, 50.0))
            .unwrap();
        assert_eq!(doc.page_count, 1);
        assert_eq!(keys(&doc.pages[0]), vec!["header", "b0", "b1", "schedule", "advice"]);

        let placements = &doc.pages[0].placements;
        assert_eq!(placements[0].y, 15.0);
        // 15 + 20 header + 2 spacing.
        assert_eq!(placements[1].y, 37.0);
        assert_eq!(placements[2].y, 77.0);
        assert_eq!(placements[3].y, 107.0);
        // schedule + 3 mm.
        assert_eq!(placements[4].y, 170.0);
        assert_eq!(placements[1].x, 0.0);
        assert_eq!(placements[1].width, 210.0);
    }

    #[test]
    fn test_block_crossing_bottom_margin_moves_to_next_page() {
        // 37 + 200 = 237; 237 + 50 = 287 > 279.
        let doc = compose(&PageGeometry::a4(), &singles(&[200.0, 50.0]), &parts(20.0, 60.0, 50.0))
            .unwrap();
        assert_eq!(keys(&doc.pages[0]), vec!["header", "b0"]);
        assert_eq!(doc.pages[1].placements[0].key, "b1");
        assert_eq!(doc.pages[1].placements[0].y, 15.0);
    }

    #[test]
    fn test_oversized_block_does_not_leave_blank_page() {
        let doc = compose(&PageGeometry::a4(), &singles(&[250.0, 300.0]), &parts(20.0, 60.0, 50.0))
            .unwrap();
        assert!(doc.pages.iter().all(|p| !p.placements.is_empty()));
        assert_eq!(keys(&doc.pages[0]), vec!["header"]);
        assert_eq!(keys(&doc.pages[1]), vec!["b0"]);
        assert_eq!(keys(&doc.pages[2]), vec!["b1"]);
        assert_eq!(keys(&doc.pages[3]), vec!["schedule", "advice"]);
    }

    #[test]
    fn test_pair_row_positions() {
        let plan = LayoutPlan {
            items: vec![PlacementItem::Pair { indices: [0, 1] }],
            measured: measured(&[100.0, 90.0]),
            pairs: vec![PairCandidate {
                left_index: 0,
                right_index: 1,
                left_half_height: 60.0,
                right_half_height: 55.0,
                paired_height: 60.0,
                saved_height: 130.0,
            }],
            pages: 1,
            escalated: false,
        };
        let doc = compose(&PageGeometry::a4(), &plan, &parts(20.0, 60.0, 50.0)).unwrap();
        let page = &doc.pages[0];
        let left = &page.placements[1];
        let right = &page.placements[2];

        assert_eq!((left.column, left.x, left.width, left.height), (Column::Left, 8.0, 95.0, 60.0));
        assert_eq!((right.column, right.x, right.height), (Column::Right, 107.0, 55.0));
        assert_eq!(left.y, right.y);
        // Row advances by the taller column.
        assert_eq!(page.placements[3].y, 37.0 + 60.0);
    }

    #[test]
    fn test_pair_without_measurement_is_rejected() {
        let plan = LayoutPlan {
            items: vec![PlacementItem::Pair { indices: [0, 1] }],
            measured: measured(&[100.0, 90.0]),
            pairs: Vec::new(),
            pages: 1,
            escalated: false,
        };
        let err = compose(&PageGeometry::a4(), &plan, &parts(20.0, 60.0, 50.0)).unwrap_err();
        assert!(matches!(err, LayoutError::InconsistentPlan(0)));
    }

    // ── trailing blocks ─────────────────────────────────────────────────────

    #[test]
    fn test_trailing_blocks_move_together_when_both_do_not_fit() {
        // 37 + 150 = 187; 92 left, schedule 60 + 3 + advice 50 = 113.
        let doc = compose(&PageGeometry::a4(), &singles(&[150.0]), &parts(20.0, 60.0, 50.0))
            .unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(keys(&doc.pages[0]), vec!["header", "b0"]);
        assert_eq!(keys(&doc.pages[1]), vec!["schedule", "advice"]);
    }

    #[test]
    fn test_advice_alone_moves_when_too_tall_for_remaining_space() {
        // Fresh page for the pair of trailing blocks (113 > 92), then advice 240 does not fit
        // below schedule 60 + 3 on that page.
        let doc = compose(&PageGeometry::a4(), &singles(&[150.0]), &parts(20.0, 60.0, 240.0))
            .unwrap();
        assert_eq!(doc.page_count, 3);
        assert_eq!(keys(&doc.pages[1]), vec!["schedule"]);
        assert_eq!(keys(&doc.pages[2]), vec!["advice"]);
    }

    #[test]
    fn test_every_page_has_numbered_footer() {
        let doc = compose(&PageGeometry::a4(), &singles(&[150.0]), &parts(20.0, 60.0, 240.0))
            .unwrap();
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert!(page.footer.ends_with(&format!("Pag. {}/3", i + 1)));
        }
        assert_eq!(doc.filename, "hoja_test.pdf");
    }
}
