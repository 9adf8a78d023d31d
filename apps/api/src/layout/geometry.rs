//! Page geometry for the printed leaflet.
//!
//! All lengths are millimetres except the off-screen render container, which is in CSS pixels.
//! `PageGeometry::a4()` carries the constants the printed leaflets have always used; changing any of them
//! changes page breaks.

use serde::{Deserialize, Serialize};

use crate::layout::planner::LayoutError;

/// Horizontal padding the render container adds around its content (0 20px).
const CONTAINER_PADDING_PX: f64 = 20.0;

/// Fixed page geometry plus the two pairing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub margin_right_mm: f64,
    /// Gap between the two columns of a paired row.
    pub column_gap_mm: f64,
    /// Space left under the header block on page 1.
    pub header_spacing_mm: f64,
    /// Space between the schedule and advice trailing blocks.
    pub trailing_spacing_mm: f64,
    /// Width of the off-screen container a full-width block is rendered into.
    pub container_width_px: f64,
    /// A block is "short" (pairable) at or below this fraction of a full page.
    pub short_block_fraction: f64,
    /// Threshold used by the second, escalated pairing pass.
    pub escalated_block_fraction: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Width at which a block is rendered: the container size it wraps in and the page width it is
/// scaled to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderWidth {
    pub container_px: f64,
    pub width_mm: f64,
}

impl RenderWidth {
    pub fn mm_per_px(&self) -> f64 {
        self.width_mm / self.container_px
    }
}

impl PageGeometry {
    /// A4 portrait, as printed by the hospital pharmacy leaflets.
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_top_mm: 15.0,
            margin_bottom_mm: 18.0,
            margin_left_mm: 8.0,
            margin_right_mm: 8.0,
            column_gap_mm: 4.0,
            header_spacing_mm: 2.0,
            trailing_spacing_mm: 3.0,
            container_width_px: 680.0,
            short_block_fraction: 0.40,
            escalated_block_fraction: 0.55,
        }
    }

    /// Rejects geometry that leaves no room for content.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.full_page_space() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "margins ({} + {}) leave no usable height on a {} mm page",
                self.margin_top_mm, self.margin_bottom_mm, self.page_height_mm
            )));
        }
        if self.half_column_width_mm() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "usable width {} mm leaves no room for two columns with a {} mm gap",
                self.usable_width_mm(),
                self.column_gap_mm
            )));
        }
        if self.half_container_width_px() <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "render container of {} px is too narrow to split",
                self.container_width_px
            )));
        }
        for (name, fraction) in [
            ("short_block_fraction", self.short_block_fraction),
            ("escalated_block_fraction", self.escalated_block_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(LayoutError::InvalidGeometry(format!(
                    "{name} must be in (0, 1], got {fraction}"
                )));
            }
        }
        Ok(())
    }

    /// Vertical space of a page without a header (264 mm on A4).
    pub fn full_page_space(&self) -> f64 {
        self.page_height_mm - self.margin_top_mm - self.margin_bottom_mm
    }

    pub fn usable_width_mm(&self) -> f64 {
        self.page_width_mm - self.margin_left_mm - self.margin_right_mm
    }

    /// Width of one column in a paired row (95 mm on A4).
    pub fn half_column_width_mm(&self) -> f64 {
        (self.usable_width_mm() - self.column_gap_mm) / 2.0
    }

    /// Container width for half-width rendering: `floor((680 - 20) / 2)` = 330 px.
    pub fn half_container_width_px(&self) -> f64 {
        ((self.container_width_px - CONTAINER_PADDING_PX) / 2.0).floor()
    }

    /// Full-width blocks are drawn edge to edge; their own padding provides the side margin.
    pub fn full_width(&self) -> RenderWidth {
        RenderWidth {
            container_px: self.container_width_px,
            width_mm: self.page_width_mm,
        }
    }

    pub fn half_width(&self) -> RenderWidth {
        RenderWidth {
            container_px: self.half_container_width_px(),
            width_mm: self.half_column_width_mm(),
        }
    }

    /// Room left on page 1 once the header and its spacing are placed. Never negative.
    pub fn space_after_header(&self, header_height_mm: f64) -> f64 {
        (self.full_page_space() - header_height_mm - self.header_spacing_mm).max(0.0)
    }

    pub fn short_threshold_mm(&self) -> f64 {
        self.full_page_space() * self.short_block_fraction
    }

    pub fn escalated_threshold_mm(&self) -> f64 {
        self.full_page_space() * self.escalated_block_fraction
    }

    /// Lowest y a block may reach on any page.
    pub fn content_bottom_mm(&self) -> f64 {
        self.page_height_mm - self.margin_bottom_mm
    }

    /// x of the right column in a paired row.
    pub fn right_column_x_mm(&self) -> f64 {
        self.margin_left_mm + self.half_column_width_mm() + self.column_gap_mm
    }
}
