// Leaflet layout: measure content blocks, decide which adjacent sections share a row, and place
// everything on A4 pages.
//
// geometry       page constants and derived spaces
// font_metrics   static glyph widths for text measurement
// oracle         MeasurementOracle trait + deterministic text-metrics implementation
// planner        single/paired row planning with greedy pair selection
// composer       page breaking, trailing blocks and footers
// blocks         header / section / schedule / advice content
// sheet_layout   the above, end to end for one sheet

pub mod blocks;
pub mod composer;
pub mod font_metrics;
pub mod geometry;
pub mod handlers;
pub mod oracle;
pub mod planner;
pub mod sheet_layout;

pub use geometry::PageGeometry;
pub use planner::{LayoutError, LayoutPlanner};
