//! Adaptive pagination planner: fits leaflet sections onto as few pages as possible.
//!
//! # Architecture
//! - Every block is measured once at full width. If the total fits in the room after the header
//!   plus one full page, the plan is all single-column and nothing else is measured.
//! - Otherwise consecutive "short" blocks become pair candidates, are measured at half width,
//!   and a greedy pass keeps the non-overlapping pairs that save the most height.
//! - If the simulated plan still needs more than two pages, one escalated pass widens "short"
//!   to the escalated threshold, measures the new candidates, and adds whatever pairs still fit
//!   around the ones already accepted.
//!
//! Content is never reordered: a pair always puts block `i` on the left and `i + 1` on the right.
//! Oracle calls happen one at a time, in a fixed order (blocks in order, then each candidate
//! pair left before right).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::geometry::{PageGeometry, RenderWidth};
use crate::layout::oracle::{ContentBlock, MeasureError, MeasurementOracle};

/// Plans that need more pages than this trigger the escalated pairing pass.
const TARGET_PAGES: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("measurement failed for block '{key}' at {width_mm} mm: {source}")]
    MeasurementFailed {
        key: String,
        width_mm: f64,
        #[source]
        source: MeasureError,
    },

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("plan pairs block {0} but carries no pair measurement for it")]
    InconsistentPlan(usize),
}

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

/// A block with its full-width height. Immutable once measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBlock {
    pub block: ContentBlock,
    pub height_at_full_width: f64,
}

/// Two adjacent blocks measured side by side.
///
/// `paired_height = max(left_half_height, right_half_height)` and
/// `saved_height = full(left) + full(right) - paired_height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCandidate {
    pub left_index: usize,
    pub right_index: usize,
    pub left_half_height: f64,
    pub right_half_height: f64,
    pub paired_height: f64,
    pub saved_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementItem {
    Single { index: usize },
    Pair { indices: [usize; 2] },
}

impl PlacementItem {
    pub fn indices(&self) -> Vec<usize> {
        match *self {
            PlacementItem::Single { index } => vec![index],
            PlacementItem::Pair { indices } => indices.to_vec(),
        }
    }
}

/// Ordered placement instructions plus what the planner learned while building them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub items: Vec<PlacementItem>,
    pub measured: Vec<MeasuredBlock>,
    /// Accepted pairs, in acceptance order.
    pub pairs: Vec<PairCandidate>,
    /// Simulated page count for the content blocks (trailing blocks excluded).
    pub pages: usize,
    /// True when the escalated-threshold pass ran.
    pub escalated: bool,
}

impl LayoutPlan {
    /// Block indices in emitted order. Always `0..n` for a valid plan.
    pub fn flatten_indices(&self) -> Vec<usize> {
        self.items.iter().flat_map(|item| item.indices()).collect()
    }

    /// The accepted pair whose left block is `left_index`.
    pub fn pair_starting_at(&self, left_index: usize) -> Option<&PairCandidate> {
        self.pairs.iter().find(|p| p.left_index == left_index)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planner
// ────────────────────────────────────────────────────────────────────────────

/// Pagination planner bound to one page geometry.
#[derive(Debug, Clone)]
pub struct LayoutPlanner {
    geometry: PageGeometry,
}

impl LayoutPlanner {
    pub fn new(geometry: PageGeometry) -> Result<Self, LayoutError> {
        geometry.validate()?;
        Ok(Self { geometry })
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Plans `blocks` below a header of `header_height` mm.
    ///
    /// Any oracle failure aborts the whole plan with `LayoutError::MeasurementFailed`.
    pub async fn plan<O>(
        &self,
        blocks: &[ContentBlock],
        header_height: f64,
        oracle: &mut O,
    ) -> Result<LayoutPlan, LayoutError>
    where
        O: MeasurementOracle + ?Sized,
    {
        let full_width = self.geometry.full_width();
        let mut measured = Vec::with_capacity(blocks.len());
        for block in blocks {
            let height = measure(oracle, block, full_width).await?;
            measured.push(MeasuredBlock {
                block: block.clone(),
                height_at_full_width: height,
            });
        }

        let heights: Vec<f64> = measured.iter().map(|m| m.height_at_full_width).collect();
        let total: f64 = heights.iter().sum();
        let first_page = self.geometry.space_after_header(header_height);
        let full_page = self.geometry.full_page_space();

        debug!(
            blocks = blocks.len(),
            total_mm = total,
            first_page_mm = first_page,
            full_page_mm = full_page,
            "Measured content blocks"
        );

        if total <= first_page + full_page {
            return Ok(LayoutPlan {
                items: build_plan(heights.len(), &[]),
                pages: simulate_pages(&heights, &[], first_page, full_page),
                measured,
                pairs: Vec::new(),
                escalated: false,
            });
        }

        // Pass 1: short-block threshold.
        let mut measured_pairs: HashSet<usize> = HashSet::new();
        let first_candidates =
            adjacent_short_pairs(&heights, self.geometry.short_threshold_mm(), &measured_pairs);
        let mut pool = self
            .measure_pairs(&first_candidates, &measured, oracle)
            .await?;
        measured_pairs.extend(first_candidates.iter().copied());

        let mut selected = select_best_pairs(&pool, &[]);
        let mut pages = simulate_pages(&heights, &selected, first_page, full_page);
        let mut escalated = false;

        // Pass 2: escalated threshold, only if still over target.
        if pages > TARGET_PAGES {
            escalated = true;
            let extra = adjacent_short_pairs(
                &heights,
                self.geometry.escalated_threshold_mm(),
                &measured_pairs,
            );
            let extra_measured = self.measure_pairs(&extra, &measured, oracle).await?;
            pool.extend(extra_measured);

            let kept = selected.clone();
            selected = select_best_pairs(&pool, &kept);
            let before = pages;
            pages = simulate_pages(&heights, &selected, first_page, full_page);
            info!(
                new_candidates = extra.len(),
                pages_before = before,
                pages_after = pages,
                "Escalated pairing pass"
            );
        }

        debug!(
            pairs = ?selected.iter().map(|p| (p.left_index, p.right_index)).collect::<Vec<_>>(),
            pages,
            "Pairing selected"
        );

        Ok(LayoutPlan {
            items: build_plan(heights.len(), &selected),
            measured,
            pairs: selected,
            pages,
            escalated,
        })
    }

    /// Measures each candidate `(i, i + 1)` at half width, left before right.
    async fn measure_pairs<O>(
        &self,
        lefts: &[usize],
        measured: &[MeasuredBlock],
        oracle: &mut O,
    ) -> Result<Vec<PairCandidate>, LayoutError>
    where
        O: MeasurementOracle + ?Sized,
    {
        let half = self.geometry.half_width();
        let mut out = Vec::with_capacity(lefts.len());
        for &i in lefts {
            let left = &measured[i];
            let right = &measured[i + 1];
            let left_half = measure(oracle, &left.block, half).await?;
            let right_half = measure(oracle, &right.block, half).await?;
            let paired = left_half.max(right_half);
            out.push(PairCandidate {
                left_index: i,
                right_index: i + 1,
                left_half_height: left_half,
                right_half_height: right_half,
                paired_height: paired,
                saved_height: left.height_at_full_width + right.height_at_full_width - paired,
            });
        }
        Ok(out)
    }
}

async fn measure<O>(
    oracle: &mut O,
    block: &ContentBlock,
    width: RenderWidth,
) -> Result<f64, LayoutError>
where
    O: MeasurementOracle + ?Sized,
{
    oracle
        .measure(block, width)
        .await
        .map_err(|source| LayoutError::MeasurementFailed {
            key: block.key.clone(),
            width_mm: width.width_mm,
            source,
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Pure helpers
// ────────────────────────────────────────────────────────────────────────────

/// Left indices `i` where blocks `i` and `i + 1` are both at or below `threshold`, skipping
/// pairs already in `already_measured`.
pub(crate) fn adjacent_short_pairs(
    heights: &[f64],
    threshold: f64,
    already_measured: &HashSet<usize>,
) -> Vec<usize> {
    heights
        .windows(2)
        .enumerate()
        .filter(|(i, w)| w[0] <= threshold && w[1] <= threshold && !already_measured.contains(i))
        .map(|(i, _)| i)
        .collect()
}

/// Greedy non-overlapping selection, largest saving first.
///
/// `kept` pairs are accepted up front and claim their indices, so a later pass can only add
/// pairs around them. Ties keep pool order (the sort is stable). Pairs saving nothing are never
/// accepted.
pub(crate) fn select_best_pairs(
    pool: &[PairCandidate],
    kept: &[PairCandidate],
) -> Vec<PairCandidate> {
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut selected: Vec<PairCandidate> = Vec::with_capacity(kept.len());
    for pair in kept {
        claimed.insert(pair.left_index);
        claimed.insert(pair.right_index);
        selected.push(pair.clone());
    }

    let mut sorted: Vec<&PairCandidate> = pool.iter().collect();
    sorted.sort_by(|a, b| b.saved_height.total_cmp(&a.saved_height));

    for pair in sorted {
        if pair.saved_height <= 0.0 {
            continue;
        }
        if claimed.contains(&pair.left_index) || claimed.contains(&pair.right_index) {
            continue;
        }
        claimed.insert(pair.left_index);
        claimed.insert(pair.right_index);
        selected.push(pair.clone());
    }

    selected
}

/// Counts pages for the blocks with `pairs` applied.
///
/// Page 1 starts with `full_page - first_page` already used by the header. A new page opens
/// whenever the next item would overflow the current one.
pub(crate) fn simulate_pages(
    heights: &[f64],
    pairs: &[PairCandidate],
    first_page: f64,
    full_page: f64,
) -> usize {
    let mut pages = 1;
    let mut used = full_page - first_page;

    let mut i = 0;
    while i < heights.len() {
        let item_height = match pairs.iter().find(|p| p.left_index == i) {
            Some(pair) => {
                i += 2;
                pair.paired_height
            }
            None => {
                i += 1;
                heights[i - 1]
            }
        };

        if used + item_height > full_page {
            pages += 1;
            used = 0.0;
        }
        used += item_height;
    }

    pages
}

/// Emits items in block order: a pair's left index emits the pair, its right index is already
/// consumed, everything else is single.
pub(crate) fn build_plan(n: usize, pairs: &[PairCandidate]) -> Vec<PlacementItem> {
    let mut items = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        match pairs.iter().find(|p| p.left_index == i) {
            Some(pair) => {
                items.push(PlacementItem::Pair {
                    indices: [pair.left_index, pair.right_index],
                });
                i += 2;
            }
            None => {
                items.push(PlacementItem::Single { index: i });
                i += 1;
            }
        }
    }
    items
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
