//! Window calculator: scroll geometry to a contiguous row index range
//!
//! Rows are assumed to share one uniform height. Variable-height rows are
//! not supported.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Replacement for non-positive row or viewport heights, in pixels
pub const MIN_EXTENT: f64 = 1.0;

/// Half-open index range `[start, end)` into the ordered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Viewport state supplied by the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub row_height: f64,
    pub overscan: usize,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 600.0,
            row_height: 56.0,
            overscan: 3,
        }
    }
}

impl WindowGeometry {
    /// Clamp every field into its valid domain, warning about each fix-up
    pub fn normalized(self) -> Self {
        let scroll_offset = normalize_offset(self.scroll_offset);
        if scroll_offset != self.scroll_offset {
            warn!("Scroll offset {} out of range, using {}", self.scroll_offset, scroll_offset);
        }
        let viewport_height = normalize_extent(self.viewport_height);
        if viewport_height != self.viewport_height {
            warn!("Viewport height {} invalid, clamped to {}", self.viewport_height, viewport_height);
        }
        let row_height = normalize_extent(self.row_height);
        if row_height != self.row_height {
            warn!("Row height {} invalid, clamped to {}", self.row_height, row_height);
        }

        Self {
            scroll_offset,
            viewport_height,
            row_height,
            overscan: self.overscan,
        }
    }

    /// Visible range of this geometry over `total_rows`
    pub fn visible_range(&self, total_rows: usize) -> VisibleRange {
        compute_visible_range(
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            total_rows,
            self.overscan,
        )
    }
}

/// Negative, NaN or infinite offsets become 0
pub fn normalize_offset(offset: f64) -> f64 {
    if offset.is_finite() && offset > 0.0 {
        offset
    } else {
        0.0
    }
}

/// Non-positive or non-finite heights become `MIN_EXTENT`
pub fn normalize_extent(extent: f64) -> f64 {
    if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        MIN_EXTENT
    }
}

/// Compute the overscanned index range intersecting the viewport.
///
/// `start = max(0, floor(offset / row_height) - overscan)` and
/// `end = min(total, ceil((offset + viewport) / row_height) + overscan)`.
/// Inputs are normalized silently; `start` never exceeds `end`.
pub fn compute_visible_range(
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    total_rows: usize,
    overscan: usize,
) -> VisibleRange {
    if total_rows == 0 {
        return VisibleRange::default();
    }

    let offset = normalize_offset(scroll_offset);
    let viewport = normalize_extent(viewport_height);
    let row_height = normalize_extent(row_height);

    let first = (offset / row_height).floor() as usize;
    let last = ((offset + viewport) / row_height).ceil() as usize;

    let end = last.saturating_add(overscan).min(total_rows);
    let start = first.saturating_sub(overscan).min(end);

    VisibleRange { start, end }
}

/// Scroll track height for the whole dataset, independent of the window
pub fn total_content_height(total_rows: usize, row_height: f64) -> f64 {
    total_rows as f64 * normalize_extent(row_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario() {
        let range = compute_visible_range(4000.0, 600.0, 40.0, 10_000, 3);
        assert_eq!(range, VisibleRange { start: 97, end: 118 });
        assert_eq!(range.len(), 21);
    }

    #[test]
    fn test_top_of_list() {
        let range = compute_visible_range(0.0, 600.0, 40.0, 10_000, 3);
        assert_eq!(range, VisibleRange { start: 0, end: 18 });
    }

    #[test]
    fn test_clamped_to_total() {
        let range = compute_visible_range(0.0, 600.0, 40.0, 5, 3);
        assert_eq!(range, VisibleRange { start: 0, end: 5 });
    }

    #[test]
    fn test_empty_dataset() {
        assert!(compute_visible_range(100.0, 600.0, 40.0, 0, 3).is_empty());
    }

    #[test]
    fn test_scrolled_past_end_stays_valid() {
        let range = compute_visible_range(1_000_000.0, 600.0, 40.0, 100, 3);
        assert!(range.start <= range.end);
        assert_eq!(range.end, 100);
        assert!(range.is_empty());
    }

    #[test]
    fn test_invalid_geometry_is_normalized() {
        let range = compute_visible_range(-50.0, 0.0, 0.0, 100, 0);
        assert_eq!(range, VisibleRange { start: 0, end: 1 });

        let range = compute_visible_range(f64::NAN, 40.0, -10.0, 100, 0);
        assert_eq!(range, VisibleRange { start: 0, end: 40 });

        let geometry = WindowGeometry {
            scroll_offset: -1.0,
            viewport_height: -5.0,
            row_height: 0.0,
            overscan: 2,
        }
        .normalized();
        assert_eq!(geometry.scroll_offset, 0.0);
        assert_eq!(geometry.viewport_height, MIN_EXTENT);
        assert_eq!(geometry.row_height, MIN_EXTENT);
    }

    #[test]
    fn test_window_covers_intersecting_rows() {
        let total = 500;
        for &row_height in &[1.0, 7.5, 40.0, 56.0] {
            for &viewport in &[1.0, 33.0, 600.0] {
                let mut offset = 0.0;
                while offset < total as f64 * row_height {
                    let range = compute_visible_range(offset, viewport, row_height, total, 0);
                    for i in 0..total {
                        let top = i as f64 * row_height;
                        let bottom = top + row_height;
                        if top < offset + viewport && bottom > offset {
                            assert!(range.contains(i), "row {} missing at offset {}", i, offset);
                        }
                    }
                    offset += 13.0;
                }
            }
        }
    }

    #[test]
    fn test_start_is_monotonic_in_offset() {
        let mut previous = 0;
        let mut offset = 0.0;
        while offset < 20_000.0 {
            let range = compute_visible_range(offset, 600.0, 40.0, 300, 3);
            assert!(range.start >= previous);
            previous = range.start;
            offset += 11.0;
        }
    }

    #[test]
    fn test_total_content_height() {
        assert_eq!(total_content_height(10_000, 40.0), 400_000.0);
        assert_eq!(total_content_height(0, 40.0), 0.0);
        assert_eq!(total_content_height(10, -1.0), 10.0);
    }
}
