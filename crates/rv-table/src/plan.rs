//! Render plans handed to the external renderer

use std::fmt;

use rv_core::{Row, VisibleRange};

/// One row to paint. Renderers must key painted rows by `row.id`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEntry<'a> {
    /// Position in the sorted view
    pub index: usize,
    pub row: &'a Row,
    /// `index * row_height`
    pub absolute_top: f64,
    pub is_selected: bool,
}

/// Position-annotated rows for the current state plus aggregate counts
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan<'a> {
    pub entries: Vec<RenderEntry<'a>>,
    pub range: VisibleRange,
    pub total_content_height: f64,
    pub selected_count: usize,
    pub total_count: usize,
}

impl<'a> RenderPlan<'a> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the planned rows, in paint order
    pub fn row_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|entry| entry.row.id.as_str())
    }
}

/// Footer counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub visible_count: usize,
    pub total_count: usize,
    pub selected_count: usize,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} rows", self.visible_count, self.total_count)?;
        if self.selected_count > 0 {
            write!(f, " • {} selected", self.selected_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let summary = TableSummary {
            visible_count: 21,
            total_count: 10_000,
            selected_count: 0,
        };
        assert_eq!(summary.to_string(), "Showing 21 of 10000 rows");

        let summary = TableSummary {
            selected_count: 3,
            ..summary
        };
        assert_eq!(summary.to_string(), "Showing 21 of 10000 rows • 3 selected");
    }
}
