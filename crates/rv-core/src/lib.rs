//! Core functionality for the roster list engine
//!
//! This crate provides the data model and the leaf engines of the
//! virtualized table: ordering, identity-based selection and viewport
//! windowing. The orchestrator composing them lives in `rv-table`.

pub mod columns;
pub mod events;
pub mod selection;
pub mod sort;
pub mod value;
pub mod window;

use thiserror::Error;

// Re-export commonly used types
pub use columns::{ColumnDescriptor, ColumnSet, RenderHint};
pub use events::{DatasetReplaced, Event, EventBus, SelectionChanged, SortChanged, TableEvent};
pub use selection::SelectionStore;
pub use sort::{order_rows, sort_indices, SortDirection, SortState};
pub use value::{check_unique_ids, Row, RowId, Value};
pub use window::{compute_visible_range, total_content_height, VisibleRange, WindowGeometry};

/// Errors raised when the host hands the engine malformed input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Column key must not be empty")]
    EmptyColumnKey,

    #[error("Duplicate column key: {0}")]
    DuplicateColumnKey(String),

    #[error("Duplicate row id: {0}")]
    DuplicateRowId(RowId),
}
