//! Virtualized, sortable, selectable table orchestration
//!
//! `TableView` composes the ordering, selection and windowing engines from
//! `rv-core` and produces render plans for an external renderer.

pub mod config;
pub mod plan;
pub mod shared;
pub mod table;

use rv_core::CoreError;
use thiserror::Error;

// Re-exports
pub use config::TableConfig;
pub use plan::{RenderEntry, RenderPlan, TableSummary};
pub use shared::SharedTableView;
pub use table::TableView;

/// Errors that can occur when configuring a table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Invalid table input: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
