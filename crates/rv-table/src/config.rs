//! Table configuration

use rv_core::window::{normalize_extent, WindowGeometry};
use serde::{Deserialize, Serialize};

use crate::TableError;

/// Geometry settings for a table view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Uniform row height in pixels
    pub row_height: f64,

    /// Initial viewport height in pixels, until the host reports a resize
    pub viewport_height: f64,

    /// Extra rows rendered beyond each viewport edge
    pub overscan: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height: 56.0,
            viewport_height: 600.0,
            overscan: 3,
        }
    }
}

impl TableConfig {
    /// Parse a full configuration from JSON; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let config: TableConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp heights to valid values
    pub fn normalized(self) -> Self {
        Self {
            row_height: normalize_extent(self.row_height),
            viewport_height: normalize_extent(self.viewport_height),
            overscan: self.overscan,
        }
    }

    /// Window geometry at the given scroll offset
    pub fn geometry(&self, scroll_offset: f64) -> WindowGeometry {
        WindowGeometry {
            scroll_offset,
            viewport_height: self.viewport_height,
            row_height: self.row_height,
            overscan: self.overscan,
        }
        .normalized()
    }
}
