//! Column descriptors

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Hint for the external renderer on how to paint a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderHint {
    #[default]
    Text,
    Number,
    Date,
    Badge,
}

/// Describes one table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub header: String,
    pub display_width: Option<f32>,
    pub sortable: bool,
    pub render_hint: RenderHint,
}

impl ColumnDescriptor {
    /// A sortable text column whose header is its key
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            header: key.clone(),
            key,
            display_width: None,
            sortable: true,
            render_hint: RenderHint::Text,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.display_width = Some(width);
        self
    }

    pub fn with_hint(mut self, hint: RenderHint) -> Self {
        self.render_hint = hint;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Validated, ordered set of column descriptors with key lookup
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
    by_key: AHashMap<String, usize>,
}

impl ColumnSet {
    /// Build a column set, rejecting empty or duplicate keys
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, CoreError> {
        let mut by_key = AHashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if column.key.is_empty() {
                return Err(CoreError::EmptyColumnKey);
            }
            if by_key.insert(column.key.clone(), idx).is_some() {
                return Err(CoreError::DuplicateColumnKey(column.key.clone()));
            }
        }
        Ok(Self { columns, by_key })
    }

    pub fn get(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.by_key.get(key).map(|&idx| &self.columns[idx])
    }

    /// Whether `key` names a column that may be sorted on
    pub fn is_sortable(&self, key: &str) -> bool {
        self.get(key).map(|c| c.sortable).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
