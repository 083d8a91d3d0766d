//! Comparator engine: a stable total order over rows for one sort key

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::ColumnSet;
use crate::value::{Row, Value};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Active sort. A `None` key means insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Insertion order
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }
}

/// Compute the ordered view of `rows` as a permutation of their indices.
///
/// Nulls sort last in both directions. Numbers and dates compare
/// numerically, strings case-insensitively by code point, and numeric-like
/// values precede strings in ascending order. Equal keys keep their
/// original relative order. A missing, unknown or unsortable key yields the
/// identity permutation.
pub fn sort_indices(rows: &[Row], columns: &ColumnSet, state: &SortState) -> Vec<usize> {
    let key = match state.key.as_deref() {
        Some(key) if columns.is_sortable(key) => key,
        Some(key) => {
            debug!("Ignoring sort on unsortable column '{}'", key);
            return (0..rows.len()).collect();
        }
        None => return (0..rows.len()).collect(),
    };

    let descending = state.direction == SortDirection::Desc;
    let mut keyed: Vec<(usize, &Value)> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (idx, row.get(key)))
        .collect();

    keyed.sort_unstable_by(|(ia, a), (ib, b)| {
        compare_values(a, b, descending).then_with(|| ia.cmp(ib))
    });

    keyed.into_iter().map(|(idx, _)| idx).collect()
}

/// Convenience wrapper returning the rows themselves in display order
pub fn order_rows<'a>(rows: &'a [Row], columns: &ColumnSet, state: &SortState) -> Vec<&'a Row> {
    sort_indices(rows, columns, state)
        .into_iter()
        .map(|idx| &rows[idx])
        .collect()
}

/// Directional comparison with nulls pinned last
pub fn compare_values(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_present(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let x = a.as_str().unwrap_or_default();
            let y = b.as_str().unwrap_or_default();
            x.chars()
                .flat_map(char::to_lowercase)
                .cmp(y.chars().flat_map(char::to_lowercase))
        }
    }
}
