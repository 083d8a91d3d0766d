//! Table orchestrator
//!
//! Data flows one way: rows -> sorted view -> windowed slice -> render plan.
//! Sorting and dataset replacement recompute the sorted view; scrolling and
//! resizing only recompute the window; selection never touches either.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use rv_core::events::{DatasetReplaced, SelectionChanged, SortChanged, TableEvent};
use rv_core::window::{normalize_extent, normalize_offset, total_content_height};
use rv_core::{
    check_unique_ids, sort_indices, ColumnDescriptor, ColumnSet, EventBus, Row, RowId,
    SelectionStore, SortDirection, SortState, VisibleRange, WindowGeometry,
};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::{RenderEntry, RenderPlan, TableConfig, TableError, TableSummary};

/// Virtualized, sortable, selectable view over an externally owned row array
pub struct TableView {
    columns: ColumnSet,
    rows: Arc<[Row]>,
    /// Row id -> index into `rows`
    positions: AHashMap<RowId, usize>,
    /// Sorted view as a permutation of `rows` indices
    order: Vec<usize>,
    sort: SortState,
    selection: SelectionStore,
    geometry: WindowGeometry,
    range: VisibleRange,
    events: Option<Arc<EventBus>>,
    /// Queue events instead of publishing them inline
    defer_events: bool,
    pending: Vec<TableEvent>,
}

impl TableView {
    /// Create an empty table over the given columns
    pub fn new(columns: Vec<ColumnDescriptor>, config: TableConfig) -> Result<Self, TableError> {
        let columns = ColumnSet::new(columns)?;

        Ok(Self {
            columns,
            rows: Vec::new().into(),
            positions: AHashMap::new(),
            order: Vec::new(),
            sort: SortState::unsorted(),
            selection: SelectionStore::new(),
            geometry: config.normalized().geometry(0.0),
            range: VisibleRange::default(),
            events: None,
            defer_events: false,
            pending: Vec::new(),
        })
    }

    /// Publish sort, selection and dataset changes on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Replace the dataset. The selection is left as is; call
    /// [`TableView::reconcile_selection`] to drop ids that disappeared.
    pub fn set_rows(&mut self, rows: impl Into<Arc<[Row]>>) -> Result<(), TableError> {
        let rows = rows.into();
        check_unique_ids(&rows)?;

        self.positions = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.id.clone(), idx))
            .collect();
        self.rows = rows;
        self.reorder();

        self.publish(TableEvent::DatasetReplaced(DatasetReplaced {
            total_count: self.rows.len(),
        }));
        Ok(())
    }

    /// Set the active sort. Unknown or unsortable keys leave the sort
    /// untouched and return false.
    pub fn set_sort_state(&mut self, key: Option<&str>, direction: SortDirection) -> bool {
        if let Some(key) = key {
            if !self.columns.is_sortable(key) {
                warn!("Ignoring sort request on '{}': not a sortable column", key);
                return false;
            }
        }

        self.sort = SortState {
            key: key.map(str::to_string),
            direction,
        };
        self.reorder();

        self.publish(TableEvent::SortChanged(SortChanged {
            key: self.sort.key.clone(),
            direction,
        }));
        true
    }

    /// Header click: unsorted -> ascending -> descending -> unsorted
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let (next_key, direction) = match (self.sort.key.as_deref(), self.sort.direction) {
            (Some(current), SortDirection::Asc) if current == key => (Some(key), SortDirection::Desc),
            (Some(current), SortDirection::Desc) if current == key => (None, SortDirection::Asc),
            _ => (Some(key), SortDirection::Asc),
        };

        if !self.columns.is_sortable(key) {
            warn!("Ignoring header click on '{}': not a sortable column", key);
            return false;
        }
        self.set_sort_state(next_key, direction)
    }

    /// Scroll the viewport. Only the window is recomputed.
    pub fn set_scroll(&mut self, offset: f64) {
        let normalized = normalize_offset(offset);
        if normalized != offset {
            debug!("Scroll offset {} normalized to {}", offset, normalized);
        }
        self.geometry.scroll_offset = normalized;
        self.refresh_window();
    }

    /// Resize the viewport. Only the window is recomputed.
    pub fn set_viewport_height(&mut self, height: f64) {
        let normalized = normalize_extent(height);
        if normalized != height {
            warn!("Viewport height {} invalid, clamped to {}", height, normalized);
        }
        self.geometry.viewport_height = normalized;
        self.refresh_window();
    }

    /// Apply new geometry settings, keeping the scroll offset
    pub fn apply_config(&mut self, config: TableConfig) {
        self.geometry = config.normalized().geometry(self.geometry.scroll_offset);
        self.refresh_window();
    }

    pub fn config(&self) -> TableConfig {
        TableConfig {
            row_height: self.geometry.row_height,
            viewport_height: self.geometry.viewport_height,
            overscan: self.geometry.overscan,
        }
    }

    pub fn save_config(&self) -> JsonValue {
        json!({
            "row_height": self.geometry.row_height,
            "viewport_height": self.geometry.viewport_height,
            "overscan": self.geometry.overscan,
        })
    }

    pub fn load_config(&mut self, config: JsonValue) {
        let mut next = self.config();
        if let Some(row_height) = config.get("row_height").and_then(|v| v.as_f64()) {
            next.row_height = row_height;
        }
        if let Some(viewport_height) = config.get("viewport_height").and_then(|v| v.as_f64()) {
            next.viewport_height = viewport_height;
        }
        if let Some(overscan) = config.get("overscan").and_then(|v| v.as_u64()) {
            next.overscan = overscan as usize;
        }
        self.apply_config(next);
    }

    /// Flip selection of `id`. Ids unknown to the current dataset can only
    /// be deselected. Returns the resulting membership.
    pub fn toggle_row_selection(&mut self, id: &str) -> bool {
        if !self.positions.contains_key(id) && !self.selection.is_selected(id) {
            warn!("Ignoring selection of unknown row '{}'", id);
            return false;
        }
        let selected = self.selection.toggle(id);
        self.publish_selection();
        selected
    }

    /// Select exactly the rows in the current window, overscan included
    pub fn select_all_visible(&mut self) -> usize {
        let rows = &self.rows;
        let ids = self.order[self.range.start..self.range.end]
            .iter()
            .map(|&idx| rows[idx].id.clone());
        self.selection.select_all(ids);
        self.publish_selection();
        self.selection.size()
    }

    /// Select every row of the dataset, not only the rendered ones
    pub fn select_all_matching(&mut self) -> usize {
        self.selection
            .select_all(self.rows.iter().map(|row| row.id.clone()));
        self.publish_selection();
        self.selection.size()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.publish_selection();
    }

    /// Header checkbox: clear when everything is selected, else select all
    pub fn toggle_select_all(&mut self) {
        if self.all_selected() {
            self.clear_selection();
        } else {
            self.select_all_matching();
        }
    }

    /// Whether every row of a non-empty dataset is selected
    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty()
            && self.selection.size() >= self.rows.len()
            && self.rows.iter().all(|row| self.selection.is_selected(&row.id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected id count. May include stale ids until reconciled.
    pub fn selected_count(&self) -> usize {
        self.selection.size()
    }

    /// Intersect the selection with `current_ids`. Returns how many ids were dropped.
    pub fn reconcile_selection<I, S>(&mut self, current_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current: AHashSet<String> = current_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        let pruned = self.selection.retain_ids(|id| current.contains(id));
        if pruned > 0 {
            debug!("Pruned {} stale selected ids", pruned);
            self.publish_selection();
        }
        pruned
    }

    /// Intersect the selection with the ids of the current dataset
    pub fn reconcile_with_rows(&mut self) -> usize {
        let positions = &self.positions;
        let pruned = self.selection.retain_ids(|id| positions.contains_key(id));
        if pruned > 0 {
            debug!("Pruned {} stale selected ids", pruned);
            self.publish_selection();
        }
        pruned
    }

    /// Selected rows of the current dataset in display order
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.order
            .iter()
            .map(|&idx| &self.rows[idx])
            .filter(|row| self.selection.is_selected(&row.id))
            .collect()
    }

    /// Build the render plan for the current window
    pub fn render_plan(&self) -> RenderPlan<'_> {
        let row_height = self.geometry.row_height;
        let entries = (self.range.start..self.range.end)
            .map(|index| {
                let row = &self.rows[self.order[index]];
                RenderEntry {
                    index,
                    row,
                    absolute_top: index as f64 * row_height,
                    is_selected: self.selection.is_selected(&row.id),
                }
            })
            .collect();

        RenderPlan {
            entries,
            range: self.range,
            total_content_height: self.total_content_height(),
            selected_count: self.selection.size(),
            total_count: self.rows.len(),
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            visible_count: self.range.len(),
            total_count: self.rows.len(),
            selected_count: self.selection.size(),
        }
    }

    pub fn total_content_height(&self) -> f64 {
        total_content_height(self.rows.len(), self.geometry.row_height)
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    fn reorder(&mut self) {
        self.order = sort_indices(&self.rows, &self.columns, &self.sort);
        self.refresh_window();
        debug!(
            "Reordered {} rows by {:?} {:?}",
            self.order.len(),
            self.sort.key,
            self.sort.direction
        );
    }

    fn refresh_window(&mut self) {
        self.range = self.geometry.visible_range(self.order.len());
    }

    /// Hold events until [`TableView::take_pending_events`] is called
    pub(crate) fn defer_events(&mut self) {
        self.defer_events = true;
    }

    /// Queued events and the bus they belong on
    pub(crate) fn take_pending_events(&mut self) -> Option<(Arc<EventBus>, Vec<TableEvent>)> {
        if self.pending.is_empty() {
            return None;
        }
        let events = std::mem::take(&mut self.pending);
        self.events.clone().map(|bus| (bus, events))
    }

    fn publish_selection(&mut self) {
        self.publish(TableEvent::SelectionChanged(SelectionChanged {
            selected_count: self.selection.size(),
        }));
    }

    fn publish(&mut self, event: TableEvent) {
        if let Some(bus) = &self.events {
            if self.defer_events {
                self.pending.push(event);
            } else {
                event.publish_on(bus);
            }
        }
    }
}
