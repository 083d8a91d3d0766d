//! Lock-guarded handle for hosts that touch a table from several threads

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{RenderPlan, TableView};

/// Shared table handle. Plans are built under the read lock, so a dataset
/// replacement can never interleave with a plan computation. Events raised
/// by a mutation are published after the write lock is released, so
/// subscribers may read or update the table from their handlers.
#[derive(Clone)]
pub struct SharedTableView {
    inner: Arc<RwLock<TableView>>,
}

impl SharedTableView {
    pub fn new(mut table: TableView) -> Self {
        table.defer_events();
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Build the current render plan and hand it to `f`
    pub fn with_plan<R>(&self, f: impl FnOnce(&RenderPlan<'_>) -> R) -> R {
        let table = self.inner.read();
        let plan = table.render_plan();
        f(&plan)
    }

    /// Read access to the table
    pub fn read<R>(&self, f: impl FnOnce(&TableView) -> R) -> R {
        f(&self.inner.read())
    }

    /// Apply a mutation; it completes before any other access proceeds
    pub fn update<R>(&self, f: impl FnOnce(&mut TableView) -> R) -> R {
        let (result, pending) = {
            let mut table = self.inner.write();
            let result = f(&mut table);
            (result, table.take_pending_events())
        };

        if let Some((bus, events)) = pending {
            for event in events {
                event.publish_on(&bus);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableConfig;
    use parking_lot::Mutex;
    use rv_core::events::{DatasetReplaced, SelectionChanged};
    use rv_core::{ColumnDescriptor, EventBus, Row};
    use std::thread;

    fn shared_with_bus(bus: &Arc<EventBus>) -> SharedTableView {
        let mut table = TableView::new(vec![ColumnDescriptor::new("name")], TableConfig::default())
            .unwrap()
            .with_event_bus(bus.clone());
        table
            .set_rows((0..5).map(|i| Row::new(format!("R{}", i))).collect::<Vec<_>>())
            .unwrap();
        SharedTableView::new(table)
    }

    #[test]
    fn test_selection_handler_reads_shared_table() {
        let bus = Arc::new(EventBus::new());
        let shared = shared_with_bus(&bus);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let consumer = shared.clone();
        let sink = seen.clone();
        bus.subscribe_fn(move |e: &SelectionChanged| {
            let selected = consumer.read(|table| table.is_selected("R1"));
            sink.lock().push((e.selected_count, selected));
        });
        bus.start();

        assert!(shared.update(|table| table.toggle_row_selection("R1")));
        assert_eq!(*seen.lock(), vec![(1, true)]);
    }

    #[test]
    fn test_handler_can_update_shared_table() {
        let bus = Arc::new(EventBus::new());
        let shared = shared_with_bus(&bus);
        let seen = Arc::new(Mutex::new(Vec::new()));

        // Replacing the dataset prunes the selection from inside a handler
        let consumer = shared.clone();
        bus.subscribe_fn(move |_: &DatasetReplaced| {
            consumer.update(|table| table.reconcile_with_rows());
        });
        let sink = seen.clone();
        bus.subscribe_fn(move |e: &SelectionChanged| sink.lock().push(e.selected_count));
        bus.start();

        shared.update(|table| table.select_all_matching());
        shared
            .update(|table| table.set_rows(vec![Row::new("R0"), Row::new("R1")]))
            .unwrap();

        assert_eq!(shared.read(|table| table.selected_count()), 2);
        assert_eq!(*seen.lock(), vec![5, 2]);
    }

    #[test]
    fn test_plans_are_consistent_across_threads() {
        let mut table = TableView::new(vec![ColumnDescriptor::new("name")], TableConfig::default())
            .unwrap();
        table
            .set_rows((0..100).map(|i| Row::new(format!("R{}", i))).collect::<Vec<_>>())
            .unwrap();
        let shared = SharedTableView::new(table);

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for n in 0..50 {
                    let rows: Vec<Row> = (0..n).map(|i| Row::new(format!("N{}", i))).collect();
                    shared.update(|table| table.set_rows(rows)).unwrap();
                }
            })
        };

        for _ in 0..50 {
            shared.with_plan(|plan| {
                assert!(plan.entries.len() <= plan.total_count);
                assert!(plan.entries.iter().all(|e| e.index < plan.total_count));
            });
        }
        writer.join().unwrap();

        assert_eq!(shared.read(|table| table.total_count()), 49);
    }
}
