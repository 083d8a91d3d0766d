//! Patient roster demo: drives a virtualized table through a scripted session

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use rv_core::events::{DatasetReplaced, SelectionChanged, SortChanged};
use rv_core::{ColumnDescriptor, EventBus, RenderHint, Row, SortDirection, Value};
use rv_table::{RenderPlan, TableConfig, TableView};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROGRAMS: [&str; 4] = ["Oncology Assist", "Cardio Care", "Rare Disease", "Immunology"];
const STATUSES: [&str; 3] = ["active", "at-risk", "paused"];

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name").with_header("Patient").with_width(220.0),
        ColumnDescriptor::new("program").with_header("Program"),
        ColumnDescriptor::new("adherence")
            .with_header("Adherence %")
            .with_hint(RenderHint::Number),
        ColumnDescriptor::new("last_call")
            .with_header("Last Call")
            .with_hint(RenderHint::Date),
        ColumnDescriptor::new("status")
            .with_header("Status")
            .with_hint(RenderHint::Badge)
            .unsortable(),
    ]
}

fn roster(count: usize) -> Vec<Row> {
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single();
    (0..count)
        .map(|i| {
            let adherence = if i % 17 == 0 {
                Value::Null
            } else {
                Value::Num(((i * 37) % 100) as f64)
            };
            let last_call = epoch
                .map(|start| Value::Date(start + Duration::hours(((i * 13) % 2000) as i64)))
                .unwrap_or(Value::Null);

            Row::new(format!("P{:05}", i))
                .with("name", format!("Patient {:05}", (i * 7919) % count.max(1)))
                .with("program", PROGRAMS[i % PROGRAMS.len()])
                .with("adherence", adherence)
                .with("last_call", last_call)
                .with("status", STATUSES[i % STATUSES.len()])
        })
        .collect()
}

fn log_plan(label: &str, plan: &RenderPlan<'_>) {
    info!(
        "{}: rows {}..{} of {}, content height {}px, {} selected",
        label,
        plan.range.start,
        plan.range.end,
        plan.total_count,
        plan.total_content_height,
        plan.selected_count
    );
    for entry in plan.entries.iter().take(5) {
        info!(
            "  [{:>5}] top={:>8} {} {:<16} adherence={:?}{}",
            entry.index,
            entry.absolute_top,
            entry.row.id,
            entry.row.get("name").as_str().unwrap_or("-"),
            entry.row.get("adherence").as_number(),
            if entry.is_selected { " *" } else { "" }
        );
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting patient roster demo");

    let bus = Arc::new(EventBus::new());
    bus.subscribe_fn(|e: &DatasetReplaced| info!("event: dataset replaced ({} rows)", e.total_count));
    bus.subscribe_fn(|e: &SortChanged| info!("event: sort {:?} {:?}", e.key, e.direction));
    bus.subscribe_fn(|e: &SelectionChanged| info!("event: {} selected", e.selected_count));
    bus.start();

    let config = TableConfig::from_json(r#"{ "row_height": 40.0, "viewport_height": 600.0, "overscan": 3 }"#)
        .context("parsing table config")?;
    let mut table = TableView::new(columns(), config)
        .context("building roster table")?
        .with_event_bus(bus.clone());

    let headers: Vec<&str> = table.columns().iter().map(|c| c.header.as_str()).collect();
    info!("Columns: {}", headers.join(" | "));

    table.set_rows(roster(10_000)).context("loading roster")?;
    log_plan("initial", &table.render_plan());

    table.set_scroll(4000.0);
    log_plan("scrolled", &table.render_plan());

    table.toggle_row_selection("P00107");
    table.set_sort_state(Some("adherence"), SortDirection::Desc);
    log_plan("sorted by adherence", &table.render_plan());
    info!("P00107 still selected: {}", table.is_selected("P00107"));

    // Status is display-only
    table.toggle_sort("status");

    table.select_all_visible();
    info!("{}", table.summary());
    table.select_all_matching();
    info!("{}", table.summary());

    table.set_rows(roster(2_500)).context("refreshing roster")?;
    let pruned = table.reconcile_with_rows();
    info!("Dropped {} stale selections after refresh", pruned);
    info!("{}", table.summary());

    info!("Saved config: {}", table.save_config());
    bus.stop();

    Ok(())
}
