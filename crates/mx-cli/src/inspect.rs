//! `evmix inspect` — summarize a Parquet event table.

use anyhow::{Context, Result};
use std::path::Path;

pub fn cmd_inspect(input: &Path) -> Result<()> {
    let table = mx_table::read_events(input)
        .with_context(|| format!("failed to read event table {}", input.display()))?;

    let runs = table.runs();
    let events = table.events();
    let json = serde_json::json!({
        "path": input.display().to_string(),
        "rows": table.n_rows(),
        "run_range": [runs.iter().min(), runs.iter().max()],
        "event_range": [events.iter().min(), events.iter().max()],
        "columns": table.column_names(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
