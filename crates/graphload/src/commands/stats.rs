use crate::config::Resolved;
use anyhow::{Context, Result, bail};
use database::GraphStore;
use database::kuzu::KuzuGraphStore;

pub fn run(config: &Resolved, json: bool) -> Result<()> {
    let path = &config.database.database_path;
    if !path.exists() {
        bail!("No database at {}; run `graphload load` first", path.display());
    }
    let store = KuzuGraphStore::open(&config.database.clone().read_only())
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    let counts = store.counts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!("{counts}");
    for (label, count) in &counts.nodes_by_label {
        println!("  {label}: {count}");
    }
    for (rel_type, count) in &counts.relationships_by_type {
        println!("  -[{rel_type}]->: {count}");
    }
    Ok(())
}
