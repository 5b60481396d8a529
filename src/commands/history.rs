use std::io;

use anyhow::{Context, Result};
use homelog_core::Config;
use homelog_nest::{write_reading, ReadingLog};

/// Print the most recent readings, newest first.
pub fn cmd_history(config: &Config, limit: usize) -> Result<()> {
    let path = &config.logging.database;
    let log = ReadingLog::open(path)
        .with_context(|| format!("Failed to open reading log {}", path.display()))?;

    let readings = log.recent(limit)?;
    if readings.is_empty() {
        println!("No readings logged yet in {}", path.display());
        return Ok(());
    }

    let mut out = io::stdout();
    for reading in &readings {
        write_reading(&mut out, reading)?;
    }
    Ok(())
}
