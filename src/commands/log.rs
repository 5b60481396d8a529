use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use homelog_core::Config;
use homelog_nest::{Poller, ReadingLog};

pub async fn cmd_log(config: &Config, interval: Option<u64>, once: bool) -> Result<()> {
    let client = super::nest_client(config).await?;
    let log = ReadingLog::open(&config.logging.database).with_context(|| {
        format!("Failed to open reading log {}", config.logging.database.display())
    })?;

    let interval = Duration::from_secs(interval.unwrap_or(config.logging.poll_interval_secs));
    let poller = Poller::new(client, log, interval);
    let mut out = io::stdout();

    if once {
        let report = poller.poll_once(&mut out).await?;
        println!("Logged {} reading(s), {} failed", report.logged, report.failed);
    } else {
        poller.run(&mut out).await;
    }
    Ok(())
}
