use std::io;

use anyhow::Result;
use chrono::Utc;
use homelog_core::Config;
use homelog_nest::write_reading;

/// One-shot: print every thermostat's current readings.
pub async fn cmd_nest(config: &Config) -> Result<()> {
    let client = super::nest_client(config).await?;
    let devices = client.list_devices().await?;
    if devices.is_empty() {
        println!("No devices in this Device Access project.");
        return Ok(());
    }

    let mut out = io::stdout();
    for device in &devices {
        let reading = client
            .get_device_stats(device)
            .await
            .and_then(|stats| stats.reading(Utc::now().timestamp()));

        match reading {
            Ok(reading) => write_reading(&mut out, &reading)?,
            Err(e) => {
                tracing::error!(device = %device.device_id(), "Skipping device: {}", e);
                eprintln!("{}: {}", device.device_id(), e.user_message());
            }
        }
    }
    Ok(())
}

pub async fn cmd_structures(config: &Config) -> Result<()> {
    let client = super::nest_client(config).await?;
    let structures = client.list_structures().await?;
    if structures.is_empty() {
        println!("No structures in this Device Access project.");
        return Ok(());
    }

    for structure in &structures {
        println!("{}\t{}", structure.name, structure.custom_name().unwrap_or("(unnamed)"));
    }
    Ok(())
}
