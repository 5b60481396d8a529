//! The logging loop: poll every device, log and print each reading.

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use crate::client::NestClient;
use crate::error::NestError;
use crate::store::ReadingLog;
use crate::types::{Device, DeviceReading};

/// Outcome of one poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub logged: usize,
    pub failed: usize,
}

pub struct Poller {
    client: NestClient,
    log: ReadingLog,
    interval: Duration,
}

impl Poller {
    pub fn new(client: NestClient, log: ReadingLog, interval: Duration) -> Self {
        Self { client, log, interval }
    }

    pub fn log(&self) -> &ReadingLog {
        &self.log
    }

    /// Poll every device once.
    ///
    /// A device that fails is logged, counted and skipped; the rest of the
    /// cycle still runs. Only a failed device listing fails the cycle.
    pub async fn poll_once<W: Write>(&self, out: &mut W) -> Result<CycleReport, NestError> {
        let devices = self.client.list_devices().await?;
        let mut report = CycleReport::default();

        for device in &devices {
            match self.poll_device(device).await {
                Ok(reading) => {
                    report.logged += 1;
                    if let Err(e) = write_reading(out, &reading) {
                        tracing::warn!("Failed to print reading for {}: {}", reading.device_id, e);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(device = %device.device_id(), "Skipping device: {}", e);
                }
            }
        }

        tracing::info!(
            logged = report.logged,
            failed = report.failed,
            "Poll cycle complete"
        );
        Ok(report)
    }

    async fn poll_device(&self, device: &Device) -> Result<DeviceReading, NestError> {
        let stats = self.client.get_device_stats(device).await?;
        let reading = stats.reading(Utc::now().timestamp())?;
        self.log.append(&reading)?;
        Ok(reading)
    }

    /// Poll until Ctrl-C.
    pub async fn run<W: Write>(&self, out: &mut W) {
        self.run_until(out, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Poll, then sleep the interval, until `shutdown` completes.
    ///
    /// A failed cycle is logged and the loop carries on.
    pub async fn run_until<W, F>(&self, out: &mut W, shutdown: F)
    where
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!("Logging every {}s", self.interval.as_secs());

        loop {
            tokio::select! {
                result = self.poll_once(out) => {
                    if let Err(e) = result {
                        tracing::error!("Poll cycle failed: {}", e);
                    }
                }
                _ = &mut shutdown => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Logging stopped");
    }
}

/// Print a reading with its device and local timestamp.
pub fn write_reading<W: Write>(out: &mut W, reading: &DeviceReading) -> io::Result<()> {
    let when = DateTime::<Utc>::from_timestamp(reading.timestamp, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| reading.timestamp.to_string());

    writeln!(out, "Device: {}", reading.device_id)?;
    writeln!(out, "{}", when)?;
    writeln!(out)?;
    write!(out, "{}", reading)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_write_reading_layout() {
        let reading = DeviceReading {
            timestamp: 1_700_000_000,
            temperature_f: 70.0,
            relative_humidity_pct: 45.0,
            dew_point_f: None,
            device_id: "dev-1".to_string(),
            connectivity_status: "ONLINE".to_string(),
            hvac_status: "OFF".to_string(),
            mode: "HEAT".to_string(),
            eco_mode: "OFF".to_string(),
            eco_heat_f: 60.0,
            eco_cool_f: 80.0,
            setpoint_f: None,
        };

        let mut out = Vec::new();
        write_reading(&mut out, &reading).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Device: dev-1"));
        // Local time, so only the shape is stable
        let stamp = lines.next().unwrap();
        assert_eq!(stamp.len(), "2023-11-14 22:13:20".len());
        assert!(text.contains("Temperature:\t 70 °F"));
        assert!(text.contains("Mode:\t\t HEAT"));
    }
}
