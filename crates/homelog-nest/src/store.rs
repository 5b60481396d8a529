//! SQLite reading log.

use std::path::Path;

use homelog_core::{DatabaseError, RusqliteErrorExt};
use rusqlite::{params, Connection, Row};

use crate::types::DeviceReading;

/// Append-only log of thermostat readings.
///
/// Column order matches existing log files; inserts are positional.
pub struct ReadingLog {
    conn: Connection,
}

impl ReadingLog {
    /// Open the log at `path`, creating the file and table when needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path).map_err(|e| e.into_database_error())?;
        let log = Self { conn };
        log.init_schema()?;
        tracing::debug!("Reading log open at {}", path.display());
        Ok(log)
    }

    /// Create an in-memory log (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| e.into_database_error())?;
        let log = Self { conn };
        log.init_schema()?;
        Ok(log)
    }

    fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS device_stats (
                    timestamp INTEGER,
                    temperature REAL,
                    relative_humidity REAL,
                    dew_point REAL,
                    device_id TEXT,
                    connectivity TEXT,
                    hvac TEXT,
                    mode TEXT,
                    eco_mode TEXT,
                    eco_heat REAL,
                    eco_cool REAL,
                    set_point REAL
                );
                "#,
            )
            .map_err(|e| e.into_database_error())
    }

    /// Append one reading.
    pub fn append(&self, reading: &DeviceReading) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO device_stats VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    reading.timestamp,
                    reading.temperature_f,
                    reading.relative_humidity_pct,
                    reading.dew_point_f,
                    reading.device_id,
                    reading.connectivity_status,
                    reading.hvac_status,
                    reading.mode,
                    reading.eco_mode,
                    reading.eco_heat_f,
                    reading.eco_cool_f,
                    reading.setpoint_f,
                ],
            )
            .map_err(|e| e.into_database_error())?;
        Ok(())
    }

    /// The most recent `limit` readings, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<DeviceReading>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT timestamp, temperature, relative_humidity, dew_point, device_id,
                       connectivity, hvac, mode, eco_mode, eco_heat, eco_cool, set_point
                FROM device_stats
                ORDER BY timestamp DESC, rowid DESC
                LIMIT ?1
                "#,
            )
            .map_err(|e| e.into_database_error())?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], row_to_reading)
            .map_err(|e| e.into_database_error())?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.into_database_error())
    }

    /// Total number of logged readings.
    pub fn count(&self) -> Result<u64, DatabaseError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM device_stats", [], |row| row.get::<_, i64>(0))
            .map(|n| u64::try_from(n).unwrap_or(0))
            .map_err(|e| e.into_database_error())
    }
}

fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<DeviceReading> {
    Ok(DeviceReading {
        timestamp: row.get(0)?,
        temperature_f: row.get(1)?,
        relative_humidity_pct: row.get(2)?,
        dew_point_f: row.get(3)?,
        device_id: row.get(4)?,
        connectivity_status: row.get(5)?,
        hvac_status: row.get(6)?,
        mode: row.get(7)?,
        eco_mode: row.get(8)?,
        eco_heat_f: row.get(9)?,
        eco_cool_f: row.get(10)?,
        setpoint_f: row.get(11)?,
    })
}
