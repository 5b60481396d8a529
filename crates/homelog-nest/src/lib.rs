//! Thermostat telemetry for homelog.
//!
//! Smart Device Management API client, trait extraction into readings,
//! the SQLite reading log and the polling loop.

pub mod client;
pub mod error;
pub mod poller;
pub mod store;
pub mod types;

pub use client::NestClient;
pub use error::NestError;
pub use poller::{write_reading, CycleReport, Poller};
pub use store::ReadingLog;
pub use types::{extract_reading, Device, DeviceReading, DeviceStats, Structure};
