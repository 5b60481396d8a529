use std::fmt;

use homelog_core::units::{c_to_f, dew_point_f};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NestError;

pub const TEMPERATURE_TRAIT: &str = "sdm.devices.traits.Temperature";
pub const HUMIDITY_TRAIT: &str = "sdm.devices.traits.Humidity";
pub const CONNECTIVITY_TRAIT: &str = "sdm.devices.traits.Connectivity";
pub const HVAC_TRAIT: &str = "sdm.devices.traits.ThermostatHvac";
pub const MODE_TRAIT: &str = "sdm.devices.traits.ThermostatMode";
pub const ECO_TRAIT: &str = "sdm.devices.traits.ThermostatEco";
pub const SETPOINT_TRAIT: &str = "sdm.devices.traits.ThermostatTemperatureSetpoint";
pub const STRUCTURE_INFO_TRAIT: &str = "sdm.structures.traits.Info";

/// Raw trait bundle keyed by fully-qualified trait name
pub type Traits = Map<String, Value>;

/// Device entry from the device list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// `enterprises/{project}/devices/{id}`
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub traits: Traits,
}

impl Device {
    /// Last path segment of the resource name
    pub fn device_id(&self) -> &str {
        device_id(&self.name)
    }
}

/// One device's current trait bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStats {
    pub name: String,
    #[serde(default)]
    pub traits: Traits,
}

impl DeviceStats {
    pub fn reading(&self, timestamp: i64) -> Result<DeviceReading, NestError> {
        extract_reading(&self.name, &self.traits, timestamp)
    }
}

/// A home (structure) in the device-access project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    #[serde(default)]
    pub traits: Traits,
}

impl Structure {
    /// The user-assigned name, when the Info trait carries one
    pub fn custom_name(&self) -> Option<&str> {
        self.traits
            .get(STRUCTURE_INFO_TRAIT)?
            .get("customName")?
            .as_str()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceListResponse {
    pub devices: Option<Vec<Device>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StructureListResponse {
    #[serde(default)]
    pub structures: Vec<Structure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemperatureTrait {
    ambient_temperature_celsius: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HumidityTrait {
    ambient_humidity_percent: f64,
}

#[derive(Debug, Deserialize)]
struct StatusTrait {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ModeTrait {
    mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EcoTrait {
    mode: String,
    heat_celsius: f64,
    cool_celsius: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetpointTrait {
    #[serde(default)]
    heat_celsius: Option<f64>,
}

/// A point-in-time thermostat snapshot, one per device per poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    /// Unix seconds
    pub timestamp: i64,
    pub temperature_f: f64,
    pub relative_humidity_pct: f64,
    /// Only defined at 50% humidity or more
    pub dew_point_f: Option<f64>,
    pub device_id: String,
    pub connectivity_status: String,
    pub hvac_status: String,
    pub mode: String,
    pub eco_mode: String,
    pub eco_heat_f: f64,
    pub eco_cool_f: f64,
    /// Heat setpoint, absent when the thermostat isn't heating to a target
    pub setpoint_f: Option<f64>,
}

fn device_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn required_trait<T: DeserializeOwned>(traits: &Traits, name: &str) -> Result<T, NestError> {
    let value = traits
        .get(name)
        .ok_or_else(|| NestError::MissingTrait(name.to_string()))?;
    serde_json::from_value(value.clone()).map_err(|e| {
        tracing::debug!("Trait {} did not match the expected shape: {}", name, e);
        NestError::MissingTrait(name.to_string())
    })
}

/// Map a trait bundle to a reading.
///
/// Temperature, Humidity, Connectivity, ThermostatHvac, ThermostatMode and
/// ThermostatEco are required; ThermostatTemperatureSetpoint is optional.
pub fn extract_reading(
    device_name: &str,
    traits: &Traits,
    timestamp: i64,
) -> Result<DeviceReading, NestError> {
    let temperature: TemperatureTrait = required_trait(traits, TEMPERATURE_TRAIT)?;
    let humidity: HumidityTrait = required_trait(traits, HUMIDITY_TRAIT)?;
    let connectivity: StatusTrait = required_trait(traits, CONNECTIVITY_TRAIT)?;
    let hvac: StatusTrait = required_trait(traits, HVAC_TRAIT)?;
    let mode: ModeTrait = required_trait(traits, MODE_TRAIT)?;
    let eco: EcoTrait = required_trait(traits, ECO_TRAIT)?;

    let setpoint_f = traits
        .get(SETPOINT_TRAIT)
        .and_then(|v| serde_json::from_value::<SetpointTrait>(v.clone()).ok())
        .and_then(|s| s.heat_celsius)
        .map(c_to_f);

    let temp_c = temperature.ambient_temperature_celsius;
    let rh = humidity.ambient_humidity_percent;

    Ok(DeviceReading {
        timestamp,
        temperature_f: c_to_f(temp_c),
        relative_humidity_pct: rh,
        dew_point_f: dew_point_f(temp_c, rh),
        device_id: device_id(device_name).to_string(),
        connectivity_status: connectivity.status,
        hvac_status: hvac.status,
        mode: mode.mode,
        eco_mode: eco.mode,
        eco_heat_f: c_to_f(eco.heat_celsius),
        eco_cool_f: c_to_f(eco.cool_celsius),
        setpoint_f,
    })
}

impl fmt::Display for DeviceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Temperature:\t {} °F", self.temperature_f)?;
        writeln!(f)?;
        writeln!(f, "Humidity:\t {} %", self.relative_humidity_pct)?;
        if let Some(dew) = self.dew_point_f {
            writeln!(f, "Dew Point:\t {} °F", dew)?;
        }
        writeln!(f)?;
        writeln!(f, "Connectivity:\t {}", self.connectivity_status)?;
        writeln!(f, "HVAC:\t\t {}", self.hvac_status)?;
        writeln!(f, "Mode:\t\t {}", self.mode)?;
        writeln!(f)?;
        writeln!(f, "Eco Mode:\t {}", self.eco_mode)?;
        writeln!(f, "Eco Min:\t {} °F", self.eco_heat_f)?;
        writeln!(f, "Eco Max:\t {} °F", self.eco_cool_f)?;
        if let Some(setpoint) = self.setpoint_f {
            writeln!(f, "Set Point:\t {} °F", setpoint)?;
        }
        Ok(())
    }
}
