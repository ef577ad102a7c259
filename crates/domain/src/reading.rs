//! One timestamped sensor value produced by a provider.
//!
//! Readings are immutable once produced. Every reading belongs to exactly
//! one provider, identified by its `source_id`.

use serde::{Deserialize, Serialize};

use crate::definition::Definition;
use crate::time::Timestamp;

/// What physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCategory {
    Temperature,
    Voltage,
    Current,
    Power,
    Clock,
    Load,
    Usage,
    Frequency,
    Fan,
    Flow,
    Control,
    Level,
    Factor,
    Data,
    Throughput,
    Energy,
    Noise,
    #[default]
    Unknown,
}

/// Which piece of hardware a sensor is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareType {
    Cpu,
    Gpu,
    Memory,
    Motherboard,
    Storage,
    Network,
    Controller,
    Battery,
    Cooler,
    Psu,
    Fan,
    #[default]
    Unknown,
}

/// Provider-assessed confidence in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Unknown,
}

/// A single sensor value sampled at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub category: SensorCategory,
    pub hardware_type: HardwareType,
    pub source_id: String,
    pub quality: DataQuality,
    pub timestamp: Timestamp,
}

impl Reading {
    /// Sample `value` for the sensor described by `definition`.
    ///
    /// Identity, unit and classification are copied from the definition so
    /// a reading never disagrees with the metadata it was produced from.
    #[must_use]
    pub fn sample(definition: &Definition, value: f64, timestamp: Timestamp) -> Self {
        Self {
            sensor_id: definition.sensor_id.clone(),
            name: definition.name.clone(),
            value,
            unit: definition.unit.clone(),
            category: definition.category,
            hardware_type: definition.hardware_type,
            source_id: definition.source_id.clone(),
            quality: DataQuality::Good,
            timestamp,
        }
    }

    /// Override the quality assessment.
    #[must_use]
    pub fn with_quality(mut self, quality: DataQuality) -> Self {
        self.quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn cpu_temp() -> Definition {
        Definition::builder()
            .sensor_id("cpu_temp")
            .name("CPU Temperature")
            .source_id("mock")
            .unit("\u{b0}C")
            .category(SensorCategory::Temperature)
            .hardware_type(HardwareType::Cpu)
            .range(30.0, 85.0)
            .build()
            .unwrap()
    }

    #[test]
    fn should_copy_metadata_from_definition() {
        let ts = now();
        let reading = Reading::sample(&cpu_temp(), 47.5, ts);
        assert_eq!(reading.sensor_id, "cpu_temp");
        assert_eq!(reading.source_id, "mock");
        assert_eq!(reading.unit, "\u{b0}C");
        assert_eq!(reading.category, SensorCategory::Temperature);
        assert_eq!(reading.hardware_type, HardwareType::Cpu);
        assert_eq!(reading.quality, DataQuality::Good);
        assert_eq!(reading.timestamp, ts);
    }

    #[test]
    fn should_override_quality() {
        let reading = Reading::sample(&cpu_temp(), 47.5, now()).with_quality(DataQuality::Poor);
        assert_eq!(reading.quality, DataQuality::Poor);
    }

    #[test]
    fn should_serialize_enums_as_snake_case() {
        let reading = Reading::sample(&cpu_temp(), 47.5, now());
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["category"], "temperature");
        assert_eq!(json["hardware_type"], "cpu");
        assert_eq!(json["quality"], "good");
        assert_eq!(json["value"], 47.5);
    }
}
