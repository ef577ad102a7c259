//! The fixed set of simulated sensors.

use sensorcast_domain::definition::Definition;
use sensorcast_domain::reading::{HardwareType, HardwareType as Hw, SensorCategory, SensorCategory as Cat};

use crate::SOURCE_ID;

/// Static description of one simulated sensor and its waveform.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulatedSensor {
    pub(crate) id: &'static str,
    pub(crate) name: &'static str,
    pub(crate) unit: &'static str,
    pub(crate) category: SensorCategory,
    pub(crate) hardware_type: HardwareType,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) base: f64,
    pub(crate) variation: f64,
}

impl SimulatedSensor {
    /// Integer-valued units are reported without decimals.
    pub(crate) fn is_integral(&self) -> bool {
        matches!(self.unit, "RPM" | "MHz")
    }

    pub(crate) fn definition(&self) -> Definition {
        Definition {
            sensor_id: self.id.to_string(),
            name: self.name.to_string(),
            unit: self.unit.to_string(),
            category: self.category,
            hardware_type: self.hardware_type,
            source_id: SOURCE_ID.to_string(),
            min: Some(self.min),
            max: Some(self.max),
        }
    }
}

const fn sensor(
    id: &'static str,
    name: &'static str,
    unit: &'static str,
    (category, hardware_type): (SensorCategory, HardwareType),
    (min, max): (f64, f64),
    (base, variation): (f64, f64),
) -> SimulatedSensor {
    SimulatedSensor {
        id,
        name,
        unit,
        category,
        hardware_type,
        min,
        max,
        base,
        variation,
    }
}

pub(crate) const CATALOG: [SimulatedSensor; 17] = [
    sensor("cpu_temp", "CPU Temperature", "\u{b0}C", (Cat::Temperature, Hw::Cpu), (30.0, 85.0), (45.0, 15.0)),
    sensor("cpu_usage", "CPU Usage", "%", (Cat::Usage, Hw::Cpu), (0.0, 100.0), (25.0, 35.0)),
    sensor("cpu_power", "CPU Power", "W", (Cat::Power, Hw::Cpu), (15.0, 125.0), (45.0, 30.0)),
    sensor("cpu_clock", "CPU Clock Speed", "MHz", (Cat::Frequency, Hw::Cpu), (800.0, 4200.0), (2400.0, 800.0)),
    sensor("gpu_temp", "GPU Temperature", "\u{b0}C", (Cat::Temperature, Hw::Gpu), (35.0, 83.0), (50.0, 20.0)),
    sensor("gpu_usage", "GPU Usage", "%", (Cat::Usage, Hw::Gpu), (0.0, 100.0), (30.0, 40.0)),
    sensor("gpu_memory", "GPU Memory Usage", "%", (Cat::Usage, Hw::Gpu), (10.0, 95.0), (35.0, 25.0)),
    sensor("gpu_power", "GPU Power", "W", (Cat::Power, Hw::Gpu), (20.0, 250.0), (80.0, 60.0)),
    sensor("ram_usage", "RAM Usage", "%", (Cat::Usage, Hw::Memory), (25.0, 85.0), (45.0, 15.0)),
    sensor("ram_temp", "RAM Temperature", "\u{b0}C", (Cat::Temperature, Hw::Memory), (30.0, 55.0), (38.0, 8.0)),
    sensor("nvme_temp", "NVMe SSD Temperature", "\u{b0}C", (Cat::Temperature, Hw::Storage), (25.0, 70.0), (35.0, 12.0)),
    sensor("disk_usage", "Disk Usage", "%", (Cat::Usage, Hw::Storage), (45.0, 75.0), (60.0, 5.0)),
    sensor("motherboard_temp", "Motherboard Temperature", "\u{b0}C", (Cat::Temperature, Hw::Motherboard), (28.0, 50.0), (35.0, 6.0)),
    sensor("psu_temp", "PSU Temperature", "\u{b0}C", (Cat::Temperature, Hw::Psu), (30.0, 65.0), (42.0, 10.0)),
    sensor("cpu_fan_speed", "CPU Fan Speed", "RPM", (Cat::Fan, Hw::Fan), (500.0, 2000.0), (1200.0, 400.0)),
    sensor("case_fan_speed", "Case Fan Speed", "RPM", (Cat::Fan, Hw::Fan), (300.0, 1500.0), (800.0, 300.0)),
    sensor("network_usage", "Network Usage", "%", (Cat::Usage, Hw::Network), (0.0, 100.0), (15.0, 25.0)),
];
