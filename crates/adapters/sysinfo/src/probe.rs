//! Blocking access to `sysinfo`. Everything here runs on the blocking pool.

use std::collections::HashSet;

use sysinfo::{Components, System};

use sensorcast_domain::definition::Definition;
use sensorcast_domain::reading::{HardwareType, SensorCategory};

use crate::SOURCE_ID;

/// What a host sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metric {
    CpuLoad,
    CoreLoad(usize),
    CpuClock,
    MemoryUsage,
    SwapUsage,
    /// Index into the component list captured at discovery.
    Temperature(usize),
}

/// A discovered sensor and the metric backing it.
#[derive(Debug, Clone)]
pub(crate) struct HostSensor {
    pub(crate) metric: Metric,
    pub(crate) definition: Definition,
}

pub(crate) struct Probe {
    system: System,
    components: Components,
}

impl Probe {
    pub(crate) fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();
        Self {
            system,
            components: Components::new_with_refreshed_list(),
        }
    }

    /// Enumerate the sensors this host can report.
    pub(crate) fn discover(&self) -> Vec<HostSensor> {
        let mut sensors = vec![sensor(
            Metric::CpuLoad,
            "cpu_load",
            "CPU Load",
            "%",
            (SensorCategory::Load, HardwareType::Cpu),
            Some((0.0, 100.0)),
        )];

        for (index, cpu) in self.system.cpus().iter().enumerate() {
            sensors.push(sensor(
                Metric::CoreLoad(index),
                &format!("cpu_core_{index}_load"),
                &format!("CPU Core {} Load ({})", index + 1, cpu.name()),
                "%",
                (SensorCategory::Load, HardwareType::Cpu),
                Some((0.0, 100.0)),
            ));
        }

        if average_frequency(&self.system).is_some() {
            sensors.push(sensor(
                Metric::CpuClock,
                "cpu_clock",
                "CPU Clock Speed",
                "MHz",
                (SensorCategory::Clock, HardwareType::Cpu),
                None,
            ));
        }

        if self.system.total_memory() > 0 {
            sensors.push(sensor(
                Metric::MemoryUsage,
                "memory_usage",
                "Memory Usage",
                "%",
                (SensorCategory::Usage, HardwareType::Memory),
                Some((0.0, 100.0)),
            ));
        }
        if self.system.total_swap() > 0 {
            sensors.push(sensor(
                Metric::SwapUsage,
                "swap_usage",
                "Swap Usage",
                "%",
                (SensorCategory::Usage, HardwareType::Memory),
                Some((0.0, 100.0)),
            ));
        }

        let mut taken = HashSet::new();
        for (index, component) in self.components.list().iter().enumerate() {
            let label = component.label().trim();
            let name = if label.is_empty() {
                format!("Component {}", index + 1)
            } else {
                label.to_string()
            };
            let mut id = format!("temp_{}", slug(&name));
            if !taken.insert(id.clone()) {
                id = format!("{id}_{index}");
                taken.insert(id.clone());
            }
            sensors.push(sensor(
                Metric::Temperature(index),
                &id,
                &name,
                "\u{b0}C",
                (SensorCategory::Temperature, hardware_for(&name)),
                None,
            ));
        }

        sensors
    }

    /// Refresh the backing counters and read one value per sensor.
    ///
    /// Sensors whose current value is unknown are skipped.
    pub(crate) fn sample(&mut self, sensors: &[HostSensor]) -> Vec<(usize, f64)> {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.components.refresh();

        sensors
            .iter()
            .enumerate()
            .filter_map(|(index, sensor)| {
                self.value(sensor.metric)
                    .filter(|v| v.is_finite())
                    .map(|v| (index, v))
            })
            .collect()
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CpuLoad => Some(one_decimal(f64::from(
                self.system.global_cpu_info().cpu_usage(),
            ))),
            Metric::CoreLoad(index) => self
                .system
                .cpus()
                .get(index)
                .map(|cpu| one_decimal(f64::from(cpu.cpu_usage()))),
            Metric::CpuClock => average_frequency(&self.system),
            Metric::MemoryUsage => {
                percent(self.system.used_memory(), self.system.total_memory())
            }
            Metric::SwapUsage => percent(self.system.used_swap(), self.system.total_swap()),
            Metric::Temperature(index) => self
                .components
                .list()
                .get(index)
                .map(|c| one_decimal(f64::from(c.temperature()))),
        }
    }
}

fn sensor(
    metric: Metric,
    id: &str,
    name: &str,
    unit: &str,
    (category, hardware_type): (SensorCategory, HardwareType),
    range: Option<(f64, f64)>,
) -> HostSensor {
    HostSensor {
        metric,
        definition: Definition {
            sensor_id: id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            category,
            hardware_type,
            source_id: SOURCE_ID.to_string(),
            min: range.map(|(min, _)| min),
            max: range.map(|(_, max)| max),
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_frequency(system: &System) -> Option<f64> {
    let cpus = system.cpus();
    let total: u64 = cpus.iter().map(sysinfo::Cpu::frequency).sum();
    (total > 0).then(|| (total as f64 / cpus.len() as f64).round())
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(used: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| one_decimal(used as f64 / total as f64 * 100.0))
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Lowercase ASCII identifier with runs of other characters collapsed to `_`.
pub(crate) fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("sensor");
    }
    out
}

/// Best guess at the hardware behind a component label.
pub(crate) fn hardware_for(label: &str) -> HardwareType {
    let label = label.to_ascii_lowercase();
    if ["cpu", "core", "package", "k10temp", "coretemp", "tctl", "tdie"]
        .iter()
        .any(|k| label.contains(k))
    {
        HardwareType::Cpu
    } else if ["gpu", "amdgpu", "nouveau", "radeon", "edge", "junction"]
        .iter()
        .any(|k| label.contains(k))
    {
        HardwareType::Gpu
    } else if ["nvme", "composite", "drivetemp", "ssd", "disk"]
        .iter()
        .any(|k| label.contains(k))
    {
        HardwareType::Storage
    } else if ["acpitz", "pch", "board", "system"].iter().any(|k| label.contains(k)) {
        HardwareType::Motherboard
    } else if label.contains("battery") || label.contains("bat") {
        HardwareType::Battery
    } else if ["wifi", "iwlwifi", "eth"].iter().any(|k| label.contains(k)) {
        HardwareType::Network
    } else {
        HardwareType::Unknown
    }
}
