//! Static metadata describing a sensor.
//!
//! Definitions are produced once per provider activation and answer
//! "which sensors exist" without polling any provider.

use serde::{Deserialize, Serialize};

use crate::error::{SensorcastError, ValidationError};
use crate::reading::{HardwareType, SensorCategory};

/// Static descriptor of a sensor exposed by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub sensor_id: String,
    pub name: String,
    pub unit: String,
    pub category: SensorCategory,
    pub hardware_type: HardwareType,
    pub source_id: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Definition {
    /// Create a builder for constructing a [`Definition`].
    #[must_use]
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SensorcastError::Validation`] when:
    /// - `sensor_id` is blank ([`ValidationError::EmptySensorId`])
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - `source_id` is blank ([`ValidationError::EmptySourceId`])
    /// - both bounds are set and `min > max` ([`ValidationError::InvalidRange`])
    pub fn validate(&self) -> Result<(), SensorcastError> {
        if self.sensor_id.trim().is_empty() {
            return Err(ValidationError::EmptySensorId.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.source_id.trim().is_empty() {
            return Err(ValidationError::EmptySourceId.into());
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(ValidationError::InvalidRange {
                sensor_id: self.sensor_id.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Clamp `value` into the declared range, if any.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

/// Step-by-step builder for [`Definition`].
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    sensor_id: Option<String>,
    name: Option<String>,
    unit: Option<String>,
    category: Option<SensorCategory>,
    hardware_type: Option<HardwareType>,
    source_id: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
}

impl DefinitionBuilder {
    #[must_use]
    pub fn sensor_id(mut self, sensor_id: impl Into<String>) -> Self {
        self.sensor_id = Some(sensor_id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: SensorCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn hardware_type(mut self, hardware_type: HardwareType) -> Self {
        self.hardware_type = Some(hardware_type);
        self
    }

    #[must_use]
    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Consume the builder, validate, and return a [`Definition`].
    ///
    /// # Errors
    ///
    /// Returns [`SensorcastError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Definition, SensorcastError> {
        let definition = Definition {
            sensor_id: self.sensor_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            hardware_type: self.hardware_type.unwrap_or_default(),
            source_id: self.source_id.unwrap_or_default(),
            min: self.min,
            max: self.max,
        };
        definition.validate()?;
        Ok(definition)
    }
}
