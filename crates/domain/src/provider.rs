//! Provider descriptors: class, derived status and activation policy.
//!
//! The provider *behaviour* is a port defined in `sensorcast-app`; this
//! module only holds the plain data that flows across it.

use serde::{Deserialize, Serialize};

/// Priority class of a provider.
///
/// `Hardware` providers read real sensors and may short-circuit lower
/// priority providers; `Fallback` providers are always available and
/// guarantee the system has at least one data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderClass {
    Hardware,
    Fallback,
}

/// How the manager walks the priority list during activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Stop at the first successful `Hardware` provider.
    #[default]
    FirstHardware,
    /// Activate every provider that initialises successfully.
    AllAvailable,
}

/// Point-in-time status of one provider, derived on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub source_id: String,
    pub display_name: String,
    pub available: bool,
    pub sensor_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_first_hardware_policy() {
        assert_eq!(ActivationPolicy::default(), ActivationPolicy::FirstHardware);
    }

    #[test]
    fn should_deserialize_policy_from_snake_case() {
        let policy: ActivationPolicy = serde_json::from_str("\"all_available\"").unwrap();
        assert_eq!(policy, ActivationPolicy::AllAvailable);
    }

    #[test]
    fn should_serialize_status_fields() {
        let status = ProviderStatus {
            source_id: "mock".to_string(),
            display_name: "Mock Sensor".to_string(),
            available: true,
            sensor_count: 17,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["source_id"], "mock");
        assert_eq!(json["available"], true);
        assert_eq!(json["sensor_count"], 17);
    }
}
