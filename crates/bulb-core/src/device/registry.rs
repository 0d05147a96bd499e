//! Static device registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps a logical device name to the device's hardware id (its MAC address).
///
/// The logical name doubles as the device's DNS host name: the REST endpoint
/// of device `mitte` is `http://mitte/api/v1/device/<hardware id>`.
///
/// The registry is built once from configuration and never mutated.
///
/// # Example
///
/// ```rust
/// use bulb_core::DeviceRegistry;
///
/// let registry = DeviceRegistry::from_iter([("mitte", "5CCF7FA0CA06")]);
/// assert_eq!(
///     registry.endpoint("mitte").as_deref(),
///     Some("http://mitte/api/v1/device/5CCF7FA0CA06")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, String>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hardware id registered for `name`.
    pub fn hardware_id(&self, name: &str) -> Option<&str> {
        self.devices.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` is a registered device.
    pub fn contains(&self, name: &str) -> bool {
        self.devices.contains_key(name)
    }

    /// Returns the REST endpoint URL of device `name`.
    pub fn endpoint(&self, name: &str) -> Option<String> {
        self.hardware_id(name)
            .map(|id| format!("http://{name}/api/v1/device/{id}"))
    }

    /// Registered device names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<N, H> FromIterator<(N, H)> for DeviceRegistry
where
    N: Into<String>,
    H: Into<String>,
{
    /// Builds a registry from `(name, hardware id)` pairs.
    fn from_iter<I: IntoIterator<Item = (N, H)>>(entries: I) -> Self {
        Self {
            devices: entries
                .into_iter()
                .map(|(name, id)| (name.into(), id.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::from_iter([("eingang", "5CCF7FA0C8B4"), ("mitte", "5CCF7FA0CA06")])
    }

    #[test]
    fn test_endpoint_uses_name_as_host_and_id_as_path() {
        assert_eq!(
            registry().endpoint("mitte").unwrap(),
            "http://mitte/api/v1/device/5CCF7FA0CA06"
        );
    }

    #[test]
    fn test_endpoint_of_unknown_device_is_none() {
        assert!(registry().endpoint("keller").is_none());
    }

    #[test]
    fn test_names_are_sorted() {
        let binding = registry();
        let names: Vec<&str> = binding.names().collect();
        assert_eq!(names, vec!["eingang", "mitte"]);
    }

    #[test]
    fn test_deserializes_from_plain_table() {
        let registry: DeviceRegistry =
            serde_json::from_str(r#"{"mitte":"5CCF7FA0CA06"}"#).unwrap();
        assert_eq!(registry.hardware_id("mitte"), Some("5CCF7FA0CA06"));
        assert_eq!(registry.len(), 1);
    }
}
