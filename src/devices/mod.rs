// MIT License - Copyright (c) 2026 Peter Wright
// Presented devices

pub mod zone;

use serde::Serialize;

use crate::constants::{DEVICE_MANUFACTURER, DEVICE_MODEL, DEVICE_NAME, DOMAIN};

pub use zone::{ZoneAttributes, ZoneDisplay, ZoneSensor};

/// Device metadata shared by every zone of one config entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    /// `(domain, entry_id)` pairs identifying the panel
    pub identifiers: Vec<(String, String)>,
}

impl DeviceInfo {
    pub fn for_entry(entry_id: &str) -> Self {
        Self {
            name: DEVICE_NAME.to_string(),
            manufacturer: DEVICE_MANUFACTURER.to_string(),
            model: DEVICE_MODEL.to_string(),
            identifiers: vec![(DOMAIN.to_string(), entry_id.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info() {
        let info = DeviceInfo::for_entry("abc123");
        assert_eq!(info.name, "Pima Force");
        assert_eq!(info.manufacturer, "Pima");
        assert_eq!(info.model, "Force");
        assert_eq!(info.identifiers, vec![("pima_force".to_string(), "abc123".to_string())]);
    }
}
