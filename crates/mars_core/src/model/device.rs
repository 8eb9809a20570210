//! Device catalog entry.

use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of a catalog device row.
pub type DeviceId = RecordId;

/// Available device model offered to customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub manufacturer: String,
    pub model: String,
}

/// Insert payload for a catalog device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub manufacturer: String,
    pub model: String,
}

impl NewDevice {
    pub fn new(manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
        }
    }
}

impl Device {
    /// Renders `"{manufacturer} {model}"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.manufacturer, self.model)
    }
}
