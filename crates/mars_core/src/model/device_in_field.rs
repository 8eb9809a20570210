//! Physical unit deployed at a customer site.
//!
//! # Invariants
//! - `customer_id` references an existing customer.
//! - `analyzer_id` references an existing catalog device.
//! - `owner_status` is free text and is never validated.

use crate::model::customer::CustomerId;
use crate::model::device::{Device, DeviceId};
use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};

/// Identifier of a deployed unit row.
pub type DeviceInFieldId = RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInField {
    pub id: DeviceInFieldId,
    pub serial_number: String,
    /// Customer operating the unit.
    pub customer_id: CustomerId,
    /// Catalog device this unit is an instance of.
    pub analyzer_id: DeviceId,
    pub owner_status: String,
}

/// Insert payload for a deployed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeviceInField {
    pub serial_number: String,
    pub customer_id: CustomerId,
    pub analyzer_id: DeviceId,
    pub owner_status: String,
}

impl NewDeviceInField {
    pub fn new(
        serial_number: impl Into<String>,
        customer_id: CustomerId,
        analyzer_id: DeviceId,
        owner_status: impl Into<String>,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            customer_id,
            analyzer_id,
            owner_status: owner_status.into(),
        }
    }
}

impl DeviceInField {
    /// Renders `"{serial_number} {analyzer label}"`.
    ///
    /// `analyzer` is the catalog device referenced by `analyzer_id`; the
    /// caller resolves it, this function does not check the id.
    pub fn label(&self, analyzer: &Device) -> String {
        render_label(&self.serial_number, analyzer)
    }
}

pub(crate) fn render_label(serial_number: &str, analyzer: &Device) -> String {
    format!("{serial_number} {analyzer}")
}
