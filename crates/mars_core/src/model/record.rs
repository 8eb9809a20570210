//! Record identity shared by every entity kind.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned record identifier (SQLite `AUTOINCREMENT` rowid).
pub type RecordId = i64;

/// The four record kinds persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Catalog entry (`devices`).
    Device,
    /// Customer organization (`customers`).
    Customer,
    /// Physical unit deployed at a customer site (`device_in_fields`).
    DeviceInField,
    /// Service ticket (`orders`).
    Order,
}

impl RecordKind {
    /// Logical table name used by the persisted layout.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Device => "devices",
            Self::Customer => "customers",
            Self::DeviceInField => "device_in_fields",
            Self::Order => "orders",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Device => "device",
            Self::Customer => "customer",
            Self::DeviceInField => "device in field",
            Self::Order => "order",
        };
        f.write_str(name)
    }
}
