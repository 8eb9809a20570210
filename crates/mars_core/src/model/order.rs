//! Service order (ticket) domain model.
//!
//! # Responsibility
//! - Define the order record and its closed status enumeration.
//! - Own the only field-level validation rule in the store.
//!
//! # Invariants
//! - `order_status` is always one of `open|closed|in progress|need info`.
//! - `created_dt` is assigned once by storage and never changes.
//! - `last_update_dt` is `None` until the first update and then
//!   `>= created_dt`.
//! - Status changes are unconstrained: any status may follow any other.

use crate::model::customer::CustomerId;
use crate::model::device_in_field::DeviceInFieldId;
use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of an order row.
pub type OrderId = RecordId;

/// Service order lifecycle state.
///
/// Wire and storage literals contain spaces (`"in progress"`, `"need info"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "need info")]
    NeedInfo,
}

impl OrderStatus {
    /// Every accepted status, in declaration order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::Closed,
        OrderStatus::InProgress,
        OrderStatus::NeedInfo,
    ];

    /// Returns the storage literal for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::InProgress => "in progress",
            Self::NeedInfo => "need info",
        }
    }

    /// Parses an exact storage literal.
    ///
    /// Matching is case-sensitive and does not trim input.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "in progress" => Ok(Self::InProgress),
            "need info" => Ok(Self::NeedInfo),
            other => Err(ValidationError::InvalidOrderStatus(other.to_string())),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field value violates a declared constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `order_status` is not one of the accepted literals.
    InvalidOrderStatus(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOrderStatus(value) => write!(f, "{value} is wrong status"),
        }
    }
}

impl Error for ValidationError {}

/// Canonical order record as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Deployed unit the work is about.
    pub device: DeviceInFieldId,
    pub customer: CustomerId,
    pub order_description: String,
    /// Unix epoch milliseconds, stamped on insert.
    pub created_dt: i64,
    /// Unix epoch milliseconds, stamped on every update.
    pub last_update_dt: Option<i64>,
    pub order_status: OrderStatus,
}

impl Order {
    pub fn label(&self) -> String {
        format!("order #{} ({})", self.id, self.order_status)
    }
}

/// Insert payload for an order. Timestamps are not caller-settable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub device: DeviceInFieldId,
    pub customer: CustomerId,
    pub order_description: String,
    pub order_status: OrderStatus,
}

/// Partial update payload for an order.
///
/// `None` fields keep their stored value. An empty change set still counts
/// as a write and refreshes `last_update_dt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub device: Option<DeviceInFieldId>,
    pub customer: Option<CustomerId>,
    pub order_description: Option<String>,
    pub order_status: Option<OrderStatus>,
}

impl OrderChanges {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            order_status: Some(status),
            ..Self::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            order_description: Some(description.into()),
            ..Self::default()
        }
    }
}
