//! Core record store for the Mars service order-tracking application.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::customer::{Customer, CustomerId, NewCustomer};
pub use model::device::{Device, DeviceId, NewDevice};
pub use model::device_in_field::{DeviceInField, DeviceInFieldId, NewDeviceInField};
pub use model::order::{NewOrder, Order, OrderChanges, OrderId, OrderStatus, ValidationError};
pub use model::record::{RecordId, RecordKind};
pub use repo::customer_repo::{CustomerListQuery, CustomerRepository, SqliteCustomerRepository};
pub use repo::device_repo::{DeviceListQuery, DeviceRepository, SqliteDeviceRepository};
pub use repo::error::{ReferentialIntegrityError, RepoError, RepoResult};
pub use repo::field_repo::{
    DeviceInFieldListQuery, DeviceInFieldRepository, SqliteDeviceInFieldRepository,
};
pub use repo::order_repo::{now_epoch_ms, OrderListQuery, OrderRepository, SqliteOrderRepository};
pub use service::field_service::FieldService;
pub use service::order_service::{OrderDraft, OrderService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
