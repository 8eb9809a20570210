//! Plain record types for the order-tracking data model.
//!
//! # Responsibility
//! - Define the four persisted record kinds and their insert/update payloads.
//! - Render human-readable labels for records.
//!
//! # Invariants
//! - Every record is identified by a storage-assigned integer id that is never
//!   reused.
//! - Labels are presentation only; identity and comparison use ids.
//! - `OrderStatus` is closed: only its four literals are representable.

pub mod customer;
pub mod device;
pub mod device_in_field;
pub mod order;
pub mod record;
