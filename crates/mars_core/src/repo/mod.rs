//! Repository layer: the domain record store.
//!
//! # Responsibility
//! - Define per-kind CRUD contracts over the four record tables.
//! - Enforce referential integrity and restrict-on-delete explicitly, before
//!   SQLite's own foreign-key checks are reached.
//!
//! # Invariants
//! - Rejected writes leave storage untouched.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `ReferentialIntegrity`) in addition to storage errors.

pub mod customer_repo;
pub mod device_repo;
pub mod error;
pub mod field_repo;
pub mod order_repo;
mod sql;
