//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep caller-facing text parsing out of the repositories.

pub mod field_service;
pub mod order_service;
