//! Order use-case service.
//!
//! # Responsibility
//! - Accept caller-supplied status text and validate it before storage.
//! - Provide status/description update shortcuts over the repository.
//!
//! # Invariants
//! - Invalid status text never reaches the repository.
//! - Service APIs never bypass repository reference checks.

use crate::model::customer::CustomerId;
use crate::model::device_in_field::DeviceInFieldId;
use crate::model::order::{NewOrder, Order, OrderChanges, OrderId, OrderStatus};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::order_repo::{OrderListQuery, OrderRepository};
use log::{debug, warn};

/// Order request with untyped status text, as received from callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub device: DeviceInFieldId,
    pub customer: CustomerId,
    pub order_description: String,
    pub order_status: String,
}

/// Use-case service wrapper for order operations.
pub struct OrderService<R: OrderRepository> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates the draft status and creates the order.
    ///
    /// # Errors
    /// - `RepoError::Validation` for an unknown status literal.
    /// - `RepoError::ReferentialIntegrity` when the unit or customer is missing.
    pub fn create_order(&self, draft: &OrderDraft) -> RepoResult<Order> {
        let order_status = parse_status("create", &draft.order_status)?;
        let order = NewOrder {
            device: draft.device,
            customer: draft.customer,
            order_description: draft.order_description.clone(),
            order_status,
        };
        let created = log_write("create", self.repo.create_order(&order))?;
        debug!(
            "event=order_write module=service status=ok op=create order_id={}",
            created.id
        );
        Ok(created)
    }

    /// Applies typed partial changes, refreshing `last_update_dt`.
    pub fn update_order(&self, id: OrderId, changes: &OrderChanges) -> RepoResult<Order> {
        log_write("update", self.repo.update_order(id, changes))
    }

    /// Overwrites the status. Any accepted status may follow any other.
    pub fn set_order_status(&self, id: OrderId, status: &str) -> RepoResult<Order> {
        let status = parse_status("set_status", status)?;
        self.update_order(id, &OrderChanges::status(status))
    }

    pub fn set_order_description(
        &self,
        id: OrderId,
        description: impl Into<String>,
    ) -> RepoResult<Order> {
        self.update_order(id, &OrderChanges::description(description))
    }

    pub fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        self.repo.get_order(id)
    }

    pub fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        self.repo.list_orders(query)
    }

    pub fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        log_write("delete", self.repo.delete_order(id))
    }
}

fn parse_status(op: &'static str, value: &str) -> RepoResult<OrderStatus> {
    OrderStatus::parse(value).map_err(|err| {
        // Status text is caller-controlled; log the rule, not the value.
        warn!("event=order_write module=service status=rejected op={op} reason=invalid_status");
        RepoError::from(err)
    })
}

fn log_write<T>(op: &'static str, result: RepoResult<T>) -> RepoResult<T> {
    if let Err(err) = &result {
        let reason = match err {
            RepoError::Validation(_) => "validation",
            RepoError::ReferentialIntegrity(_) => "referential_integrity",
            RepoError::NotFound { .. } => "not_found",
            _ => "storage",
        };
        warn!("event=order_write module=service status=rejected op={op} reason={reason}");
    }
    result
}
