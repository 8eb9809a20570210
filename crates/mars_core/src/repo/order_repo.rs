//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist service orders and stamp their timestamps.
//! - Enforce that orders reference an existing unit and customer.
//!
//! # Invariants
//! - `created_dt` is written by insert only and never by update.
//! - Every update writes `last_update_dt = max(now, created_dt)`.
//! - Read paths reject unknown persisted status literals.

use crate::model::customer::CustomerId;
use crate::model::device_in_field::DeviceInFieldId;
use crate::model::order::{NewOrder, Order, OrderChanges, OrderId, OrderStatus};
use crate::model::record::RecordKind;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, push_pagination, require_reference};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::time::{SystemTime, UNIX_EPOCH};

const ORDER_SELECT_SQL: &str = "SELECT
    id,
    device,
    customer,
    order_description,
    created_dt,
    last_update_dt,
    order_status
FROM orders";

/// Source of write timestamps in Unix epoch milliseconds.
pub type Clock = fn() -> i64;

/// Query options for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub customer: Option<CustomerId>,
    pub device: Option<DeviceInFieldId>,
    pub status: Option<OrderStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for order CRUD operations.
pub trait OrderRepository {
    fn create_order(&self, order: &NewOrder) -> RepoResult<Order>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    /// Applies `changes` and returns the stored record after the write.
    fn update_order(&self, id: OrderId, changes: &OrderChanges) -> RepoResult<Order>;
    fn delete_order(&self, id: OrderId) -> RepoResult<()>;
    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
    clock: Clock,
}

impl<'conn> SqliteOrderRepository<'conn> {
    /// Constructs a repository from a migrated connection using wall-clock time.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "orders",
            &[
                "id",
                "device",
                "customer",
                "order_description",
                "created_dt",
                "last_update_dt",
                "order_status",
            ],
        )?;
        Ok(Self {
            conn,
            clock: now_epoch_ms,
        })
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &NewOrder) -> RepoResult<Order> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_order_references(&tx, order.device, order.customer)?;

        let created_dt = (self.clock)();
        tx.execute(
            "INSERT INTO orders (
                device,
                customer,
                order_description,
                created_dt,
                last_update_dt,
                order_status
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5);",
            params![
                order.device,
                order.customer,
                order.order_description.as_str(),
                created_dt,
                order.order_status.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Order {
            id,
            device: order.device,
            customer: order.customer,
            order_description: order.order_description.clone(),
            created_dt,
            last_update_dt: None,
            order_status: order.order_status,
        })
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        load_order(self.conn, id)
    }

    fn update_order(&self, id: OrderId, changes: &OrderChanges) -> RepoResult<Order> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_order(&tx, id)?.ok_or(RepoError::NotFound {
            kind: RecordKind::Order,
            id,
        })?;

        let device = changes.device.unwrap_or(current.device);
        let customer = changes.customer.unwrap_or(current.customer);
        require_order_references(&tx, device, customer)?;

        let description = changes
            .order_description
            .as_deref()
            .unwrap_or(current.order_description.as_str());
        let status = changes.order_status.unwrap_or(current.order_status);
        let last_update_dt = (self.clock)().max(current.created_dt);

        tx.execute(
            "UPDATE orders
             SET
                device = ?1,
                customer = ?2,
                order_description = ?3,
                order_status = ?4,
                last_update_dt = ?5
             WHERE id = ?6;",
            params![
                device,
                customer,
                description,
                status.as_str(),
                last_update_dt,
                id
            ],
        )?;

        let updated = Order {
            id,
            device,
            customer,
            order_description: description.to_string(),
            created_dt: current.created_dt,
            last_update_dt: Some(last_update_dt),
            order_status: status,
        };
        tx.commit()?;
        Ok(updated)
    }

    fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM orders WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Order,
                id,
            });
        }
        Ok(())
    }

    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        let mut sql = format!("{ORDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(customer) = query.customer {
            sql.push_str(" AND customer = ?");
            bind_values.push(Value::Integer(customer));
        }

        if let Some(device) = query.device {
            sql.push_str(" AND device = ?");
            bind_values.push(Value::Integer(device));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND order_status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_dt DESC, id DESC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(parse_order_row(row)?);
        }

        Ok(orders)
    }
}

/// Wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before 1970 report `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn require_order_references(
    conn: &Connection,
    device: DeviceInFieldId,
    customer: CustomerId,
) -> RepoResult<()> {
    require_reference(conn, "device", RecordKind::DeviceInField, device)?;
    require_reference(conn, "customer", RecordKind::Customer, customer)?;
    Ok(())
}

fn load_order(conn: &Connection, id: OrderId) -> RepoResult<Option<Order>> {
    let mut stmt = conn.prepare(&format!("{ORDER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_order_row(row)?));
    }
    Ok(None)
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<Order> {
    let status_text: String = row.get("order_status")?;
    let order_status = OrderStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid order status `{status_text}` in orders.order_status"
        ))
    })?;

    Ok(Order {
        id: row.get("id")?,
        device: row.get("device")?,
        customer: row.get("customer")?,
        order_description: row.get("order_description")?,
        created_dt: row.get("created_dt")?,
        last_update_dt: row.get("last_update_dt")?,
        order_status,
    })
}
