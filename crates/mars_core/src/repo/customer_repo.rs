//! Customer repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A customer referenced by a deployed unit or an order cannot be deleted.

use crate::model::customer::{Customer, CustomerId, NewCustomer};
use crate::model::record::RecordKind;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, ensure_unreferenced, push_pagination};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    customer_name,
    customer_address,
    customer_city
FROM customers";

/// Query options for listing customers.
#[derive(Debug, Clone, Default)]
pub struct CustomerListQuery {
    /// Exact city match.
    pub city: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for customer CRUD operations.
pub trait CustomerRepository {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<Customer>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn update_customer(&self, customer: &Customer) -> RepoResult<()>;
    fn delete_customer(&self, id: CustomerId) -> RepoResult<()>;
    fn list_customers(&self, query: &CustomerListQuery) -> RepoResult<Vec<Customer>>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "customers",
            &["id", "customer_name", "customer_address", "customer_city"],
        )?;
        Ok(Self { conn })
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<Customer> {
        self.conn.execute(
            "INSERT INTO customers (
                customer_name,
                customer_address,
                customer_city
            ) VALUES (?1, ?2, ?3);",
            params![
                customer.customer_name.as_str(),
                customer.customer_address.as_str(),
                customer.customer_city.as_str(),
            ],
        )?;

        Ok(Customer {
            id: self.conn.last_insert_rowid(),
            customer_name: customer.customer_name.clone(),
            customer_address: customer.customer_address.clone(),
            customer_city: customer.customer_city.clone(),
        })
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn update_customer(&self, customer: &Customer) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE customers
             SET
                customer_name = ?1,
                customer_address = ?2,
                customer_city = ?3
             WHERE id = ?4;",
            params![
                customer.customer_name.as_str(),
                customer.customer_address.as_str(),
                customer.customer_city.as_str(),
                customer.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Customer,
                id: customer.id,
            });
        }

        Ok(())
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unreferenced(
            &tx,
            RecordKind::Customer,
            id,
            RecordKind::DeviceInField,
            "customer_id",
        )?;
        ensure_unreferenced(&tx, RecordKind::Customer, id, RecordKind::Order, "customer")?;

        let changed = tx.execute("DELETE FROM customers WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Customer,
                id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn list_customers(&self, query: &CustomerListQuery) -> RepoResult<Vec<Customer>> {
        let mut sql = format!("{CUSTOMER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(city) = query.city.as_ref() {
            sql.push_str(" AND customer_city = ?");
            bind_values.push(Value::Text(city.clone()));
        }

        sql.push_str(" ORDER BY id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }

        Ok(customers)
    }
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    Ok(Customer {
        id: row.get("id")?,
        customer_name: row.get("customer_name")?,
        customer_address: row.get("customer_address")?,
        customer_city: row.get("customer_city")?,
    })
}
