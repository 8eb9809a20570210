//! Deployed-unit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist `DeviceInField` rows linking a catalog device to a customer.
//! - Resolve the analyzer device for label rendering.
//!
//! # Invariants
//! - Writes are rejected unless both `customer_id` and `analyzer_id` exist.
//! - A unit referenced by any order cannot be deleted.
//! - Reference checks and the mutation share one immediate transaction.

use crate::model::customer::CustomerId;
use crate::model::device::DeviceId;
use crate::model::device_in_field::{
    render_label, DeviceInField, DeviceInFieldId, NewDeviceInField,
};
use crate::model::record::RecordKind;
use crate::repo::device_repo::load_device;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{
    ensure_connection_ready, ensure_unreferenced, push_pagination, require_reference,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const FIELD_SELECT_SQL: &str = "SELECT
    id,
    serial_number,
    customer_id,
    analyzer_id,
    owner_status
FROM device_in_fields";

/// Query options for listing deployed units.
#[derive(Debug, Clone, Default)]
pub struct DeviceInFieldListQuery {
    pub customer_id: Option<CustomerId>,
    pub analyzer_id: Option<DeviceId>,
    /// Exact serial number match.
    pub serial_number: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for deployed-unit CRUD operations.
pub trait DeviceInFieldRepository {
    fn create_device_in_field(&self, unit: &NewDeviceInField) -> RepoResult<DeviceInField>;
    fn get_device_in_field(&self, id: DeviceInFieldId) -> RepoResult<Option<DeviceInField>>;
    fn update_device_in_field(&self, unit: &DeviceInField) -> RepoResult<()>;
    fn delete_device_in_field(&self, id: DeviceInFieldId) -> RepoResult<()>;
    fn list_devices_in_field(
        &self,
        query: &DeviceInFieldListQuery,
    ) -> RepoResult<Vec<DeviceInField>>;
    /// Renders `"{serial_number} {manufacturer} {model}"` for one unit.
    fn device_in_field_label(&self, id: DeviceInFieldId) -> RepoResult<Option<String>>;
}

/// SQLite-backed deployed-unit repository.
pub struct SqliteDeviceInFieldRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeviceInFieldRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "device_in_fields",
            &[
                "id",
                "serial_number",
                "customer_id",
                "analyzer_id",
                "owner_status",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl DeviceInFieldRepository for SqliteDeviceInFieldRepository<'_> {
    fn create_device_in_field(&self, unit: &NewDeviceInField) -> RepoResult<DeviceInField> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_unit_references(&tx, unit.customer_id, unit.analyzer_id)?;

        tx.execute(
            "INSERT INTO device_in_fields (
                serial_number,
                customer_id,
                analyzer_id,
                owner_status
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                unit.serial_number.as_str(),
                unit.customer_id,
                unit.analyzer_id,
                unit.owner_status.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(DeviceInField {
            id,
            serial_number: unit.serial_number.clone(),
            customer_id: unit.customer_id,
            analyzer_id: unit.analyzer_id,
            owner_status: unit.owner_status.clone(),
        })
    }

    fn get_device_in_field(&self, id: DeviceInFieldId) -> RepoResult<Option<DeviceInField>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FIELD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_field_row(row)?));
        }
        Ok(None)
    }

    fn update_device_in_field(&self, unit: &DeviceInField) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_unit_references(&tx, unit.customer_id, unit.analyzer_id)?;

        let changed = tx.execute(
            "UPDATE device_in_fields
             SET
                serial_number = ?1,
                customer_id = ?2,
                analyzer_id = ?3,
                owner_status = ?4
             WHERE id = ?5;",
            params![
                unit.serial_number.as_str(),
                unit.customer_id,
                unit.analyzer_id,
                unit.owner_status.as_str(),
                unit.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::DeviceInField,
                id: unit.id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_device_in_field(&self, id: DeviceInFieldId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unreferenced(
            &tx,
            RecordKind::DeviceInField,
            id,
            RecordKind::Order,
            "device",
        )?;

        let changed = tx.execute("DELETE FROM device_in_fields WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::DeviceInField,
                id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn list_devices_in_field(
        &self,
        query: &DeviceInFieldListQuery,
    ) -> RepoResult<Vec<DeviceInField>> {
        let mut sql = format!("{FIELD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(customer_id) = query.customer_id {
            sql.push_str(" AND customer_id = ?");
            bind_values.push(Value::Integer(customer_id));
        }

        if let Some(analyzer_id) = query.analyzer_id {
            sql.push_str(" AND analyzer_id = ?");
            bind_values.push(Value::Integer(analyzer_id));
        }

        if let Some(serial_number) = query.serial_number.as_ref() {
            sql.push_str(" AND serial_number = ?");
            bind_values.push(Value::Text(serial_number.clone()));
        }

        sql.push_str(" ORDER BY id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_field_row(row)?);
        }

        Ok(units)
    }

    fn device_in_field_label(&self, id: DeviceInFieldId) -> RepoResult<Option<String>> {
        let Some(unit) = self.get_device_in_field(id)? else {
            return Ok(None);
        };

        // Foreign keys guarantee the analyzer row; a miss means corrupted storage.
        let analyzer = load_device(self.conn, unit.analyzer_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "device_in_fields.analyzer_id `{}` has no devices row",
                unit.analyzer_id
            ))
        })?;

        Ok(Some(render_label(&unit.serial_number, &analyzer)))
    }
}

fn require_unit_references(
    conn: &Connection,
    customer_id: CustomerId,
    analyzer_id: DeviceId,
) -> RepoResult<()> {
    require_reference(conn, "customer_id", RecordKind::Customer, customer_id)?;
    require_reference(conn, "analyzer_id", RecordKind::Device, analyzer_id)?;
    Ok(())
}

fn parse_field_row(row: &Row<'_>) -> RepoResult<DeviceInField> {
    Ok(DeviceInField {
        id: row.get("id")?,
        serial_number: row.get("serial_number")?,
        customer_id: row.get("customer_id")?,
        analyzer_id: row.get("analyzer_id")?,
        owner_status: row.get("owner_status")?,
    })
}
