//! Device catalog repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A device referenced by any deployed unit cannot be deleted.

use crate::model::device::{Device, DeviceId, NewDevice};
use crate::model::record::RecordKind;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, ensure_unreferenced, push_pagination};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const DEVICE_SELECT_SQL: &str = "SELECT id, manufacturer, model FROM devices";

/// Query options for listing catalog devices.
#[derive(Debug, Clone, Default)]
pub struct DeviceListQuery {
    /// Exact manufacturer match.
    pub manufacturer: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog device CRUD operations.
pub trait DeviceRepository {
    fn create_device(&self, device: &NewDevice) -> RepoResult<Device>;
    fn get_device(&self, id: DeviceId) -> RepoResult<Option<Device>>;
    fn update_device(&self, device: &Device) -> RepoResult<()>;
    fn delete_device(&self, id: DeviceId) -> RepoResult<()>;
    fn list_devices(&self, query: &DeviceListQuery) -> RepoResult<Vec<Device>>;
}

/// SQLite-backed catalog device repository.
pub struct SqliteDeviceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeviceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "devices", &["id", "manufacturer", "model"])?;
        Ok(Self { conn })
    }
}

impl DeviceRepository for SqliteDeviceRepository<'_> {
    fn create_device(&self, device: &NewDevice) -> RepoResult<Device> {
        self.conn.execute(
            "INSERT INTO devices (manufacturer, model) VALUES (?1, ?2);",
            params![device.manufacturer.as_str(), device.model.as_str()],
        )?;

        Ok(Device {
            id: self.conn.last_insert_rowid(),
            manufacturer: device.manufacturer.clone(),
            model: device.model.clone(),
        })
    }

    fn get_device(&self, id: DeviceId) -> RepoResult<Option<Device>> {
        load_device(self.conn, id)
    }

    fn update_device(&self, device: &Device) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE devices SET manufacturer = ?1, model = ?2 WHERE id = ?3;",
            params![
                device.manufacturer.as_str(),
                device.model.as_str(),
                device.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Device,
                id: device.id,
            });
        }

        Ok(())
    }

    fn delete_device(&self, id: DeviceId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unreferenced(
            &tx,
            RecordKind::Device,
            id,
            RecordKind::DeviceInField,
            "analyzer_id",
        )?;

        let changed = tx.execute("DELETE FROM devices WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Device,
                id,
            });
        }

        tx.commit()?;
        Ok(())
    }

    fn list_devices(&self, query: &DeviceListQuery) -> RepoResult<Vec<Device>> {
        let mut sql = format!("{DEVICE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(manufacturer) = query.manufacturer.as_ref() {
            sql.push_str(" AND manufacturer = ?");
            bind_values.push(Value::Text(manufacturer.clone()));
        }

        sql.push_str(" ORDER BY id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut devices = Vec::new();
        while let Some(row) = rows.next()? {
            devices.push(parse_device_row(row)?);
        }

        Ok(devices)
    }
}

/// Loads one catalog device; shared with label rendering for deployed units.
pub(crate) fn load_device(conn: &Connection, id: DeviceId) -> RepoResult<Option<Device>> {
    let mut stmt = conn.prepare(&format!("{DEVICE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_device_row(row)?));
    }
    Ok(None)
}

fn parse_device_row(row: &Row<'_>) -> RepoResult<Device> {
    Ok(Device {
        id: row.get("id")?,
        manufacturer: row.get("manufacturer")?,
        model: row.get("model")?,
    })
}
