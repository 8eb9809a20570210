//! SQL helpers shared by the record repositories.
//!
//! Table and column names passed here are always `&'static str` constants
//! owned by this crate; user input only ever travels as bound parameters.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::record::{RecordId, RecordKind};
use crate::repo::error::{ReferentialIntegrityError, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Verifies the connection is migrated and exposes the required columns.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn record_exists(conn: &Connection, kind: RecordKind, id: RecordId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
            kind.table_name()
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Fails with `MissingReference` unless `target` row `id` exists.
pub(crate) fn require_reference(
    conn: &Connection,
    field: &'static str,
    target: RecordKind,
    id: RecordId,
) -> RepoResult<()> {
    if record_exists(conn, target, id)? {
        return Ok(());
    }
    Err(ReferentialIntegrityError::MissingReference { field, target, id }.into())
}

/// Fails with `DeleteRestricted` while any `dependent.column` row points at `id`.
pub(crate) fn ensure_unreferenced(
    conn: &Connection,
    kind: RecordKind,
    id: RecordId,
    dependent: RecordKind,
    column: &'static str,
) -> RepoResult<()> {
    let dependents: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {column} = ?1;",
            dependent.table_name()
        ),
        [id],
        |row| row.get(0),
    )?;
    if dependents == 0 {
        return Ok(());
    }
    Err(ReferentialIntegrityError::DeleteRestricted {
        kind,
        id,
        dependent,
        dependents: dependents as u64,
    }
    .into())
}

/// Appends `LIMIT`/`OFFSET` clauses and their bind values.
pub(crate) fn push_pagination(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    limit: Option<u32>,
    offset: u32,
) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}
