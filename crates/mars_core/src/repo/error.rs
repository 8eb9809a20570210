//! Store error taxonomy shared by every repository.

use crate::db::DbError;
use crate::model::order::ValidationError;
use crate::model::record::{RecordId, RecordKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// A foreign-key rule would be broken by the requested write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferentialIntegrityError {
    /// A write names a record that does not exist.
    MissingReference {
        /// Referencing column, e.g. `analyzer_id`.
        field: &'static str,
        target: RecordKind,
        id: RecordId,
    },
    /// A delete is blocked because dependent rows still reference the record.
    DeleteRestricted {
        kind: RecordKind,
        id: RecordId,
        dependent: RecordKind,
        dependents: u64,
    },
}

impl Display for ReferentialIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingReference { field, target, id } => {
                write!(f, "`{field}` references missing {target} {id}")
            }
            Self::DeleteRestricted {
                kind,
                id,
                dependent,
                dependents,
            } => write!(
                f,
                "cannot delete {kind} {id}: restricted by {dependents} referencing {dependent} row(s)"
            ),
        }
    }
}

impl Error for ReferentialIntegrityError {}

/// Generic repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// A field value violates a declared constraint.
    Validation(ValidationError),
    /// A reference is missing, or a delete is restricted.
    ReferentialIntegrity(ReferentialIntegrityError),
    /// The storage layer itself failed. Propagated unchanged.
    Storage(DbError),
    /// Update/delete target does not exist.
    NotFound { kind: RecordKind, id: RecordId },
    /// Persisted row cannot be converted into a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReferentialIntegrity(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ReferentialIntegrity(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReferentialIntegrityError> for RepoError {
    fn from(value: ReferentialIntegrityError) -> Self {
        Self::ReferentialIntegrity(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}
