//! Shared repository error type.

use crate::db::DbError;
use crate::model::guest::{GuestId, GuestValidationError};
use crate::model::table::{TableId, TableValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for guest/table/arrival persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    GuestValidation(GuestValidationError),
    TableValidation(TableValidationError),
    GuestNotFound(GuestId),
    TableNotFound(TableId),
    /// Another guest already uses this display name.
    DuplicateGuestName(String),
    /// A locking read was attempted on a connection in autocommit mode.
    LockOutsideUnitOfWork(&'static str),
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
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::GuestValidation(err) => write!(f, "{err}"),
            Self::TableValidation(err) => write!(f, "{err}"),
            Self::GuestNotFound(id) => write!(f, "guest not found: {id}"),
            Self::TableNotFound(id) => write!(f, "table not found: {id}"),
            Self::DuplicateGuestName(name) => write!(f, "guest name already registered: `{name}`"),
            Self::LockOutsideUnitOfWork(table) => write!(
                f,
                "locking read on `{table}` requires an open unit of work"
            ),
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
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::GuestValidation(err) => Some(err),
            Self::TableValidation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<GuestValidationError> for RepoError {
    fn from(value: GuestValidationError) -> Self {
        Self::GuestValidation(value)
    }
}

impl From<TableValidationError> for RepoError {
    fn from(value: TableValidationError) -> Self {
        Self::TableValidation(value)
    }
}
