//! Table use-case service.

use crate::model::table::{Table, TableValidationError};
use crate::repo::table_repo::TableRepository;
use crate::repo::{PageQuery, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from table service operations.
#[derive(Debug)]
pub enum TableServiceError {
    /// Requested size is zero.
    InvalidSize,
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TableServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSize => write!(f, "table size must be at least 1"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TableServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidSize => None,
        }
    }
}

impl From<RepoError> for TableServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TableValidation(TableValidationError::ZeroSize) => Self::InvalidSize,
            other => Self::Repo(other),
        }
    }
}

/// Table service facade.
pub struct TableService<R: TableRepository> {
    repo: R,
}

impl<R: TableRepository> TableService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty table with `size` seats.
    pub fn create_table(&self, size: u32) -> Result<Table, TableServiceError> {
        if size == 0 {
            return Err(TableServiceError::InvalidSize);
        }
        let table = self.repo.create_table(size)?;
        info!(
            "event=table_create module=service status=ok table_id={} size={}",
            table.id, table.size
        );
        Ok(table)
    }

    pub fn list_tables(&self, page: &PageQuery) -> Result<Vec<Table>, TableServiceError> {
        self.repo.list_tables(page).map_err(Into::into)
    }

    /// Free seats summed over every table.
    pub fn empty_seats(&self) -> Result<u64, TableServiceError> {
        self.repo.empty_seats().map_err(Into::into)
    }
}
