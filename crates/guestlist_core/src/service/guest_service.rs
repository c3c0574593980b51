//! Guest use-case service.
//!
//! # Responsibility
//! - Register guests against an existing table.
//! - Resolve guests by display name and list them.
//!
//! # Invariants
//! - A guest can only be registered against a table whose total size can
//!   hold the guest's party. Current occupancy is not consulted here; it is
//!   checked again under lock at arrival.

use crate::model::guest::{Guest, GuestValidationError, NewGuest};
use crate::model::table::TableId;
use crate::repo::guest_repo::GuestRepository;
use crate::repo::table_repo::TableRepository;
use crate::repo::{PageQuery, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from guest service operations.
#[derive(Debug)]
pub enum GuestServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// No guest is registered under this name.
    GuestNotFound(String),
    /// Name is already registered.
    GuestNameTaken(String),
    /// Referenced table does not exist.
    TableNotFound(TableId),
    /// The table can never hold this party.
    PartyExceedsTableSize { table_size: u32, party_size: u64 },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for GuestServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "guest name must not be blank"),
            Self::GuestNotFound(name) => write!(f, "guest not found: `{name}`"),
            Self::GuestNameTaken(name) => write!(f, "guest name already registered: `{name}`"),
            Self::TableNotFound(id) => write!(f, "table not found: {id}"),
            Self::PartyExceedsTableSize {
                table_size,
                party_size,
            } => write!(
                f,
                "the table size {table_size} is not big enough to hold the capacity of your party {party_size}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GuestServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GuestServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::GuestValidation(GuestValidationError::BlankName) => Self::InvalidName,
            RepoError::DuplicateGuestName(name) => Self::GuestNameTaken(name),
            RepoError::TableNotFound(id) => Self::TableNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Guest service facade.
pub struct GuestService<G: GuestRepository, T: TableRepository> {
    guests: G,
    tables: T,
}

impl<G: GuestRepository, T: TableRepository> GuestService<G, T> {
    pub fn new(guests: G, tables: T) -> Self {
        Self { guests, tables }
    }

    /// Registers a guest against `table_id`.
    ///
    /// # Contract
    /// - Name is trimmed and must not be blank.
    /// - Table must exist and `size >= entourage + 1`.
    /// - The guest starts without an arrival.
    pub fn register_guest(
        &self,
        guest_name: &str,
        entourage: u32,
        table_id: TableId,
    ) -> Result<Guest, GuestServiceError> {
        let new_guest = NewGuest::new(guest_name, entourage, table_id);
        if new_guest.validate().is_err() {
            return Err(GuestServiceError::InvalidName);
        }

        let table = self
            .tables
            .get_table(table_id)?
            .ok_or(GuestServiceError::TableNotFound(table_id))?;
        let party_size = u64::from(entourage) + 1;
        if u64::from(table.size) < party_size {
            return Err(GuestServiceError::PartyExceedsTableSize {
                table_size: table.size,
                party_size,
            });
        }

        let guest = self.guests.create_guest(&new_guest)?;
        info!(
            "event=guest_register module=service status=ok guest_id={} table_id={} entourage={}",
            guest.id, guest.table_id, guest.entourage
        );
        Ok(guest)
    }

    /// Loads one guest by display name.
    pub fn get_guest_by_name(&self, guest_name: &str) -> Result<Guest, GuestServiceError> {
        self.guests
            .get_guest_by_name(guest_name)?
            .ok_or_else(|| GuestServiceError::GuestNotFound(guest_name.trim().to_string()))
    }

    pub fn list_guests(&self, page: &PageQuery) -> Result<Vec<Guest>, GuestServiceError> {
        self.guests.list_guests(page).map_err(Into::into)
    }

    /// Lists guests with a confirmed arrival, earliest first.
    pub fn list_arrived_guests(&self, page: &PageQuery) -> Result<Vec<Guest>, GuestServiceError> {
        self.guests.list_arrived_guests(page).map_err(Into::into)
    }
}
