//! Guest domain model.
//!
//! # Responsibility
//! - Define the persisted guest record and its write-time validation.
//!
//! # Invariants
//! - `guest_name` is unique across the guest list and never blank.
//! - `arrival_time` is set only by a successful table assignment.

use crate::model::table::TableId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a guest row.
pub type GuestId = Uuid;

/// Validation failures for guest write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestValidationError {
    /// Name is empty after trimming.
    BlankName,
}

impl Display for GuestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "guest name must not be blank"),
        }
    }
}

impl Error for GuestValidationError {}

/// Persisted guest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub guest_name: String,
    /// Companions accompanying the guest, excluding the guest.
    pub entourage: u32,
    pub table_id: TableId,
    /// Epoch ms of the confirmed arrival, stamped by SQLite at millisecond
    /// resolution. `None` while only registered.
    pub arrival_time: Option<i64>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Guest {
    /// Seats this guest consumes at the current entourage value.
    pub fn party_size(&self) -> u32 {
        self.entourage.saturating_add(1)
    }

    /// Returns whether an arrival has been recorded for this guest.
    pub fn has_arrived(&self) -> bool {
        self.arrival_time.is_some()
    }
}

/// Insert model for a new guest registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub id: GuestId,
    pub guest_name: String,
    pub entourage: u32,
    pub table_id: TableId,
}

impl NewGuest {
    /// Builds an insert model with a generated id and a trimmed name.
    pub fn new(guest_name: impl AsRef<str>, entourage: u32, table_id: TableId) -> Self {
        Self {
            id: Uuid::new_v4(),
            guest_name: guest_name.as_ref().trim().to_string(),
            entourage,
            table_id,
        }
    }

    pub fn validate(&self) -> Result<(), GuestValidationError> {
        if self.guest_name.trim().is_empty() {
            return Err(GuestValidationError::BlankName);
        }
        Ok(())
    }
}
