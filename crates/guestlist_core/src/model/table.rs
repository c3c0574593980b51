//! Table domain model.
//!
//! # Invariants
//! - `size > 0`.
//! - `occupied <= size` for every committed state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a table row.
pub type TableId = Uuid;

/// Validation failures for table write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableValidationError {
    /// Tables need at least one seat.
    ZeroSize,
    /// Occupancy above size can never be persisted.
    OverCapacity { size: u32, occupied: u32 },
}

impl Display for TableValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "table size must be at least 1"),
            Self::OverCapacity { size, occupied } => write!(
                f,
                "table occupancy {occupied} exceeds table size {size}"
            ),
        }
    }
}

impl Error for TableValidationError {}

/// Persisted table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Total seat capacity.
    pub size: u32,
    /// Seats currently consumed by arrived parties.
    pub occupied: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Table {
    /// Seats still free at this table.
    pub fn remaining_seats(&self) -> u32 {
        self.size.saturating_sub(self.occupied)
    }

    /// Returns whether a party of `party_size` fits into the remaining seats.
    ///
    /// Computed in `u64` so extreme inputs cannot wrap.
    pub fn can_seat(&self, party_size: u64) -> bool {
        u64::from(self.occupied) + party_size <= u64::from(self.size)
    }

    pub fn validate(&self) -> Result<(), TableValidationError> {
        if self.size == 0 {
            return Err(TableValidationError::ZeroSize);
        }
        if self.occupied > self.size {
            return Err(TableValidationError::OverCapacity {
                size: self.size,
                occupied: self.occupied,
            });
        }
        Ok(())
    }
}
