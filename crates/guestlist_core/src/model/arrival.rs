//! Arrival domain model.
//!
//! An arrival is the immutable record that a guest's party took seats at a
//! table. At most one exists per guest.

use crate::model::guest::GuestId;
use crate::model::table::TableId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an arrival row.
pub type ArrivalId = Uuid;

/// Persisted arrival record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    pub id: ArrivalId,
    pub guest_id: GuestId,
    pub table_id: TableId,
    /// Seats consumed: confirmed entourage plus the guest.
    pub party_size: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

/// Insert model for a new arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArrival {
    pub id: ArrivalId,
    pub guest_id: GuestId,
    pub table_id: TableId,
    pub party_size: u32,
}

impl NewArrival {
    pub fn new(guest_id: GuestId, table_id: TableId, party_size: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            guest_id,
            table_id,
            party_size,
        }
    }
}
