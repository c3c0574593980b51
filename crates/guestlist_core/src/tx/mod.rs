//! Seating transaction coordinator.
//!
//! # Responsibility
//! - Run `assign_table` and `remove_guest` as all-or-nothing units of work
//!   over the guest, table and arrival repositories.
//! - Own the cross-entity invariants: `occupied <= size` and at most one
//!   arrival per guest.
//!
//! # Invariants
//! - Every call receives an explicit `TxContext`; there is no ambient
//!   transaction state.
//! - Capacity is checked only after the table lock is held.
//! - Errors are classified by `TxErrorKind`, never by message text.

mod context;
mod coordinator;
mod error;

pub use context::{CancelReason, TxContext};
pub use tokio_util::sync::CancellationToken;
pub use coordinator::{
    assign_table_with, remove_guest_with, AssignTableOutcome, AssignTableParams,
    SeatingCoordinator, SeatingStore,
};
pub use error::{TxError, TxErrorKind, TxResult};
