//! Error taxonomy of the seating coordinator.

use crate::model::arrival::ArrivalId;
use crate::model::guest::GuestId;
use crate::model::table::TableId;
use crate::repo::RepoError;
use crate::tx::context::CancelReason;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TxResult<T> = Result<T, TxError>;

/// Structural classification of coordinator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxErrorKind {
    /// Referenced guest or table does not exist. Not retriable.
    NotFound,
    /// Guest already has an arrival. Not retriable with the same input.
    AlreadyArrived,
    /// Party does not fit into the remaining seats. Not retriable with the same input.
    InsufficientCapacity,
    /// Context was cancelled or its deadline passed; nothing was applied.
    Cancelled,
    /// Persistence failure (busy lock, I/O, constraint). Caller decides on retry.
    StoreFailure,
}

/// Errors from coordinator units of work.
#[derive(Debug)]
pub enum TxError {
    GuestNotFound(GuestId),
    TableNotFound(TableId),
    AlreadyArrived {
        guest_id: GuestId,
        arrival_id: ArrivalId,
    },
    InsufficientCapacity {
        table_id: TableId,
        size: u32,
        occupied: u32,
        party_size: u64,
    },
    Cancelled {
        label: String,
        reason: CancelReason,
    },
    Store(RepoError),
}

impl TxError {
    pub fn kind(&self) -> TxErrorKind {
        match self {
            Self::GuestNotFound(_) | Self::TableNotFound(_) => TxErrorKind::NotFound,
            Self::AlreadyArrived { .. } => TxErrorKind::AlreadyArrived,
            Self::InsufficientCapacity { .. } => TxErrorKind::InsufficientCapacity,
            Self::Cancelled { .. } => TxErrorKind::Cancelled,
            Self::Store(_) => TxErrorKind::StoreFailure,
        }
    }

    /// Stable code used in structured log lines.
    pub(crate) fn code(&self) -> &'static str {
        match self.kind() {
            TxErrorKind::NotFound => "not_found",
            TxErrorKind::AlreadyArrived => "already_arrived",
            TxErrorKind::InsufficientCapacity => "insufficient_capacity",
            TxErrorKind::Cancelled => "cancelled",
            TxErrorKind::StoreFailure => "store_failure",
        }
    }
}

impl Display for TxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GuestNotFound(id) => write!(f, "guest not found: {id}"),
            Self::TableNotFound(id) => write!(f, "table not found: {id}"),
            Self::AlreadyArrived {
                guest_id,
                arrival_id,
            } => write!(
                f,
                "guest {guest_id} has already arrived (arrival {arrival_id})"
            ),
            Self::InsufficientCapacity {
                table_id,
                size,
                occupied,
                party_size,
            } => write!(
                f,
                "table {table_id} has insufficient space: party of {party_size}, {occupied}/{size} seats taken"
            ),
            Self::Cancelled { label, reason } => match reason {
                CancelReason::Requested => write!(f, "unit of work `{label}` was cancelled"),
                CancelReason::DeadlineExceeded => {
                    write!(f, "unit of work `{label}` exceeded its deadline")
                }
            },
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TxError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::GuestNotFound(id) => Self::GuestNotFound(id),
            RepoError::TableNotFound(id) => Self::TableNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<rusqlite::Error> for TxError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.into())
    }
}
