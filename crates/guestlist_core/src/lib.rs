//! Core domain logic for the seated-event guest list.
//! This crate is the single source of truth for seating invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tx;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::arrival::{Arrival, ArrivalId, NewArrival};
pub use model::guest::{Guest, GuestId, GuestValidationError, NewGuest};
pub use model::table::{Table, TableId, TableValidationError};
pub use repo::arrival_repo::{ArrivalListQuery, ArrivalRepository, SqliteArrivalRepository};
pub use repo::guest_repo::{GuestRepository, SqliteGuestRepository};
pub use repo::table_repo::{SqliteTableRepository, TableRepository};
pub use repo::{PageQuery, RepoError, RepoResult};
pub use service::guest_service::{GuestService, GuestServiceError};
pub use service::table_service::{TableService, TableServiceError};
pub use tx::{
    AssignTableOutcome, AssignTableParams, CancelReason, CancellationToken, SeatingCoordinator,
    SeatingStore, TxContext, TxError, TxErrorKind, TxResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
