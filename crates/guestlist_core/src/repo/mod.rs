//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define single-row data access contracts for guests, tables and arrivals.
//! - Isolate SQLite query details from the seating coordinator.
//!
//! # Invariants
//! - Repositories never enforce cross-entity rules (occupancy versus size,
//!   one arrival per guest); the seating coordinator owns those.
//! - `*_for_update` reads are the explicit lock step and only run inside a
//!   unit of work.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.

pub mod arrival_repo;
mod error;
pub mod guest_repo;
mod support;
pub mod table_repo;

pub use error::{RepoError, RepoResult};
pub use support::PageQuery;
