//! Single-row use-case services.
//!
//! # Responsibility
//! - Validate inputs for guest registration and table creation.
//! - Expose listings and the empty-seat summary to adapters.
//!
//! # Invariants
//! - Services never mutate occupancy or arrivals; only the `tx` coordinator
//!   does.

pub mod guest_service;
pub mod table_service;
