//! Domain model for the seated-event guest list.
//!
//! # Responsibility
//! - Define canonical records for guests, tables and arrivals.
//! - Keep party-size arithmetic in one place.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - A guest's party is `entourage + 1`; the guest occupies a seat too.

pub mod arrival;
pub mod guest;
pub mod table;
