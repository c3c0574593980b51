//! Unit-of-work orchestration for table assignment and guest removal.
//!
//! # Responsibility
//! - Drive the repositories through the assignment and removal algorithms.
//! - Wrap each call in one `BEGIN IMMEDIATE` transaction and commit or roll
//!   back as a whole.
//!
//! # Invariants
//! - Lock order is guest row, then table row.
//! - No write happens before the capacity check passes.
//! - A rollback failure never replaces the originating error.
//!
//! # Concurrency
//! - One `SeatingCoordinator` borrows one connection; concurrent callers use
//!   one connection each. SQLite grants the write lock to one unit of work
//!   at a time, so assignments are totally ordered by lock acquisition.

use crate::model::arrival::{Arrival, NewArrival};
use crate::model::guest::{Guest, GuestId};
use crate::model::table::{Table, TableId};
use crate::repo::arrival_repo::{ArrivalRepository, SqliteArrivalRepository};
use crate::repo::guest_repo::{GuestRepository, SqliteGuestRepository};
use crate::repo::table_repo::{SqliteTableRepository, TableRepository};
use crate::repo::RepoResult;
use crate::tx::context::TxContext;
use crate::tx::error::{TxError, TxErrorKind, TxResult};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input of one table assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignTableParams {
    pub guest_id: GuestId,
    pub table_id: TableId,
    /// Confirmed entourage at the door; may differ from the registered value.
    pub new_entourage: u32,
}

/// Snapshot returned by a committed assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignTableOutcome {
    pub arrival: Arrival,
    /// Guest as persisted after the update.
    pub guest: Guest,
    /// Table as read under lock, before the occupancy update.
    pub old_table: Table,
    /// Table as persisted after the update.
    pub table: Table,
}

/// Transactional interface consumed by request adapters.
pub trait SeatingStore {
    /// Seats a guest's party at a table in one unit of work.
    fn assign_table(
        &self,
        ctx: &TxContext,
        params: &AssignTableParams,
    ) -> TxResult<AssignTableOutcome>;
    /// Deletes a guest and releases their seats in one unit of work.
    fn remove_guest(&self, ctx: &TxContext, guest_id: GuestId) -> TxResult<()>;
}

/// Assignment algorithm over arbitrary repositories.
///
/// The caller must run this inside an open unit of work and roll back on
/// `Err`; the function itself never commits.
pub fn assign_table_with<G, T, A>(
    ctx: &TxContext,
    guests: &G,
    tables: &T,
    arrivals: &A,
    params: &AssignTableParams,
) -> TxResult<AssignTableOutcome>
where
    G: GuestRepository + ?Sized,
    T: TableRepository + ?Sized,
    A: ArrivalRepository + ?Sized,
{
    ctx.ensure_active()?;

    let guest = guests
        .get_guest_for_update(params.guest_id)?
        .ok_or(TxError::GuestNotFound(params.guest_id))?;

    if let Some(existing) = arrivals.get_arrival_for_guest(guest.id)? {
        return Err(TxError::AlreadyArrived {
            guest_id: guest.id,
            arrival_id: existing.id,
        });
    }

    let old_table = tables
        .get_table_for_update(params.table_id)?
        .ok_or(TxError::TableNotFound(params.table_id))?;

    let requested = u64::from(params.new_entourage) + 1;
    let insufficient = || TxError::InsufficientCapacity {
        table_id: old_table.id,
        size: old_table.size,
        occupied: old_table.occupied,
        party_size: requested,
    };
    if !old_table.can_seat(requested) {
        return Err(insufficient());
    }
    // Fits into a u32 table, so it fits into u32.
    let party_size = u32::try_from(requested).map_err(|_| insufficient())?;

    ctx.ensure_active()?;

    let arrival = arrivals.create_arrival(&NewArrival::new(guest.id, old_table.id, party_size))?;
    guests.update_guest_arrival(guest.id, params.new_entourage, old_table.id)?;
    tables.update_table_occupancy(old_table.id, old_table.occupied + party_size)?;

    let guest = guests
        .get_guest(guest.id)?
        .ok_or(TxError::GuestNotFound(guest.id))?;
    let table = tables
        .get_table(old_table.id)?
        .ok_or(TxError::TableNotFound(old_table.id))?;

    Ok(AssignTableOutcome {
        arrival,
        guest,
        old_table,
        table,
    })
}

/// What a committed removal did to table occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeatRelease {
    /// Guest never arrived; no table to adjust.
    NotArrived,
    /// Guest arrived but the table row is gone.
    TableMissing(TableId),
    Released {
        table_id: TableId,
        seats: u32,
    },
}

/// Removal algorithm over arbitrary repositories.
///
/// Seats are released using the guest's current entourage, not the party
/// size recorded on the arrival. The two only diverge if entourage is
/// changed outside `assign_table`; an underflow is clamped to zero and
/// logged at `warn`.
pub fn remove_guest_with<G, T>(
    ctx: &TxContext,
    guests: &G,
    tables: &T,
    guest_id: GuestId,
) -> TxResult<()>
where
    G: GuestRepository + ?Sized,
    T: TableRepository + ?Sized,
{
    release_guest(ctx, guests, tables, guest_id).map(|_| ())
}

fn release_guest<G, T>(
    ctx: &TxContext,
    guests: &G,
    tables: &T,
    guest_id: GuestId,
) -> TxResult<SeatRelease>
where
    G: GuestRepository + ?Sized,
    T: TableRepository + ?Sized,
{
    ctx.ensure_active()?;

    let guest = guests
        .get_guest(guest_id)?
        .ok_or(TxError::GuestNotFound(guest_id))?;
    guests.delete_guest(guest.id)?;

    if !guest.has_arrived() {
        return Ok(SeatRelease::NotArrived);
    }

    let Some(table) = tables.get_table_for_update(guest.table_id)? else {
        return Ok(SeatRelease::TableMissing(guest.table_id));
    };

    let seats = guest.party_size();
    let occupied = match table.occupied.checked_sub(seats) {
        Some(value) => value,
        None => {
            warn!(
                "event=remove_guest module=tx status=occupancy_underflow tx={} guest_id={} table_id={} occupied={} released={}",
                ctx.label(),
                guest.id,
                table.id,
                table.occupied,
                seats
            );
            0
        }
    };

    ctx.ensure_active()?;
    tables.update_table_occupancy(table.id, occupied)?;

    Ok(SeatRelease::Released {
        table_id: table.id,
        seats,
    })
}

/// SQLite-backed seating coordinator bound to one connection.
pub struct SeatingCoordinator<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SeatingCoordinator<'conn> {
    /// Creates a coordinator after checking all three repository schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        SqliteGuestRepository::try_new(conn)?;
        SqliteTableRepository::try_new(conn)?;
        SqliteArrivalRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Runs `work` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// Commits only when `work` succeeds and `ctx` is still active;
    /// otherwise rolls back and returns the originating error.
    fn run_unit_of_work<T>(
        &self,
        ctx: &TxContext,
        op: &'static str,
        work: impl FnOnce(&Connection) -> TxResult<T>,
    ) -> TxResult<T> {
        ctx.ensure_active()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let conn: &Connection = &tx;
        let result = work(conn).and_then(|value| {
            ctx.ensure_active()?;
            Ok(value)
        });

        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event={op} module=tx status=rollback_failed tx={} error_code={} error={}",
                        ctx.label(),
                        err.code(),
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}

impl SeatingStore for SeatingCoordinator<'_> {
    fn assign_table(
        &self,
        ctx: &TxContext,
        params: &AssignTableParams,
    ) -> TxResult<AssignTableOutcome> {
        let started_at = Instant::now();
        debug!(
            "event=assign_table module=tx status=start tx={} guest_id={} table_id={} entourage={}",
            ctx.label(),
            params.guest_id,
            params.table_id,
            params.new_entourage
        );

        let result = self.run_unit_of_work(ctx, "assign_table", |conn| {
            let guests = SqliteGuestRepository::from_ready(conn);
            let tables = SqliteTableRepository::from_ready(conn);
            let arrivals = SqliteArrivalRepository::from_ready(conn);
            assign_table_with(ctx, &guests, &tables, &arrivals, params)
        });

        match &result {
            Ok(outcome) => info!(
                "event=assign_table module=tx status=ok tx={} guest_id={} table_id={} party_size={} occupied={} size={} duration_ms={}",
                ctx.label(),
                outcome.guest.id,
                outcome.table.id,
                outcome.arrival.party_size,
                outcome.table.occupied,
                outcome.table.size,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("assign_table", ctx, params.guest_id, started_at, err),
        }
        result
    }

    fn remove_guest(&self, ctx: &TxContext, guest_id: GuestId) -> TxResult<()> {
        let started_at = Instant::now();
        debug!(
            "event=remove_guest module=tx status=start tx={} guest_id={}",
            ctx.label(),
            guest_id
        );

        let result = self.run_unit_of_work(ctx, "remove_guest", |conn| {
            let guests = SqliteGuestRepository::from_ready(conn);
            let tables = SqliteTableRepository::from_ready(conn);
            release_guest(ctx, &guests, &tables, guest_id)
        });

        match &result {
            Ok(SeatRelease::Released { table_id, seats }) => info!(
                "event=remove_guest module=tx status=ok tx={} guest_id={} table_id={} released={} duration_ms={}",
                ctx.label(),
                guest_id,
                table_id,
                seats,
                started_at.elapsed().as_millis()
            ),
            Ok(SeatRelease::TableMissing(table_id)) => info!(
                "event=remove_guest module=tx status=ok tx={} guest_id={} table_id={} released=0 reason=table_missing duration_ms={}",
                ctx.label(),
                guest_id,
                table_id,
                started_at.elapsed().as_millis()
            ),
            Ok(SeatRelease::NotArrived) => info!(
                "event=remove_guest module=tx status=ok tx={} guest_id={} released=0 reason=not_arrived duration_ms={}",
                ctx.label(),
                guest_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("remove_guest", ctx, guest_id, started_at, err),
        }
        result.map(|_| ())
    }
}

fn log_failure(
    op: &'static str,
    ctx: &TxContext,
    guest_id: GuestId,
    started_at: Instant,
    err: &TxError,
) {
    if err.kind() == TxErrorKind::StoreFailure {
        error!(
            "event={op} module=tx status=error tx={} guest_id={} duration_ms={} error_code={} error={}",
            ctx.label(),
            guest_id,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        );
    } else {
        warn!(
            "event={op} module=tx status=rejected tx={} guest_id={} duration_ms={} error_code={}",
            ctx.label(),
            guest_id,
            started_at.elapsed().as_millis(),
            err.code()
        );
    }
}
