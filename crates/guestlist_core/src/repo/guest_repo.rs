//! Guest repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-row CRUD APIs over the `guests` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewGuest::validate()` before SQL mutations.
//! - `get_guest_for_update` only runs inside a unit of work.
//! - Listing order is deterministic: registration order, or arrival log order
//!   for arrived guests.

use crate::model::guest::{Guest, GuestId, NewGuest};
use crate::model::table::TableId;
use crate::repo::support::{
    ensure_schema_ready, ensure_unit_of_work, is_unique_violation, parse_uuid, push_page_clause,
};
use crate::repo::{PageQuery, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const GUEST_SELECT_SQL: &str = "SELECT
    uuid,
    guest_name,
    entourage,
    table_uuid,
    arrival_time,
    created_at
FROM guests";

const GUEST_COLUMNS: &[&str] = &[
    "uuid",
    "guest_name",
    "entourage",
    "table_uuid",
    "arrival_time",
    "created_at",
];

/// Repository interface for guest rows.
pub trait GuestRepository {
    /// Inserts one guest and returns the persisted row.
    fn create_guest(&self, guest: &NewGuest) -> RepoResult<Guest>;
    /// Loads one guest by id.
    fn get_guest(&self, id: GuestId) -> RepoResult<Option<Guest>>;
    /// Loads one guest by id holding the unit-of-work write lock.
    fn get_guest_for_update(&self, id: GuestId) -> RepoResult<Option<Guest>>;
    /// Loads one guest by unique display name.
    fn get_guest_by_name(&self, guest_name: &str) -> RepoResult<Option<Guest>>;
    /// Lists guests in registration order.
    fn list_guests(&self, page: &PageQuery) -> RepoResult<Vec<Guest>>;
    /// Lists guests with a confirmed arrival, earliest arrival first.
    ///
    /// Order follows the arrival log, so guests seated within the same
    /// millisecond still come back in the order they were seated.
    fn list_arrived_guests(&self, page: &PageQuery) -> RepoResult<Vec<Guest>>;
    /// Stores the confirmed entourage and table and stamps the arrival time.
    fn update_guest_arrival(
        &self,
        id: GuestId,
        entourage: u32,
        table_id: TableId,
    ) -> RepoResult<()>;
    /// Hard-deletes one guest row.
    fn delete_guest(&self, id: GuestId) -> RepoResult<()>;
}

/// SQLite-backed guest repository.
///
/// Works on plain connections and on transactions alike, since
/// `rusqlite::Transaction` dereferences to `Connection`.
pub struct SqliteGuestRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGuestRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "guests", GUEST_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Creates repository for a connection whose schema was already checked.
    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, sql_suffix: &str, key: &str) -> RepoResult<Option<Guest>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GUEST_SELECT_SQL} {sql_suffix}"))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_guest_row(row)?));
        }
        Ok(None)
    }

    fn query_many(&self, sql_suffix: &str, page: &PageQuery) -> RepoResult<Vec<Guest>> {
        let mut sql = format!("{GUEST_SELECT_SQL} {sql_suffix}");
        let mut bind_values: Vec<Value> = Vec::new();
        push_page_clause(&mut sql, &mut bind_values, page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut guests = Vec::new();
        while let Some(row) = rows.next()? {
            guests.push(parse_guest_row(row)?);
        }
        Ok(guests)
    }
}

impl GuestRepository for SqliteGuestRepository<'_> {
    fn create_guest(&self, guest: &NewGuest) -> RepoResult<Guest> {
        guest.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO guests (
                uuid,
                guest_name,
                entourage,
                table_uuid,
                arrival_time
            ) VALUES (?1, ?2, ?3, ?4, NULL);",
            params![
                guest.id.to_string(),
                guest.guest_name.as_str(),
                guest.entourage,
                guest.table_id.to_string(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateGuestName(guest.guest_name.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        self.get_guest(guest.id)?
            .ok_or(RepoError::GuestNotFound(guest.id))
    }

    fn get_guest(&self, id: GuestId) -> RepoResult<Option<Guest>> {
        self.query_one("WHERE uuid = ?1;", &id.to_string())
    }

    fn get_guest_for_update(&self, id: GuestId) -> RepoResult<Option<Guest>> {
        ensure_unit_of_work(self.conn, "guests")?;
        self.get_guest(id)
    }

    fn get_guest_by_name(&self, guest_name: &str) -> RepoResult<Option<Guest>> {
        self.query_one("WHERE guest_name = ?1;", guest_name.trim())
    }

    fn list_guests(&self, page: &PageQuery) -> RepoResult<Vec<Guest>> {
        self.query_many("ORDER BY rowid ASC", page)
    }

    fn list_arrived_guests(&self, page: &PageQuery) -> RepoResult<Vec<Guest>> {
        self.query_many(
            "WHERE arrival_time IS NOT NULL
             ORDER BY
                (SELECT a.rowid FROM arrivals a WHERE a.guest_uuid = guests.uuid) ASC,
                arrival_time ASC,
                rowid ASC",
            page,
        )
    }

    fn update_guest_arrival(
        &self,
        id: GuestId,
        entourage: u32,
        table_id: TableId,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE guests
             SET
                entourage = ?2,
                table_uuid = ?3,
                arrival_time = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
             WHERE uuid = ?1;",
            params![id.to_string(), entourage, table_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::GuestNotFound(id));
        }
        Ok(())
    }

    fn delete_guest(&self, id: GuestId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM guests WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::GuestNotFound(id));
        }
        Ok(())
    }
}

fn parse_guest_row(row: &Row<'_>) -> RepoResult<Guest> {
    let id_text: String = row.get("uuid")?;
    let table_text: String = row.get("table_uuid")?;
    let guest_name: String = row.get("guest_name")?;
    if guest_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank guest_name for guest `{id_text}`"
        )));
    }

    Ok(Guest {
        id: parse_uuid(&id_text, "guests.uuid")?,
        guest_name,
        entourage: row.get("entourage")?,
        table_id: parse_uuid(&table_text, "guests.table_uuid")?,
        arrival_time: row.get("arrival_time")?,
        created_at: row.get("created_at")?,
    })
}
