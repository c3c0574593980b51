//! Table repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-row CRUD APIs over the `tables` table.
//! - Report aggregate free seats for the whole venue.
//!
//! # Invariants
//! - Occupancy writes are taken as given: the seating coordinator checks
//!   capacity before calling `update_table_occupancy`.
//! - Read paths reject rows that break `occupied <= size`.

use crate::model::table::{Table, TableId, TableValidationError};
use crate::repo::support::{
    ensure_schema_ready, ensure_unit_of_work, parse_uuid, push_page_clause,
};
use crate::repo::{PageQuery, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const TABLE_SELECT_SQL: &str = "SELECT
    uuid,
    size,
    occupied,
    created_at
FROM tables";

const TABLE_COLUMNS: &[&str] = &["uuid", "size", "occupied", "created_at"];

/// Repository interface for table rows.
pub trait TableRepository {
    /// Inserts one empty table with `size` seats.
    fn create_table(&self, size: u32) -> RepoResult<Table>;
    /// Loads one table by id.
    fn get_table(&self, id: TableId) -> RepoResult<Option<Table>>;
    /// Loads one table by id holding the unit-of-work write lock.
    fn get_table_for_update(&self, id: TableId) -> RepoResult<Option<Table>>;
    /// Lists tables in creation order.
    fn list_tables(&self, page: &PageQuery) -> RepoResult<Vec<Table>>;
    /// Overwrites the occupied-seat count of one table.
    fn update_table_occupancy(&self, id: TableId, occupied: u32) -> RepoResult<()>;
    /// Sum of free seats across all tables.
    fn empty_seats(&self) -> RepoResult<u64>;
}

/// SQLite-backed table repository.
pub struct SqliteTableRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTableRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "tables", TABLE_COLUMNS)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TableRepository for SqliteTableRepository<'_> {
    fn create_table(&self, size: u32) -> RepoResult<Table> {
        if size == 0 {
            return Err(TableValidationError::ZeroSize.into());
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tables (uuid, size, occupied) VALUES (?1, ?2, 0);",
            params![id.to_string(), size],
        )?;

        self.get_table(id)?.ok_or(RepoError::TableNotFound(id))
    }

    fn get_table(&self, id: TableId) -> RepoResult<Option<Table>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TABLE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_table_row(row)?));
        }
        Ok(None)
    }

    fn get_table_for_update(&self, id: TableId) -> RepoResult<Option<Table>> {
        ensure_unit_of_work(self.conn, "tables")?;
        self.get_table(id)
    }

    fn list_tables(&self, page: &PageQuery) -> RepoResult<Vec<Table>> {
        let mut sql = format!("{TABLE_SELECT_SQL} ORDER BY rowid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        push_page_clause(&mut sql, &mut bind_values, page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tables = Vec::new();
        while let Some(row) = rows.next()? {
            tables.push(parse_table_row(row)?);
        }
        Ok(tables)
    }

    fn update_table_occupancy(&self, id: TableId, occupied: u32) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tables SET occupied = ?2 WHERE uuid = ?1;",
            params![id.to_string(), occupied],
        )?;

        if changed == 0 {
            return Err(RepoError::TableNotFound(id));
        }
        Ok(())
    }

    fn empty_seats(&self) -> RepoResult<u64> {
        let seats: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(size), 0) - COALESCE(SUM(occupied), 0) FROM tables;",
            [],
            |row| row.get(0),
        )?;
        u64::try_from(seats)
            .map_err(|_| RepoError::InvalidData(format!("negative empty seat total {seats}")))
    }
}

fn parse_table_row(row: &Row<'_>) -> RepoResult<Table> {
    let id_text: String = row.get("uuid")?;
    let table = Table {
        id: parse_uuid(&id_text, "tables.uuid")?,
        size: row.get("size")?,
        occupied: row.get("occupied")?,
        created_at: row.get("created_at")?,
    };
    table.validate().map_err(|err| {
        RepoError::InvalidData(format!("table `{id_text}` failed validation: {err}"))
    })?;
    Ok(table)
}
