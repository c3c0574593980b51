//! Arrival repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append arrival events and look them up by id, guest or table.
//!
//! # Invariants
//! - Arrival rows are never updated or deleted.
//! - The log outlives guest rows; a removed guest keeps its arrival.

use crate::model::arrival::{Arrival, ArrivalId, NewArrival};
use crate::model::guest::GuestId;
use crate::model::table::TableId;
use crate::repo::support::{ensure_schema_ready, parse_uuid, push_page_clause};
use crate::repo::{PageQuery, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ARRIVAL_SELECT_SQL: &str = "SELECT
    uuid,
    guest_uuid,
    table_uuid,
    party_size,
    created_at
FROM arrivals";

const ARRIVAL_COLUMNS: &[&str] = &[
    "uuid",
    "guest_uuid",
    "table_uuid",
    "party_size",
    "created_at",
];

/// Filter options for listing arrivals. Filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalListQuery {
    pub guest_id: Option<GuestId>,
    pub table_id: Option<TableId>,
    pub page: PageQuery,
}

/// Repository interface for the arrival log.
pub trait ArrivalRepository {
    /// Appends one arrival and returns the persisted row.
    fn create_arrival(&self, arrival: &NewArrival) -> RepoResult<Arrival>;
    fn get_arrival(&self, id: ArrivalId) -> RepoResult<Option<Arrival>>;
    /// Loads the arrival recorded for one guest, if any.
    fn get_arrival_for_guest(&self, guest_id: GuestId) -> RepoResult<Option<Arrival>>;
    /// Lists arrivals in append order.
    fn list_arrivals(&self, query: &ArrivalListQuery) -> RepoResult<Vec<Arrival>>;
}

/// SQLite-backed arrival repository.
pub struct SqliteArrivalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArrivalRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "arrivals", ARRIVAL_COLUMNS)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, column: &str, key: String) -> RepoResult<Option<Arrival>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARRIVAL_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_arrival_row(row)?));
        }
        Ok(None)
    }
}

impl ArrivalRepository for SqliteArrivalRepository<'_> {
    fn create_arrival(&self, arrival: &NewArrival) -> RepoResult<Arrival> {
        if arrival.party_size == 0 {
            return Err(RepoError::InvalidData(
                "arrival party_size must be at least 1".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO arrivals (
                uuid,
                guest_uuid,
                table_uuid,
                party_size
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                arrival.id.to_string(),
                arrival.guest_id.to_string(),
                arrival.table_id.to_string(),
                arrival.party_size,
            ],
        )?;

        self.get_arrival(arrival.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("arrival `{}` missing after insert", arrival.id))
        })
    }

    fn get_arrival(&self, id: ArrivalId) -> RepoResult<Option<Arrival>> {
        self.query_one("uuid", id.to_string())
    }

    fn get_arrival_for_guest(&self, guest_id: GuestId) -> RepoResult<Option<Arrival>> {
        self.query_one("guest_uuid", guest_id.to_string())
    }

    fn list_arrivals(&self, query: &ArrivalListQuery) -> RepoResult<Vec<Arrival>> {
        let mut sql = format!("{ARRIVAL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(guest_id) = query.guest_id {
            sql.push_str(" AND guest_uuid = ?");
            bind_values.push(Value::Text(guest_id.to_string()));
        }
        if let Some(table_id) = query.table_id {
            sql.push_str(" AND table_uuid = ?");
            bind_values.push(Value::Text(table_id.to_string()));
        }

        sql.push_str(" ORDER BY rowid ASC");
        push_page_clause(&mut sql, &mut bind_values, &query.page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut arrivals = Vec::new();
        while let Some(row) = rows.next()? {
            arrivals.push(parse_arrival_row(row)?);
        }
        Ok(arrivals)
    }
}

fn parse_arrival_row(row: &Row<'_>) -> RepoResult<Arrival> {
    let id_text: String = row.get("uuid")?;
    let guest_text: String = row.get("guest_uuid")?;
    let table_text: String = row.get("table_uuid")?;
    let party_size: u32 = row.get("party_size")?;
    if party_size == 0 {
        return Err(RepoError::InvalidData(format!(
            "zero party_size in arrival `{id_text}`"
        )));
    }

    Ok(Arrival {
        id: parse_uuid(&id_text, "arrivals.uuid")?,
        guest_id: parse_uuid(&guest_text, "arrivals.guest_uuid")?,
        table_id: parse_uuid(&table_text, "arrivals.table_uuid")?,
        party_size,
        created_at: row.get("created_at")?,
    })
}
