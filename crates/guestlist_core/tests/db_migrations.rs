use guestlist_core::db::migrations::{latest_version, schema_version};
use guestlist_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2);",
        [kind, name],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn fresh_store_reaches_latest_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["tables", "guests", "arrivals"] {
        assert!(object_exists(&conn, "table", table), "missing table {table}");
    }
    for index in [
        "idx_guests_table_uuid",
        "idx_guests_arrival_time",
        "idx_arrivals_table_uuid",
    ] {
        assert!(object_exists(&conn, "index", index), "missing index {index}");
    }
}

#[test]
fn reopening_a_file_store_keeps_its_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("venue.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO tables (uuid, size, occupied) VALUES ('kept', 4, 0);",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let kept: i64 = conn
        .query_row("SELECT COUNT(*) FROM tables WHERE uuid = 'kept';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn file_store_runs_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("wal.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert!(mode.eq_ignore_ascii_case("wal"));
}

#[test]
fn store_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newer.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("expected version refusal, got {other}"),
    }
}

#[test]
fn schema_checks_reject_impossible_rows() {
    let conn = open_db_in_memory().unwrap();

    let zero_size = conn.execute(
        "INSERT INTO tables (uuid, size, occupied) VALUES ('t-zero', 0, 0);",
        [],
    );
    assert!(zero_size.is_err());

    let empty_party = conn.execute(
        "INSERT INTO arrivals (uuid, guest_uuid, table_uuid, party_size)
         VALUES ('a-1', 'g-1', 't-1', 0);",
        [],
    );
    assert!(empty_party.is_err());
}
