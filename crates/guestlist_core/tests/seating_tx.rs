use guestlist_core::db::open_db_in_memory;
use guestlist_core::tx::remove_guest_with;
use guestlist_core::{
    ArrivalListQuery, ArrivalRepository, AssignTableParams, CancelReason, Guest, GuestRepository,
    NewGuest, PageQuery, SeatingCoordinator, SeatingStore, SqliteArrivalRepository,
    SqliteGuestRepository, SqliteTableRepository, Table, TableRepository, TxContext, TxError,
    TxErrorKind,
};
use rusqlite::Connection;
use std::time::{Duration, Instant};
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_table(conn: &Connection, size: u32) -> Table {
    SqliteTableRepository::try_new(conn)
        .unwrap()
        .create_table(size)
        .unwrap()
}

fn register(conn: &Connection, name: &str, entourage: u32, table: &Table) -> Guest {
    SqliteGuestRepository::try_new(conn)
        .unwrap()
        .create_guest(&NewGuest::new(name, entourage, table.id))
        .unwrap()
}

fn reload_table(conn: &Connection, table: &Table) -> Table {
    SqliteTableRepository::try_new(conn)
        .unwrap()
        .get_table(table.id)
        .unwrap()
        .unwrap()
}

fn params(guest: &Guest, table: &Table, new_entourage: u32) -> AssignTableParams {
    AssignTableParams {
        guest_id: guest.id,
        table_id: table.id,
        new_entourage,
    }
}

fn arrival_count(conn: &Connection) -> usize {
    SqliteArrivalRepository::try_new(conn)
        .unwrap()
        .list_arrivals(&ArrivalListQuery::default())
        .unwrap()
        .len()
}

#[test]
fn full_table_rejects_one_more_guest() {
    let conn = setup();
    let table = create_table(&conn, 10);
    let host = register(&conn, "Host", 9, &table);
    let latecomer = register(&conn, "Latecomer", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let outcome = store
        .assign_table(&TxContext::new("host"), &params(&host, &table, 9))
        .unwrap();
    assert_eq!(outcome.table.occupied, 10);

    let err = store
        .assign_table(&TxContext::new("late"), &params(&latecomer, &table, 0))
        .unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::InsufficientCapacity);
    assert!(matches!(
        err,
        TxError::InsufficientCapacity {
            size: 10,
            occupied: 10,
            party_size: 1,
            ..
        }
    ));

    assert_eq!(reload_table(&conn, &table).occupied, 10);
    assert_eq!(arrival_count(&conn), 1);
    let latecomer = SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(latecomer.id)
        .unwrap()
        .unwrap();
    assert!(!latecomer.has_arrived());
}

#[test]
fn assign_table_records_arrival_and_updates_rows() {
    let conn = setup();
    let registered_at = create_table(&conn, 4);
    let seated_at = create_table(&conn, 8);
    let guest = register(&conn, "Walk-in", 1, &registered_at);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let outcome = store
        .assign_table(&TxContext::new("door"), &params(&guest, &seated_at, 3))
        .unwrap();

    assert_eq!(outcome.old_table.occupied, 0);
    assert_eq!(outcome.table.occupied, 4);
    assert_eq!(outcome.table.id, seated_at.id);
    assert_eq!(outcome.arrival.party_size, 4);
    assert_eq!(outcome.arrival.guest_id, guest.id);
    assert_eq!(outcome.arrival.table_id, seated_at.id);
    assert_eq!(outcome.guest.entourage, 3);
    assert_eq!(outcome.guest.table_id, seated_at.id);
    assert!(outcome.guest.has_arrived());

    assert_eq!(reload_table(&conn, &registered_at).occupied, 0);
    assert_eq!(reload_table(&conn, &seated_at).occupied, 4);
    let arrived = SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .list_arrived_guests(&PageQuery::default())
        .unwrap();
    assert_eq!(arrived.len(), 1);
    assert_eq!(arrived[0].id, guest.id);
    assert!(conn.is_autocommit());
}

#[test]
fn exact_fit_is_accepted() {
    let conn = setup();
    let table = create_table(&conn, 5);
    let first = register(&conn, "First", 1, &table);
    let second = register(&conn, "Second", 2, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("a"), &params(&first, &table, 1))
        .unwrap();
    let outcome = store
        .assign_table(&TxContext::new("b"), &params(&second, &table, 2))
        .unwrap();
    assert_eq!(outcome.table.occupied, 5);
    assert_eq!(outcome.table.remaining_seats(), 0);
}

#[test]
fn second_assignment_for_same_guest_is_rejected() {
    let conn = setup();
    let table = create_table(&conn, 10);
    let other = create_table(&conn, 10);
    let guest = register(&conn, "Repeat", 1, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let first = store
        .assign_table(&TxContext::new("first"), &params(&guest, &table, 1))
        .unwrap();
    let err = store
        .assign_table(&TxContext::new("second"), &params(&guest, &other, 0))
        .unwrap_err();

    assert_eq!(err.kind(), TxErrorKind::AlreadyArrived);
    assert!(matches!(
        err,
        TxError::AlreadyArrived { arrival_id, .. } if arrival_id == first.arrival.id
    ));
    assert_eq!(reload_table(&conn, &table).occupied, 2);
    assert_eq!(reload_table(&conn, &other).occupied, 0);
    assert_eq!(arrival_count(&conn), 1);
}

#[test]
fn missing_guest_or_table_is_not_found() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Known", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let missing_guest = AssignTableParams {
        guest_id: Uuid::new_v4(),
        table_id: table.id,
        new_entourage: 0,
    };
    let err = store
        .assign_table(&TxContext::new("ghost"), &missing_guest)
        .unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::NotFound);
    assert!(matches!(err, TxError::GuestNotFound(id) if id == missing_guest.guest_id));

    let missing_table = AssignTableParams {
        guest_id: guest.id,
        table_id: Uuid::new_v4(),
        new_entourage: 0,
    };
    let err = store
        .assign_table(&TxContext::new("nowhere"), &missing_table)
        .unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::NotFound);
    assert!(matches!(err, TxError::TableNotFound(id) if id == missing_table.table_id));

    assert_eq!(arrival_count(&conn), 0);
    let guest = SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(guest.id)
        .unwrap()
        .unwrap();
    assert!(!guest.has_arrived());
}

#[test]
fn oversized_party_leaves_no_trace() {
    let conn = setup();
    let table = create_table(&conn, 3);
    let guest = register(&conn, "Big Party", 1, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let err = store
        .assign_table(&TxContext::new("big"), &params(&guest, &table, u32::MAX))
        .unwrap_err();
    assert!(matches!(
        err,
        TxError::InsufficientCapacity { party_size, .. } if party_size == u64::from(u32::MAX) + 1
    ));

    assert_eq!(reload_table(&conn, &table).occupied, 0);
    assert_eq!(arrival_count(&conn), 0);
    let guest = SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(guest.id)
        .unwrap()
        .unwrap();
    assert_eq!(guest.entourage, 1);
}

#[test]
fn cancelled_context_is_rejected_before_any_write() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Cancelled", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let ctx = TxContext::new("cancelled");
    ctx.cancel_token().cancel();
    let err = store
        .assign_table(&ctx, &params(&guest, &table, 0))
        .unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::Cancelled);
    assert!(matches!(
        err,
        TxError::Cancelled {
            reason: CancelReason::Requested,
            ..
        }
    ));

    let err = store.remove_guest(&ctx, guest.id).unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::Cancelled);

    assert_eq!(reload_table(&conn, &table).occupied, 0);
    assert_eq!(arrival_count(&conn), 0);
    assert!(SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(guest.id)
        .unwrap()
        .is_some());
}

#[test]
fn elapsed_deadline_is_reported_as_cancelled() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Slow", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let ctx = TxContext::new("expired").with_deadline(Instant::now() - Duration::from_millis(1));
    let err = store
        .assign_table(&ctx, &params(&guest, &table, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        TxError::Cancelled {
            reason: CancelReason::DeadlineExceeded,
            ..
        }
    ));
    assert_eq!(reload_table(&conn, &table).occupied, 0);
}

#[test]
fn remove_guest_releases_seats_and_keeps_arrival_log() {
    let conn = setup();
    let table = create_table(&conn, 6);
    let staying = register(&conn, "Staying", 1, &table);
    let leaving = register(&conn, "Leaving", 2, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("a"), &params(&staying, &table, 1))
        .unwrap();
    store
        .assign_table(&TxContext::new("b"), &params(&leaving, &table, 2))
        .unwrap();
    assert_eq!(reload_table(&conn, &table).occupied, 5);

    store
        .remove_guest(&TxContext::new("leave"), leaving.id)
        .unwrap();

    assert_eq!(reload_table(&conn, &table).occupied, 2);
    let guests = SqliteGuestRepository::try_new(&conn).unwrap();
    assert!(guests.get_guest(leaving.id).unwrap().is_none());
    assert!(guests.get_guest(staying.id).unwrap().is_some());
    assert_eq!(arrival_count(&conn), 2);

    // Name is free again; the old arrival belongs to the deleted row.
    let returning = register(&conn, "Leaving", 0, &table);
    let outcome = store
        .assign_table(&TxContext::new("return"), &params(&returning, &table, 0))
        .unwrap();
    assert_eq!(outcome.table.occupied, 3);
}

#[test]
fn remove_guest_without_arrival_keeps_occupancy() {
    let conn = setup();
    let table = create_table(&conn, 8);
    let seated = register(&conn, "Seated", 2, &table);
    let no_show = register(&conn, "No Show", 4, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("seat"), &params(&seated, &table, 2))
        .unwrap();
    store
        .remove_guest(&TxContext::new("no-show"), no_show.id)
        .unwrap();

    assert_eq!(reload_table(&conn, &table).occupied, 3);
    assert!(SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(no_show.id)
        .unwrap()
        .is_none());
}

#[test]
fn remove_unknown_guest_is_not_found() {
    let conn = setup();
    let store = SeatingCoordinator::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = store
        .remove_guest(&TxContext::new("ghost"), missing)
        .unwrap_err();
    assert_eq!(err.kind(), TxErrorKind::NotFound);
    assert!(matches!(err, TxError::GuestNotFound(id) if id == missing));
}

#[test]
fn remove_guest_succeeds_when_table_row_is_gone() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Orphan", 1, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("seat"), &params(&guest, &table, 1))
        .unwrap();
    conn.execute("DELETE FROM tables WHERE uuid = ?1;", [table.id.to_string()])
        .unwrap();

    store
        .remove_guest(&TxContext::new("orphan"), guest.id)
        .unwrap();
    assert!(SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(guest.id)
        .unwrap()
        .is_none());
}

#[test]
fn remove_guest_clamps_occupancy_at_zero() {
    let conn = setup();
    let table = create_table(&conn, 10);
    let guest = register(&conn, "Grown Party", 1, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("seat"), &params(&guest, &table, 1))
        .unwrap();
    conn.execute(
        "UPDATE guests SET entourage = 6 WHERE uuid = ?1;",
        [guest.id.to_string()],
    )
    .unwrap();

    store
        .remove_guest(&TxContext::new("leave"), guest.id)
        .unwrap();
    assert_eq!(reload_table(&conn, &table).occupied, 0);
}

#[test]
fn remove_guest_with_runs_inside_caller_owned_transaction() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Manual", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();
    store
        .assign_table(&TxContext::new("seat"), &params(&guest, &table, 0))
        .unwrap();

    let tx = conn.unchecked_transaction().unwrap();
    {
        let guests = SqliteGuestRepository::try_new(&tx).unwrap();
        let tables = SqliteTableRepository::try_new(&tx).unwrap();
        remove_guest_with(&TxContext::new("manual"), &guests, &tables, guest.id).unwrap();
    }
    tx.rollback().unwrap();

    assert_eq!(reload_table(&conn, &table).occupied, 1);
    assert!(SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .get_guest(guest.id)
        .unwrap()
        .is_some());
}

#[test]
fn assign_outcome_serializes_with_snake_case_fields() {
    let conn = setup();
    let table = create_table(&conn, 4);
    let guest = register(&conn, "Json", 1, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    let outcome = store
        .assign_table(&TxContext::new("json"), &params(&guest, &table, 1))
        .unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["arrival"]["party_size"], 2);
    assert_eq!(value["old_table"]["occupied"], 0);
    assert_eq!(value["table"]["occupied"], 2);
    assert_eq!(value["guest"]["guest_name"], "Json");
    assert_eq!(value["guest"]["id"], guest.id.to_string());
}

#[test]
fn arrived_guests_are_listed_in_seating_order() {
    let conn = setup();
    let table = create_table(&conn, 10);
    let alpha = register(&conn, "Alpha", 0, &table);
    let bravo = register(&conn, "Bravo", 0, &table);
    let store = SeatingCoordinator::try_new(&conn).unwrap();

    store
        .assign_table(&TxContext::new("bravo"), &params(&bravo, &table, 0))
        .unwrap();
    store
        .assign_table(&TxContext::new("alpha"), &params(&alpha, &table, 0))
        .unwrap();

    let names: Vec<String> = SqliteGuestRepository::try_new(&conn)
        .unwrap()
        .list_arrived_guests(&PageQuery::default())
        .unwrap()
        .into_iter()
        .map(|guest| guest.guest_name)
        .collect();
    assert_eq!(names, vec!["Bravo", "Alpha"]);
}
