//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `guestlist_core` wiring against the configured database.
//! - Print a deterministic seating summary for quick local checks.

use guestlist_core::db::open_db;
use guestlist_core::{
    core_version, init_logging_from_config, CoreConfig, GuestService, PageQuery,
    SqliteGuestRepository, SqliteTableRepository, TableService,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("guestlist_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;

    println!("guestlist_core version={}", core_version());
    println!("db_path={}", config.db_path.display());

    let conn = open_db(&config.db_path)?;
    let tables = TableService::new(SqliteTableRepository::try_new(&conn)?);
    let guests = GuestService::new(
        SqliteGuestRepository::try_new(&conn)?,
        SqliteTableRepository::try_new(&conn)?,
    );

    let all = PageQuery::default();
    let table_count = tables.list_tables(&all)?.len();
    let guest_count = guests.list_guests(&all)?.len();
    let arrived_count = guests.list_arrived_guests(&all)?.len();
    let empty_seats = tables.empty_seats()?;

    println!("tables={table_count}");
    println!("guests={guest_count} arrived={arrived_count}");
    println!("seats_empty={empty_seats}");
    info!(
        "event=cli_summary module=cli status=ok tables={} guests={} arrived={} seats_empty={}",
        table_count, guest_count, arrived_count, empty_seats
    );
    Ok(())
}
