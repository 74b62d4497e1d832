use chrono::NaiveDate;
use cycle_core::db::migrations::SCHEMA_VERSION;
use cycle_core::db::{open_db, open_db_in_memory, DbError};
use cycle_core::{
    initialize, CyclePolicies, CycleService, PeriodRepository, SortDirection,
    SqlitePeriodRepository, StoreError,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_periods_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "periods");
}

#[test]
fn opening_same_file_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO periods (startDate, endDate) VALUES ('2024-01-01', '2024-01-05');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), SCHEMA_VERSION);
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM periods;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn existing_unversioned_periods_table_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE periods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            startDate TEXT NOT NULL,
            endDate TEXT NOT NULL
        );
        INSERT INTO periods (startDate, endDate) VALUES ('2024-01-01', '2024-01-05');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_eq!(SqlitePeriodRepository::new(&conn).count().unwrap(), 1);
}

#[test]
fn adopted_timestamp_rows_are_read_as_calendar_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE periods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            startDate TEXT NOT NULL,
            endDate TEXT NOT NULL
        );
        INSERT INTO periods (startDate, endDate)
            VALUES ('2024-03-01T00:00:00.000', '2024-03-05T00:00:00.000');
        INSERT INTO periods (startDate, endDate)
            VALUES ('2024-02-01T00:00:00.000', '2024-02-05T00:00:00.000');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let repo = SqlitePeriodRepository::new(&conn);
    // A row written after adoption uses plain dates and must sort among them.
    repo.insert(date("2024-01-01"), date("2024-01-05")).unwrap();

    let ascending = repo.fetch_all(SortDirection::Ascending).unwrap();
    let starts: Vec<_> = ascending.iter().map(|record| record.start_date).collect();
    assert_eq!(
        starts,
        vec![date("2024-01-01"), date("2024-02-01"), date("2024-03-01")]
    );
    assert_eq!(ascending[2].end_date, date("2024-03-05"));

    let mut descending = repo.fetch_all(SortDirection::Descending).unwrap();
    descending.reverse();
    assert_eq!(ascending, descending);

    let service = CycleService::new(repo, CyclePolicies::default());
    // Gaps of 27 and 25 days.
    assert_eq!(service.average_cycle_length(), 26);
    assert_eq!(
        service.predict_next_period_date().unwrap(),
        Some(date("2024-03-31"))
    );
    assert_eq!(service.render_history().unwrap().len(), 3);

    let removed = service.remove_last_period().unwrap().unwrap();
    assert_eq!(removed.start_date, date("2024-01-01"));
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn initialize_reports_corrupt_file_as_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();

    let err = initialize(&path).unwrap_err();
    assert!(matches!(err, StoreError::Init(_)));
    assert!(err.to_string().starts_with("could not open period storage"));
}

#[test]
fn initialize_reports_missing_directory_as_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("db.sqlite3");

    assert!(matches!(initialize(&path), Err(StoreError::Init(_))));
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
