//! Period store contract and SQLite implementation.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT`, so they increase and are never reused.
//! - Start-date ordering compares calendar dates (`date(startDate)`) and breaks
//!   ties by `id` in the same direction, making descending order the exact
//!   reverse of ascending order.
//! - New rows store `YYYY-MM-DD`; reads also accept legacy timestamp text.

use crate::db::{open_db, DbError};
use crate::model::period::{PeriodId, PeriodRecord};
use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const PERIOD_SELECT_SQL: &str = "SELECT id, startDate, endDate FROM periods";
const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure classes of the period store.
#[derive(Debug)]
pub enum StoreError {
    /// Storage could not be opened, created or migrated.
    Init(DbError),
    /// An insert or delete did not persist.
    Write(rusqlite::Error),
    /// Records could not be fetched or decoded.
    Read(rusqlite::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init(err) => write!(f, "could not open period storage: {err}"),
            Self::Write(err) => write!(f, "could not save period data: {err}"),
            Self::Read(err) => write!(f, "could not read period data: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Init(err) => Some(err),
            Self::Write(err) | Self::Read(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Init(value)
    }
}

/// Ordering direction for start-date listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Durable operations over period records.
pub trait PeriodRepository {
    /// Appends a record and returns its freshly assigned id.
    fn insert(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<PeriodId>;
    /// Removes the record with the highest id; `None` when the store is empty.
    fn delete_most_recently_inserted(&self) -> StoreResult<Option<PeriodRecord>>;

    fn fetch_all(&self, direction: SortDirection) -> StoreResult<Vec<PeriodRecord>>;
    /// Returns the record with the latest start date.
    fn fetch_most_recent_by_start_date(&self) -> StoreResult<Option<PeriodRecord>>;
    /// Looks up one record by id.
    fn get_period(&self, id: PeriodId) -> StoreResult<Option<PeriodRecord>>;
    /// Number of stored records.
    fn count(&self) -> StoreResult<usize>;
}

/// SQLite-backed period store borrowing a migrated connection.
pub struct SqlitePeriodRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePeriodRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

/// Opens or creates the period storage at `path`.
///
/// The returned connection is ready for `SqlitePeriodRepository::new`.
pub fn initialize(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    let conn = open_db(path)?;
    info!(
        "event=store_init module=repo status=ok path={}",
        path.display()
    );
    Ok(conn)
}

impl PeriodRepository for SqlitePeriodRepository<'_> {
    fn insert(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<PeriodId> {
        self.conn
            .execute(
                "INSERT INTO periods (startDate, endDate) VALUES (?1, ?2);",
                params![start, end],
            )
            .map_err(|err| write_failed("insert", err))?;

        let id = self.conn.last_insert_rowid();
        info!("event=period_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn delete_most_recently_inserted(&self) -> StoreResult<Option<PeriodRecord>> {
        let latest = self
            .conn
            .query_row(
                &format!("{PERIOD_SELECT_SQL} ORDER BY id DESC LIMIT 1;"),
                [],
                parse_period_row,
            )
            .optional()
            .map_err(|err| read_failed("delete_lookup", err))?;

        let Some(record) = latest else {
            info!("event=period_delete module=repo status=empty");
            return Ok(None);
        };

        self.conn
            .execute("DELETE FROM periods WHERE id = ?1;", [record.id])
            .map_err(|err| write_failed("delete", err))?;

        info!(
            "event=period_delete module=repo status=ok id={}",
            record.id
        );
        Ok(Some(record))
    }

    fn fetch_all(&self, direction: SortDirection) -> StoreResult<Vec<PeriodRecord>> {
        let order = direction.as_sql();
        let sql = format!("{PERIOD_SELECT_SQL} ORDER BY date(startDate) {order}, id {order};");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| read_failed("fetch_all", err))?;
        let records = stmt
            .query_map([], parse_period_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|err| read_failed("fetch_all", err))?;

        Ok(records)
    }

    fn fetch_most_recent_by_start_date(&self) -> StoreResult<Option<PeriodRecord>> {
        self.conn
            .query_row(
                &format!("{PERIOD_SELECT_SQL} ORDER BY date(startDate) DESC, id DESC LIMIT 1;"),
                [],
                parse_period_row,
            )
            .optional()
            .map_err(|err| read_failed("fetch_most_recent", err))
    }

    fn get_period(&self, id: PeriodId) -> StoreResult<Option<PeriodRecord>> {
        self.conn
            .query_row(
                &format!("{PERIOD_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_period_row,
            )
            .optional()
            .map_err(|err| read_failed("get_period", err))
    }

    fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM periods;", [], |row| row.get(0))
            .map_err(|err| read_failed("count", err))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn parse_period_row(row: &Row<'_>) -> rusqlite::Result<PeriodRecord> {
    Ok(PeriodRecord {
        id: row.get(0)?,
        start_date: stored_date(row, 1)?,
        end_date: stored_date(row, 2)?,
    })
}

/// Decodes a date column written either as `YYYY-MM-DD` or as a
/// `YYYY-MM-DDTHH:MM:SS.fff` timestamp (older `db.sqlite3` files).
fn stored_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    parse_stored_date(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_stored_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, STORED_DATE_FORMAT).or_else(|date_err| {
        LEGACY_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|timestamp| timestamp.date())
            .ok_or(date_err)
    })
}

fn write_failed(op: &str, err: rusqlite::Error) -> StoreError {
    error!("event=store_write module=repo status=error op={op} error={err}");
    StoreError::Write(err)
}

fn read_failed(op: &str, err: rusqlite::Error) -> StoreError {
    error!("event=store_read module=repo status=error op={op} error={err}");
    StoreError::Read(err)
}
