//! Storage layer for the time clock.
//!
//! Provides persistence for work segments using `rusqlite` and owns the
//! transactional clock-in/clock-out operations.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared without external synchronization; concurrent callers should
//! each open their own connection to the same file, as a request-per-
//! operation service would.
//!
//! # Schema
//!
//! Dates are stored as TEXT `YYYY-MM-DD`, times of day as TEXT `HH:MM:SS`,
//! and creation timestamps as RFC 3339 UTC with millisecond precision. For
//! all three, lexicographic ordering matches chronological ordering, so SQL
//! comparisons and `ORDER BY` work on the raw columns.
//!
//! # The single-open-segment invariant
//!
//! At most one segment per owner may be open (`end_time IS NULL`) at any
//! instant, across all dates. Two mechanisms enforce this under concurrency:
//!
//! - [`Database::clock_in`] runs its check-then-insert inside an `IMMEDIATE`
//!   transaction, serializing writers across connections;
//! - a partial unique index on `owner WHERE end_time IS NULL` is the
//!   backstop, so no interleaving can commit two open segments for one
//!   owner. Violations surface as [`DbError::AlreadyOpen`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params, params_from_iter};
use thiserror::Error;

use tc_core::{ClockReading, Scope, Segment, UserId, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Clock-in while a segment is already open for the owner.
    #[error("an open segment already exists for {owner}")]
    AlreadyOpen { owner: UserId },
    /// Clock-out with no open segment for the owner.
    #[error("no open segment for {owner}")]
    NoOpenSegment { owner: UserId },
    /// Segment id unknown or outside the caller's scope.
    #[error("segment {id} not found")]
    NotFound { id: i64 },
    /// Edit would leave `end_time` at or before `start_time`.
    #[error("end time {end} must be strictly later than start time {start}")]
    InvalidRange { start: NaiveTime, end: NaiveTime },
    /// Failed to parse a stored date.
    #[error("invalid stored date for segment {id}: {value}")]
    DateParse {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored time of day.
    #[error("invalid stored time for segment {id}: {value}")]
    TimeParse {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored creation timestamp.
    #[error("invalid stored timestamp for segment {id}: {value}")]
    TimestampParse {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored owner column failed validation.
    #[error("invalid stored owner for segment {id}")]
    OwnerParse {
        id: i64,
        #[source]
        source: ValidationError,
    },
}

/// Requested changes to a segment's mutable fields.
///
/// `owner` is honored only when the caller may reassign owners; otherwise
/// the original owner is silently kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentChanges {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub owner: Option<UserId>,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const SEGMENT_COLUMNS: &str = "id, owner, date, start_time, end_time, created_at";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        // Writers queue on the file lock instead of failing fast.
        self.conn
            .busy_timeout(std::time::Duration::from_millis(5000))?;
        self.conn.execute_batch(
            "
            -- Segments table: one row per clock-in/clock-out attempt
            -- date: 'YYYY-MM-DD', times: 'HH:MM:SS', created_at: RFC 3339 UTC
            CREATE TABLE IF NOT EXISTS segments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_segments_owner_date ON segments(owner, date);
            CREATE INDEX IF NOT EXISTS idx_segments_date ON segments(date);

            -- At most one open segment per owner, across all dates.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_segments_owner_open
                ON segments(owner) WHERE end_time IS NULL;
            ",
        )?;
        Ok(())
    }

    /// Opens a new segment for `owner` at the given clock reading.
    ///
    /// Either succeeds uniquely or fails with [`DbError::AlreadyOpen`]; no
    /// interleaving of concurrent callers can produce two open segments for
    /// the same owner.
    pub fn clock_in(&mut self, owner: &UserId, reading: &ClockReading) -> Result<Segment, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let open: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM segments WHERE owner = ? AND end_time IS NULL)",
            params![owner.as_str()],
            |row| row.get(0),
        )?;
        if open {
            return Err(DbError::AlreadyOpen {
                owner: owner.clone(),
            });
        }
        tx.execute(
            "
            INSERT INTO segments (owner, date, start_time, end_time, created_at)
            VALUES (?, ?, ?, NULL, ?)
            ",
            params![
                owner.as_str(),
                format_date(reading.date),
                format_time(reading.time),
                format_timestamp(reading.utc),
            ],
        )
        .map_err(|err| map_open_conflict(err, owner))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(%owner, id, "segment opened");
        Ok(Segment {
            id,
            owner: owner.clone(),
            date: reading.date,
            start_time: reading.time,
            end_time: None,
            created_at: reading.utc,
        })
    }

    /// Closes the open segment for `owner` at the given clock reading.
    ///
    /// If several open segments exist (the invariant should prevent this),
    /// the one with the latest `(date, id)` is closed.
    pub fn clock_out(
        &mut self,
        owner: &UserId,
        reading: &ClockReading,
    ) -> Result<Segment, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let row = tx
            .query_row(
                &format!(
                    "
                    SELECT {SEGMENT_COLUMNS} FROM segments
                    WHERE owner = ? AND end_time IS NULL
                    ORDER BY date DESC, id DESC
                    LIMIT 1
                    "
                ),
                params![owner.as_str()],
                SegmentRow::from_row,
            )
            .optional()?;
        let Some(row) = row else {
            return Err(DbError::NoOpenSegment {
                owner: owner.clone(),
            });
        };
        tx.execute(
            "UPDATE segments SET end_time = ? WHERE id = ?",
            params![format_time(reading.time), row.id],
        )?;
        tx.commit()?;

        tracing::debug!(%owner, id = row.id, "segment closed");
        let mut segment = row.into_segment()?;
        segment.end_time = Some(reading.time);
        Ok(segment)
    }

    /// Whether `owner` has an open segment on any date.
    pub fn open_segment_exists(&self, owner: &UserId) -> Result<bool, DbError> {
        let open = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM segments WHERE owner = ? AND end_time IS NULL)",
            params![owner.as_str()],
            |row| row.get(0),
        )?;
        Ok(open)
    }

    /// Lists `owner`'s segments on `date`, ordered by `(start_time, id)`.
    pub fn segments_for_day(
        &self,
        owner: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<Segment>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SEGMENT_COLUMNS} FROM segments
            WHERE owner = ? AND date = ?
            ORDER BY start_time ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map(
            params![owner.as_str(), format_date(date)],
            SegmentRow::from_row,
        )?;
        collect_segments(rows)
    }

    /// Lists segments in scope whose date falls in the given year/month.
    ///
    /// Out-of-range values are accepted literally: they describe an empty
    /// calendar window and match zero segments.
    pub fn segments_for_month(
        &self,
        scope: &Scope,
        year: i32,
        month: u32,
    ) -> Result<Vec<Segment>, DbError> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Ok(Vec::new());
        };
        let next_first = if month == 12 {
            year.checked_add(1)
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let Some(next_first) = next_first else {
            return Ok(Vec::new());
        };

        let mut sql = format!(
            "SELECT {SEGMENT_COLUMNS} FROM segments WHERE date >= ? AND date < ?"
        );
        let mut args = vec![
            Value::Text(format_date(first)),
            Value::Text(format_date(next_first)),
        ];
        if let Some(owner) = scope.owner_filter() {
            sql.push_str(" AND owner = ?");
            args.push(Value::Text(owner.to_string()));
        }
        sql.push_str(" ORDER BY date ASC, start_time ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), SegmentRow::from_row)?;
        collect_segments(rows)
    }

    /// Lists segments in scope, optionally bounded by an inclusive date
    /// range, ordered by `(date, id)` descending.
    pub fn list_segments(
        &self,
        scope: &Scope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Segment>, DbError> {
        let mut sql = format!("SELECT {SEGMENT_COLUMNS} FROM segments");
        let mut clauses = Vec::new();
        let mut args = Vec::new();
        if let Some(owner) = scope.owner_filter() {
            clauses.push("owner = ?");
            args.push(Value::Text(owner.to_string()));
        }
        if let Some(from) = from {
            clauses.push("date >= ?");
            args.push(Value::Text(format_date(from)));
        }
        if let Some(to) = to {
            clauses.push("date <= ?");
            args.push(Value::Text(format_date(to)));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), SegmentRow::from_row)?;
        collect_segments(rows)
    }

    /// Fetches one segment by id, or [`DbError::NotFound`] if the id is
    /// unknown or outside the caller's scope.
    pub fn get_segment(&self, id: i64, scope: &Scope) -> Result<Segment, DbError> {
        let row = match scope.owner_filter() {
            Some(owner) => self
                .conn
                .query_row(
                    &format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE id = ? AND owner = ?"),
                    params![id, owner.as_str()],
                    SegmentRow::from_row,
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    &format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE id = ?"),
                    params![id],
                    SegmentRow::from_row,
                )
                .optional()?,
        };
        row.ok_or(DbError::NotFound { id })?.into_segment()
    }

    /// Applies edits to a segment's times and (for privileged callers) its
    /// owner.
    ///
    /// When both resulting times are present, `end_time` must be strictly
    /// later than `start_time` in raw comparison; otherwise the write is
    /// rejected with [`DbError::InvalidRange`]. Overnight segments can only
    /// be produced by [`Database::clock_out`], never by edits.
    pub fn update_segment(
        &mut self,
        id: i64,
        scope: &Scope,
        changes: &SegmentChanges,
        allow_reassign: bool,
    ) -> Result<Segment, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let row = match scope.owner_filter() {
            Some(owner) => tx
                .query_row(
                    &format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE id = ? AND owner = ?"),
                    params![id, owner.as_str()],
                    SegmentRow::from_row,
                )
                .optional()?,
            None => tx
                .query_row(
                    &format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE id = ?"),
                    params![id],
                    SegmentRow::from_row,
                )
                .optional()?,
        };
        let existing = row.ok_or(DbError::NotFound { id })?.into_segment()?;

        let start_time = changes.start_time.unwrap_or(existing.start_time);
        let end_time = changes.end_time.or(existing.end_time);
        if let Some(end) = end_time {
            if end <= start_time {
                return Err(DbError::InvalidRange {
                    start: start_time,
                    end,
                });
            }
        }
        // A worker edit supplying a different owner silently keeps the
        // original owner; it is not an error.
        let owner = if allow_reassign {
            changes
                .owner
                .clone()
                .unwrap_or_else(|| existing.owner.clone())
        } else {
            existing.owner.clone()
        };

        tx.execute(
            "UPDATE segments SET owner = ?, start_time = ?, end_time = ? WHERE id = ?",
            params![
                owner.as_str(),
                format_time(start_time),
                end_time.map(format_time),
                id,
            ],
        )
        .map_err(|err| map_open_conflict(err, &owner))?;
        tx.commit()?;

        tracing::debug!(id, %owner, "segment updated");
        Ok(Segment {
            id,
            owner,
            date: existing.date,
            start_time,
            end_time,
            created_at: existing.created_at,
        })
    }

    /// Deletes a segment, or [`DbError::NotFound`] if the id is unknown or
    /// outside the caller's scope.
    pub fn delete_segment(&mut self, id: i64, scope: &Scope) -> Result<(), DbError> {
        let deleted = match scope.owner_filter() {
            Some(owner) => self.conn.execute(
                "DELETE FROM segments WHERE id = ? AND owner = ?",
                params![id, owner.as_str()],
            )?,
            None => self
                .conn
                .execute("DELETE FROM segments WHERE id = ?", params![id])?,
        };
        if deleted == 0 {
            return Err(DbError::NotFound { id });
        }
        tracing::debug!(id, "segment deleted");
        Ok(())
    }
}

#[derive(Debug)]
struct SegmentRow {
    id: i64,
    owner: String,
    date: String,
    start_time: String,
    end_time: Option<String>,
    created_at: String,
}

impl SegmentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            date: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_segment(self) -> Result<Segment, DbError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|source| {
            DbError::DateParse {
                id: self.id,
                value: self.date.clone(),
                source,
            }
        })?;
        let start_time = parse_stored_time(self.id, &self.start_time)?;
        let end_time = match self.end_time.as_deref() {
            Some(value) => Some(parse_stored_time(self.id, value)?),
            None => None,
        };
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|source| DbError::TimestampParse {
                id: self.id,
                value: self.created_at.clone(),
                source,
            })?;
        let owner = UserId::new(self.owner).map_err(|source| DbError::OwnerParse {
            id: self.id,
            source,
        })?;

        Ok(Segment {
            id: self.id,
            owner,
            date,
            start_time,
            end_time,
            created_at,
        })
    }
}

fn collect_segments(
    rows: impl Iterator<Item = rusqlite::Result<SegmentRow>>,
) -> Result<Vec<Segment>, DbError> {
    let mut segments = Vec::new();
    for row in rows {
        segments.push(row?.into_segment()?);
    }
    Ok(segments)
}

fn parse_stored_time(id: i64, value: &str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|source| DbError::TimeParse {
        id,
        value: value.to_string(),
        source,
    })
}

/// Maps a partial-unique-index violation to [`DbError::AlreadyOpen`].
fn map_open_conflict(err: rusqlite::Error, owner: &UserId) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::AlreadyOpen {
                owner: owner.clone(),
            }
        }
        _ => DbError::Sqlite(err),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
