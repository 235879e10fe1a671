//! Generic persistence over the marketplace tables.
//!
//! # Responsibility
//! - Get, list, insert, update and delete rows of any `EntityKind`.
//! - Own the transaction scope every repository mutation runs in.
//! - Translate SQLite constraint failures into semantic errors.
//! - Provide the process-wide `Store` handle that hands out connections.
//!
//! # Invariants
//! - Mutations run inside one `IMMEDIATE` transaction: commit on `Ok`,
//!   rollback on `Err` and on unwind.
//! - `update`/`delete` report `NotFound` instead of silently touching 0 rows.
//! - Table and column names come from static identifiers, never from input.

use crate::db::{connect_db, open_db, DbError, DbResult};
use crate::model::EntityKind;
use crate::validate::ValidationError;
use log::{error, info, warn};
use rusqlite::types::Value;
use rusqlite::{
    ffi, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// One column assignment: static column name plus bound value.
pub type Column = (&'static str, Value);

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by store, validator and repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Id does not resolve for get/update/delete.
    NotFound { kind: EntityKind, id: i64 },
    Validation(ValidationError),
    /// A reference field points at a missing row. `id` is unknown when the
    /// violation is reported by SQLite itself.
    ForeignKey { field: String, id: Option<i64> },
    UniqueViolation { field: String },
    Db(DbError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl RepoError {
    /// Whether the failure is a storage fault rather than a rejected request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Db(_) | Self::InvalidData(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ForeignKey {
                field,
                id: Some(id),
            } => write!(f, "`{field}` references missing record {id}"),
            Self::ForeignKey { field, id: None } => {
                write!(f, "`{field}` references a missing record")
            }
            Self::UniqueViolation { field } => write!(f, "`{field}` is already in use"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let Some(err) = constraint_error(&value) {
            return err;
        }
        match value {
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => Self::InvalidData(value.to_string()),
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Row type stored in one marketplace table.
pub trait Record: Sized {
    const KIND: EntityKind;
    /// Comma-separated select list, `id` first.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Shared handle to the marketplace database.
///
/// Created once at startup by [`Store::open`], which migrates the schema.
/// Every caller then takes its own connection through [`Store::connect`];
/// concurrent writers are serialized by SQLite's write lock.
#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
}

impl Store {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path)?;
        drop(conn);
        info!(
            "event=store_open module=store status=ok path={}",
            path.display()
        );
        Ok(Self {
            path: Arc::new(path),
        })
    }

    /// Returns a new configured connection to the opened database.
    pub fn connect(&self) -> DbResult<Connection> {
        connect_db(self.path.as_path())
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

/// Runs `op` inside one `IMMEDIATE` transaction.
///
/// Commits when `op` succeeds; any error rolls back every write `op` made.
/// `event` names the operation in log output.
pub fn with_transaction<T>(
    conn: &mut Connection,
    event: &str,
    op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match op(&tx) {
        Ok(value) => {
            tx.commit()?;
            info!(
                "event={event} module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event={event} module=store status=error error_code=rollback_failed error={rollback_err}"
                );
            }
            if err.is_internal() {
                error!(
                    "event={event} module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
            } else {
                warn!(
                    "event={event} module=store status=rejected duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
            }
            Err(err)
        }
    }
}

/// Loads one record or fails with `NotFound`.
pub fn get<R: Record>(conn: &Connection, id: i64) -> RepoResult<R> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1;",
        R::COLUMNS,
        R::KIND.table()
    );
    conn.query_row(&sql, [id], R::from_row)
        .optional()?
        .ok_or(RepoError::NotFound { kind: R::KIND, id })
}

/// Lists every record of one kind in storage (id) order.
pub fn list_all<R: Record>(conn: &Connection) -> RepoResult<Vec<R>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY id ASC;",
        R::COLUMNS,
        R::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(R::from_row(row)?);
    }
    Ok(records)
}

pub fn exists(conn: &Connection, kind: EntityKind, id: i64) -> RepoResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
        kind.table()
    );
    let found: i64 = conn.query_row(&sql, [id], |row| row.get(0))?;
    Ok(found == 1)
}

/// Fails with `NotFound` unless a `kind` row with `id` exists.
pub fn ensure_exists(conn: &Connection, kind: EntityKind, id: i64) -> RepoResult<()> {
    if exists(conn, kind, id)? {
        return Ok(());
    }
    Err(RepoError::NotFound { kind, id })
}

/// Returns the id of the row whose `column` equals `value`, if any.
pub fn find_id_by(
    conn: &Connection,
    kind: EntityKind,
    column: &'static str,
    value: &str,
) -> RepoResult<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE {column} = ?1 LIMIT 1;",
        kind.table()
    );
    let id = conn
        .query_row(&sql, [value], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Inserts one row and returns its new id.
pub fn insert(conn: &Connection, kind: EntityKind, columns: &[Column]) -> RepoResult<i64> {
    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES;", kind.table())
    } else {
        let names = columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({names}) VALUES ({placeholders});",
            kind.table()
        )
    };

    conn.execute(&sql, params_from_iter(columns.iter().map(|(_, value)| value)))?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites `columns` of one row; other columns keep their values.
pub fn update(conn: &Connection, kind: EntityKind, id: i64, columns: &[Column]) -> RepoResult<()> {
    if columns.is_empty() {
        return ensure_exists(conn, kind, id);
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, (name, _))| format!("{name} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{};",
        kind.table(),
        columns.len() + 1
    );

    let id_value = Value::Integer(id);
    let values = columns
        .iter()
        .map(|(_, value)| value)
        .chain(std::iter::once(&id_value));
    let changed = conn.execute(&sql, params_from_iter(values))?;

    if changed == 0 {
        return Err(RepoError::NotFound { kind, id });
    }
    Ok(())
}

/// Deletes one row. Dependent rows follow the schema's `ON DELETE` rules.
pub fn delete(conn: &Connection, kind: EntityKind, id: i64) -> RepoResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1;", kind.table());
    let changed = conn.execute(&sql, [id])?;
    if changed == 0 {
        return Err(RepoError::NotFound { kind, id });
    }
    Ok(())
}

fn constraint_error(err: &rusqlite::Error) -> Option<RepoError> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }

    match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE => Some(RepoError::UniqueViolation {
            field: constrained_column(message.as_deref()),
        }),
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(RepoError::ForeignKey {
            field: "reference".to_string(),
            id: None,
        }),
        _ => None,
    }
}

// SQLite reports `UNIQUE constraint failed: users.email`.
fn constrained_column(message: Option<&str>) -> String {
    message
        .and_then(|text| text.rsplit(['.', ' ']).next())
        .filter(|column| !column.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
