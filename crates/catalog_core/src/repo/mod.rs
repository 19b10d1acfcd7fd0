//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the find/save/update/delete/count contracts per entity.
//! - Isolate SQLite query details from services and the seed generator.
//! - Map storage failures onto the catalog error taxonomy.
//!
//! # Invariants
//! - Write paths validate drafts before SQL mutations.
//! - Each repository call is one transaction; nothing stays open across calls.
//! - Repositories only accept connections migrated to the latest schema.

use crate::db::migrations::latest_version;
use crate::db::{with_transaction, DbError};
use crate::model::category::CategoryId;
use crate::model::validation::ValidationError;
use log::info;
use rusqlite::{Connection, ErrorCode};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_repo;
pub mod item_repo;
pub mod seed_lock_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity named by `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Item,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// Coarse classification consumed by outer layers (e.g. status mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ConstraintViolation,
    DependencyIntegrity,
    Storage,
}

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Draft rejected before reaching storage.
    Validation(ValidationError),
    /// Storage rejected the write (unique, foreign key, check, not null).
    ConstraintViolation(String),
    /// Update/delete target does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// Category still owns items and cannot be deleted.
    DependencyIntegrity {
        category_id: CategoryId,
        item_count: u64,
    },
    Db(DbError),
    /// Persisted row cannot be converted to a valid model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DependencyIntegrity { .. } => ErrorKind::DependencyIntegrity,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DependencyIntegrity {
                category_id,
                item_count,
            } => write!(
                f,
                "category {category_id} still owns {item_count} item(s) and cannot be deleted"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
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
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.unwrap_or_else(|| failure.to_string()))
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Row counts removed by [`clear_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedCatalog {
    pub items: u64,
    pub categories: u64,
    pub seed_locks: u64,
}

/// Deletes every item, category and seed lock in one transaction.
///
/// This is the operator path for re-seeding after a partial or crashed run:
/// the seed guard treats any existing rows as already seeded.
pub fn clear_catalog(conn: &Connection) -> RepoResult<ClearedCatalog> {
    ensure_connection_ready(conn, CATALOG_TABLES)?;
    let cleared = with_transaction(conn, |tx| {
        let items = tx.execute("DELETE FROM item;", [])?;
        let categories = tx.execute("DELETE FROM category;", [])?;
        let seed_locks = tx.execute("DELETE FROM seed_lock;", [])?;
        Ok::<_, RepoError>(ClearedCatalog {
            items: items as u64,
            categories: categories as u64,
            seed_locks: seed_locks as u64,
        })
    })?;
    info!(
        "event=catalog_clear module=repo status=ok items={} categories={} seed_locks={}",
        cleared.items, cleared.categories, cleared.seed_locks
    );
    Ok(cleared)
}

pub(crate) type TableSpec = (&'static str, &'static [&'static str]);

pub(crate) const CATEGORY_TABLE: TableSpec =
    ("category", &["id", "code", "name", "updated_at"]);
pub(crate) const ITEM_TABLE: TableSpec = (
    "item",
    &[
        "id",
        "sku",
        "name",
        "description",
        "price_cents",
        "stock",
        "category_id",
        "updated_at",
    ],
);
pub(crate) const SEED_LOCK_TABLE: TableSpec = ("seed_lock", &["name", "owner", "acquired_at"]);

const CATALOG_TABLES: &[TableSpec] = &[CATEGORY_TABLE, ITEM_TABLE, SEED_LOCK_TABLE];

/// Verifies schema version, tables and columns before a repository is built.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[TableSpec]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Converts a page offset to a SQLite bind value.
pub(crate) fn sql_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

pub(crate) fn count_to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` for {column}")))
}
