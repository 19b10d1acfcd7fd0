//! Advisory lock rows for run-once jobs.
//!
//! # Responsibility
//! - Let exactly one process at a time hold a named job lock.
//!
//! # Invariants
//! - A lock is held iff its `seed_lock` row exists.
//! - Only the owner token that acquired a lock can release it.
//! - Acquisition is one `IMMEDIATE` transaction, so two processes racing on
//!   the same store cannot both observe the lock as free.

use crate::db::{current_epoch_ms, with_transaction};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult, SEED_LOCK_TABLE};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

/// Current holder of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockHolder {
    pub owner: Uuid,
    /// Epoch milliseconds at acquisition.
    pub acquired_at: i64,
}

/// Repository interface for named advisory locks.
pub trait SeedLockRepository {
    /// Claims `name` for `owner`. Returns `false` when another owner holds it.
    fn try_acquire(&self, name: &str, owner: Uuid) -> RepoResult<bool>;
    /// Releases `name` if `owner` holds it. Returns whether a lock was removed.
    fn release(&self, name: &str, owner: Uuid) -> RepoResult<bool>;
    fn holder(&self, name: &str) -> RepoResult<Option<LockHolder>>;
}

/// SQLite-backed advisory lock repository.
pub struct SqliteSeedLockRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSeedLockRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[SEED_LOCK_TABLE])?;
        Ok(Self { conn })
    }
}

impl SeedLockRepository for SqliteSeedLockRepository<'_> {
    fn try_acquire(&self, name: &str, owner: Uuid) -> RepoResult<bool> {
        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO seed_lock (name, owner, acquired_at)
                 VALUES (?1, ?2, ?3);",
                params![name, owner.to_string(), now],
            )?;
            Ok::<_, RepoError>(inserted == 1)
        })
    }

    fn release(&self, name: &str, owner: Uuid) -> RepoResult<bool> {
        let removed = with_transaction(self.conn, |tx| {
            tx.execute(
                "DELETE FROM seed_lock WHERE name = ?1 AND owner = ?2;",
                params![name, owner.to_string()],
            )
            .map_err(RepoError::from)
        })?;
        Ok(removed == 1)
    }

    fn holder(&self, name: &str) -> RepoResult<Option<LockHolder>> {
        let row = self
            .conn
            .query_row(
                "SELECT owner, acquired_at FROM seed_lock WHERE name = ?1;",
                [name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        row.map(|(owner_text, acquired_at)| {
            let owner = Uuid::parse_str(&owner_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid uuid value `{owner_text}` in seed_lock.owner"
                ))
            })?;
            Ok(LockHolder { owner, acquired_at })
        })
        .transpose()
    }
}
