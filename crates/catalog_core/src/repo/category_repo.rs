//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/save/update/delete/count APIs over the `category` table.
//! - Enforce the category delete policy: a category that still owns items
//!   is never deleted.
//!
//! # Invariants
//! - `find_all` pages in insertion order (`id ASC`).
//! - `save_batch` writes the whole batch in one transaction or nothing.
//! - `updated_at` never decreases on update.

use crate::db::{current_epoch_ms, with_read_transaction, with_transaction};
use crate::model::category::{Category, CategoryId, NewCategory};
use crate::model::page::{Page, PageRequest};
use crate::repo::{
    count_to_u64, ensure_connection_ready, sql_offset, EntityKind, RepoError, RepoResult,
    CATEGORY_TABLE, ITEM_TABLE,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

const CATEGORY_SELECT_SQL: &str = "SELECT id, code, name, updated_at FROM category";

const CATEGORY_INSERT_SQL: &str =
    "INSERT INTO category (code, name, updated_at) VALUES (?1, ?2, ?3);";

/// Repository interface for category persistence.
pub trait CategoryRepository {
    /// Loads one category; `None` when absent.
    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Loads one page in insertion order plus the total count.
    fn find_all(&self, request: PageRequest) -> RepoResult<Page<Category>>;
    /// Inserts one category and returns it with storage-assigned fields.
    fn save(&self, draft: &NewCategory) -> RepoResult<Category>;
    /// Inserts one batch atomically, returning rows in input order.
    fn save_batch(&self, drafts: &[NewCategory]) -> RepoResult<Vec<Category>>;
    /// Replaces all mutable fields of an existing category.
    fn update(&self, id: CategoryId, draft: &NewCategory) -> RepoResult<Category>;
    fn exists_by_id(&self, id: CategoryId) -> RepoResult<bool>;
    /// Deletes one category; fails if absent or still owning items.
    fn delete_by_id(&self, id: CategoryId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CATEGORY_TABLE, ITEM_TABLE])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        load_category(self.conn, id)
    }

    fn find_all(&self, request: PageRequest) -> RepoResult<Page<Category>> {
        with_read_transaction(self.conn, |tx| {
            let total: i64 = tx.query_row("SELECT COUNT(*) FROM category;", [], |row| row.get(0))?;
            let mut stmt = tx.prepare_cached(&format!(
                "{CATEGORY_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
            ))?;
            let mut rows = stmt.query(params![
                i64::from(request.size()),
                sql_offset(request.offset())
            ])?;
            let mut content = Vec::new();
            while let Some(row) = rows.next()? {
                content.push(parse_category_row(row)?);
            }
            Ok(Page::new(
                content,
                count_to_u64(total, "category")?,
                request,
            ))
        })
    }

    fn save(&self, draft: &NewCategory) -> RepoResult<Category> {
        draft.validate()?;
        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            insert_category(tx, draft, now)
        })
    }

    fn save_batch(&self, drafts: &[NewCategory]) -> RepoResult<Vec<Category>> {
        for draft in drafts {
            draft.validate()?;
        }
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            let mut saved = Vec::with_capacity(drafts.len());
            for draft in drafts {
                saved.push(insert_category(tx, draft, now)?);
            }
            Ok(saved)
        })
    }

    fn update(&self, id: CategoryId, draft: &NewCategory) -> RepoResult<Category> {
        draft.validate()?;
        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            let changed = tx.execute(
                "UPDATE category
                 SET
                    code = ?2,
                    name = ?3,
                    updated_at = MAX(updated_at, ?4)
                 WHERE id = ?1;",
                params![id.0, draft.code.as_str(), draft.name.as_str(), now],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: EntityKind::Category,
                    id: id.0,
                });
            }
            load_category(tx, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("category {id} vanished during update"))
            })
        })
    }

    fn exists_by_id(&self, id: CategoryId) -> RepoResult<bool> {
        category_exists(self.conn, id)
    }

    fn delete_by_id(&self, id: CategoryId) -> RepoResult<()> {
        with_transaction(self.conn, |tx| {
            if !category_exists(tx, id)? {
                return Err(RepoError::NotFound {
                    entity: EntityKind::Category,
                    id: id.0,
                });
            }

            let owned: i64 = tx.query_row(
                "SELECT COUNT(*) FROM item WHERE category_id = ?1;",
                [id.0],
                |row| row.get(0),
            )?;
            if owned > 0 {
                return Err(RepoError::DependencyIntegrity {
                    category_id: id,
                    item_count: count_to_u64(owned, "item.category_id")?,
                });
            }

            tx.execute("DELETE FROM category WHERE id = ?1;", [id.0])?;
            Ok(())
        })
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM category;", [], |row| row.get(0))?;
        count_to_u64(total, "category")
    }
}

fn insert_category(tx: &Transaction<'_>, draft: &NewCategory, now: i64) -> RepoResult<Category> {
    let mut stmt = tx.prepare_cached(CATEGORY_INSERT_SQL)?;
    stmt.execute(params![draft.code.as_str(), draft.name.as_str(), now])?;
    Ok(Category {
        id: CategoryId(tx.last_insert_rowid()),
        code: draft.code.clone(),
        name: draft.name.clone(),
        updated_at: now,
    })
}

fn load_category(conn: &Connection, id: CategoryId) -> RepoResult<Option<Category>> {
    let mut stmt = conn.prepare_cached(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
    let category = stmt
        .query_row([id.0], |row| Ok(parse_category_row(row)))
        .optional()?;
    category.transpose()
}

fn category_exists(conn: &Connection, id: CategoryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1);",
        [id.0],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Maps one row selected with `CATEGORY_SELECT_SQL` column names.
pub(crate) fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: CategoryId(row.get("id")?),
        code: row.get("code")?,
        name: row.get("name")?,
        updated_at: row.get("updated_at")?,
    })
}
