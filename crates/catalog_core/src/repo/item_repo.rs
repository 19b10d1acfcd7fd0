//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/save/update/delete/count APIs over the `item` table.
//! - Serve the category-scoped listing with the category resolved by a
//!   single JOIN (no per-row category lookups).
//! - Apply the deployment's [`CategoryRequirement`] on every write path.
//!
//! # Invariants
//! - Listings page in insertion order (`id ASC`).
//! - `save_batch` writes the whole batch in one transaction or nothing.
//! - A non-null `category_id` always references an existing category
//!   (foreign key, surfaced as `ConstraintViolation`).

use crate::db::{current_epoch_ms, with_read_transaction, with_transaction};
use crate::model::category::{Category, CategoryId};
use crate::model::item::{CategorizedItem, CategoryRequirement, Item, ItemId, NewItem};
use crate::model::page::{Page, PageRequest};
use crate::model::price::Price;
use crate::repo::{
    count_to_u64, ensure_connection_ready, sql_offset, EntityKind, RepoError, RepoResult,
    CATEGORY_TABLE, ITEM_TABLE,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    sku,
    name,
    description,
    price_cents,
    stock,
    category_id,
    updated_at
FROM item";

const ITEM_INSERT_SQL: &str = "INSERT INTO item (
    sku,
    name,
    description,
    price_cents,
    stock,
    category_id,
    updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);";

const ITEM_WITH_CATEGORY_SQL: &str = "SELECT
    i.id AS id,
    i.sku AS sku,
    i.name AS name,
    i.description AS description,
    i.price_cents AS price_cents,
    i.stock AS stock,
    i.category_id AS category_id,
    i.updated_at AS updated_at,
    c.id AS category_ref_id,
    c.code AS category_code,
    c.name AS category_name,
    c.updated_at AS category_updated_at
FROM item i
INNER JOIN category c ON c.id = i.category_id
WHERE i.category_id = ?1
ORDER BY i.id ASC
LIMIT ?2 OFFSET ?3;";

/// Repository interface for item persistence.
pub trait ItemRepository {
    /// Loads one item; `None` when absent.
    fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Loads one page in insertion order plus the total count.
    fn find_all(&self, request: PageRequest) -> RepoResult<Page<Item>>;
    /// Loads one page of a category's items, each with its category resolved.
    fn find_items_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> RepoResult<Page<CategorizedItem>>;
    /// Inserts one item and returns it with storage-assigned fields.
    fn save(&self, draft: &NewItem) -> RepoResult<Item>;
    /// Inserts one batch atomically, returning rows in input order.
    fn save_batch(&self, drafts: &[NewItem]) -> RepoResult<Vec<Item>>;
    /// Replaces all mutable fields of an existing item.
    fn update(&self, id: ItemId, draft: &NewItem) -> RepoResult<Item>;
    fn exists_by_id(&self, id: ItemId) -> RepoResult<bool>;
    /// Deletes one item; fails with `NotFound` if absent.
    fn delete_by_id(&self, id: ItemId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
    fn count_by_category(&self, category_id: CategoryId) -> RepoResult<u64>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    category_requirement: CategoryRequirement,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates repository from a migrated connection with optional categories.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CATEGORY_TABLE, ITEM_TABLE])?;
        Ok(Self {
            conn,
            category_requirement: CategoryRequirement::default(),
        })
    }

    /// Sets the nullability policy for `category_id`.
    pub fn with_category_requirement(mut self, requirement: CategoryRequirement) -> Self {
        self.category_requirement = requirement;
        self
    }

    pub fn category_requirement(&self) -> CategoryRequirement {
        self.category_requirement
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, id)
    }

    fn find_all(&self, request: PageRequest) -> RepoResult<Page<Item>> {
        with_read_transaction(self.conn, |tx| {
            let total: i64 = tx.query_row("SELECT COUNT(*) FROM item;", [], |row| row.get(0))?;
            let mut stmt = tx.prepare_cached(&format!(
                "{ITEM_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
            ))?;
            let mut rows = stmt.query(params![
                i64::from(request.size()),
                sql_offset(request.offset())
            ])?;
            let mut content = Vec::new();
            while let Some(row) = rows.next()? {
                content.push(parse_item_row(row)?);
            }
            Ok(Page::new(content, count_to_u64(total, "item")?, request))
        })
    }

    fn find_items_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> RepoResult<Page<CategorizedItem>> {
        with_read_transaction(self.conn, |tx| {
            let total = count_items_in_category(tx, category_id)?;
            let mut stmt = tx.prepare_cached(ITEM_WITH_CATEGORY_SQL)?;
            let mut rows = stmt.query(params![
                category_id.0,
                i64::from(request.size()),
                sql_offset(request.offset())
            ])?;
            let mut content = Vec::new();
            while let Some(row) = rows.next()? {
                content.push(CategorizedItem {
                    item: parse_item_row(row)?,
                    category: Category {
                        id: CategoryId(row.get("category_ref_id")?),
                        code: row.get("category_code")?,
                        name: row.get("category_name")?,
                        updated_at: row.get("category_updated_at")?,
                    },
                });
            }
            Ok(Page::new(content, total, request))
        })
    }

    fn save(&self, draft: &NewItem) -> RepoResult<Item> {
        draft.validate(self.category_requirement)?;
        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            insert_item(tx, draft, now)
        })
    }

    fn save_batch(&self, drafts: &[NewItem]) -> RepoResult<Vec<Item>> {
        for draft in drafts {
            draft.validate(self.category_requirement)?;
        }
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            let mut saved = Vec::with_capacity(drafts.len());
            for draft in drafts {
                saved.push(insert_item(tx, draft, now)?);
            }
            Ok(saved)
        })
    }

    fn update(&self, id: ItemId, draft: &NewItem) -> RepoResult<Item> {
        draft.validate(self.category_requirement)?;
        with_transaction(self.conn, |tx| {
            let now = current_epoch_ms(tx)?;
            let changed = tx.execute(
                "UPDATE item
                 SET
                    sku = ?2,
                    name = ?3,
                    description = ?4,
                    price_cents = ?5,
                    stock = ?6,
                    category_id = ?7,
                    updated_at = MAX(updated_at, ?8)
                 WHERE id = ?1;",
                params![
                    id.0,
                    draft.sku.as_str(),
                    draft.name.as_str(),
                    draft.description.as_deref(),
                    draft.price.cents(),
                    i64::from(draft.stock),
                    draft.category_id.map(|category| category.0),
                    now,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: EntityKind::Item,
                    id: id.0,
                });
            }
            load_item(tx, id)?
                .ok_or_else(|| RepoError::InvalidData(format!("item {id} vanished during update")))
        })
    }

    fn exists_by_id(&self, id: ItemId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM item WHERE id = ?1);",
            [id.0],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_by_id(&self, id: ItemId) -> RepoResult<()> {
        let changed = with_transaction(self.conn, |tx| {
            tx.execute("DELETE FROM item WHERE id = ?1;", [id.0])
                .map_err(RepoError::from)
        })?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Item,
                id: id.0,
            });
        }
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM item;", [], |row| row.get(0))?;
        count_to_u64(total, "item")
    }

    fn count_by_category(&self, category_id: CategoryId) -> RepoResult<u64> {
        count_items_in_category(self.conn, category_id)
    }
}

fn insert_item(tx: &Transaction<'_>, draft: &NewItem, now: i64) -> RepoResult<Item> {
    let mut stmt = tx.prepare_cached(ITEM_INSERT_SQL)?;
    stmt.execute(params![
        draft.sku.as_str(),
        draft.name.as_str(),
        draft.description.as_deref(),
        draft.price.cents(),
        i64::from(draft.stock),
        draft.category_id.map(|category| category.0),
        now,
    ])?;
    Ok(Item {
        id: ItemId(tx.last_insert_rowid()),
        sku: draft.sku.clone(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        price: draft.price,
        stock: draft.stock,
        category_id: draft.category_id,
        updated_at: now,
    })
}

fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare_cached(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let item = stmt
        .query_row([id.0], |row| Ok(parse_item_row(row)))
        .optional()?;
    item.transpose()
}

fn count_items_in_category(conn: &Connection, category_id: CategoryId) -> RepoResult<u64> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM item WHERE category_id = ?1;",
        [category_id.0],
        |row| row.get(0),
    )?;
    count_to_u64(total, "item.category_id")
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id = ItemId(row.get("id")?);

    let price_cents: i64 = row.get("price_cents")?;
    let price = Price::from_cents(price_cents).map_err(|err| {
        RepoError::InvalidData(format!("invalid item.price_cents `{price_cents}`: {err}"))
    })?;

    let stock_value: i64 = row.get("stock")?;
    let stock = u32::try_from(stock_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid item.stock `{stock_value}` for item {id}"))
    })?;

    Ok(Item {
        id,
        sku: row.get("sku")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price,
        stock,
        category_id: row.get::<_, Option<i64>>("category_id")?.map(CategoryId),
        updated_at: row.get("updated_at")?,
    })
}
