//! Item use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points for items.
//! - Switch listings between the plain scan and the category-scoped fetch
//!   join based on `ItemListQuery::category_id`.

use crate::model::category::{Category, CategoryId};
use crate::model::item::{CategorizedItem, Item, ItemId, NewItem};
use crate::model::page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
use crate::model::price::Price;
use crate::repo::item_repo::ItemRepository;
use crate::repo::RepoResult;
use serde::{Deserialize, Serialize};

/// Listing request as received from outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemListQuery {
    pub page: u32,
    pub size: u32,
    pub category_id: Option<CategoryId>,
}

impl Default for ItemListQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            category_id: None,
        }
    }
}

/// Listing element: item fields plus the category when it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl ItemView {
    fn from_parts(item: Item, category: Option<Category>) -> Self {
        Self {
            id: item.id,
            sku: item.sku,
            name: item.name,
            description: item.description,
            price: item.price,
            stock: item.stock,
            category_id: item.category_id,
            updated_at: item.updated_at,
            category,
        }
    }
}

impl From<Item> for ItemView {
    fn from(value: Item) -> Self {
        Self::from_parts(value, None)
    }
}

impl From<CategorizedItem> for ItemView {
    fn from(value: CategorizedItem) -> Self {
        Self::from_parts(value.item, Some(value.category))
    }
}

/// Use-case service wrapper for item operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_item(&self, draft: &NewItem) -> RepoResult<Item> {
        self.repo.save(draft)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.find_by_id(id)
    }

    /// Replaces all mutable fields; `NotFound` when absent.
    pub fn update_item(&self, id: ItemId, draft: &NewItem) -> RepoResult<Item> {
        self.repo.update(id, draft)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.delete_by_id(id)
    }

    pub fn count_items(&self) -> RepoResult<u64> {
        self.repo.count()
    }

    pub fn count_items_in_category(&self, category_id: CategoryId) -> RepoResult<u64> {
        self.repo.count_by_category(category_id)
    }

    /// Lists items, filtered to one category when `category_id` is set.
    ///
    /// # Contract
    /// - Unfiltered: plain scan, `category` is absent on every element.
    /// - Filtered: fetch join, `category` is present on every element. An
    ///   unknown category yields an empty page.
    /// - `size == 0` is rejected as a validation error.
    pub fn list_items(&self, query: &ItemListQuery) -> RepoResult<Page<ItemView>> {
        let request = PageRequest::new(query.page, query.size)?;
        match query.category_id {
            Some(category_id) => Ok(self
                .repo
                .find_items_by_category(category_id, request)?
                .map(ItemView::from)),
            None => Ok(self.repo.find_all(request)?.map(ItemView::from)),
        }
    }
}
