//! Category use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points for categories.
//! - Serve a category's item listing, distinguishing an absent category
//!   from an empty one.
//!
//! # Invariants
//! - Deletion goes through the repository's dependency check; a category
//!   that still owns items is never removed.

use crate::model::category::{Category, CategoryId, NewCategory};
use crate::model::item::CategorizedItem;
use crate::model::page::{Page, PageRequest};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::item_repo::ItemRepository;
use crate::repo::{EntityKind, RepoError, RepoResult};

/// Use-case service wrapper for category operations.
pub struct CategoryService<C: CategoryRepository, I: ItemRepository> {
    categories: C,
    items: I,
}

impl<C: CategoryRepository, I: ItemRepository> CategoryService<C, I> {
    pub fn new(categories: C, items: I) -> Self {
        Self { categories, items }
    }

    pub fn create_category(&self, draft: &NewCategory) -> RepoResult<Category> {
        self.categories.save(draft)
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.categories.find_by_id(id)
    }

    pub fn list_categories(&self, request: PageRequest) -> RepoResult<Page<Category>> {
        self.categories.find_all(request)
    }

    /// Replaces code and name of an existing category.
    pub fn update_category(&self, id: CategoryId, draft: &NewCategory) -> RepoResult<Category> {
        self.categories.update(id, draft)
    }

    /// Deletes a category.
    ///
    /// # Errors
    /// - `NotFound` when absent.
    /// - `DependencyIntegrity` when items still reference it.
    pub fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        self.categories.delete_by_id(id)
    }

    pub fn count_categories(&self) -> RepoResult<u64> {
        self.categories.count()
    }

    /// Lists one page of a category's items with the category embedded.
    ///
    /// Returns `NotFound` when the category does not exist, so callers can
    /// tell an unknown id from a category without items.
    pub fn list_category_items(
        &self,
        id: CategoryId,
        request: PageRequest,
    ) -> RepoResult<Page<CategorizedItem>> {
        if !self.categories.exists_by_id(id)? {
            return Err(RepoError::NotFound {
                entity: EntityKind::Category,
                id: id.0,
            });
        }
        self.items.find_items_by_category(id, request)
    }
}
