//! Catalog storage core: category/item model, SQLite repositories, use-case
//! services and the bulk seed generator.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::AppConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId, NewCategory};
pub use model::item::{CategorizedItem, CategoryRequirement, Item, ItemId, NewItem};
pub use model::page::{Page, PageRequest};
pub use model::price::Price;
pub use model::validation::ValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::seed_lock_repo::{SeedLockRepository, SqliteSeedLockRepository};
pub use repo::{clear_catalog, ClearedCatalog, ErrorKind, RepoError, RepoResult};
pub use seed::generator::{SeedGenerator, SeedReport};
pub use seed::{SeedError, SeedSettings};
pub use service::category_service::CategoryService;
pub use service::item_service::{ItemListQuery, ItemService, ItemView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
