//! Item domain model.
//!
//! # Invariants
//! - `sku` is the business key: unique, non-blank, at most 64 chars.
//! - `category_id` is a non-owning reference; whether it may be `None` is
//!   decided by [`CategoryRequirement`], not by the record itself.
//! - `stock` is non-negative by construction.

use crate::model::category::{Category, CategoryId};
use crate::model::price::Price;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ITEM_SKU_MAX_CHARS: usize = 64;
pub const ITEM_NAME_MAX_CHARS: usize = 128;

/// Storage-assigned item identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployment policy for `Item.category_id` nullability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryRequirement {
    /// Items may exist without a category.
    #[default]
    Optional,
    /// Every item write must carry a category.
    Required,
}

/// Write model for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
}

impl NewItem {
    /// Checks column constraints and the category policy.
    ///
    /// Existence of the referenced category and `sku` uniqueness are
    /// enforced by storage.
    pub fn validate(&self, requirement: CategoryRequirement) -> Result<(), ValidationError> {
        require_text("sku", &self.sku, ITEM_SKU_MAX_CHARS)?;
        require_text("name", &self.name, ITEM_NAME_MAX_CHARS)?;
        if requirement == CategoryRequirement::Required && self.category_id.is_none() {
            return Err(ValidationError::CategoryRequired);
        }
        Ok(())
    }
}

/// Persisted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
    /// Unix epoch milliseconds of the last insert/update.
    pub updated_at: i64,
}

/// Item with its owning category resolved by the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorizedItem {
    #[serde(flatten)]
    pub item: Item,
    pub category: Category,
}
