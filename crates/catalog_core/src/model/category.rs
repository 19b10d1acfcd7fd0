//! Category domain model.
//!
//! # Invariants
//! - `code` is the business key: unique, non-blank, at most 32 chars.
//! - `name` is non-blank, at most 128 chars.
//! - `id` and `updated_at` are assigned by storage only.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const CATEGORY_CODE_MAX_CHARS: usize = 32;
pub const CATEGORY_NAME_MAX_CHARS: usize = 128;

/// Storage-assigned category identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Write model for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub code: String,
    pub name: String,
}

impl NewCategory {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Checks column constraints that can be verified without storage.
    ///
    /// Uniqueness of `code` is enforced by storage, not here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("code", &self.code, CATEGORY_CODE_MAX_CHARS)?;
        require_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)?;
        Ok(())
    }
}

/// Persisted category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
    /// Unix epoch milliseconds of the last insert/update.
    pub updated_at: i64,
}
