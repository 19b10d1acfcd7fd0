//! Bulk test-data generation.
//!
//! # Responsibility
//! - Populate an empty catalog with a fixed number of categories and items.
//! - Bound memory by flushing items in fixed-size batches.
//! - Stay idempotent: a non-empty store or a held seed lock means no writes.
//!
//! # Invariants
//! - Categories are fully persisted (ids assigned) before the first item is
//!   generated.
//! - No in-memory batch ever exceeds `batch_size` records.
//! - A failed flush aborts the run; earlier batches stay committed and the
//!   failed batch is rolled back as a unit.

use crate::repo::RepoError;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

pub mod batch;
pub mod fake_data;
pub mod generator;

pub const DEFAULT_CATEGORY_COUNT: u32 = 2_000;
pub const DEFAULT_ITEM_COUNT: u64 = 100_000;
pub const DEFAULT_BATCH_SIZE: usize = 1_000;
/// Keeps `<token>_<index>` codes within 32 chars (25 + 1 + 6).
pub const MAX_CATEGORY_COUNT: u32 = 1_000_000;

pub type SeedResult<T> = Result<T, SeedError>;

/// Errors that abort a seed run.
#[derive(Debug)]
pub enum SeedError {
    /// Settings rejected before any write.
    InvalidSettings(String),
    /// Storage failure; the store may be partially seeded.
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSettings(message) => write!(f, "invalid seed settings: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSettings(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Dataset shape and batching policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub category_count: u32,
    pub item_count: u64,
    /// Maximum records buffered before one `save_batch` flush.
    pub batch_size: usize,
    /// Fixed seed for reproducible content; entropy when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            category_count: DEFAULT_CATEGORY_COUNT,
            item_count: DEFAULT_ITEM_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            rng_seed: None,
        }
    }
}

impl SeedSettings {
    /// Checks settings and returns the validated batch capacity.
    pub fn validate(&self) -> SeedResult<NonZeroUsize> {
        let batch_size = NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| SeedError::InvalidSettings("batch_size must be >= 1".to_string()))?;
        if self.category_count > MAX_CATEGORY_COUNT {
            return Err(SeedError::InvalidSettings(format!(
                "category_count {} exceeds {MAX_CATEGORY_COUNT}",
                self.category_count
            )));
        }
        if self.item_count > 0 && self.category_count == 0 {
            return Err(SeedError::InvalidSettings(
                "items need at least one category".to_string(),
            ));
        }
        Ok(batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{SeedError, SeedSettings};

    #[test]
    fn defaults_match_benchmark_dataset() {
        let settings = SeedSettings::default();
        assert_eq!(settings.category_count, 2_000);
        assert_eq!(settings.item_count, 100_000);
        assert_eq!(settings.validate().unwrap().get(), 1_000);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let settings = SeedSettings {
            batch_size: 0,
            ..SeedSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SeedError::InvalidSettings(_))
        ));
    }

    #[test]
    fn items_without_categories_are_rejected() {
        let settings = SeedSettings {
            category_count: 0,
            item_count: 1,
            ..SeedSettings::default()
        };
        assert!(settings.validate().is_err());

        let empty = SeedSettings {
            category_count: 0,
            item_count: 0,
            ..SeedSettings::default()
        };
        assert!(empty.validate().is_ok());
    }
}
