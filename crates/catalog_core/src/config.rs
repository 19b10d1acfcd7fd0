//! Application configuration.
//!
//! Values come from an optional TOML file layered under environment
//! variables (`CATALOG__SECTION__KEY`). Every key has a default, so an
//! empty environment with no file yields a usable configuration.

use crate::logging::default_log_level;
use crate::model::item::CategoryRequirement;
use crate::seed::SeedSettings;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File consulted when no explicit path is given; absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "config/catalog.toml";
pub const ENV_PREFIX: &str = "CATALOG";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub seed: SeedSettings,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Whether items must reference a category.
    pub item_category: CategoryRequirement,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; relative paths are resolved by the caller.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path` (required when given) or the default
    /// file (optional), then applies `CATALOG__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(
        path: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AppConfig = settings.try_deserialize()?;
        loaded
            .seed
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::model::item::CategoryRequirement;
    use crate::seed::{DEFAULT_BATCH_SIZE, DEFAULT_CATEGORY_COUNT, DEFAULT_ITEM_COUNT};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_without_file_or_env() {
        let config = AppConfig::load_with_prefix(None, "CATALOG_UNIT_DEFAULTS").unwrap();
        assert_eq!(config.database.path, PathBuf::from("catalog.db"));
        assert_eq!(config.seed.category_count, DEFAULT_CATEGORY_COUNT);
        assert_eq!(config.seed.item_count, DEFAULT_ITEM_COUNT);
        assert_eq!(config.seed.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.seed.rng_seed, None);
        assert_eq!(config.catalog.item_category, CategoryRequirement::Optional);
    }

    #[test]
    fn file_values_are_layered_under_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[database]\npath = \"bench.db\"\n\n[seed]\ncategory_count = 3\nitem_count = 10\nbatch_size = 4\n\n[catalog]\nitem_category = \"required\"\n"
        )
        .unwrap();

        std::env::set_var("CATALOG_UNIT_LAYERED__SEED__BATCH_SIZE", "2");
        let config =
            AppConfig::load_with_prefix(Some(file.path()), "CATALOG_UNIT_LAYERED").unwrap();
        std::env::remove_var("CATALOG_UNIT_LAYERED__SEED__BATCH_SIZE");

        assert_eq!(config.database.path, PathBuf::from("bench.db"));
        assert_eq!(config.seed.category_count, 3);
        assert_eq!(config.seed.item_count, 10);
        assert_eq!(config.seed.batch_size, 2);
        assert_eq!(config.catalog.item_category, CategoryRequirement::Required);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load_with_prefix(Some(&missing), "CATALOG_UNIT_MISSING").is_err());
    }

    #[test]
    fn zero_batch_size_is_rejected_at_load() {
        std::env::set_var("CATALOG_UNIT_ZERO__SEED__BATCH_SIZE", "0");
        let result = AppConfig::load_with_prefix(None, "CATALOG_UNIT_ZERO");
        std::env::remove_var("CATALOG_UNIT_ZERO__SEED__BATCH_SIZE");
        assert!(result.is_err());
    }
}
