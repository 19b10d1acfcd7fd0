//! Randomized catalog content.
//!
//! Realism here is incidental; what matters is the shape: codes and skus
//! are unique by construction (generation index), text fits its columns,
//! prices are exact two-place decimals.

use crate::model::category::{CategoryId, NewCategory, CATEGORY_NAME_MAX_CHARS};
use crate::model::item::{NewItem, ITEM_NAME_MAX_CHARS};
use crate::model::price::Price;
use crate::model::validation::ValidationError;
use fake::faker::company::en::{BsNoun, Buzzword, Industry};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use rust_decimal::Decimal;

static CODE_TOKEN_REJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9.\-]").expect("valid code token regex"));

/// Longest random prefix kept in a category code.
pub const CODE_TOKEN_MAX_CHARS: usize = 25;
const CODE_TOKEN_FALLBACK: &str = "category";

/// Draw range for prices, in thousandths: `[1.000, 999.995)`.
///
/// Rounded half-up to two places this stays within `[1.00, 999.99]`.
const PRICE_MIN_MILLS: i64 = 1_000;
const PRICE_MAX_MILLS: i64 = 999_995;
const STOCK_MAX_EXCLUSIVE: u32 = 1_000;

/// Strips to `[a-zA-Z0-9.-]`, lowercases and truncates to 25 chars.
pub fn sanitize_code_token(raw: &str) -> String {
    CODE_TOKEN_REJECT_RE
        .replace_all(raw, "")
        .to_lowercase()
        .chars()
        .take(CODE_TOKEN_MAX_CHARS)
        .collect()
}

/// Builds `<token>_<index>`; the index suffix alone guarantees uniqueness.
pub fn category_code(raw_token: &str, index: u32) -> String {
    let token = sanitize_code_token(raw_token);
    let token = if token.is_empty() {
        CODE_TOKEN_FALLBACK
    } else {
        token.as_str()
    };
    format!("{token}_{index}")
}

/// Sku for the `index`-th generated item (zero-based).
pub fn item_sku(index: u64) -> String {
    format!("ITEM-{:07}", index + 1)
}

/// Random record source. Reproducible when built with a fixed seed.
pub struct CatalogFaker {
    rng: StdRng,
}

impl CatalogFaker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn category(&mut self, index: u32) -> NewCategory {
        let department: String = Industry().fake_with_rng(&mut self.rng);
        NewCategory {
            code: category_code(&department, index),
            name: truncate_chars(&department, CATEGORY_NAME_MAX_CHARS),
        }
    }

    /// Builds one item assigned to a category drawn uniformly from `categories`.
    pub fn item(
        &mut self,
        index: u64,
        categories: &[CategoryId],
    ) -> Result<NewItem, ValidationError> {
        let adjective: String = Buzzword().fake_with_rng(&mut self.rng);
        let noun: String = BsNoun().fake_with_rng(&mut self.rng);
        let description: String = Sentence(6..14).fake_with_rng(&mut self.rng);

        let mills = self.rng.gen_range(PRICE_MIN_MILLS..PRICE_MAX_MILLS);
        let price = Price::new(Decimal::new(mills, 3))?;

        let category_id = if categories.is_empty() {
            None
        } else {
            Some(categories[self.rng.gen_range(0..categories.len())])
        };

        Ok(NewItem {
            sku: item_sku(index),
            name: truncate_chars(&format!("{adjective} {noun}"), ITEM_NAME_MAX_CHARS),
            description: Some(description),
            price,
            stock: self.rng.gen_range(0..STOCK_MAX_EXCLUSIVE),
            category_id,
        })
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
