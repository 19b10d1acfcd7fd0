//! Catalog domain model.
//!
//! # Responsibility
//! - Define the `Category` and `Item` records and their write drafts.
//! - Own field-level validation shared by every write path.
//! - Define the pagination request/envelope contract.
//!
//! # Invariants
//! - Identities are storage-assigned surrogate keys and never reused.
//! - `Item` references its category by id only; a `Category` never embeds
//!   its items, so serialized output has no cycles.

pub mod category;
pub mod item;
pub mod page;
pub mod price;
pub mod validation;
