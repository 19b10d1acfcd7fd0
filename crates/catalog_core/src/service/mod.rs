//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the listing envelope and the `category_id` filter switch that
//!   outer (HTTP) layers consume.

pub mod category_service;
pub mod item_service;
