//! `stockcat-core`: identifiers and error types shared by the catalog-facing crates.
//!
//! This crate has no IO; stores and services live in the crates built on top of it.

pub mod error;
pub mod id;

pub use error::{CatalogError, CatalogResult};
pub use id::{CategoryId, ProductId};
