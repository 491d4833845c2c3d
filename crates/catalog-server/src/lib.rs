//! # Catalog Server Library
//!
//! Composition root shared by the `catalog-api` and `image-processor`
//! binaries: dependency injection, logging and startup helpers.

pub mod di;
pub mod logging;
pub mod startup;
