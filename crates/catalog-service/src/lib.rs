//! # Catalog Service
//!
//! Business logic layer of the product catalog.
//!
//! The [`ProductService`] orchestrator combines the product store, the
//! cache layer and the image-processing task publisher:
//!
//! ```text
//!   create ──▶ validate ──▶ store ──▶ publish task (fire and forget)
//!   get    ──▶ cache ──miss──▶ store ──▶ populate cache
//!   list   ──▶ cache ──miss──▶ store ──▶ populate cache
//!   process──▶ compress ──▶ store ──▶ invalidate product entry
//! ```

pub mod cache;
pub mod dto;
pub mod image_compressor;
pub mod r#impl;
pub mod product_service;
pub mod task_publisher;

pub use cache::*;
pub use dto::*;
pub use image_compressor::*;
pub use r#impl::*;
pub use product_service::*;
pub use task_publisher::*;
