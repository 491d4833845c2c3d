//! # Catalog Repository
//!
//! Persistent store for products.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ProductRepository>     (domain interface)
//! PgProductRepository                 (SQLx / PostgreSQL)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! PostgreSQL
//! ```
//!
//! The store is the single source of truth. Every write is one statement,
//! so row-level atomicity comes from PostgreSQL and no locking happens here.

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
