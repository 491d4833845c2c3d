//! List filter for products.

use crate::{PageRequest, UserId};
use serde::{Deserialize, Serialize};

/// A normalized product list query.
///
/// Price bounds and the name filter are `None` when the caller did not
/// supply a usable value. Two filters that compare equal always describe the
/// same result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Owner scope; always applied.
    pub user_id: UserId,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Page window.
    pub page: PageRequest,
}

impl ProductFilter {
    /// Builds a filter from raw parameters, applying the normalization rules.
    ///
    /// Non-positive or non-finite prices and empty names are dropped.
    #[must_use]
    pub fn new(
        user_id: UserId,
        min_price: Option<f64>,
        max_price: Option<f64>,
        name: Option<String>,
        page: i64,
        page_size: i64,
    ) -> Self {
        let positive = |v: Option<f64>| v.filter(|p| p.is_finite() && *p > 0.0);
        Self {
            user_id,
            min_price: positive(min_price),
            max_price: positive(max_price),
            name: name.filter(|n| !n.is_empty()),
            page: PageRequest::normalized(page, page_size),
        }
    }

    /// Returns a filter for the first default-sized page of a user's products.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self::new(user_id, None, None, None, 1, PageRequest::DEFAULT_SIZE)
    }
}
