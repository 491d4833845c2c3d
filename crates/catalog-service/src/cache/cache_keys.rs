//! Cache key generators for consistent key naming.

use catalog_core::{ProductFilter, ProductId};

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "catalog:cache";

/// Generates the cache key for a single product.
#[must_use]
pub fn product_by_id(id: ProductId) -> String {
    format!("{CACHE_PREFIX}:product:{id}")
}

/// Generates the cache key for one page of a filtered product list.
///
/// Every field of the normalized filter contributes. The name goes last so
/// that colons inside it cannot shift the other segments.
#[must_use]
pub fn product_list(filter: &ProductFilter) -> String {
    format!(
        "{CACHE_PREFIX}:products:{}:{}:{}:{}:{}:{}",
        filter.user_id,
        price_segment(filter.min_price),
        price_segment(filter.max_price),
        filter.page.page,
        filter.page.page_size,
        filter.name.as_deref().unwrap_or_default(),
    )
}

// `Display` for f64 is the shortest representation that round-trips.
fn price_segment(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::UserId;

    fn filter(min: Option<f64>, max: Option<f64>, name: Option<&str>, page: i64) -> ProductFilter {
        ProductFilter::new(UserId(7), min, max, name.map(String::from), page, 10)
    }

    #[test]
    fn test_product_by_id_key() {
        assert_eq!(product_by_id(ProductId(42)), "catalog:cache:product:42");
    }

    #[test]
    fn test_product_list_key_layout() {
        let key = product_list(&filter(Some(10.5), None, Some("lamp"), 2));
        assert_eq!(key, "catalog:cache:products:7:10.5:-:2:10:lamp");
    }

    #[test]
    fn test_identical_filters_share_key() {
        let a = product_list(&filter(Some(1.0), Some(2.0), Some("x"), 1));
        let b = product_list(&filter(Some(1.0), Some(2.0), Some("x"), 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_field_changes_key() {
        let base = product_list(&filter(Some(1.0), Some(2.0), Some("x"), 1));
        assert_ne!(base, product_list(&filter(Some(1.0), Some(2.0), Some("x"), 2)));
        assert_ne!(base, product_list(&filter(Some(1.5), Some(2.0), Some("x"), 1)));
        assert_ne!(base, product_list(&filter(Some(1.0), None, Some("x"), 1)));
        assert_ne!(base, product_list(&filter(Some(1.0), Some(2.0), Some("y"), 1)));
        assert_ne!(base, product_list(&filter(Some(1.0), Some(2.0), None, 1)));

        let other_user = ProductFilter::new(UserId(8), Some(1.0), Some(2.0), Some("x".into()), 1, 10);
        assert_ne!(base, product_list(&other_user));
    }

    #[test]
    fn test_close_prices_do_not_collide() {
        let a = product_list(&filter(Some(1.000_000_1), None, None, 1));
        let b = product_list(&filter(Some(1.000_000_2), None, None, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalized_paging_shares_key() {
        let a = product_list(&ProductFilter::new(UserId(1), None, None, None, 0, 0));
        let b = product_list(&ProductFilter::new(UserId(1), None, None, None, 1, 10));
        assert_eq!(a, b);
    }
}
