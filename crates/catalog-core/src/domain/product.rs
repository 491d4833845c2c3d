//! Product entity.

use crate::{ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product as persisted by the store.
///
/// `compressed_product_images` is either empty (not processed yet) or holds
/// one entry per original image, in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,

    /// Owning user.
    pub user_id: UserId,

    /// Display name.
    pub product_name: String,

    /// Optional free-text description.
    pub product_description: Option<String>,

    /// Non-negative price.
    pub product_price: f64,

    /// Original image references, in upload order.
    pub product_images: Vec<String>,

    /// Compressed image references, positionally matching `product_images`.
    #[serde(default)]
    pub compressed_product_images: Vec<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true once background processing has written compressed images.
    #[must_use]
    pub fn has_processed_images(&self) -> bool {
        !self.compressed_product_images.is_empty()
    }

    /// Checks the positional correspondence between original and compressed images.
    #[must_use]
    pub fn images_consistent(&self) -> bool {
        self.compressed_product_images.is_empty()
            || self.compressed_product_images.len() == self.product_images.len()
    }
}

/// Fields supplied by the caller when creating a product.
///
/// The store fills in the ID and both timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub user_id: UserId,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub product_images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(images: &[&str], compressed: &[&str]) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId(1),
            user_id: UserId(1),
            product_name: "Widget".to_string(),
            product_description: None,
            product_price: 9.99,
            product_images: images.iter().map(ToString::to_string).collect(),
            compressed_product_images: compressed.iter().map(ToString::to_string).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unprocessed_product() {
        let p = product(&["a.jpg", "b.jpg"], &[]);
        assert!(!p.has_processed_images());
        assert!(p.images_consistent());
    }

    #[test]
    fn test_processed_product() {
        let p = product(&["a.jpg", "b.jpg"], &["compressed_a.jpg", "compressed_b.jpg"]);
        assert!(p.has_processed_images());
        assert!(p.images_consistent());
    }

    #[test]
    fn test_inconsistent_product() {
        let p = product(&["a.jpg", "b.jpg"], &["compressed_a.jpg"]);
        assert!(!p.images_consistent());
    }

    #[test]
    fn test_snapshot_without_compressed_field() {
        let json = r#"{
            "id": 3, "user_id": 1, "product_name": "Widget",
            "product_description": null, "product_price": 1.5,
            "product_images": ["a.jpg"],
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(p.compressed_product_images.is_empty());
        assert_eq!(p.id, ProductId(3));
    }
}
