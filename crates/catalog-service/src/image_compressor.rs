//! Image compression seam.

use catalog_core::Interface;
use shaku::Component;

/// Prefix marking a compressed image reference.
pub const COMPRESSED_PREFIX: &str = "compressed_";

/// Maps an original image reference to its compressed counterpart.
///
/// Implementations must be deterministic.
pub trait ImageCompressor: Interface + Send + Sync {
    /// Returns the compressed reference for one image.
    fn compress(&self, image_url: &str) -> String;

    /// Compresses a list of images, preserving order.
    fn compress_all(&self, image_urls: &[String]) -> Vec<String> {
        image_urls.iter().map(|url| self.compress(url)).collect()
    }
}

/// Compressor that derives the compressed reference by prefixing the original.
#[derive(Component, Debug, Clone)]
#[shaku(interface = ImageCompressor)]
pub struct PrefixImageCompressor {
    #[shaku(default = COMPRESSED_PREFIX.to_string())]
    prefix: String,
}

impl PrefixImageCompressor {
    /// Creates a compressor using [`COMPRESSED_PREFIX`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix(COMPRESSED_PREFIX)
    }

    /// Creates a compressor with a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for PrefixImageCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCompressor for PrefixImageCompressor {
    fn compress(&self, image_url: &str) -> String {
        format!("{}{image_url}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_prefixes() {
        let compressor = PrefixImageCompressor::new();
        assert_eq!(compressor.compress("a.jpg"), "compressed_a.jpg");
    }

    #[test]
    fn test_compress_all_preserves_order() {
        let compressor = PrefixImageCompressor::new();
        let urls = vec!["b.jpg".to_string(), "a.jpg".to_string(), "b.jpg".to_string()];
        assert_eq!(
            compressor.compress_all(&urls),
            vec!["compressed_b.jpg", "compressed_a.jpg", "compressed_b.jpg"]
        );
    }

    #[test]
    fn test_compress_all_empty() {
        assert!(PrefixImageCompressor::new().compress_all(&[]).is_empty());
    }
}
