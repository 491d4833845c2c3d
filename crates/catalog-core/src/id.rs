//! Typed ID wrappers for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

/// A strongly-typed wrapper for product IDs.
///
/// Product IDs are assigned by the store on insert and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Parses a product ID from a string.
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        s.trim().parse::<i64>().map(Self)
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// A strongly-typed wrapper for the owning user's ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Returns the inner value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse() {
        assert_eq!(ProductId::parse("42").unwrap(), ProductId(42));
        assert_eq!(" 7 ".parse::<ProductId>().unwrap(), ProductId(7));
        assert!(ProductId::parse("abc").is_err());
        assert!(ProductId::parse("").is_err());
        assert!(ProductId::parse("1.5").is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&ProductId(5)).unwrap(), "5");
        assert_eq!(serde_json::from_str::<UserId>("9").unwrap(), UserId(9));
    }
}
