//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Opaque product identifier assigned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier from its remote key.
    pub fn new(id: impl Into<String>) -> Self {
        ProductId(id.into())
    }

    /// The raw remote key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::new(id)
    }
}

/// Product sourced from the remote catalog.
///
/// The remote store guarantees nothing about field presence, so name, SKU and
/// description are all optional. A record with no price is normalised to zero
/// at ingest time.
#[derive(Debug, Clone)]
pub struct Product {
    /// Product name, if the remote record carries one.
    pub name: Option<String>,

    /// Stock keeping unit, if the remote record carries one.
    pub sku: Option<String>,

    /// Unit price in the catalog currency.
    pub price: Money<'static, Currency>,

    /// Free-text description.
    pub description: Option<String>,
}

impl Product {
    /// Create a product with just a name and price.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money<'static, Currency>) -> Self {
        Product {
            name: Some(name.into()),
            sku: None,
            price,
            description: None,
        }
    }

    /// Attach a SKU.
    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::KES};

    use super::*;

    #[test]
    fn product_id_display_is_raw_key() {
        let id = ProductId::new("prd-001");

        assert_eq!(id.to_string(), "prd-001");
        assert_eq!(id.as_str(), "prd-001");
    }

    #[test]
    fn builder_style_constructors_set_fields() {
        let product = Product::new("Chai Crate", Money::from_minor(120_000, KES))
            .with_sku("CHAI-12")
            .with_description("12 boxes");

        assert_eq!(product.name.as_deref(), Some("Chai Crate"));
        assert_eq!(product.sku.as_deref(), Some("CHAI-12"));
        assert_eq!(product.description.as_deref(), Some("12 boxes"));
        assert_eq!(product.price.to_minor_units(), 120_000);
    }
}
