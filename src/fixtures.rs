//! Fixtures
//!
//! YAML catalog fixtures standing in for the remote product collection in
//! demos and tests. Prices are written as `AMOUNT CURRENCY` strings, e.g.
//! `1200.00 KES`; every priced product in a fixture must share one currency.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::products::{Product, ProductId};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No priced products in the fixture, so the currency is unknown
    #[error("No priced products in fixture; currency unknown")]
    NoCurrency,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixtureFile {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
///
/// Every field mirrors the sparse remote documents: any of them may be
/// missing, including the price.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: Option<String>,

    /// Stock keeping unit
    pub sku: Option<String>,

    /// Product price (e.g., "1200.00 KES")
    pub price: Option<String>,

    /// Product description
    pub description: Option<String>,
}

/// A parsed catalog fixture: one currency and a product snapshot.
#[derive(Debug)]
pub struct CatalogFixture {
    currency: &'static Currency,
    products: Vec<(ProductId, Product)>,
}

impl CatalogFixture {
    /// Load a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Load the named fixture from a base directory, as `{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        Self::from_path(base_path.as_ref().join(format!("{name}.yml")))
    }

    /// Parse a fixture from YAML contents.
    ///
    /// Unpriced products are normalised to zero in the fixture currency,
    /// which is inferred from the priced products.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price cannot be parsed,
    /// or the products mix currencies.
    pub fn parse(contents: &str) -> Result<Self, FixtureError> {
        let file: CatalogFixtureFile = serde_norway::from_str(contents)?;

        let mut currency: Option<&'static Currency> = None;
        let mut records = Vec::with_capacity(file.products.len());

        for (key, fixture) in file.products {
            let price = match fixture.price.as_deref() {
                Some(raw) => {
                    let (minor_units, parsed) = parse_price(raw)?;

                    match currency {
                        Some(existing) if existing != parsed => {
                            return Err(FixtureError::CurrencyMismatch(
                                existing.iso_alpha_code.to_string(),
                                parsed.iso_alpha_code.to_string(),
                            ));
                        }
                        _ => currency = Some(parsed),
                    }

                    Some(Money::from_minor(minor_units, parsed))
                }
                None => None,
            };

            records.push((key, fixture, price));
        }

        let currency = currency.ok_or(FixtureError::NoCurrency)?;

        let mut products: Vec<(ProductId, Product)> = records
            .into_iter()
            .map(|(key, fixture, price)| {
                (
                    ProductId::new(key),
                    Product {
                        name: fixture.name,
                        sku: fixture.sku,
                        price: price.unwrap_or_else(|| Money::from_minor(0, currency)),
                        description: fixture.description,
                    },
                )
            })
            .collect();

        // Map order is arbitrary; keep the snapshot deterministic.
        products.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(CatalogFixture { currency, products })
    }

    /// Currency shared by every priced product in the fixture.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The product snapshot, sorted by id.
    #[must_use]
    pub fn into_products(self) -> Vec<(ProductId, Product)> {
        self.products
    }

    /// Number of products in the fixture.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the fixture has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Parse a price string (e.g., "12.50 KES") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scale = Decimal::from(10_i64.pow(currency.exponent));

    let minor_units = amount
        .checked_mul(scale)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
