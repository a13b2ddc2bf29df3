//! Cart
//!
//! Ordered sequence of line items built from catalog products and ad-hoc
//! manual entries. Insertion order is display order. Re-adding a catalog
//! product merges into its existing line; manual entries never merge.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    products::{Product, ProductId},
};

/// Sentinel SKU carried by manual cart lines.
pub const MANUAL_SKU: &str = "MANUAL";

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product identifier is no longer in the catalog cache.
    #[error("product {0} is not in the catalog")]
    ProductNotFound(ProductId),

    /// A manual entry needs a non-empty name.
    #[error("manual items need a name")]
    EmptyName,

    /// A manual entry needs a price greater than zero.
    #[error("manual items need a price greater than zero")]
    NonPositivePrice,

    /// A manual entry's quantity must be a positive integer.
    #[error("manual items need a quantity of at least 1")]
    NonPositiveQuantity,

    /// The line identifier is not in the cart.
    #[error("line {0} is not in the cart")]
    LineNotFound(LineId),

    /// An item's currency differs from the cart currency.
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// Identifier of one cart line.
///
/// Manual entries carry a per-cart counter value, so they are distinguishable
/// from catalog lines by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineId {
    /// Line backed by a catalog product.
    Catalog(ProductId),

    /// Ad-hoc manual entry.
    Manual(u64),
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Catalog(id) => write!(f, "{id}"),
            LineId::Manual(n) => write!(f, "manual-{n}"),
        }
    }
}

/// One entry in the cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    id: LineId,
    name: String,
    sku: Option<String>,
    unit_price: Money<'static, Currency>,
    quantity: u32,
    description: Option<String>,
    manual: bool,
}

impl CartLine {
    /// Line identifier.
    #[must_use]
    pub fn id(&self) -> &LineId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SKU, if any. Manual lines always carry [`MANUAL_SKU`].
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    /// Unit price at the time the line was added.
    #[must_use]
    pub fn unit_price(&self) -> Money<'static, Currency> {
        self.unit_price
    }

    /// Quantity, always at least 1.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Free-text description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this line is a manual entry.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.manual
    }
}

/// A validated manual entry, before it becomes a cart line.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    /// Item name (required, non-empty after trimming).
    pub name: String,

    /// Unit price (must be greater than zero).
    pub price: Money<'static, Currency>,

    /// Quantity; `None` defaults to 1. Zero is rejected, not coerced.
    pub quantity: Option<u32>,

    /// Free-text description.
    pub description: Option<String>,
}

/// Ordered cart of line items.
#[derive(Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    next_manual_id: u64,
}

impl Cart {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
            next_manual_id: 0,
        }
    }

    /// Add a catalog product to the cart.
    ///
    /// If a line for this product already exists its quantity is incremented
    /// by 1; otherwise a new line is appended with quantity 1, copying the
    /// product's current name, SKU, price and description.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] if the identifier is not in the
    /// catalog, or [`CartError::CurrencyMismatch`] if the product is priced in
    /// a different currency. Neither mutates the cart.
    pub fn add_catalog_item(
        &mut self,
        catalog: &Catalog,
        id: &ProductId,
    ) -> Result<&CartLine, CartError> {
        let line_id = LineId::Catalog(id.clone());

        if let Some(pos) = self.position(&line_id) {
            if let Some(line) = self.lines.get_mut(pos) {
                line.quantity = line.quantity.saturating_add(1);

                debug!(line = %line.id, quantity = line.quantity, "merged catalog item");
            }

            return self
                .lines
                .get(pos)
                .ok_or(CartError::LineNotFound(line_id));
        }

        let product = catalog
            .get(id)
            .ok_or_else(|| CartError::ProductNotFound(id.clone()))?;

        self.check_currency(&product.price)?;
        self.lines.push(line_from_product(id, product));

        debug!(line = %line_id, "added catalog item");

        self.lines
            .last()
            .ok_or(CartError::LineNotFound(line_id))
    }

    /// Add a manual entry to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyName`], [`CartError::NonPositivePrice`],
    /// [`CartError::NonPositiveQuantity`] or [`CartError::CurrencyMismatch`]
    /// without mutating the cart.
    pub fn add_manual_item(&mut self, entry: ManualEntry) -> Result<&CartLine, CartError> {
        let name = entry.name.trim();

        if name.is_empty() {
            return Err(CartError::EmptyName);
        }

        if entry.price.to_minor_units() <= 0 {
            return Err(CartError::NonPositivePrice);
        }

        if entry.quantity == Some(0) {
            return Err(CartError::NonPositiveQuantity);
        }

        self.check_currency(&entry.price)?;

        let id = LineId::Manual(self.next_manual_id);
        self.next_manual_id += 1;

        self.lines.push(CartLine {
            id: id.clone(),
            name: name.to_owned(),
            sku: Some(MANUAL_SKU.to_owned()),
            unit_price: entry.price,
            quantity: entry.quantity.unwrap_or(1),
            description: entry.description,
            manual: true,
        });

        debug!(line = %id, "added manual item");

        self.lines.last().ok_or(CartError::LineNotFound(id))
    }

    /// Adjust a line's quantity by a signed delta, clamped so it never drops
    /// below 1. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line is not in the cart.
    pub fn change_quantity(&mut self, id: &LineId, delta: i64) -> Result<u32, CartError> {
        let line = self.line_mut(id)?;
        let adjusted = i64::from(line.quantity).saturating_add(delta).max(1);

        line.quantity = u32::try_from(adjusted).unwrap_or(u32::MAX);

        Ok(line.quantity)
    }

    /// Set a line's quantity from raw field input.
    ///
    /// Only values parseable as a positive integer are applied; anything else
    /// is silently ignored. Returns whether the quantity changed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line is not in the cart.
    pub fn set_quantity(&mut self, id: &LineId, raw: &str) -> Result<bool, CartError> {
        let line = self.line_mut(id)?;

        match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => {
                line.quantity = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Remove a line from the cart; the cart may become empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line is not in the cart.
    pub fn remove(&mut self, id: &LineId) -> Result<CartLine, CartError> {
        let pos = self
            .position(id)
            .ok_or_else(|| CartError::LineNotFound(id.clone()))?;

        debug!(line = %id, "removed line");

        Ok(self.lines.remove(pos))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in display (insertion) order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of every line in the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, id: &LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == *id)
    }

    fn line_mut(&mut self, id: &LineId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.id == *id)
            .ok_or_else(|| CartError::LineNotFound(id.clone()))
    }

    fn check_currency(&self, price: &Money<'static, Currency>) -> Result<(), CartError> {
        if price.currency() == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

/// Snapshot a catalog product into a fresh line with quantity 1.
///
/// A product with no name falls back to its identifier so the line is still
/// addressable on screen.
fn line_from_product(id: &ProductId, product: &Product) -> CartLine {
    CartLine {
        id: LineId::Catalog(id.clone()),
        name: product
            .name
            .clone()
            .unwrap_or_else(|| id.as_str().to_owned()),
        sku: product.sku.clone(),
        unit_price: product.price,
        quantity: 1,
        description: product.description.clone(),
        manual: false,
    }
}
