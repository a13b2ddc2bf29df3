//! Orders
//!
//! Validation, order assembly and submission against a pluggable append-only
//! document store. Orders are snapshots: once written, this client never
//! mutates them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    cart::{Cart, CartLine},
    pricing::{Pricing, PricingError, line_total},
};

/// Fixed prefix of every human-readable order code.
pub const ORDER_PREFIX: &str = "B2B";

/// Source tag stamped on every order this client writes.
pub const ORDER_SOURCE: &str = "field-order";

/// Initial status of every submitted order.
pub const ORDER_STATUS_PENDING: &str = "pending";

/// Customer contact fields from the entry form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Customer name (required).
    pub name: String,

    /// Customer phone (required).
    pub phone: String,

    /// Company (optional).
    pub company: Option<String>,

    /// Email (optional).
    pub email: Option<String>,

    /// Address (optional).
    pub address: Option<String>,
}

/// Pre-submission validation failures, in the order they are checked.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    /// Customer name is blank.
    #[error("customer name is required")]
    MissingCustomerName,

    /// Customer phone is blank.
    #[error("customer phone is required")]
    MissingCustomerPhone,

    /// Attendant name is blank.
    #[error("attendant name is required")]
    MissingAttendant,

    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,
}

/// Errors from the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading from the store failed.
    #[error("order store read failed: {0}")]
    Read(String),

    /// Writing to the store failed.
    #[error("order store write failed: {0}")]
    Write(String),
}

/// Everything that can go wrong between pressing submit and a stored order.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A required field is missing or the cart is empty.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote write or number reservation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Submission lifecycle of the form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// Nothing in flight.
    #[default]
    Idle,

    /// Required fields are being checked.
    Validating,

    /// The order record is being written.
    Submitting,

    /// The write landed; the success panel shows this code.
    Succeeded {
        /// Formatted order code, e.g. `B2B-007`.
        code: String,
    },

    /// The write failed; the form stays intact for a manual retry.
    Failed,
}

/// One cart line frozen into an order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Line identifier (product id or generated manual id).
    pub id: String,

    /// Display name.
    pub name: String,

    /// SKU, if any; manual lines carry the sentinel.
    pub sku: Option<String>,

    /// Unit price in minor units.
    pub unit_price_minor: i64,

    /// Quantity.
    pub quantity: u32,

    /// Line total in minor units.
    pub total_minor: i64,

    /// Whether the line was entered manually.
    pub manual: bool,

    /// Free-text description, if any.
    pub description: Option<String>,
}

/// Pricing breakdown frozen into an order record, in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of line totals.
    pub subtotal_minor: i64,

    /// Discount rate in percent points.
    pub discount_percent: Decimal,

    /// Discount amount.
    pub discount_minor: i64,

    /// Tax rate in percent points.
    pub tax_percent: Decimal,

    /// Tax amount.
    pub tax_minor: i64,

    /// Final payable amount.
    pub grand_total_minor: i64,
}

/// Immutable order snapshot written to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Sequential order number reserved from the store.
    pub order_number: u64,

    /// Customer contact details.
    pub customer: CustomerDetails,

    /// Attendant (field marketer) who took the order.
    pub attendant: String,

    /// Frozen cart lines.
    pub lines: Vec<OrderLine>,

    /// ISO alpha code of the order currency.
    pub currency: String,

    /// Frozen pricing breakdown.
    pub totals: OrderTotals,

    /// Promotional message attached to the order, if any.
    pub promo_message: Option<String>,

    /// Initial status; always [`ORDER_STATUS_PENDING`].
    pub status: String,

    /// Source tag; always [`ORDER_SOURCE`].
    pub source: String,

    /// Client-side submission timestamp.
    pub submitted_at: DateTime<Utc>,
}

/// Seam to the append-only order collection.
///
/// The source design derived the next order number by reading the collection
/// count and adding one, which races under concurrent writers. Stores here
/// reserve the number instead; the memory store does it atomically in the
/// single-writer sense, and a remote implementation is expected to use a
/// transactional counter.
pub trait OrderStore {
    /// Current number of persisted orders.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    fn count(&self) -> Result<u64, StoreError>;

    /// Reserve the next sequential order number.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the counter cannot be advanced.
    fn reserve_order_number(&mut self) -> Result<u64, StoreError>;

    /// Append one order record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails.
    fn append(&mut self, order: Order) -> Result<(), StoreError>;
}

/// In-memory order store for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Vec<Order>,
    reserved: u64,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        MemoryOrderStore::default()
    }

    /// Orders appended so far, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl OrderStore for MemoryOrderStore {
    fn count(&self) -> Result<u64, StoreError> {
        Ok(u64::try_from(self.orders.len()).unwrap_or(u64::MAX))
    }

    fn reserve_order_number(&mut self) -> Result<u64, StoreError> {
        // Reservation survives a failed append, so numbers may have gaps but
        // never duplicates.
        let persisted = u64::try_from(self.orders.len()).unwrap_or(u64::MAX);
        self.reserved = self.reserved.max(persisted).saturating_add(1);

        Ok(self.reserved)
    }

    fn append(&mut self, order: Order) -> Result<(), StoreError> {
        self.orders.push(order);

        Ok(())
    }
}

/// Check the required fields, in form order; the first failure wins.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(
    customer: &CustomerDetails,
    attendant: &str,
    cart: &Cart,
) -> Result<(), ValidationError> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::MissingCustomerName);
    }

    if customer.phone.trim().is_empty() {
        return Err(ValidationError::MissingCustomerPhone);
    }

    if attendant.trim().is_empty() {
        return Err(ValidationError::MissingAttendant);
    }

    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    Ok(())
}

/// Freeze the current cart, pricing and form fields into an order record.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line total cannot be computed.
pub fn build_order(
    cart: &Cart,
    pricing: &Pricing,
    customer: CustomerDetails,
    attendant: &str,
    promo_message: Option<&str>,
    order_number: u64,
    submitted_at: DateTime<Utc>,
) -> Result<Order, PricingError> {
    let lines = cart
        .iter()
        .map(freeze_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Order {
        order_number,
        customer,
        attendant: attendant.trim().to_owned(),
        lines,
        currency: cart.currency().iso_alpha_code.to_owned(),
        totals: OrderTotals {
            subtotal_minor: pricing.subtotal.to_minor_units(),
            discount_percent: pricing.discount_percent.points(),
            discount_minor: pricing.discount_amount.to_minor_units(),
            tax_percent: pricing.tax_percent.points(),
            tax_minor: pricing.tax_amount.to_minor_units(),
            grand_total_minor: pricing.grand_total.to_minor_units(),
        },
        promo_message: promo_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToOwned::to_owned),
        status: ORDER_STATUS_PENDING.to_owned(),
        source: ORDER_SOURCE.to_owned(),
        submitted_at,
    })
}

/// Validate, reserve a number, write the order and return its display code.
///
/// On a store failure the caller's cart and fields are untouched; nothing is
/// retried automatically.
///
/// # Errors
///
/// Returns a [`SubmitError`] for the first validation failure, a pricing
/// failure, or a store failure.
pub fn submit_order(
    store: &mut dyn OrderStore,
    cart: &Cart,
    pricing: &Pricing,
    customer: CustomerDetails,
    attendant: &str,
    promo_message: Option<&str>,
    submitted_at: DateTime<Utc>,
) -> Result<String, SubmitError> {
    validate(&customer, attendant, cart)?;

    let order_number = store.reserve_order_number()?;
    let order = build_order(
        cart,
        pricing,
        customer,
        attendant,
        promo_message,
        order_number,
        submitted_at,
    )?;

    if let Err(err) = store.append(order) {
        error!(order_number, %err, "order write failed");
        return Err(err.into());
    }

    let code = format_order_code(&order_number.to_string());

    info!(order_number, %code, "order submitted");

    Ok(code)
}

/// Format a raw order-number value into a display code.
///
/// Numeric values are zero-padded to three digits (`7` becomes `B2B-007`).
/// A value that merely contains digits has its first digit run extracted and
/// formatted the same way. A value with no digits at all is truncated to
/// three characters and left-padded with zeros.
#[must_use]
pub fn format_order_code(raw: &str) -> String {
    if let Some(number) = first_digit_run(raw) {
        return format!("{ORDER_PREFIX}-{number:03}");
    }

    let tail: String = raw.chars().take(3).collect();

    format!("{ORDER_PREFIX}-{tail:0>3}")
}

/// The first contiguous run of ASCII digits, parsed; `None` when the value
/// has no digits or the run overflows.
fn first_digit_run(raw: &str) -> Option<u64> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// Freeze one cart line into its order representation.
fn freeze_line(line: &CartLine) -> Result<OrderLine, PricingError> {
    Ok(OrderLine {
        id: line.id().to_string(),
        name: line.name().to_owned(),
        sku: line.sku().map(ToOwned::to_owned),
        unit_price_minor: line.unit_price().to_minor_units(),
        quantity: line.quantity(),
        total_minor: line_total(line)?.to_minor_units(),
        manual: line.is_manual(),
        description: line.description().map(ToOwned::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::KES};
    use testresult::TestResult;

    use crate::{
        cart::ManualEntry,
        pricing::{Percent, price_cart},
    };

    use super::*;

    fn filled_customer() -> CustomerDetails {
        CustomerDetails {
            name: "Amina W.".to_owned(),
            phone: "+254 700 000001".to_owned(),
            company: None,
            email: None,
            address: None,
        }
    }

    fn one_line_cart() -> Result<Cart, crate::cart::CartError> {
        let mut cart = Cart::new(KES);

        cart.add_manual_item(ManualEntry {
            name: "Chai Crate".to_owned(),
            price: Money::from_minor(100_000, KES),
            quantity: Some(2),
            description: None,
        })?;

        Ok(cart)
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn validation_checks_fields_in_form_order() -> TestResult {
        let cart = one_line_cart()?;
        let empty_cart = Cart::new(KES);

        let blank = CustomerDetails::default();
        assert_eq!(
            validate(&blank, "", &empty_cart),
            Err(ValidationError::MissingCustomerName)
        );

        let mut customer = CustomerDetails {
            name: "Amina W.".to_owned(),
            ..CustomerDetails::default()
        };
        assert_eq!(
            validate(&customer, "", &empty_cart),
            Err(ValidationError::MissingCustomerPhone)
        );

        customer.phone = "+254 700 000001".to_owned();
        assert_eq!(
            validate(&customer, "  ", &empty_cart),
            Err(ValidationError::MissingAttendant)
        );

        assert_eq!(
            validate(&customer, "Joseph", &empty_cart),
            Err(ValidationError::EmptyCart)
        );

        assert_eq!(validate(&customer, "Joseph", &cart), Ok(()));

        Ok(())
    }

    #[test]
    fn submit_writes_order_and_returns_code() -> TestResult {
        let cart = one_line_cart()?;
        let pricing = price_cart(&cart, Percent::zero(), Percent::zero())?;
        let mut store = MemoryOrderStore::new();

        let code = submit_order(
            &mut store,
            &cart,
            &pricing,
            filled_customer(),
            "Joseph",
            Some("August promo"),
            submitted_at(),
        )?;

        assert_eq!(code, "B2B-001");
        assert_eq!(store.orders().len(), 1);

        let order = store.orders().first().ok_or("missing order")?;

        assert_eq!(order.order_number, 1);
        assert_eq!(order.status, ORDER_STATUS_PENDING);
        assert_eq!(order.source, ORDER_SOURCE);
        assert_eq!(order.currency, "KES");
        assert_eq!(order.promo_message.as_deref(), Some("August promo"));
        assert_eq!(order.totals.subtotal_minor, 200_000);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(
            order.lines.first().map(|l| l.total_minor),
            Some(200_000)
        );

        Ok(())
    }

    #[test]
    fn validation_failure_means_no_store_write() -> TestResult {
        let cart = one_line_cart()?;
        let pricing = price_cart(&cart, Percent::zero(), Percent::zero())?;
        let mut store = MemoryOrderStore::new();

        let result = submit_order(
            &mut store,
            &cart,
            &pricing,
            CustomerDetails::default(),
            "Joseph",
            None,
            submitted_at(),
        );

        assert!(matches!(
            result,
            Err(SubmitError::Validation(ValidationError::MissingCustomerName))
        ));
        assert!(store.orders().is_empty());
        assert_eq!(store.count()?, 0);

        Ok(())
    }

    #[test]
    fn sequential_numbers_across_submissions() -> TestResult {
        let cart = one_line_cart()?;
        let pricing = price_cart(&cart, Percent::zero(), Percent::zero())?;
        let mut store = MemoryOrderStore::new();

        for expected in 1..=3_u64 {
            let code = submit_order(
                &mut store,
                &cart,
                &pricing,
                filled_customer(),
                "Joseph",
                None,
                submitted_at(),
            )?;

            assert_eq!(code, format!("B2B-{expected:03}"));
        }

        Ok(())
    }

    #[test]
    fn failed_append_does_not_reuse_reserved_numbers() -> TestResult {
        let mut store = MemoryOrderStore::new();

        assert_eq!(store.reserve_order_number()?, 1);
        // The append for number 1 never happened; the next reservation still
        // moves forward.
        assert_eq!(store.reserve_order_number()?, 2);

        Ok(())
    }

    #[test]
    fn order_serializes_to_a_flat_document() -> TestResult {
        let cart = one_line_cart()?;
        let pricing = price_cart(&cart, Percent::zero(), Percent::zero())?;

        let order = build_order(
            &cart,
            &pricing,
            filled_customer(),
            "Joseph",
            None,
            7,
            submitted_at(),
        )?;

        let yaml = serde_norway::to_string(&order)?;

        assert!(yaml.contains("order_number: 7"), "order number serialized");
        assert!(yaml.contains("status: pending"), "status serialized");

        Ok(())
    }

    #[test]
    fn order_codes_pad_to_three_digits() {
        assert_eq!(format_order_code("7"), "B2B-007");
        assert_eq!(format_order_code("123"), "B2B-123");
        assert_eq!(format_order_code("1024"), "B2B-1024");
    }

    #[test]
    fn order_codes_extract_first_digit_run() {
        assert_eq!(format_order_code("A77B2"), "B2B-077");
        assert_eq!(format_order_code("draft-9"), "B2B-009");
    }

    #[test]
    fn order_codes_fall_back_for_non_numeric_values() {
        assert_eq!(format_order_code("abcdef"), "B2B-abc");
        assert_eq!(format_order_code("ab"), "B2B-0ab");
        assert_eq!(format_order_code(""), "B2B-000");
    }
}
