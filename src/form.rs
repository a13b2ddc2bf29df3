//! Field order form
//!
//! The single application-state object behind the order-entry page. Every
//! user-interface event maps to one method here; the form owns the catalog
//! cache, the cart, the raw field strings, search state, toasts and the
//! submission lifecycle. There is no global mutable state.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rusty_money::iso::Currency;
use tracing::warn;

use crate::{
    cart::{Cart, LineId, ManualEntry},
    catalog::{Catalog, CatalogFeed},
    notify::{Notifications, Severity},
    orders::{CustomerDetails, OrderStore, SubmitError, SubmitState, submit_order},
    pricing::{Percent, Pricing, price_cart},
    products::{Product, ProductId},
    search::{Debouncer, MIN_QUERY_LEN, SearchOutcome, search},
};

/// Application state for one order-entry form.
#[derive(Debug)]
pub struct OrderForm {
    catalog: Catalog,
    cart: Cart,
    customer: CustomerDetails,
    attendant: String,
    promo_message: String,
    discount_field: String,
    tax_field: String,
    search_field: String,
    debouncer: Debouncer,
    search_outcome: SearchOutcome,
    notifications: Notifications,
    submit_state: SubmitState,
    pricing: Pricing,
}

impl OrderForm {
    /// Create an empty form in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        OrderForm {
            catalog: Catalog::new(),
            cart: Cart::new(currency),
            customer: CustomerDetails::default(),
            attendant: String::new(),
            promo_message: String::new(),
            discount_field: String::new(),
            tax_field: String::new(),
            search_field: String::new(),
            debouncer: Debouncer::new(),
            search_outcome: SearchOutcome::NotSearching,
            notifications: Notifications::new(),
            submit_state: SubmitState::Idle,
            pricing: Pricing::zero(currency),
        }
    }

    /// Apply a full catalog snapshot from the remote feed.
    pub fn replace_catalog(&mut self, products: Vec<(ProductId, Product)>) {
        self.catalog.replace(products);
    }

    /// Drain pending catalog snapshots from a feed.
    pub fn pump_feed(&mut self, feed: &mut impl CatalogFeed) {
        self.catalog.pump(feed);
    }

    /// A keystroke in the search box.
    ///
    /// Short queries hide the results panel immediately; longer ones restart
    /// the debounce timer and run once [`tick`](Self::tick) observes 300ms of
    /// inactivity.
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.search_field = text.to_owned();

        if text.trim().chars().count() < MIN_QUERY_LEN {
            self.debouncer.clear();
            self.search_outcome = SearchOutcome::NotSearching;
        } else {
            self.debouncer.note_input(text, now);
        }
    }

    /// Advance form time: fire a due search and expire old toasts.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.poll(now) {
            self.search_outcome = search(&self.catalog, &query);
        }

        self.notifications.sweep(now);
    }

    /// The user picked a product from the results panel.
    pub fn select_search_result(&mut self, id: &ProductId, now: Instant) {
        match self.cart.add_catalog_item(&self.catalog, id) {
            Ok(line) => {
                let message = format!("{} added to cart", line.name());
                self.notifications.push(Severity::Success, message, now);
            }
            Err(err) => {
                self.notifications.push(Severity::Error, err.to_string(), now);
            }
        }

        self.close_search();
        self.recompute(now);
    }

    /// Close the search box, clearing the query and the results panel.
    pub fn close_search(&mut self) {
        self.search_field.clear();
        self.debouncer.clear();
        self.search_outcome = SearchOutcome::NotSearching;
    }

    /// Add a manual entry to the cart.
    pub fn add_manual_item(&mut self, entry: ManualEntry, now: Instant) {
        match self.cart.add_manual_item(entry) {
            Ok(line) => {
                let message = format!("{} added to cart", line.name());
                self.notifications.push(Severity::Success, message, now);
            }
            Err(err) => {
                self.notifications.push(Severity::Error, err.to_string(), now);
            }
        }

        self.recompute(now);
    }

    /// Per-line quantity increment button.
    pub fn increment_quantity(&mut self, id: &LineId, now: Instant) {
        self.adjust_quantity(id, 1, now);
    }

    /// Per-line quantity decrement button; clamps at 1.
    pub fn decrement_quantity(&mut self, id: &LineId, now: Instant) {
        self.adjust_quantity(id, -1, now);
    }

    /// Direct edit of a line's quantity field. Unparseable or non-positive
    /// input is silently ignored.
    pub fn edit_quantity(&mut self, id: &LineId, raw: &str, now: Instant) {
        match self.cart.set_quantity(id, raw) {
            Ok(true) => self.recompute(now),
            Ok(false) => {}
            Err(err) => self.notifications.push(Severity::Error, err.to_string(), now),
        }
    }

    /// Remove a line from the cart.
    pub fn remove_line(&mut self, id: &LineId, now: Instant) {
        match self.cart.remove(id) {
            Ok(line) => {
                let message = format!("{} removed from cart", line.name());
                self.notifications.push(Severity::Info, message, now);
            }
            Err(err) => {
                self.notifications.push(Severity::Error, err.to_string(), now);
            }
        }

        self.recompute(now);
    }

    /// Edit the discount percentage field.
    pub fn set_discount_field(&mut self, raw: &str, now: Instant) {
        self.discount_field = raw.to_owned();
        self.recompute(now);
    }

    /// Edit the tax percentage field.
    pub fn set_tax_field(&mut self, raw: &str, now: Instant) {
        self.tax_field = raw.to_owned();
        self.recompute(now);
    }

    /// Mutable access to the customer contact fields.
    pub fn customer_mut(&mut self) -> &mut CustomerDetails {
        &mut self.customer
    }

    /// Set the attendant (field marketer) name.
    pub fn set_attendant(&mut self, name: &str) {
        self.attendant = name.to_owned();
    }

    /// Set the promotional message.
    pub fn set_promo_message(&mut self, message: &str) {
        self.promo_message = message.to_owned();
    }

    /// Press the submit button.
    ///
    /// Validation failures surface as distinct error toasts and leave the
    /// form in entry mode. A store failure reports a generic error and keeps
    /// cart and fields intact; a success swaps in the success panel with the
    /// formatted order code.
    pub fn submit(
        &mut self,
        store: &mut dyn OrderStore,
        now: Instant,
        submitted_at: DateTime<Utc>,
    ) -> &SubmitState {
        self.submit_state = SubmitState::Validating;

        let promo = (!self.promo_message.trim().is_empty()).then_some(self.promo_message.as_str());

        // Validation happens once, inside the submitter; a validation error
        // means the store was never touched.
        match submit_order(
            store,
            &self.cart,
            &self.pricing,
            self.customer.clone(),
            &self.attendant,
            promo,
            submitted_at,
        ) {
            Ok(code) => {
                let message = format!("order {code} submitted");
                self.notifications.push(Severity::Success, message, now);
                self.submit_state = SubmitState::Succeeded { code };
            }
            Err(SubmitError::Validation(err)) => {
                self.notifications.push(Severity::Error, err.to_string(), now);
                self.submit_state = SubmitState::Idle;
            }
            Err(err) => {
                warn!(%err, "order submission failed");
                self.notifications.push(
                    Severity::Error,
                    "order could not be submitted, please try again",
                    now,
                );
                self.submit_state = SubmitState::Failed;
            }
        }

        &self.submit_state
    }

    /// Press the reset button. The caller passes the outcome of the
    /// confirmation prompt; nothing happens unless it was confirmed.
    pub fn reset(&mut self, confirmed: bool, now: Instant) {
        if !confirmed {
            return;
        }

        self.clear_form();
        self.notifications.push(Severity::Info, "form cleared", now);
    }

    /// Press "create another order" on the success panel.
    pub fn start_new_order(&mut self) {
        self.clear_form();
    }

    /// The catalog cache.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The pricing breakdown as of the last mutation.
    #[must_use]
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// The search outcome shown in the results panel.
    #[must_use]
    pub fn search_results(&self) -> &SearchOutcome {
        &self.search_outcome
    }

    /// Raw contents of the search box.
    #[must_use]
    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    /// The visible toast queue.
    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Submission lifecycle state.
    #[must_use]
    pub fn submit_state(&self) -> &SubmitState {
        &self.submit_state
    }

    /// Customer contact fields.
    #[must_use]
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Attendant name field.
    #[must_use]
    pub fn attendant(&self) -> &str {
        &self.attendant
    }

    /// Promotional message field.
    #[must_use]
    pub fn promo_message(&self) -> &str {
        &self.promo_message
    }

    /// Raw discount percentage field.
    #[must_use]
    pub fn discount_field(&self) -> &str {
        &self.discount_field
    }

    /// Raw tax percentage field.
    #[must_use]
    pub fn tax_field(&self) -> &str {
        &self.tax_field
    }

    fn adjust_quantity(&mut self, id: &LineId, delta: i64, now: Instant) {
        if let Err(err) = self.cart.change_quantity(id, delta) {
            self.notifications.push(Severity::Error, err.to_string(), now);
        }

        self.recompute(now);
    }

    /// Full recompute of the pricing breakdown after any mutation.
    fn recompute(&mut self, now: Instant) {
        let discount = Percent::parse_field(&self.discount_field);
        let tax = Percent::parse_field(&self.tax_field);

        match price_cart(&self.cart, discount, tax) {
            Ok(pricing) => self.pricing = pricing,
            Err(err) => {
                warn!(%err, "pricing recompute failed");
                self.notifications.push(Severity::Error, err.to_string(), now);
            }
        }
    }

    fn clear_form(&mut self) {
        self.cart.clear();
        self.customer = CustomerDetails::default();
        self.attendant.clear();
        self.promo_message.clear();
        self.discount_field.clear();
        self.tax_field.clear();
        self.close_search();
        self.pricing = Pricing::zero(self.cart.currency());
        self.submit_state = SubmitState::Idle;
    }
}
