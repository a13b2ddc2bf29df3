//! Orderpad prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, LineId, ManualEntry},
    catalog::{Catalog, CatalogFeed, StaticFeed},
    fixtures::{CatalogFixture, FixtureError},
    form::OrderForm,
    notify::{Notification, Notifications, Severity},
    orders::{
        CustomerDetails, MemoryOrderStore, Order, OrderStore, StoreError, SubmitError,
        SubmitState, ValidationError,
    },
    pricing::{Percent, Pricing, PricingError},
    products::{Product, ProductId},
    render::{FormView, cart_table, form_view, totals_block},
    search::{Debouncer, SearchHit, SearchOutcome},
};
