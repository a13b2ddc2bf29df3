//! Orderpad
//!
//! Orderpad is the engine behind a single-page field-sales order form: a locally cached product catalog with debounced substring search, a cart with merge and clamp semantics, discount-then-tax pricing, and sequential order submission to a pluggable store.

pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod form;
pub mod notify;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod render;
pub mod search;
pub mod utils;
