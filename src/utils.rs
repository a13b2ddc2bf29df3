//! Utils

use clap::Parser;

/// Arguments for the order form demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Catalog fixture to load from `fixtures/catalog`
    #[clap(short, long, default_value = "field")]
    pub fixture: String,

    /// Discount percentage to apply to the order
    #[clap(short, long, default_value = "10")]
    pub discount: String,

    /// Tax percentage to apply after the discount
    #[clap(short, long, default_value = "16")]
    pub tax: String,
}
