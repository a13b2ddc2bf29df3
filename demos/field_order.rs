//! Field Order Demo
//!
//! This demo walks one order through the form: catalog ingest, debounced
//! search, catalog and manual cart lines, discount and tax, and submission.
//!
//! Use `-f` to load a catalog fixture by name from `fixtures/catalog`
//! Use `-d` to set the discount percentage field
//! Use `-t` to set the tax percentage field

use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use rusty_money::Money;

use orderpad::{
    cart::{LineId, ManualEntry},
    catalog::StaticFeed,
    fixtures::CatalogFixture,
    form::OrderForm,
    orders::{MemoryOrderStore, SubmitState},
    products::ProductId,
    render::{cart_table, form_view, totals_block},
    search::{DEBOUNCE, SearchOutcome},
    utils::DemoArgs,
};

/// Field Order Demo
#[expect(clippy::print_stdout, reason = "Demo code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = DemoArgs::parse();

    let fixture = CatalogFixture::load("fixtures/catalog", &args.fixture)?;
    let currency = fixture.currency();

    let mut feed = StaticFeed::new();
    feed.push_snapshot(fixture.into_products());

    let mut form = OrderForm::new(currency);
    form.pump_feed(&mut feed);

    println!(
        "loaded {} products from fixture '{}'",
        form.catalog().len(),
        args.fixture
    );

    // Type a query, then let the debounce elapse before the tick.
    let t0 = Instant::now();
    form.search_input("cha", t0);
    form.tick(t0 + DEBOUNCE);

    let picked: Vec<ProductId> = match form.search_results() {
        SearchOutcome::Results(hits) => hits.iter().map(|hit| hit.id.clone()).collect(),
        SearchOutcome::NotSearching => Vec::new(),
    };

    println!("search 'cha' returned {} hit(s)", picked.len());

    for id in &picked {
        form.select_search_result(id, t0 + DEBOUNCE);
    }

    form.select_search_result(&ProductId::new("sugar-bale"), t0 + DEBOUNCE);
    form.increment_quantity(&LineId::Catalog(ProductId::new("sugar-bale")), t0 + DEBOUNCE);

    form.add_manual_item(
        ManualEntry {
            name: "Delivery surcharge".to_owned(),
            price: Money::from_minor(50_000, currency),
            quantity: None,
            description: Some("Outside the usual route".to_owned()),
        },
        t0 + DEBOUNCE,
    );

    form.set_discount_field(&args.discount, t0 + DEBOUNCE);
    form.set_tax_field(&args.tax, t0 + DEBOUNCE);

    form.customer_mut().name = "Amina Wanjiru".to_owned();
    form.customer_mut().phone = "+254 700 000001".to_owned();
    form.customer_mut().email = Some("amina@example.com".to_owned());
    form.set_attendant("Joseph K.");
    form.set_promo_message("August bulk pricing");

    let view = form_view(&form);

    println!("\n{}", cart_table(&view));
    println!("{}", totals_block(&view));

    let mut store = MemoryOrderStore::new();

    match form.submit(&mut store, t0 + DEBOUNCE, Utc::now()) {
        SubmitState::Succeeded { code } => println!("\norder {code} submitted"),
        state => println!("\nsubmission did not complete: {state:?}"),
    }

    for toast in &form_view(&form).toasts {
        println!("[{:?}] {}", toast.severity, toast.message);
    }

    Ok(())
}
