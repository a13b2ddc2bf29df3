//! Render
//!
//! Pure mapping from form state to a display view-model, plus a text
//! rendering of the cart table. No business logic lives here; everything is
//! derived from [`OrderForm`] accessors so it can be tested without any
//! user interface.

use std::fmt::Write as _;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};

use crate::{
    form::OrderForm,
    notify::Severity,
    orders::SubmitState,
    pricing::line_total,
    search::SearchOutcome,
};

/// One cart line ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    /// Line identifier, for wiring row buttons back to events.
    pub id: String,

    /// Display name.
    pub name: String,

    /// SKU column value; blank when the product has none.
    pub sku: String,

    /// Formatted unit price.
    pub unit_price: String,

    /// Quantity.
    pub quantity: u32,

    /// Formatted line total.
    pub total: String,

    /// Whether the line is a manual entry.
    pub manual: bool,
}

/// The subtotal/discount/tax/grand-total block.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsView {
    /// Formatted subtotal.
    pub subtotal: String,

    /// Discount rate label, e.g. `10%`.
    pub discount_label: String,

    /// Formatted discount amount.
    pub discount_amount: String,

    /// Tax rate label, e.g. `16%`.
    pub tax_label: String,

    /// Formatted tax amount.
    pub tax_amount: String,

    /// Formatted grand total.
    pub grand_total: String,
}

/// One row of the search results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct HitView {
    /// Product identifier, for wiring the row back to a selection event.
    pub id: String,

    /// Display label: name, with the SKU in parentheses when present.
    pub label: String,

    /// Formatted unit price.
    pub price: String,
}

/// The search results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    /// Whether the panel is shown at all.
    pub visible: bool,

    /// Rows to show when visible.
    pub hits: Vec<HitView>,
}

/// One visible toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastView {
    /// Severity, for styling.
    pub severity: Severity,

    /// Message text.
    pub message: String,
}

/// Everything the page needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    /// Cart rows in display order.
    pub lines: Vec<LineView>,

    /// Totals block.
    pub totals: TotalsView,

    /// Search results panel.
    pub search: SearchView,

    /// When set, the success panel replaces the entry form and shows this
    /// order code.
    pub success_code: Option<String>,

    /// Visible toasts, oldest first.
    pub toasts: Vec<ToastView>,
}

impl FormView {
    /// Whether the entry form (rather than the success panel) is shown.
    #[must_use]
    pub fn entry_visible(&self) -> bool {
        self.success_code.is_none()
    }
}

/// Build the view-model for the current form state.
#[must_use]
pub fn form_view(form: &OrderForm) -> FormView {
    let lines = form
        .cart()
        .iter()
        .map(|line| LineView {
            id: line.id().to_string(),
            name: line.name().to_owned(),
            sku: line.sku().unwrap_or_default().to_owned(),
            unit_price: format_money(&line.unit_price()),
            quantity: line.quantity(),
            total: line_total(line)
                .map(|total| format_money(&total))
                .unwrap_or_else(|_| "—".to_owned()),
            manual: line.is_manual(),
        })
        .collect();

    let pricing = form.pricing();

    let totals = TotalsView {
        subtotal: format_money(&pricing.subtotal),
        discount_label: pricing.discount_percent.to_string(),
        discount_amount: format_money(&pricing.discount_amount),
        tax_label: pricing.tax_percent.to_string(),
        tax_amount: format_money(&pricing.tax_amount),
        grand_total: format_money(&pricing.grand_total),
    };

    let search = match form.search_results() {
        SearchOutcome::NotSearching => SearchView {
            visible: false,
            hits: Vec::new(),
        },
        SearchOutcome::Results(hits) => SearchView {
            visible: true,
            hits: hits
                .iter()
                .map(|hit| HitView {
                    id: hit.id.to_string(),
                    label: hit_label(hit.name.as_deref(), hit.sku.as_deref(), hit.id.as_str()),
                    price: format_money(&hit.price),
                })
                .collect(),
        },
    };

    let success_code = match form.submit_state() {
        SubmitState::Succeeded { code } => Some(code.clone()),
        SubmitState::Idle
        | SubmitState::Validating
        | SubmitState::Submitting
        | SubmitState::Failed => None,
    };

    let toasts = form
        .notifications()
        .iter()
        .map(|toast| ToastView {
            severity: toast.severity(),
            message: toast.message().to_owned(),
        })
        .collect();

    FormView {
        lines,
        totals,
        search,
        success_code,
        toasts,
    }
}

/// Render the cart rows as a text table.
#[must_use]
pub fn cart_table(view: &FormView) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Item", "SKU", "Unit Price", "Qty", "Total"]);

    for line in &view.lines {
        builder.push_record([
            line.name.as_str(),
            line.sku.as_str(),
            line.unit_price.as_str(),
            &line.quantity.to_string(),
            line.total.as_str(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    table.to_string()
}

/// Render the totals block with right-aligned labels.
#[must_use]
pub fn totals_block(view: &FormView) -> String {
    let totals = &view.totals;

    let rows = [
        ("Subtotal:".to_owned(), &totals.subtotal),
        (
            format!("Discount ({}):", totals.discount_label),
            &totals.discount_amount,
        ),
        (format!("Tax ({}):", totals.tax_label), &totals.tax_amount),
        ("Grand Total:".to_owned(), &totals.grand_total),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    let mut out = String::new();

    for (label, value) in &rows {
        _ = writeln!(out, "{label:>label_width$}  {value:>value_width$}");
    }

    out
}

/// Format a money value with a fixed currency-code prefix, thousands
/// separators and the currency's minor-unit precision, e.g. `KES 2,088.00`.
#[must_use]
pub fn format_money(money: &Money<'static, Currency>) -> String {
    let currency = money.currency();
    let minor = money.to_minor_units();

    let exponent = usize::try_from(currency.exponent).unwrap_or(2);
    let scale = 10_u64.pow(currency.exponent);

    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let major = group_thousands(abs / scale);

    if exponent == 0 {
        return format!("{} {sign}{major}", currency.iso_alpha_code);
    }

    let frac = abs % scale;

    format!(
        "{} {sign}{major}.{frac:0exponent$}",
        currency.iso_alpha_code
    )
}

/// Insert a separator every three digits from the right.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }

        out.push(ch);
    }

    out
}

/// Label for one search hit: name (or identifier) with the SKU appended.
fn hit_label(name: Option<&str>, sku: Option<&str>, id: &str) -> String {
    let base = name.unwrap_or(id);

    match sku {
        Some(sku) => format!("{base} ({sku})"),
        None => base.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use rusty_money::iso::{JPY, KES};
    use testresult::TestResult;

    use crate::{
        cart::ManualEntry,
        products::{Product, ProductId},
    };

    use super::*;

    fn hit_label_for(name: Option<&str>, sku: Option<&str>) -> String {
        hit_label(name, sku, "p9")
    }

    #[test]
    fn money_formats_with_code_prefix_and_separators() {
        assert_eq!(
            format_money(&Money::from_minor(208_800, KES)),
            "KES 2,088.00"
        );
        assert_eq!(format_money(&Money::from_minor(0, KES)), "KES 0.00");
        assert_eq!(format_money(&Money::from_minor(5, KES)), "KES 0.05");
        assert_eq!(
            format_money(&Money::from_minor(123_456_789, KES)),
            "KES 1,234,567.89"
        );
    }

    #[test]
    fn money_formats_zero_exponent_currencies_without_decimals() {
        assert_eq!(format_money(&Money::from_minor(1_500, JPY)), "JPY 1,500");
    }

    #[test]
    fn hit_labels_prefer_name_and_append_sku() {
        assert_eq!(
            hit_label_for(Some("Chai Crate"), Some("CHAI-12")),
            "Chai Crate (CHAI-12)"
        );
        assert_eq!(hit_label_for(Some("Chai Crate"), None), "Chai Crate");
        assert_eq!(hit_label_for(None, Some("CHAI-12")), "p9 (CHAI-12)");
        assert_eq!(hit_label_for(None, None), "p9");
    }

    #[test]
    fn empty_form_views_as_zero_totals_and_hidden_panels() {
        let form = OrderForm::new(KES);
        let view = form_view(&form);

        assert!(view.lines.is_empty());
        assert_eq!(view.totals.subtotal, "KES 0.00");
        assert_eq!(view.totals.grand_total, "KES 0.00");
        assert!(!view.search.visible);
        assert!(view.success_code.is_none());
        assert!(view.entry_visible());
    }

    #[test]
    fn view_includes_line_totals_and_pricing_block() -> TestResult {
        let mut form = OrderForm::new(KES);
        let t0 = Instant::now();

        form.replace_catalog(vec![(
            ProductId::new("p1"),
            Product::new("Chai Crate", Money::from_minor(100_000, KES)).with_sku("CHAI-12"),
        )]);
        form.select_search_result(&ProductId::new("p1"), t0);
        form.increment_quantity(&crate::cart::LineId::Catalog(ProductId::new("p1")), t0);
        form.set_discount_field("10", t0);
        form.set_tax_field("16", t0);

        let view = form_view(&form);
        let line = view.lines.first().ok_or("missing line view")?;

        assert_eq!(line.total, "KES 2,000.00");
        assert_eq!(line.quantity, 2);
        assert_eq!(view.totals.discount_label, "10%");
        assert_eq!(view.totals.discount_amount, "KES 200.00");
        assert_eq!(view.totals.tax_amount, "KES 288.00");
        assert_eq!(view.totals.grand_total, "KES 2,088.00");

        Ok(())
    }

    #[test]
    fn cart_table_lists_lines_and_headers() {
        let mut form = OrderForm::new(KES);
        let t0 = Instant::now();

        form.add_manual_item(
            ManualEntry {
                name: "Crate of Sodas".to_owned(),
                price: Money::from_minor(80_000, KES),
                quantity: Some(3),
                description: None,
            },
            t0,
        );

        let view = form_view(&form);
        let table = cart_table(&view);

        assert!(table.contains("Crate of Sodas"), "item name in table");
        assert!(table.contains("MANUAL"), "sentinel sku in table");
        assert!(table.contains("KES 2,400.00"), "line total in table");
    }

    #[test]
    fn totals_block_lines_up_labels() {
        let form = OrderForm::new(KES);
        let block = totals_block(&form_view(&form));

        assert!(block.contains("Subtotal:"), "subtotal label present");
        assert!(block.contains("Grand Total:"), "grand total label present");
        assert_eq!(block.lines().count(), 4, "four totals rows");
    }
}
