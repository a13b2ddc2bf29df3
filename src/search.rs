//! Search
//!
//! Debounced substring search over the catalog cache. A query shorter than
//! [`MIN_QUERY_LEN`] characters means "not searching" rather than "zero
//! matches", so the results panel stays hidden regardless of the catalog.

use std::time::{Duration, Instant};

use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{catalog::Catalog, products::ProductId};

/// Minimum query length (in characters) before a search runs.
pub const MIN_QUERY_LEN: usize = 2;

/// Inactivity window before a pending query fires.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// One catalog product matched by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Identifier of the matched product.
    pub id: ProductId,

    /// Product name, if the catalog record carries one.
    pub name: Option<String>,

    /// Product SKU, if the catalog record carries one.
    pub sku: Option<String>,

    /// Unit price.
    pub price: Money<'static, Currency>,
}

/// Result of running a query against the catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchOutcome {
    /// The query was too short to count as a search; no panel is shown.
    #[default]
    NotSearching,

    /// The query ran; the panel shows these hits (possibly none).
    Results(Vec<SearchHit>),
}

impl SearchOutcome {
    /// Whether a results panel should be visible at all.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self, SearchOutcome::Results(_))
    }
}

/// Run a case-insensitive substring search over the catalog.
///
/// Matches against product name or SKU; a product missing either field simply
/// cannot match on it. Hits are sorted by name then identifier so the outcome
/// is stable across snapshots.
#[must_use]
pub fn search(catalog: &Catalog, query: &str) -> SearchOutcome {
    let trimmed = query.trim();

    if trimmed.chars().count() < MIN_QUERY_LEN {
        return SearchOutcome::NotSearching;
    }

    let needle = trimmed.to_lowercase();

    let mut hits: Vec<SearchHit> = catalog
        .iter()
        .filter(|(_, product)| {
            field_matches(product.name.as_deref(), &needle)
                || field_matches(product.sku.as_deref(), &needle)
        })
        .map(|(id, product)| SearchHit {
            id: id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.price,
        })
        .collect();

    hits.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));

    debug!(query = %trimmed, hits = hits.len(), "search executed");

    SearchOutcome::Results(hits)
}

/// An absent field never matches; a present one matches case-insensitively.
fn field_matches(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Cancellable debounce timer owned by the search component.
///
/// Every keystroke replaces the pending deadline; the query is yielded exactly
/// once when a poll observes the deadline has passed. Driven entirely by
/// injected [`Instant`]s, so tests never sleep.
#[derive(Debug)]
pub struct Debouncer {
    pending: Option<(String, Instant)>,
    delay: Duration,
}

impl Debouncer {
    /// Create a debouncer with the standard [`DEBOUNCE`] delay.
    #[must_use]
    pub fn new() -> Self {
        Debouncer::with_delay(DEBOUNCE)
    }

    /// Create a debouncer with a custom delay.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Debouncer {
            pending: None,
            delay,
        }
    }

    /// Record a keystroke: cancel any pending query and restart the timer.
    pub fn note_input(&mut self, query: &str, now: Instant) {
        self.pending = Some((query.to_owned(), now + self.delay));
    }

    /// Yield the pending query if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| *deadline <= now);

        if due {
            self.pending.take().map(|(query, _)| query)
        } else {
            None
        }
    }

    /// Cancel any pending query.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Whether a query is waiting on its deadline.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KES;

    use crate::products::Product;

    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();

        catalog.replace(vec![
            (
                ProductId::new("p1"),
                Product::new("Cabbage Sack", Money::from_minor(4_500, KES)).with_sku("VEG-CAB"),
            ),
            (
                ProductId::new("p2"),
                Product::new("Tea Leaves", Money::from_minor(9_900, KES)).with_sku("TEA-AB1"),
            ),
            (
                ProductId::new("p3"),
                Product {
                    name: None,
                    sku: None,
                    price: Money::from_minor(100, KES),
                    description: None,
                },
            ),
        ]);

        catalog
    }

    #[test]
    fn one_char_query_is_not_searching() {
        let outcome = search(&catalog(), "a");

        assert_eq!(outcome, SearchOutcome::NotSearching);
        assert!(!outcome.is_searching());
    }

    #[test]
    fn two_char_query_matches_name_and_sku_case_insensitively() {
        let SearchOutcome::Results(hits) = search(&catalog(), "ab") else {
            unreachable!("two characters must run a search");
        };

        // "ab" appears in "Cabbage Sack" (name) and "TEA-AB1" (SKU).
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.first().map(|h| h.id.as_str()), Some("p1"));
        assert_eq!(hits.get(1).map(|h| h.id.as_str()), Some("p2"));
    }

    #[test]
    fn products_missing_name_and_sku_never_match() {
        let SearchOutcome::Results(hits) = search(&catalog(), "p3") else {
            unreachable!("two characters must run a search");
        };

        assert!(hits.is_empty());
    }

    #[test]
    fn whitespace_only_query_is_not_searching() {
        assert_eq!(search(&catalog(), "   "), SearchOutcome::NotSearching);
    }

    #[test]
    fn query_is_trimmed_before_matching() {
        let SearchOutcome::Results(hits) = search(&catalog(), "  tea  ") else {
            unreachable!("trimmed query is long enough to search");
        };

        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn debouncer_fires_only_after_deadline() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.note_input("tea", t0);

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(300)),
            Some("tea".to_owned())
        );
    }

    #[test]
    fn debouncer_yields_query_exactly_once() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.note_input("tea", t0);

        let fire_at = t0 + DEBOUNCE;
        assert!(debouncer.poll(fire_at).is_some());
        assert!(debouncer.poll(fire_at).is_none());
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn new_keystroke_replaces_pending_deadline() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.note_input("te", t0);
        debouncer.note_input("tea", t0 + Duration::from_millis(200));

        // The first deadline has passed, but it was cancelled by the second
        // keystroke; only the newer query fires, at its own deadline.
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(500)),
            Some("tea".to_owned())
        );
    }

    #[test]
    fn clear_cancels_pending_query() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.note_input("tea", t0);
        debouncer.clear();

        assert_eq!(debouncer.poll(t0 + DEBOUNCE), None);
    }
}
