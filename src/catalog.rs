//! Catalog cache
//!
//! In-memory cache of the remote product catalog. The remote feed delivers
//! full snapshots; every notification replaces the cache contents outright
//! rather than merging incrementally. If the feed never fires the cache stays
//! empty, searches simply return nothing, and no error is raised.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::products::{Product, ProductId};

/// In-memory cache of the remote product catalog.
///
/// Consumers only ever read through snapshot-style accessors; the live map is
/// never handed out mutably. The generation counter increments once per feed
/// snapshot so consumers can tell a refresh happened.
#[derive(Debug, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
    generation: u64,
}

impl Catalog {
    /// Create an empty catalog cache.
    #[must_use]
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Replace the entire cache contents with a fresh feed snapshot.
    pub fn replace(&mut self, products: impl IntoIterator<Item = (ProductId, Product)>) {
        self.products = products.into_iter().collect();
        self.generation = self.generation.wrapping_add(1);

        debug!(
            products = self.products.len(),
            generation = self.generation,
            "catalog snapshot replaced"
        );
    }

    /// Drain every pending snapshot from a feed, keeping only the last.
    pub fn pump(&mut self, feed: &mut impl CatalogFeed) {
        while let Some(snapshot) = feed.next_snapshot() {
            self.replace(snapshot);
        }
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Iterate over the cached products.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &Product)> {
        self.products.iter()
    }

    /// Number of cached products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of snapshots applied so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Seam to the remote product feed.
///
/// The cache owns the only mutable reference into its map; a feed just hands
/// over full snapshots when the remote collection changes.
pub trait CatalogFeed {
    /// The next full snapshot, if one has arrived since the last poll.
    fn next_snapshot(&mut self) -> Option<Vec<(ProductId, Product)>>;
}

/// In-memory feed backing demos and tests.
#[derive(Debug, Default)]
pub struct StaticFeed {
    pending: VecDeque<Vec<(ProductId, Product)>>,
}

impl StaticFeed {
    /// Create a feed with no pending snapshots.
    #[must_use]
    pub fn new() -> Self {
        StaticFeed::default()
    }

    /// Queue a snapshot for delivery on the next poll.
    pub fn push_snapshot(&mut self, snapshot: Vec<(ProductId, Product)>) {
        self.pending.push_back(snapshot);
    }
}

impl CatalogFeed for StaticFeed {
    fn next_snapshot(&mut self) -> Option<Vec<(ProductId, Product)>> {
        self.pending.pop_front()
    }
}
