//! MetadataStore - point lookup and attribute scan over the catalog.

use crate::query::MetadataQuery;
use anyhow::Result;
use data_loader::{GameIndex, GameRecord};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Catalog lookups the workers depend on.
pub trait MetadataStore: Send + Sync {
    /// Records matching every predicate in `query`, cheapest first.
    ///
    /// Records without a price sort last; ties break by id so the order is
    /// stable. At most `query.limit` records are returned.
    fn filter_by_attributes(&self, query: &MetadataQuery) -> Result<Vec<GameRecord>>;

    /// Point lookup. A missing id is `None`, not an error.
    fn get_by_id(&self, id: &str) -> Option<GameRecord>;
}

/// MetadataStore over the in-memory [`GameIndex`]
#[derive(Clone)]
pub struct InMemoryMetadataStore {
    index: Arc<GameIndex>,
}

impl InMemoryMetadataStore {
    pub fn new(index: Arc<GameIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<GameIndex> {
        &self.index
    }

    /// Records worth running the filters over.
    ///
    /// A genre constraint narrows the scan to the first genre's index entry;
    /// the genre filter still checks every requested genre afterwards.
    fn scan_set(&self, query: &MetadataQuery) -> Vec<&GameRecord> {
        match query.genres.first() {
            Some(genre) => self
                .index
                .get_games_by_genre(genre)
                .iter()
                .filter_map(|id| self.index.get_game(id))
                .collect(),
            None => self.index.iter().collect(),
        }
    }
}

fn price_order(a: &GameRecord, b: &GameRecord) -> Ordering {
    match (a.price_cents, b.price_cents) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

impl MetadataStore for InMemoryMetadataStore {
    #[instrument(skip(self, query), fields(limit = query.limit))]
    fn filter_by_attributes(&self, query: &MetadataQuery) -> Result<Vec<GameRecord>> {
        let pipeline = query.to_pipeline();

        let scanned = self.scan_set(query);
        let scanned_len = scanned.len();
        let mut matches = pipeline.apply(scanned)?;
        debug!("{} of {} scanned records matched", matches.len(), scanned_len);

        matches.sort_by(|a, b| price_order(a, b));
        Ok(matches
            .into_iter()
            .take(query.limit)
            .cloned()
            .collect())
    }

    fn get_by_id(&self, id: &str) -> Option<GameRecord> {
        self.index.get_game(id).cloned()
    }
}
