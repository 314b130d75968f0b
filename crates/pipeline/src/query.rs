//! MetadataQuery - an attribute filter request against the catalog.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{CandidateIdFilter, GenreFilter, MultiplayerFilter, PriceRangeFilter};
use data_loader::GameId;
use serde::Serialize;

/// Results returned when the caller doesn't say otherwise
pub const DEFAULT_LIMIT: usize = 10;

/// Only this many candidate ids are considered; the rest are ignored
pub const MAX_CANDIDATE_IDS: usize = 100;

/// Conjunction of optional predicates. Unset fields are not applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataQuery {
    pub candidate_ids: Option<Vec<GameId>>,
    pub max_price: Option<f64>,
    pub min_price: Option<f64>,
    /// Every listed genre must be present on a record
    pub genres: Vec<String>,
    /// Only `Some(true)` restricts results; `Some(false)` means "don't care"
    pub require_multiplayer: Option<bool>,
    pub limit: usize,
}

impl Default for MetadataQuery {
    fn default() -> Self {
        Self {
            candidate_ids: None,
            max_price: None,
            min_price: None,
            genres: Vec::new(),
            require_multiplayer: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl MetadataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate_ids(mut self, ids: impl IntoIterator<Item = GameId>) -> Self {
        self.candidate_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    pub fn with_multiplayer(mut self, required: bool) -> Self {
        self.require_multiplayer = Some(required);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// True when no attribute predicate is set (only the limit applies)
    pub fn is_unconstrained(&self) -> bool {
        self.candidate_ids.is_none()
            && self.max_price.is_none()
            && self.min_price.is_none()
            && self.genres.is_empty()
            && self.require_multiplayer != Some(true)
    }

    /// Turn the set fields into a FilterPipeline, one filter per field
    pub fn to_pipeline(&self) -> FilterPipeline {
        let mut pipeline = FilterPipeline::new();

        if let Some(ids) = &self.candidate_ids {
            if ids.len() > MAX_CANDIDATE_IDS {
                tracing::warn!(
                    "{} candidate ids given, only the first {} are used",
                    ids.len(),
                    MAX_CANDIDATE_IDS
                );
            }
            pipeline = pipeline.add_filter(CandidateIdFilter::new(
                ids.iter().take(MAX_CANDIDATE_IDS).cloned(),
            ));
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            pipeline = pipeline.add_filter(PriceRangeFilter::new(self.min_price, self.max_price));
        }
        if !self.genres.is_empty() {
            pipeline = pipeline.add_filter(GenreFilter::new(self.genres.clone()));
        }
        if self.require_multiplayer == Some(true) {
            pipeline = pipeline.add_filter(MultiplayerFilter);
        }

        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let query = MetadataQuery::new();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.is_unconstrained());
        assert!(query.to_pipeline().is_empty());
    }

    #[test]
    fn test_builder_adds_one_filter_per_field() {
        let query = MetadataQuery::new()
            .with_max_price(15.38)
            .with_min_price(1.0)
            .with_genre("Puzzle")
            .with_multiplayer(true)
            .with_candidate_ids(vec!["1".to_string()]);

        assert!(!query.is_unconstrained());
        // min and max share one price filter
        assert_eq!(query.to_pipeline().len(), 4);
    }

    #[test]
    fn test_multiplayer_false_is_not_a_filter() {
        let query = MetadataQuery::new().with_multiplayer(false);
        assert!(query.is_unconstrained());
        assert!(query.to_pipeline().is_empty());
    }
}
