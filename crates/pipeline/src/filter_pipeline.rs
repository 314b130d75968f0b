//! The FilterPipeline chains filters together.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::GameRecord;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(PriceRangeFilter::new(None, Some(15.38)))
///     .add_filter(GenreFilter::new(vec!["Puzzle".to_string()]));
///
/// let matching = pipeline.apply(index.iter().collect())?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence; the result is the conjunction of them.
    pub fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>> {
        let mut current = games;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current)?;
            tracing::debug!(
                "Filter applied: {} ({} -> {})",
                filter.name(),
                before,
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
