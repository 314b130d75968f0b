//! Core traits for the filtering pipeline.

use anyhow::Result;
use data_loader::GameRecord;

/// One attribute predicate over catalog records.
///
/// Filters borrow records from the catalog rather than cloning them; the
/// store clones only what survives every filter.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Keep the records that satisfy this filter, preserving their order.
    fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>>;
}
