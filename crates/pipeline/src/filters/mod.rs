//! Filter implementations for the metadata pipeline.
//!
//! Each filter is one attribute predicate; a MetadataQuery turns into a
//! FilterPipeline holding one filter per field it sets.

pub mod candidate_ids;
pub mod genre;
pub mod multiplayer;
pub mod price_range;

// Re-export for convenience
pub use candidate_ids::CandidateIdFilter;
pub use genre::GenreFilter;
pub use multiplayer::MultiplayerFilter;
pub use price_range::PriceRangeFilter;
