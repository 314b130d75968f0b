//! Metadata lookup over the game catalog.
//!
//! This crate provides:
//! - Filter trait and implementations for attribute predicates
//! - FilterPipeline for composing filters
//! - MetadataQuery, the attribute filter request
//! - MetadataStore trait and the in-memory store behind it
//! - QueryHints, which reads budget/genre/multiplayer wishes out of free text
//!
//! ## Architecture
//! A query is processed in stages:
//! 1. The MetadataQuery is turned into a FilterPipeline (unset fields add no filter)
//! 2. Every catalog record is scanned through the pipeline
//! 3. Survivors are sorted by ascending price (unpriced last) and truncated
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{InMemoryMetadataStore, MetadataQuery, MetadataStore, QueryHints};
//!
//! let store = InMemoryMetadataStore::new(index.clone());
//!
//! // "puzzle games under 20,000 won"
//! let query = QueryHints::extract("2만원 이하 퍼즐 게임", 1300.0).to_query();
//! for game in store.filter_by_attributes(&query)? {
//!     println!("{} ${:?}", game.name, game.price());
//! }
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod query;
pub mod query_hints;
pub mod store;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use query::{MetadataQuery, DEFAULT_LIMIT, MAX_CANDIDATE_IDS};
pub use query_hints::QueryHints;
pub use store::{InMemoryMetadataStore, MetadataStore};
