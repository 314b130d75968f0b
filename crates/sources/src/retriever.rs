//! The semantic retrieval capability.
//!
//! Workers only see this trait. The in-process [`KeywordRetriever`] is one
//! implementation; a vector-index client would be another.
//!
//! [`KeywordRetriever`]: crate::keyword::KeywordRetriever

use crate::types::{RetrievalError, RetrievedCandidate};

/// Free-text query in, ranked candidates out.
///
/// ## Design Note
/// - Synchronous on purpose: the in-process backend is CPU-bound, so async
///   callers run it through `spawn_blocking`
/// - `Send + Sync` so one retriever can be shared behind an `Arc`
pub trait SemanticRetriever: Send + Sync {
    /// Returns the name of this retriever (for logging/debugging)
    fn name(&self) -> &str;

    /// Return at most `limit` candidates for `query`, best first
    fn retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedCandidate>, RetrievalError>;
}
