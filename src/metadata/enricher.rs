//! Trait definition for metadata enrichment backends.

use async_trait::async_trait;
use vidiform_common::{LookupError, PartialMetadata};

/// Async trait that all enrichment backends must implement.
///
/// An enricher wraps a single external lookup service and maps a title to
/// descriptive metadata. Implementations must keep "nothing matched"
/// (`Ok(None)`) apart from "the lookup failed" (`Err`), so callers can tell
/// the user which one happened.
///
/// Enrichers are shared behind an `Arc` and must not hold per-call state.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Short, lowercase identifier for this backend (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the backend has the credentials it needs.
    fn is_available(&self) -> bool;

    /// Look up descriptive metadata for `title`.
    async fn lookup(&self, title: &str) -> Result<Option<PartialMetadata>, LookupError>;
}
