//! Metadata enrichment from external lookup services.
//!
//! This module defines the [`Enricher`] trait the collection uses to fill in
//! descriptive metadata (title, year, genre, description) for a file, and the
//! concrete backends that implement it.
//!
//! # Module layout
//!
//! - [`enricher`] -- Trait definition.
//! - [`providers`] -- Concrete backends (TMDB).

pub mod enricher;
pub mod providers;

pub use enricher::Enricher;
pub use providers::TmdbEnricher;
