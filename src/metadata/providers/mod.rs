//! Concrete enrichment backends.

pub mod tmdb;

pub use tmdb::TmdbEnricher;
