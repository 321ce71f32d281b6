//! Vidiform - video metadata import, editing and export
//!
//! This library crate exposes the collection workflow for the CLI and for
//! integration testing.

pub mod collection;
pub mod config;
pub mod export;
pub mod metadata;
pub mod probe;
