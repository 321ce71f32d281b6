//! Vidiform-Common: Shared types, IDs, and errors.
//!
//! This crate provides the data model used across vidiform:
//!
//! - **Metadata records**: [`MetadataRecord`] with its custom-field routing rules
//!   and the [`PartialMetadata`] merge used by enrichment
//! - **Collection types**: [`FileEntry`], [`FileHandle`], and [`ExportFormat`]
//! - **Typed IDs**: [`EntryId`] for addressing entries independently of their name
//! - **Path Utilities**: media type detection by extension
//! - **Error Handling**: the error taxonomy shared by the core and its collaborators
//!
//! # Examples
//!
//! ```
//! use vidiform_common::{ExportFormat, MetadataRecord};
//!
//! let mut record = MetadataRecord::default();
//! record.set_field("director", "Jane Doe");
//! record.set_field("title", "Night Walk");
//!
//! assert_eq!(record.title, "Night Walk");
//! assert_eq!(record.custom_field("director"), Some("Jane Doe"));
//! assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod record;
pub mod types;

pub use error::{
    EnrichError, ExportError, ExtractError, ImportError, LookupError, NoSelectionError,
    NotFoundError,
};
pub use ids::EntryId;
pub use record::{CustomField, MetadataRecord, PartialMetadata};
pub use types::{ExportFormat, FileEntry, FileHandle};
