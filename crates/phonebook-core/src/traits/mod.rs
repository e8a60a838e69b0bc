//! Core traits for the phonebook system
//!
//! - [`Source`]: Fetch raw bytes (roster CSV, topology data)
//! - [`Exporter`]: Render prepared contacts into a vendor XML dialect

pub mod exporter;
pub mod source;

pub use exporter::Exporter;
pub use source::{Source, SourceFactory};
