// # phonebook-core
//
// Core library for the mesh phonebook.
//
// ## Architecture Overview
//
// This library turns a contact roster into the XML phonebooks read by VoIP
// desk phones on a mesh network:
// - **Importer**: Parses roster CSV into ordered [`Entry`] values
// - **Network**: Builds host maps from mesh topology data and enriches entries
// - **RecordStore**: Holds the current [`Snapshot`] for concurrent readers
// - **Refresher**: Periodically re-imports, re-enriches and swaps the snapshot
// - **Exporters**: Render a snapshot in a vendor's XML dialect
// - **Registry**: Plugin-based registry for exporters and sources
//
// ## Design Principles
//
// 1. **Immutable snapshots**: A refresh builds a new snapshot; readers never
//    see a partial one
// 2. **Plugin-based**: Vendors and transports are registered, not hard-coded
// 3. **Library-first**: The daemon is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod network;
pub mod registry;
pub mod source;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{ExportConfig, PhonebookConfig, ServerConfig, TopologyConfig};
pub use engine::{RefreshEvent, Refresher, Topology};
pub use entry::{Entry, NetworkInfo, Snapshot};
pub use error::{Error, ErrorKind, Result};
pub use exporter::{ExportOptions, Format};
pub use registry::Registry;
pub use store::RecordStore;
pub use traits::{Exporter, Source, SourceFactory};
