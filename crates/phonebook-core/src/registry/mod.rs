//! Plugin-based registry
//!
//! The registry maps vendor names to exporters and location schemes to
//! source factories, so adding a phone vendor or a transport means
//! registering it here instead of touching dispatch code.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use phonebook_core::registry::Registry;
//!
//! let registry = Registry::with_builtins();
//! // In phonebook-source-http
//! phonebook_source_http::register(&registry);
//!
//! let source = registry.create_source("http://node/phonebook.csv")?;
//! let xml = registry.render("yealink", &snapshot, &options)?;
//! ```

use crate::entry::Snapshot;
use crate::error::{Error, Result};
use crate::exporter::{self, DirectoryExporter, ExportOptions, GrandstreamExporter};
use crate::source::{FileSourceFactory, scheme_of};
use crate::traits::{Exporter, Source, SourceFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of exporters and source factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes. Exporters are handed out as `Arc`s so a
/// render never holds the registry lock.
#[derive(Default)]
pub struct Registry {
    /// Registered exporters, keyed by lowercase vendor name
    exporters: RwLock<HashMap<String, Arc<dyn Exporter>>>,

    /// Registered source factories, keyed by location scheme
    sources: RwLock<HashMap<String, Arc<dyn SourceFactory>>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in vendors and the file source
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_exporter(Box::new(DirectoryExporter::generic()));
        registry.register_exporter(Box::new(DirectoryExporter::cisco()));
        registry.register_exporter(Box::new(DirectoryExporter::yealink()));
        registry.register_exporter(Box::new(DirectoryExporter::snom()));
        registry.register_exporter(Box::new(GrandstreamExporter::new()));
        registry.register_source("file", Box::new(FileSourceFactory));
        registry
    }

    /// Register an exporter under its vendor name
    pub fn register_exporter(&self, exporter: Box<dyn Exporter>) {
        let name = exporter.vendor().to_lowercase();
        let mut exporters = self.exporters.write().unwrap_or_else(PoisonError::into_inner);
        exporters.insert(name, Arc::from(exporter));
    }

    /// Register a source factory for a location scheme
    ///
    /// # Parameters
    ///
    /// - `scheme`: `"file"`, `"http"`, `"https"`, ...
    /// - `factory`: Factory object for creating source instances
    pub fn register_source(&self, scheme: impl Into<String>, factory: Box<dyn SourceFactory>) {
        let scheme = scheme.into().to_lowercase();
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        sources.insert(scheme, Arc::from(factory));
    }

    /// Look up an exporter by vendor name (case-insensitive)
    pub fn exporter(&self, vendor: &str) -> Result<Arc<dyn Exporter>> {
        let key = vendor.trim().to_lowercase();
        let exporters = self.exporters.read().unwrap_or_else(PoisonError::into_inner);
        exporters
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::export(format!("unknown target {:?}", vendor)))
    }

    /// Render a snapshot for a vendor
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The XML document
    /// - `Err(Error::Export)`: Unknown vendor
    pub fn render(&self, vendor: &str, snapshot: &Snapshot, options: &ExportOptions) -> Result<Vec<u8>> {
        let strategy = self.exporter(vendor)?;
        exporter::render(strategy.as_ref(), snapshot, options)
    }

    /// Create a source for a path or URL
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Source>)`: Created source instance
    /// - `Err(Error::Config)`: Unsupported scheme or no factory registered for it
    pub fn create_source(&self, location: &str) -> Result<Box<dyn Source>> {
        let scheme = scheme_of(location)?;
        let factory = {
            let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
            sources
                .get(&scheme)
                .cloned()
                .ok_or_else(|| Error::config(format!("no source registered for scheme '{}'", scheme)))?
        };
        factory.create(location)
    }

    /// List all registered vendors, sorted
    pub fn list_exporters(&self) -> Vec<String> {
        let exporters = self.exporters.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = exporters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a vendor is registered
    pub fn has_exporter(&self, vendor: &str) -> bool {
        self.exporter(vendor).is_ok()
    }

    /// Check if a source scheme is registered
    pub fn has_source(&self, scheme: &str) -> bool {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.contains_key(&scheme.to_lowercase())
    }
}
