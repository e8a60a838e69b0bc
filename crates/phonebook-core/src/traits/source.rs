// # Source Trait
//
// Defines the interface for fetching raw bytes from wherever a roster or a
// topology document lives.
//
// ## Implementations
//
// - File-based: [`FileSource`](crate::source::FileSource) in this crate
// - HTTP: `phonebook-source-http` crate
//
// Sources only move bytes. Parsing belongs to the importer and the
// network module.

use async_trait::async_trait;

/// Trait for byte sources
///
/// Implementations must be safe to share between the refresh loop and
/// on-demand refreshes.
#[async_trait]
pub trait Source: Send + Sync {
    /// Fetch the full content
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The raw content
    /// - `Err(Error::NotFound)`: A file-backed source does not exist
    /// - `Err(Error)`: Any other fetch failure
    async fn fetch(&self) -> Result<Vec<u8>, crate::Error>;

    /// Path or URL, for logs and error messages
    fn describe(&self) -> &str;
}

/// Helper trait for constructing sources from a location string
pub trait SourceFactory: Send + Sync {
    /// Create a Source for `location` (an absolute path or a URL)
    fn create(&self, location: &str) -> Result<Box<dyn Source>, crate::Error>;
}
