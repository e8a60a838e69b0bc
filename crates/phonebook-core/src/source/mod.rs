// # Source Implementations
//
// Built-in [`Source`](crate::traits::Source) implementations. HTTP lives in
// its own crate so the core does not pull in an HTTP client.

pub mod file;

pub use file::{FileSource, FileSourceFactory};

use crate::error::{Error, Result};

/// Scheme used to pick a source factory for a location
///
/// `http://` and `https://` URLs yield their scheme, absolute paths yield
/// `"file"`. Anything else is a configuration error.
pub fn scheme_of(location: &str) -> Result<String> {
    if let Some((scheme, _)) = location.split_once("://") {
        return Ok(scheme.to_lowercase());
    }
    if location.starts_with('/') {
        return Ok("file".to_string());
    }
    Err(Error::config(format!(
        "unknown or unsupported path scheme for '{}' (needs to be an absolute file path or http/https URL)",
        location
    )))
}
