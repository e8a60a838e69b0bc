// # HTTP Source
//
// This crate provides an HTTP-based source for the mesh phonebook.
//
// ## Purpose
//
// Rosters are usually published as a CSV export of a shared spreadsheet,
// and topology data comes from a node's `cgi-bin/sysinfo.json?hosts=1`.
// Both are plain GETs; every fetch downloads the full document.
//
// ## Usage
//
// ```rust,ignore
// let registry = Registry::with_builtins();
// phonebook_source_http::register(&registry);
// let source = registry.create_source("https://example.org/roster.csv")?;
// ```

use phonebook_core::registry::Registry;
use phonebook_core::traits::{Source, SourceFactory};
use phonebook_core::{Error, Result};

use std::time::Duration;

/// Request timeout for a single fetch
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP(S) source
pub struct HttpSource {
    /// URL to fetch
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source
    ///
    /// # Parameters
    ///
    /// - `url`: Full URL of the document (e.g., "http://localnode.local.mesh/cgi-bin/sysinfo.json?hosts=1")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl Source for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::source(self.url.clone(), format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::source(
                self.url.clone(),
                format!("HTTP error: {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::source(self.url.clone(), format!("Failed to read response: {}", e)))?;

        Ok(body.to_vec())
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

/// Factory for creating HTTP sources
pub struct HttpFactory;

impl SourceFactory for HttpFactory {
    fn create(&self, location: &str) -> Result<Box<dyn Source>> {
        let lower = location.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(Error::config(format!("not an HTTP URL: {}", location)));
        }
        Ok(Box::new(HttpSource::new(location)))
    }
}

/// Register the HTTP source with a registry for both `http` and `https`
pub fn register(registry: &Registry) {
    registry.register_source("http", Box::new(HttpFactory));
    registry.register_source("https", Box::new(HttpFactory));
}
