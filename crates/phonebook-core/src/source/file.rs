// # File Source
//
// Reads a local file on every fetch. A missing file is reported as
// `Error::NotFound` so callers can treat an absent optional file (such as
// the OLSR hosts file on a node without OLSR) differently from a read
// failure.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::Error;
use crate::traits::source::{Source, SourceFactory};

/// File-backed source
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    /// Create a source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl Source for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, Error> {
        debug!("Reading {}", self.display);
        match tokio::fs::read(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::not_found(self.display.clone())),
            Err(e) => Err(Error::source(self.display.clone(), e.to_string())),
        }
    }

    fn describe(&self) -> &str {
        &self.display
    }
}

/// Factory for file sources
pub struct FileSourceFactory;

impl SourceFactory for FileSourceFactory {
    fn create(&self, location: &str) -> Result<Box<dyn Source>, Error> {
        let path = location.strip_prefix("file://").unwrap_or(location);
        if !path.starts_with('/') {
            return Err(Error::config(format!("file source path must be absolute: {}", location)));
        }
        Ok(Box::new(FileSource::new(path)))
    }
}
