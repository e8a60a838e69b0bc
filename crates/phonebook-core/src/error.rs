//! Error types for the phonebook system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for phonebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the phonebook system
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or incomplete roster input
    #[error("Import error: {0}")]
    Import(String),

    /// Topology source unreachable or unparsable
    #[error("Network error: {0}")]
    Network(String),

    /// Unknown vendor or format requested by a caller
    #[error("Export error: {0}")]
    Export(String),

    /// Fetching raw bytes from a source failed
    #[error("Source error ({source_name}): {message}")]
    Source {
        /// Source description (path or URL)
        source_name: String,
        /// Error message
        message: String,
    },

    /// A file-backed source does not exist
    #[error("Not found: {0}")]
    NotFound(String),

}

/// Coarse classification used at the serving boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Startup configuration problem
    Config,
    /// Roster could not be imported
    Import,
    /// Topology data could not be loaded
    Network,
    /// Caller asked for something that does not exist
    Export,
    /// Everything else
    Internal,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an import error
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Create a source error
    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Import(_) => ErrorKind::Import,
            Self::Network(_) => ErrorKind::Network,
            Self::Export(_) => ErrorKind::Export,
            Self::Source { .. } | Self::NotFound(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was caused by caller input rather than by the system
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Export
    }
}
