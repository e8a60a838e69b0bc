//! Exporter engine
//!
//! Rendering happens in two steps:
//!
//! 1. [`prepare`] walks a snapshot in order, drops entries excluded by
//!    `filter_inactive`, applies the active prefix and resolves the dial
//!    targets required by the [`Format`].
//! 2. A vendor [`Exporter`] lays the resulting [`Contact`] list out in its
//!    own XML schema.
//!
//! ## Formats
//!
//! | Format   | Dial target(s)                                              |
//! |----------|-------------------------------------------------------------|
//! | Direct   | network IP when `resolve` and enriched, otherwise `address` |
//! | PBX      | `phone_number`                                              |
//! | Combined | PBX target, then Direct target                              |

pub mod directory;
pub mod grandstream;
mod xml;

pub use directory::DirectoryExporter;
pub use grandstream::GrandstreamExporter;

use crate::entry::{Entry, Snapshot};
use crate::error::{Error, Result};
use crate::traits::Exporter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dialing-mode policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Call the contact's node directly
    Direct,
    /// Call the contact's extension through the PBX
    Pbx,
    /// Offer both
    Combined,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Direct, Format::Pbx, Format::Combined];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Direct => "direct",
            Format::Pbx => "pbx",
            Format::Combined => "combined",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "d" | "direct" => Ok(Format::Direct),
            "p" | "pbx" => Ok(Format::Pbx),
            "c" | "combined" => Ok(Format::Combined),
            _ => Err(Error::export(format!("unknown format: {:?}", s))),
        }
    }
}

/// Per-render configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: Format,
    /// Dial enriched entries by IP instead of by address
    pub resolve: bool,
    /// Prefix active entries' names with `active_prefix`
    pub indicate_active: bool,
    /// Leave out entries that are not known to be active
    pub filter_inactive: bool,
    pub active_prefix: String,
}

impl ExportOptions {
    /// Options with every flag off
    pub fn new(format: Format) -> Self {
        Self {
            format,
            resolve: false,
            indicate_active: false,
            filter_inactive: false,
            active_prefix: String::new(),
        }
    }

    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_indicate_active(mut self, indicate_active: bool, prefix: impl Into<String>) -> Self {
        self.indicate_active = indicate_active;
        self.active_prefix = prefix.into();
        self
    }

    pub fn with_filter_inactive(mut self, filter_inactive: bool) -> Self {
        self.filter_inactive = filter_inactive;
        self
    }
}

/// Dial target(s) for one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialTargets<'a> {
    Single(&'a str),
    Both { pbx: &'a str, direct: &'a str },
}

impl<'a> DialTargets<'a> {
    /// Targets in render order (PBX first for combined)
    pub fn to_vec(self) -> Vec<&'a str> {
        match self {
            DialTargets::Single(target) => vec![target],
            DialTargets::Both { pbx, direct } => vec![pbx, direct],
        }
    }
}

/// An entry ready for a vendor exporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact<'a> {
    pub entry: &'a Entry,
    /// Active prefix, or empty
    pub prefix: &'a str,
    pub dial: DialTargets<'a>,
}

impl Contact<'_> {
    /// Display name including the active prefix
    pub fn display_name(&self) -> String {
        format!("{}{}", self.prefix, self.entry.display_name())
    }
}

fn direct_target<'a>(entry: &'a Entry, options: &ExportOptions) -> &'a str {
    match &entry.network {
        Some(network) if options.resolve => &network.ip,
        _ => &entry.address,
    }
}

/// Filter and annotate snapshot entries for rendering
pub fn prepare<'a>(snapshot: &'a Snapshot, options: &'a ExportOptions) -> Vec<Contact<'a>> {
    snapshot
        .entries()
        .iter()
        .filter(|entry| !options.filter_inactive || entry.is_active())
        .map(|entry| {
            let prefix = if options.indicate_active && entry.is_active() {
                options.active_prefix.as_str()
            } else {
                ""
            };
            let dial = match options.format {
                Format::Direct => DialTargets::Single(direct_target(entry, options)),
                Format::Pbx => DialTargets::Single(&entry.phone_number),
                Format::Combined => DialTargets::Both {
                    pbx: &entry.phone_number,
                    direct: direct_target(entry, options),
                },
            };
            Contact { entry, prefix, dial }
        })
        .collect()
}

/// Render a snapshot with a given exporter
pub fn render(exporter: &dyn Exporter, snapshot: &Snapshot, options: &ExportOptions) -> Result<Vec<u8>> {
    let contacts = prepare(snapshot, options);
    tracing::debug!(
        "Rendering {} of {} entries for {} ({})",
        contacts.len(),
        snapshot.len(),
        exporter.vendor(),
        options.format
    );
    exporter.render(&contacts)
}
