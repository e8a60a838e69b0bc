//! Contact records and the snapshots that hold them

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Separator between the callsign and the host part of a SIP address
pub const SIP_SEPARATOR: char = '@';

/// Mesh topology fact about a single host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Full hostname as reported by the topology source
    pub hostname: String,
    /// IP address of the host
    pub ip: String,
    /// Whether the host is currently reachable
    pub active: bool,
}

impl NetworkInfo {
    /// Create a new network info record
    pub fn new(hostname: impl Into<String>, ip: impl Into<String>, active: bool) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
            active,
        }
    }
}

/// One contact row from the roster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub first_name: String,
    pub last_name: String,
    pub callsign: String,
    /// Internal extension dialed through the PBX
    pub phone_number: String,
    /// `callsign@host` handle used for direct calls and enrichment lookups
    pub address: String,
    /// Attached by enrichment; shared with the host map of the same refresh
    pub network: Option<Arc<NetworkInfo>>,
}

impl Entry {
    /// Create an entry without an address or network data
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        callsign: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            callsign: callsign.into(),
            phone_number: phone_number.into(),
            ..Self::default()
        }
    }

    /// Set the SIP address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Attach network data
    pub fn with_network(mut self, network: Arc<NetworkInfo>) -> Self {
        self.network = Some(network);
        self
    }

    /// Host label used to look the entry up in a host map
    ///
    /// `AS1@node1.local.mesh` yields `node1`. Addresses that do not split
    /// into exactly two parts around `@` have no key.
    pub fn host_key(&self) -> Option<&str> {
        let mut parts = self.address.split(SIP_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(host), None) => host.split('.').next(),
            _ => None,
        }
    }

    /// Whether enrichment marked the entry as reachable
    pub fn is_active(&self) -> bool {
        self.network.as_ref().is_some_and(|n| n.active)
    }

    /// Human readable name: `last, first (callsign)` from the non-empty parts
    pub fn display_name(&self) -> String {
        let names: Vec<&str> = [self.last_name.as_str(), self.first_name.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let mut name = names.join(", ");
        if !self.callsign.is_empty() {
            if name.is_empty() {
                name.push_str(&self.callsign);
            } else {
                name.push_str(&format!(" ({})", self.callsign));
            }
        }
        name
    }
}

/// Immutable result of one refresh cycle
///
/// Snapshots are never edited after construction. A refresh builds a new
/// one and swaps it into the [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<Entry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The empty snapshot served before the first refresh
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot stamped with the current time
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the snapshot was produced; `None` for the initial empty snapshot
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
