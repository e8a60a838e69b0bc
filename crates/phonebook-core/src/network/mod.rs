//! Mesh network enrichment
//!
//! A [`HostMap`] maps the first label of a mesh hostname (`node1` for
//! `node1.local.mesh`) to the topology facts for that host. It is built from
//! either an OLSR hosts file ([`parse_hosts`]) or a sysinfo JSON document
//! ([`parse_sysinfo`]) and then attached to freshly imported entries with
//! [`enrich`].

pub mod hosts;
pub mod sysinfo;

pub use hosts::parse_hosts;
pub use sysinfo::parse_sysinfo;

use crate::entry::{Entry, NetworkInfo};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Hostname label → topology facts
pub type HostMap = HashMap<String, Arc<NetworkInfo>>;

/// Lookup key for a hostname: its first dot-separated label
pub fn host_label(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Insert a host unless its label is already present
pub(crate) fn insert_host(map: &mut HostMap, info: NetworkInfo) {
    let label = host_label(&info.hostname).to_string();
    if label.is_empty() {
        return;
    }
    map.entry(label).or_insert_with(|| Arc::new(info));
}

/// Attach network data to every entry whose address host is in `hosts`
///
/// Entries without a usable address or without a matching host are
/// returned unchanged. The host map is not modified.
pub fn enrich(entries: Vec<Entry>, hosts: &HostMap) -> Vec<Entry> {
    let mut matched = 0usize;
    let entries: Vec<Entry> = entries
        .into_iter()
        .map(|mut entry| {
            if let Some(info) = entry.host_key().and_then(|key| hosts.get(key)) {
                entry.network = Some(Arc::clone(info));
                matched += 1;
            }
            entry
        })
        .collect();

    debug!("Enriched {} of {} entries", matched, entries.len());
    entries
}
