// # Sysinfo topology
//
// AREDN nodes expose `cgi-bin/sysinfo.json?hosts=1`, which lists the hosts
// known to the mesh:
//
// ```json
// { "node": "node1", "hosts": [ { "name": "node2", "ip": "10.0.0.6" } ] }
// ```
//
// Listed hosts are reachable unless the document says otherwise through an
// explicit `active` flag.

use super::{HostMap, insert_host};
use crate::entry::NetworkInfo;
use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SysInfo {
    hosts: Vec<SysInfoHost>,
}

#[derive(Debug, Deserialize)]
struct SysInfoHost {
    name: String,
    ip: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Parse a sysinfo JSON document into a host map
pub fn parse_sysinfo(raw: &[u8]) -> Result<HostMap> {
    let info: SysInfo = serde_json::from_slice(raw)
        .map_err(|e| Error::network(format!("invalid sysinfo document: {}", e)))?;

    let mut map = HostMap::new();
    for host in info.hosts {
        insert_host(&mut map, NetworkInfo::new(host.name, host.ip, host.active));
    }
    Ok(map)
}
