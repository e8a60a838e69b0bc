// # OLSR hosts file
//
// The mesh routing daemon writes every reachable host into a hosts(5)
// style file (`/tmp/run/hosts_olsr` on AREDN nodes):
//
// ```text
// 10.0.0.5    node1.local.mesh    # myself
// 10.0.0.6    node2               # 10.0.0.5
// ```
//
// Every host listed there is currently routable, so all parsed hosts are
// marked active.

use super::{HostMap, insert_host};
use crate::entry::NetworkInfo;
use crate::error::{Error, Result};
use std::net::IpAddr;

/// Parse an OLSR hosts file into a host map
pub fn parse_hosts(raw: &[u8]) -> Result<HostMap> {
    let text = std::str::from_utf8(raw).map_err(|_| Error::network("hosts file is not valid UTF-8"))?;

    let mut map = HostMap::new();
    for (line_num, line) in text.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((data, _comment)) => data,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(ip), Some(hostname)) = (fields.next(), fields.next()) else {
            return Err(Error::network(format!(
                "hosts file line {}: expected `ip hostname`",
                line_num + 1
            )));
        };
        if ip.parse::<IpAddr>().is_err() {
            return Err(Error::network(format!(
                "hosts file line {}: invalid IP address '{}'",
                line_num + 1,
                ip
            )));
        }

        insert_host(&mut map, NetworkInfo::new(hostname, ip, true));
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hosts() {
        let raw = b"# header comment\n\
            10.0.0.5\tnode1.local.mesh\t# myself\n\
            \n\
            10.0.0.6  node2   alias2  # 10.0.0.5\n";

        let map = parse_hosts(raw).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["node1"].hostname, "node1.local.mesh");
        assert_eq!(map["node1"].ip, "10.0.0.5");
        assert!(map["node1"].active);
        assert_eq!(map["node2"].ip, "10.0.0.6");
    }

    #[test]
    fn test_parse_hosts_rejects_short_line() {
        let err = parse_hosts(b"10.0.0.5\n").unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_parse_hosts_rejects_bad_ip() {
        let err = parse_hosts(b"node1 10.0.0.5\n").unwrap_err();
        assert!(err.to_string().contains("invalid IP address"));
    }

    #[test]
    fn test_parse_hosts_empty() {
        assert!(parse_hosts(b"").unwrap().is_empty());
    }
}
