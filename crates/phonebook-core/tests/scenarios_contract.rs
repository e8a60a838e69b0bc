//! Contract Test: End-to-End Rendering
//!
//! Constraints verified:
//! - Roster order, privacy filter and blank-row terminator survive a full
//!   import, enrich and render pass
//! - Direct dialing resolves to the enriched IP only when asked to
//! - The active prefix and inactive filter follow network state
//! - Rendering the same snapshot twice yields identical bytes

mod common;

use common::*;
use phonebook_core::engine::Topology;
use phonebook_core::entry::Snapshot;
use phonebook_core::exporter::{ExportOptions, Format};
use phonebook_core::importer;
use phonebook_core::network::{self, HostMap};
use phonebook_core::registry::Registry;
use phonebook_core::{Entry, NetworkInfo};
use std::sync::Arc;
use std::time::Duration;

const ROSTER: &str = "first_name,name,callsign,telephone\nAlice,Smith,AS1,100\nBob,Jones,BJ2,101\n";

fn render(vendor: &str, snapshot: &Snapshot, options: &ExportOptions) -> String {
    let xml = Registry::with_builtins().render(vendor, snapshot, options).unwrap();
    String::from_utf8(xml).unwrap()
}

fn node1() -> HostMap {
    let mut hosts = HostMap::new();
    hosts.insert("node1".to_string(), Arc::new(NetworkInfo::new("node1", "10.0.0.5", true)));
    hosts
}

fn enriched_alice() -> Snapshot {
    let entries = vec![Entry::new("Alice", "Smith", "AS1", "100").with_address("AS1@node1.local.mesh")];
    Snapshot::new(network::enrich(entries, &node1()))
}

#[test]
fn roster_without_address_renders_empty_direct_targets() {
    let snapshot = Snapshot::new(importer::import(ROSTER.as_bytes()).unwrap());
    let xml = render("generic", &snapshot, &ExportOptions::new(Format::Direct));

    assert_eq!(xml.matches("<DirectoryEntry>").count(), 2);
    assert_eq!(xml.matches("<Telephone></Telephone>").count(), 2);

    let alice = xml.find("<Name>Smith, Alice (AS1)</Name>").unwrap();
    let bob = xml.find("<Name>Jones, Bob (BJ2)</Name>").unwrap();
    assert!(alice < bob);
}

#[test]
fn private_rows_never_reach_the_phonebook() {
    let csv = "first_name,name,callsign,telephone,privat\nAlice,Smith,AS1,100, y \nBob,Jones,BJ2,101,n\n";
    let snapshot = Snapshot::new(importer::import(csv.as_bytes()).unwrap());
    let xml = render("generic", &snapshot, &ExportOptions::new(Format::Pbx));

    assert!(!xml.contains("Alice"));
    assert!(xml.contains("<Name>Jones, Bob (BJ2)</Name>"));
    assert!(xml.contains("<Telephone>101</Telephone>"));
}

#[test]
fn rows_after_blank_row_are_ignored() {
    let csv = format!("{}\nAlice,Smith,AS1,100\n,,,\nBob,Jones,BJ2,101\n", HEADER);
    let entries = importer::import(csv.as_bytes()).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].callsign, "AS1");
}

#[test]
fn import_preserves_row_order() {
    let rows: Vec<(String, String)> = (0..50).map(|i| (format!("CS{}", i), format!("{}", 200 + i))).collect();
    let mut csv = format!("{}\n", HEADER);
    for (callsign, phone) in &rows {
        csv.push_str(&format!("First,Last,{},{}\n", callsign, phone));
    }

    let entries = importer::import(csv.as_bytes()).unwrap();
    let callsigns: Vec<&str> = entries.iter().map(|e| e.callsign.as_str()).collect();
    let expected: Vec<&str> = rows.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(callsigns, expected);
}

#[test]
fn resolve_dials_enriched_ip() {
    let snapshot = enriched_alice();

    let xml = render("generic", &snapshot, &ExportOptions::new(Format::Direct).with_resolve(true));
    assert!(xml.contains("<Telephone>10.0.0.5</Telephone>"));

    let xml = render("generic", &snapshot, &ExportOptions::new(Format::Direct));
    assert!(xml.contains("<Telephone>AS1@node1.local.mesh</Telephone>"));
}

#[test]
fn active_prefix_marks_display_name() {
    let snapshot = enriched_alice();
    let options = ExportOptions::new(Format::Direct)
        .with_resolve(true)
        .with_indicate_active(true, "*");

    let xml = render("generic", &snapshot, &options);
    assert!(xml.contains("<Name>*Smith, Alice (AS1)</Name>"));

    let xml = render("grandstream", &snapshot, &options);
    assert!(xml.contains("<LastName>*Smith</LastName>"));
    assert!(xml.contains("<phonenumber>10.0.0.5</phonenumber>"));
}

#[test]
fn filter_inactive_leaves_only_active_entries() {
    let mut hosts = node1();
    hosts.insert("node2".to_string(), Arc::new(NetworkInfo::new("node2", "10.0.0.6", false)));
    let entries = vec![
        Entry::new("Alice", "Smith", "AS1", "100").with_address("AS1@node1.local.mesh"),
        Entry::new("Bob", "Jones", "BJ2", "101").with_address("BJ2@node2.local.mesh"),
        Entry::new("Carol", "White", "CW3", "102").with_address("CW3@node3.local.mesh"),
        Entry::new("Dave", "Brown", "DB4", "103"),
    ];
    let snapshot = Snapshot::new(network::enrich(entries, &hosts));
    let options = ExportOptions::new(Format::Combined).with_filter_inactive(true);

    for vendor in Registry::with_builtins().list_exporters() {
        let xml = render(&vendor, &snapshot, &options);
        assert!(xml.contains("Alice"), "{} dropped an active entry", vendor);
        for name in ["Bob", "Carol", "Dave"] {
            assert!(!xml.contains(name), "{} kept inactive entry {}", vendor, name);
        }
    }
}

#[test]
fn rendering_is_deterministic() {
    let snapshot = enriched_alice();
    let registry = Registry::with_builtins();

    for vendor in registry.list_exporters() {
        for format in Format::ALL {
            let options = ExportOptions::new(format)
                .with_resolve(true)
                .with_indicate_active(true, "*");
            let first = registry.render(&vendor, &snapshot, &options).unwrap();
            let second = registry.render(&vendor, &snapshot, &options).unwrap();
            assert_eq!(first, second, "{} {} output differs between renders", vendor, format);
        }
    }
}

#[test]
fn unknown_vendor_is_a_client_error() {
    let err = Registry::with_builtins()
        .render("polycom", &Snapshot::empty(), &ExportOptions::new(Format::Pbx))
        .unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn refreshed_snapshot_renders_with_live_network_state() {
    let source = ScriptedSource::new(
        "roster",
        roster(&[
            ("Alice", "Smith", "AS1", "100", "AS1@node1.local.mesh"),
            ("Bob", "Jones", "BJ2", "101", "BJ2@node2.local.mesh"),
        ]),
    );
    let topology = ScriptedSource::new(
        "sysinfo",
        sysinfo(&[("node1", "10.0.0.5", true), ("node2", "10.0.0.6", false)]),
    );
    let (refresher, store, _events) = refresher(
        source,
        Topology::SysInfo(Box::new(topology)),
        Duration::from_secs(3600),
    );
    refresher.refresh_once().await.unwrap();

    let options = ExportOptions::new(Format::Combined)
        .with_resolve(true)
        .with_indicate_active(true, "*");
    let xml = render("yealink", &store.read(), &options);

    assert!(xml.contains("<Name>*Smith, Alice (AS1)</Name>"));
    assert!(xml.contains("<Name>Jones, Bob (BJ2)</Name>"));
    assert!(xml.contains("<Telephone>10.0.0.6</Telephone>"));
    assert!(store.read().refreshed_at().is_some());
}
