//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal sources whose content can be changed or
//! broken between refreshes.

#![allow(dead_code)]

use phonebook_core::engine::{RefreshEvent, Refresher, Topology};
use phonebook_core::error::{Error, Result};
use phonebook_core::store::RecordStore;
use phonebook_core::traits::Source;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const HEADER: &str = "first_name,name,callsign,telephone";

/// What a [`ScriptedSource`] returns on the next fetch
#[derive(Debug, Clone)]
enum Content {
    Bytes(Vec<u8>),
    Failing(String),
    Missing,
}

/// A source whose content is controlled by the test
#[derive(Clone)]
pub struct ScriptedSource {
    name: String,
    content: Arc<Mutex<Content>>,
    fetch_count: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(name: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.to_string(),
            content: Arc::new(Mutex::new(Content::Bytes(content.into()))),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the content returned by later fetches
    pub fn set(&self, content: impl Into<Vec<u8>>) {
        *self.content.lock().unwrap() = Content::Bytes(content.into());
    }

    /// Make later fetches fail
    pub fn fail(&self, message: &str) {
        *self.content.lock().unwrap() = Content::Failing(message.to_string());
    }

    /// Make later fetches report a missing file
    pub fn remove(&self) {
        *self.content.lock().unwrap() = Content::Missing;
    }

    /// Get the number of times fetch() was called
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Source for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let content = self.content.lock().unwrap().clone();
        match content {
            Content::Bytes(bytes) => Ok(bytes),
            Content::Failing(message) => Err(Error::source(self.name.clone(), message)),
            Content::Missing => Err(Error::not_found(self.name.clone())),
        }
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

/// A [`ScriptedSource`] that takes `delay` to answer and records how many
/// fetches overlapped
///
/// Content is read when the fetch starts, not when it returns.
#[derive(Clone)]
pub struct SlowSource {
    inner: ScriptedSource,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl SlowSource {
    pub fn new(inner: ScriptedSource, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Highest number of fetches seen running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Source for SlowSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = self.inner.fetch().await;
        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn describe(&self) -> &str {
        self.inner.describe()
    }
}

/// Roster CSV from `(first, last, callsign, phone, address)` rows
pub fn roster(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let mut csv = format!("{},address\n", HEADER);
    for (first, last, callsign, phone, address) in rows {
        csv.push_str(&format!("{},{},{},{},{}\n", first, last, callsign, phone, address));
    }
    csv
}

/// Sysinfo JSON for `(name, ip, active)` hosts
pub fn sysinfo(hosts: &[(&str, &str, bool)]) -> String {
    let hosts: Vec<serde_json::Value> = hosts
        .iter()
        .map(|(name, ip, active)| serde_json::json!({ "name": name, "ip": ip, "active": active }))
        .collect();
    serde_json::json!({ "node": "localnode", "hosts": hosts }).to_string()
}

/// Build a refresher publishing to a fresh store
pub fn refresher(
    roster: ScriptedSource,
    topology: Topology,
    interval: Duration,
) -> (Arc<Refresher>, Arc<RecordStore>, mpsc::Receiver<RefreshEvent>) {
    let store = Arc::new(RecordStore::new());
    let (refresher, events) = Refresher::new(Box::new(roster), topology, Arc::clone(&store), interval)
        .expect("refresher construction succeeds");
    (Arc::new(refresher), store, events)
}

/// Drain all events currently buffered in the channel
pub fn drain(events: &mut mpsc::Receiver<RefreshEvent>) -> Vec<RefreshEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
