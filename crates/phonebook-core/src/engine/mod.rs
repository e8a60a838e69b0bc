//! Refresh scheduler
//!
//! The [`Refresher`] is responsible for:
//! - Fetching and importing the roster
//! - Loading mesh topology data and enriching the entries
//! - Publishing the result to the [`RecordStore`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────┐    ┌──────────┐    ┌─────────────┐
//! │   Source    │───▶│ Importer │───▶│ Enricher │───▶│ RecordStore │
//! │  (roster)   │    └──────────┘    └──────────┘    │   (swap)    │
//! └─────────────┘                         ▲          └─────────────┘
//!                    ┌─────────────┐      │
//!                    │   Source    │──────┘
//!                    │ (topology)  │
//!                    └─────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! 1. Roster fetch or import fails: nothing is published, the previous
//!    snapshot stays live, the error is returned.
//! 2. Topology fetch or parse fails: the last good host map is used (none
//!    before the first success) and the snapshot is still published.
//! 3. No topology configured, or the hosts file does not exist: entries are
//!    published without network data.
//!
//! The loop never retries early and never backs off; it waits one full
//! interval after every attempt.

use crate::config::TopologyConfig;
use crate::entry::Snapshot;
use crate::error::{Error, Result};
use crate::importer;
use crate::network::{self, HostMap};
use crate::registry::Registry;
use crate::store::RecordStore;
use crate::traits::Source;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Capacity of the refresh event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Events emitted by the Refresher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A refresh cycle started
    Started,

    /// A new snapshot was published
    Published {
        entries: usize,
    },

    /// Entries were published without fresh network data
    EnrichmentSkipped {
        reason: String,
    },

    /// Topology data could not be loaded; stale data was used
    EnrichmentFailed {
        error: String,
    },

    /// Nothing was published
    Failed {
        error: String,
    },

    /// Refresh loop stopped
    Stopped {
        reason: String,
    },
}

/// Where enrichment data comes from
pub enum Topology {
    /// Enrichment disabled
    None,
    /// OLSR hosts file; a missing file disables enrichment for the pass
    HostsFile(Box<dyn Source>),
    /// Sysinfo JSON document
    SysInfo(Box<dyn Source>),
}

impl Topology {
    /// Build the topology source described by `config`
    pub fn from_config(config: &TopologyConfig, registry: &Registry) -> Result<Self> {
        Ok(match config {
            TopologyConfig::None => Topology::None,
            TopologyConfig::HostsFile { path } => Topology::HostsFile(registry.create_source(path)?),
            TopologyConfig::SysInfo { url } => Topology::SysInfo(registry.create_source(url)?),
        })
    }
}

/// Periodic roster refresher
///
/// ## Lifecycle
///
/// 1. Create with [`Refresher::new()`]
/// 2. Either call [`Refresher::refresh_once()`] (one-shot export) or start
///    the loop with [`Refresher::run()`] / [`Refresher::run_with_shutdown()`]
/// 3. The loop runs until a shutdown signal is received
///
/// ## Threading
///
/// `refresh_once()` may be called concurrently with the loop (for example
/// from an HTTP reload handler). Cycles run one at a time in call order, so
/// a slow cycle can never overwrite the snapshot of a later one.
pub struct Refresher {
    /// Roster source
    roster: Box<dyn Source>,

    /// Topology source
    topology: Topology,

    /// Published snapshots go here
    store: Arc<RecordStore>,

    /// Time between refresh attempts
    interval: Duration,

    /// Held for the whole of a refresh cycle
    cycle: AsyncMutex<()>,

    /// Last successfully loaded host map
    last_hosts: Mutex<Option<Arc<HostMap>>>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<RefreshEvent>,
}

impl Refresher {
    /// Create a new refresher
    ///
    /// # Returns
    ///
    /// A tuple of (refresher, event_receiver) where event_receiver yields refresh events
    pub fn new(
        roster: Box<dyn Source>,
        topology: Topology,
        store: Arc<RecordStore>,
        interval: Duration,
    ) -> Result<(Self, mpsc::Receiver<RefreshEvent>)> {
        if interval.is_zero() {
            return Err(Error::config("refresh interval must be > 0"));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let refresher = Self {
            roster,
            topology,
            store,
            interval,
            cycle: AsyncMutex::new(()),
            last_hosts: Mutex::new(None),
            event_tx: tx,
        };

        Ok((refresher, rx))
    }

    /// Store this refresher publishes to
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Roster location, for logs and status pages
    pub fn source_name(&self) -> &str {
        self.roster.describe()
    }

    /// Run one refresh cycle
    ///
    /// # Returns
    ///
    /// - `Ok(usize)`: Number of entries in the published snapshot
    /// - `Err(Error)`: Roster could not be fetched or imported; the store
    ///   was not touched
    pub async fn refresh_once(&self) -> Result<usize> {
        let _cycle = self.cycle.lock().await;
        self.emit_event(RefreshEvent::Started);

        match self.do_refresh().await {
            Ok(count) => {
                self.emit_event(RefreshEvent::Published { entries: count });
                Ok(count)
            }
            Err(e) => {
                self.emit_event(RefreshEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn do_refresh(&self) -> Result<usize> {
        debug!("Refreshing roster from {}", self.roster.describe());
        let raw = self.roster.fetch().await?;
        let entries = importer::import(&raw)?;

        let entries = match self.host_map().await {
            Some(hosts) => network::enrich(entries, &hosts),
            None => entries,
        };

        let count = entries.len();
        self.store.swap(Snapshot::new(entries));
        info!("Published {} entries from {}", count, self.roster.describe());
        Ok(count)
    }

    /// Host map for this pass, falling back to the last good one on failure
    async fn host_map(&self) -> Option<Arc<HostMap>> {
        match self.load_hosts().await {
            Ok(Some(hosts)) => {
                let hosts = Arc::new(hosts);
                *self.last_hosts.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&hosts));
                Some(hosts)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Unable to load network information, using previous data: {}", e);
                self.emit_event(RefreshEvent::EnrichmentFailed {
                    error: e.to_string(),
                });
                self.last_hosts.lock().unwrap_or_else(PoisonError::into_inner).clone()
            }
        }
    }

    async fn load_hosts(&self) -> Result<Option<HostMap>> {
        match &self.topology {
            Topology::None => {
                self.skip_enrichment("neither OLSR file nor sysinfo URL specified".to_string());
                Ok(None)
            }
            Topology::HostsFile(source) => match source.fetch().await {
                Ok(raw) => network::parse_hosts(&raw).map(Some),
                Err(Error::NotFound(path)) => {
                    self.skip_enrichment(format!("OLSR file {:?} does not exist", path));
                    Ok(None)
                }
                Err(e) => Err(Error::network(e.to_string())),
            },
            Topology::SysInfo(source) => {
                let raw = source.fetch().await.map_err(|e| Error::network(e.to_string()))?;
                network::parse_sysinfo(&raw).map(Some)
            }
        }
    }

    fn skip_enrichment(&self, reason: String) {
        info!("Not reading network information: {}", reason);
        self.emit_event(RefreshEvent::EnrichmentSkipped { reason });
    }

    /// Run the refresh loop until SIGINT
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to wait for CTRL-C: {}", e);
            }
        })
        .await
    }

    /// Run the refresh loop until `shutdown_rx` fires or its sender is dropped
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_until(async {
            let _ = shutdown_rx.await;
        })
        .await
    }

    async fn run_until(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        info!(
            "Starting refresh loop for {} (interval={:?})",
            self.roster.describe(),
            self.interval
        );

        loop {
            tokio::select! {
                result = self.refresh_once() => {
                    if let Err(e) = result {
                        // Previous snapshot stays live until the next tick.
                        error!("Error refreshing data from upstream: {}", e);
                    }
                }
                _ = &mut shutdown => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("Shutdown signal received, refresh loop stopped");
        self.emit_event(RefreshEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        Ok(())
    }

    /// Emit a refresh event
    fn emit_event(&self, event: RefreshEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping refresh event");
        }
    }
}
