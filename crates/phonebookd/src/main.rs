// # phonebookd - Mesh Phonebook Daemon
//
// This is a thin integration layer over phonebook-core. All import,
// enrichment and rendering logic lives in the library.
//
// The phonebookd binary is responsible for:
// 1. Reading configuration from a JSON file or from flags/environment
// 2. Initializing logging and the runtime
// 3. Registering sources
// 4. Either serving phonebooks over HTTP or writing them once to disk
//
// ## Configuration
//
// Every flag can also be set through the environment:
//
// ### Sources
// - `--source` / `PHONEBOOK_SOURCE`: Path or URL of the roster CSV
// - `--olsr` / `PHONEBOOK_OLSR`: OLSR hosts file (default `/tmp/run/hosts_olsr`)
// - `--sysinfo` / `PHONEBOOK_SYSINFO`: sysinfo JSON URL, takes precedence over `--olsr`
//
// ### Rendering
// - `--resolve`, `--indicate-active`, `--filter-inactive`, `--active-pfx`
//
// ### One-shot mode
// - `--path`: Output folder
// - `--formats`: Comma separated, `direct,pbx,combined`
// - `--targets`: Comma separated, `generic,yealink,cisco,snom,grandstream`
//
// ### Server mode
// - `--server`, `--port` (default 8080), `--reload` seconds (default 3600)
//
// `--conf` reads a JSON file instead of the flags above.
//
// ## Example
//
// ```bash
// phonebookd --source https://example.org/roster.csv \
//     --path /www/phonebook --targets yealink,snom --formats pbx,direct
//
// PHONEBOOK_SOURCE=/etc/phonebook.csv phonebookd --server --resolve
// ```

mod export;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use phonebook_core::config::{DEFAULT_OLSR_FILE, ExportConfig, PhonebookConfig, ServerConfig, TopologyConfig};
use phonebook_core::engine::{RefreshEvent, Refresher, Topology};
use phonebook_core::registry::Registry;
use phonebook_core::source::scheme_of;
use phonebook_core::store::RecordStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown or successful export
/// - 1: Configuration or startup error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum PhonebookExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<PhonebookExitCode> for ExitCode {
    fn from(code: PhonebookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Serve or export XML phonebooks for VoIP phones on a mesh network
#[derive(Debug, Parser)]
#[command(name = "phonebookd", version)]
struct Cli {
    /// Config file to read settings from instead of parsing flags
    #[arg(long, env = "PHONEBOOK_CONF")]
    conf: Option<PathBuf>,

    /// Path or URL to fetch the phonebook CSV from
    #[arg(long, env = "PHONEBOOK_SOURCE")]
    source: Option<String>,

    /// Path to the OLSR hosts file
    #[arg(long, env = "PHONEBOOK_OLSR", default_value = DEFAULT_OLSR_FILE)]
    olsr: String,

    /// URL of the sysinfo JSON API, usually http://localnode.local.mesh/cgi-bin/sysinfo.json?hosts=1
    #[arg(long, env = "PHONEBOOK_SYSINFO")]
    sysinfo: Option<String>,

    /// Run as a server
    #[arg(long, env = "PHONEBOOK_SERVER")]
    server: bool,

    /// Folder to write the phonebooks to
    #[arg(long, env = "PHONEBOOK_PATH")]
    path: Option<String>,

    /// Formats to export (pbx, direct, combined)
    #[arg(long, env = "PHONEBOOK_FORMATS", value_delimiter = ',', default_value = "combined")]
    formats: Vec<String>,

    /// Targets to export (generic, yealink, cisco, snom, grandstream)
    #[arg(long, env = "PHONEBOOK_TARGETS", value_delimiter = ',')]
    targets: Vec<String>,

    /// Dial IPs from mesh data instead of host names
    #[arg(long, env = "PHONEBOOK_RESOLVE")]
    resolve: bool,

    /// Prefix active participants with --active-pfx
    #[arg(long, env = "PHONEBOOK_INDICATE_ACTIVE")]
    indicate_active: bool,

    /// Leave inactive participants out of the phonebook
    #[arg(long, env = "PHONEBOOK_FILTER_INACTIVE")]
    filter_inactive: bool,

    /// Prefix added when --indicate-active is set
    #[arg(long, env = "PHONEBOOK_ACTIVE_PFX", default_value = "*")]
    active_pfx: String,

    /// Port to listen on in server mode
    #[arg(long, env = "PHONEBOOK_PORT", default_value_t = 8080)]
    port: u16,

    /// Seconds between roster reloads in server mode
    #[arg(long, env = "PHONEBOOK_RELOAD", default_value_t = 3600)]
    reload: u64,

    /// trace, debug, info, warn or error
    #[arg(long, env = "PHONEBOOK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Build the phonebook configuration from the config file or the flags
    fn config(&self) -> Result<PhonebookConfig> {
        if let Some(path) = &self.conf {
            let raw = std::fs::read(path).with_context(|| format!("unable to read config {}", path.display()))?;
            return Ok(PhonebookConfig::from_json(&raw)?);
        }

        let mut config = PhonebookConfig::new(self.source.clone().unwrap_or_default());
        config.topology = TopologyConfig::from_locations(Some(&self.olsr), self.sysinfo.as_deref());
        config.export = ExportConfig {
            formats: self.formats.clone(),
            targets: self.targets.clone(),
            path: self.path.clone(),
            resolve: self.resolve,
            indicate_active: self.indicate_active,
            filter_inactive: self.filter_inactive,
            active_prefix: self.active_pfx.clone(),
        };
        config.server = ServerConfig {
            enabled: self.server,
            port: self.port,
            reload_secs: self.reload,
        };
        Ok(config)
    }

    fn log_level(&self) -> Result<Level> {
        Ok(match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        })
    }
}

/// Registry with every source and exporter this build supports
fn registry() -> Registry {
    let registry = Registry::with_builtins();

    #[cfg(feature = "http")]
    phonebook_source_http::register(&registry);

    registry
}

/// Checks that need the registry on top of [`PhonebookConfig::validate`]
fn validate(config: &PhonebookConfig, registry: &Registry) -> Result<()> {
    config.validate()?;

    let mut locations = vec![config.source.as_str()];
    locations.extend(config.topology.location());
    for location in locations {
        let scheme = scheme_of(location)?;
        if !registry.has_source(&scheme) {
            anyhow::bail!("'{}' sources are not supported by this build", scheme);
        }
    }

    for target in &config.export.targets {
        if !registry.has_exporter(target) {
            anyhow::bail!(
                "unknown target {:?}. Supported: {}",
                target,
                registry.list_exporters().join(",")
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PhonebookExitCode::ConfigError.into();
        }
    };

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return PhonebookExitCode::ConfigError.into();
        }
    };

    let registry = registry();
    if let Err(e) = validate(&config, &registry) {
        eprintln!("Configuration validation error: {:#}", e);
        return PhonebookExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PhonebookExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PhonebookExitCode::RuntimeError.into();
        }
    };

    let registry = Arc::new(registry);
    let result = rt.block_on(async {
        let result = if config.server.enabled {
            run_server(config, registry).await
        } else {
            run_local(config, registry).await
        };
        match result {
            Ok(()) => PhonebookExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                PhonebookExitCode::RuntimeError
            }
        }
    });

    result.into()
}

fn build_refresher(
    config: &PhonebookConfig,
    registry: &Registry,
) -> Result<(Refresher, mpsc::Receiver<RefreshEvent>)> {
    let roster = registry.create_source(&config.source)?;
    let topology = Topology::from_config(&config.topology, registry)?;
    let store = Arc::new(RecordStore::new());
    Ok(Refresher::new(roster, topology, store, config.server.reload_interval())?)
}

/// Refresh once and write every configured phonebook
async fn run_local(config: PhonebookConfig, registry: Arc<Registry>) -> Result<()> {
    let (refresher, _events) = build_refresher(&config, &registry)?;

    refresher
        .refresh_once()
        .await
        .with_context(|| format!("unable to load phonebook from {}", config.source))?;

    let snapshot = refresher.store().read();
    let written = export::write_phonebooks(&registry, &snapshot, &config.export).await?;
    info!("Wrote {} phonebook(s) with {} entries", written.len(), snapshot.len());
    Ok(())
}

/// Serve phonebooks until SIGINT/SIGTERM
async fn run_server(config: PhonebookConfig, registry: Arc<Registry>) -> Result<()> {
    info!("Starting phonebookd {} on port {}", server::VERSION, config.server.port);

    let (refresher, mut events) = build_refresher(&config, &registry)?;
    let refresher = Arc::new(refresher);

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Refresh event");
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let refresh_loop = tokio::spawn({
        let refresher = Arc::clone(&refresher);
        async move { refresher.run_with_shutdown(shutdown_rx).await }
    });

    let state = Arc::new(server::AppState {
        refresher,
        registry,
        export: config.export,
    });

    let served = server::serve(state, config.server.port, async {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown error: {}", e),
        }
    })
    .await;

    let _ = shutdown_tx.send(());
    refresh_loop.await.context("refresh loop panicked")??;

    served?;
    info!("Shutting down phonebookd");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for SIGINT
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c().await.context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
