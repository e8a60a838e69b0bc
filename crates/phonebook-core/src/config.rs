//! Configuration types for the phonebook system
//!
//! This module defines all configuration structures used throughout the crate.
//! The daemon fills them either from a JSON file or from command line flags.

use crate::exporter::{ExportOptions, Format};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default location of the OLSR hosts file on AREDN nodes
pub const DEFAULT_OLSR_FILE: &str = "/tmp/run/hosts_olsr";

/// Main phonebook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonebookConfig {
    /// Path or URL of the roster CSV
    pub source: String,

    /// Where mesh topology data comes from
    #[serde(default)]
    pub topology: TopologyConfig,

    /// Rendering settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Server mode settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl PhonebookConfig {
    /// Create a configuration for `source` with defaults
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            topology: TopologyConfig::default(),
            export: ExportConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Load a configuration from a JSON document
    pub fn from_json(raw: &[u8]) -> Result<Self, crate::Error> {
        serde_json::from_slice(raw).map_err(|e| crate::Error::config(format!("invalid config file: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.source.trim().is_empty() {
            return Err(crate::Error::config("source needs to be set"));
        }
        crate::source::scheme_of(&self.source)?;

        self.topology.validate()?;
        self.export.validate()?;

        // Checked in every mode: the refresher rejects a zero interval.
        self.server.validate()?;
        if !self.server.enabled {
            self.export.validate_one_shot()?;
        }

        Ok(())
    }
}

/// Topology source configuration
///
/// When both a hosts file and a sysinfo URL are known, sysinfo wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopologyConfig {
    /// No enrichment
    #[default]
    None,

    /// OLSR hosts file
    HostsFile {
        /// Absolute path of the hosts file
        path: String,
    },

    /// Sysinfo JSON API of a mesh node
    SysInfo {
        /// e.g. `http://localnode.local.mesh/cgi-bin/sysinfo.json?hosts=1`
        url: String,
    },
}

impl TopologyConfig {
    /// Pick a topology source from the two optional locations
    pub fn from_locations(olsr_file: Option<&str>, sysinfo_url: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match (non_empty(sysinfo_url), non_empty(olsr_file)) {
            (Some(url), _) => TopologyConfig::SysInfo { url },
            (None, Some(path)) => TopologyConfig::HostsFile { path },
            (None, None) => TopologyConfig::None,
        }
    }

    /// Location to fetch from, if any
    pub fn location(&self) -> Option<&str> {
        match self {
            TopologyConfig::None => None,
            TopologyConfig::HostsFile { path } => Some(path.as_str()),
            TopologyConfig::SysInfo { url } => Some(url.as_str()),
        }
    }

    /// Validate the topology configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(location) = self.location() {
            crate::source::scheme_of(location)?;
        }
        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Formats written in one-shot mode
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Vendors written in one-shot mode
    #[serde(default)]
    pub targets: Vec<String>,

    /// Output folder for one-shot mode
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub resolve: bool,

    #[serde(default)]
    pub indicate_active: bool,

    #[serde(default)]
    pub filter_inactive: bool,

    #[serde(default = "default_active_prefix")]
    pub active_prefix: String,
}

impl ExportConfig {
    /// Render options for `format` using the process-wide flags
    pub fn options(&self, format: Format) -> ExportOptions {
        ExportOptions::new(format)
            .with_resolve(self.resolve)
            .with_indicate_active(self.indicate_active, self.active_prefix.clone())
            .with_filter_inactive(self.filter_inactive)
    }

    /// Parsed one-shot formats
    pub fn parsed_formats(&self) -> Result<Vec<Format>, crate::Error> {
        self.formats.iter().map(|f| f.parse()).collect()
    }

    /// Validate the export configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.parsed_formats()
            .map_err(|e| crate::Error::config(e.to_string()))?;
        Ok(())
    }

    fn validate_one_shot(&self) -> Result<(), crate::Error> {
        if self.path.as_deref().is_none_or(|p| p.trim().is_empty()) {
            return Err(crate::Error::config("path needs to be set"));
        }
        if self.formats.is_empty() {
            return Err(crate::Error::config("formats need to be set"));
        }
        if self.targets.is_empty() {
            return Err(crate::Error::config("targets need to be set"));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            targets: Vec::new(),
            path: None,
            resolve: false,
            indicate_active: false,
            filter_inactive: false,
            active_prefix: default_active_prefix(),
        }
    }
}

fn default_formats() -> Vec<String> {
    vec![Format::Combined.to_string()]
}

fn default_active_prefix() -> String {
    "*".to_string()
}

/// Server mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Run as a server instead of exporting once
    #[serde(default)]
    pub enabled: bool,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interval between roster reloads (in seconds)
    #[serde(default = "default_reload_secs")]
    pub reload_secs: u64,
}

impl ServerConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_secs)
    }

    /// Validate the server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.reload_secs == 0 {
            return Err(crate::Error::config("reload interval must be > 0"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_port(),
            reload_secs: default_reload_secs(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_reload_secs() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_shot() -> PhonebookConfig {
        let mut config = PhonebookConfig::new("/srv/phonebook.csv");
        config.export.path = Some("/tmp/out".to_string());
        config.export.targets = vec!["yealink".to_string()];
        config
    }

    #[test]
    fn test_defaults() {
        let config = PhonebookConfig::from_json(br#"{"source": "http://node/phonebook.csv"}"#).unwrap();
        assert_eq!(config.topology, TopologyConfig::None);
        assert_eq!(config.export.formats, vec!["combined"]);
        assert_eq!(config.export.active_prefix, "*");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.reload_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_topology_from_json() {
        let config = PhonebookConfig::from_json(
            br#"{"source": "/srv/pb.csv", "topology": {"type": "hosts_file", "path": "/tmp/run/hosts_olsr"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.topology,
            TopologyConfig::HostsFile { path: "/tmp/run/hosts_olsr".to_string() }
        );
    }

    #[test]
    fn test_topology_precedence() {
        assert_eq!(
            TopologyConfig::from_locations(Some(DEFAULT_OLSR_FILE), Some("http://localnode/sysinfo.json")),
            TopologyConfig::SysInfo { url: "http://localnode/sysinfo.json".to_string() }
        );
        assert_eq!(
            TopologyConfig::from_locations(Some(DEFAULT_OLSR_FILE), Some("")),
            TopologyConfig::HostsFile { path: DEFAULT_OLSR_FILE.to_string() }
        );
        assert_eq!(TopologyConfig::from_locations(None, None), TopologyConfig::None);
    }

    #[test]
    fn test_validate_one_shot() {
        assert!(one_shot().validate().is_ok());

        let mut config = one_shot();
        config.export.path = None;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        let mut config = one_shot();
        config.export.targets.clear();
        assert!(config.validate().is_err());

        let mut config = one_shot();
        config.export.formats = vec!["sip".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reload_in_every_mode() {
        let mut config = one_shot();
        config.server.reload_secs = 0;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        config.server.enabled = true;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate_source() {
        let mut config = one_shot();
        config.source = String::new();
        assert!(config.validate().is_err());

        config.source = "phonebook.csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_server() {
        let mut config = PhonebookConfig::new("http://node/phonebook.csv");
        config.server.enabled = true;
        assert!(config.validate().is_ok());

        config.server.reload_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_options() {
        let mut export = ExportConfig::default();
        export.resolve = true;
        export.indicate_active = true;

        let options = export.options(Format::Direct);
        assert_eq!(options.format, Format::Direct);
        assert!(options.resolve);
        assert!(options.indicate_active);
        assert!(!options.filter_inactive);
        assert_eq!(options.active_prefix, "*");
    }
}
