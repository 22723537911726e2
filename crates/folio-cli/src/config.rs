//! Configuration file loading.
//!
//! The file is TOML. Lookup order:
//!
//! 1. `--config <path>`
//! 2. `$FOLIO_CONFIG`
//! 3. `<config dir>/folio/config.toml`, if it exists
//! 4. built-in defaults
//!
//! ```toml
//! [content]
//! root = "./docs"
//! extensions = ["md", "markdown"]
//! include_hidden = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! reindex_interval_secs = 300
//!
//! [search]
//! query_mode = "or"
//! excerpt_width = 150
//!
//! [render]
//! allow_raw_html = false
//! rewrite_links = true
//! link_prefix = "/api/content?path="
//!
//! [log]
//! level = "info"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_api::ServiceConfig;
use folio_content::RenderOptions;
use folio_core::{Error, Result, WalkOptions};
use folio_fts::SearchConfig;
use serde::{Deserialize, Serialize};

/// Project name, used for the config directory.
pub const PROJECT_NAME: &str = "folio";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Corpus location and visibility.
    pub content: ContentSection,
    /// HTTP server settings.
    pub server: ServerSection,
    /// Search defaults.
    pub search: SearchConfig,
    /// HTML rendering policy.
    pub render: RenderOptions,
    /// Logging.
    pub log: LogSection,
}

/// `[content]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    /// Corpus root directory.
    pub root: PathBuf,
    /// Document extensions, without dots.
    pub extensions: Vec<String>,
    /// Include names starting with `.`.
    pub include_hidden: bool,
}

impl Default for ContentSection {
    fn default() -> Self {
        let walk = WalkOptions::default();
        Self {
            root: PathBuf::from("."),
            extensions: walk.extensions,
            include_hidden: walk.include_hidden,
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Seconds between background reindexes; unset disables them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reindex_interval_secs: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            reindex_interval_secs: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl FolioConfig {
    /// Load from the resolved config path, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if an explicitly named file cannot be read and
    /// [`Error::Config`] if the file is not valid TOML for this schema.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() || explicit.is_some() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Config path after applying the lookup order. `None` only when the
    /// platform has no config directory and nothing explicit was given.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// `<config dir>/folio/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(root) = &overrides.root {
            self.content.root = root.clone();
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Settings for [`folio_api::ContentService`].
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            root: self.content.root.clone(),
            walk: WalkOptions {
                extensions: self.content.extensions.clone(),
                include_hidden: self.content.include_hidden,
            },
            render: self.render.clone(),
            search: self.search.clone(),
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Background reindex period, if enabled.
    pub fn reindex_interval(&self) -> Option<Duration> {
        self.server
            .reindex_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Values from flags and environment that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--root` / `FOLIO_ROOT`.
    pub root: Option<PathBuf>,
    /// `--host`.
    pub host: Option<IpAddr>,
    /// `--port`.
    pub port: Option<u16>,
}

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    let mut current = value;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
