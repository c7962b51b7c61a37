//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.netdimm-panel/config.toml` unless `--config` points
//! elsewhere. If the default file is missing on first run, a commented-out
//! template is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub update: UpdateConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub panel: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub rom_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub remount_root: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TargetsConfig {
    pub addresses: Option<Vec<String>>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub interface: Option<String>,
    pub dhcp_profile: Option<PathBuf>,
    pub static_profile: Option<PathBuf>,
    pub active_profile: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateConfig {
    pub repo_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TransferConfig {
    pub time_limit_ms: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub cols: Option<u16>,
    pub rows: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ROM_DIR: &str = "/home/pi/roms/";
pub const DEFAULT_TARGETS: [&str; 2] = ["10.0.0.2", "10.0.0.3"];
pub const DEFAULT_PORT: u16 = 10703;
pub const DEFAULT_TIME_LIMIT_MS: u32 = 10 * 60 * 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;
pub const DEFAULT_INTERFACE: &str = "eth0";
pub const DEFAULT_DHCP_PROFILE: &str = "netctl/ethernet-dhcp";
pub const DEFAULT_STATIC_PROFILE: &str = "netctl/ethernet-static";
pub const DEFAULT_ACTIVE_PROFILE: &str = "/etc/netctl/eth0";
pub const DEFAULT_COLS: u16 = 16;
pub const DEFAULT_ROWS: u16 = 2;

const CONFIG_DIR: &str = ".netdimm-panel";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub rom_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub targets: Vec<String>,
    pub port: u16,
    pub time_limit_ms: u32,
    pub poll_interval: Duration,
    pub remount_root: bool,
    pub interface: String,
    pub dhcp_profile: PathBuf,
    pub static_profile: PathBuf,
    pub active_profile: PathBuf,
    pub update_dir: PathBuf,
    pub cols: u16,
    pub rows: u16,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&PanelConfig::default(), &Overrides::default(), |_| None)
    }
}

/// Values supplied on the command line. `None`/empty = not specified.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub rom_dir: Option<PathBuf>,
    pub targets: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.netdimm-panel`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR))
}

/// Returns the path to `~/.netdimm-panel/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `explicit` if given, else from the default location.
///
/// A missing default file is generated from a commented-out template and
/// yields `PanelConfig::default()`. A missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<PanelConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(PanelConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PanelConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<PanelConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# NetDIMM Panel Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# rom_dir = "/home/pi/roms/"          # Or set NETDIMM_ROM_DIR
# catalog = "catalog.json"            # Relative to ~/.netdimm-panel/, or NETDIMM_CATALOG
# poll_interval_ms = 20
# remount_root = true                 # Remount / read-write around writes

# [targets]
# addresses = ["10.0.0.2", "10.0.0.3"] # Or NETDIMM_TARGETS="10.0.0.2,10.0.0.3"
# port = 10703

# [network]
# interface = "eth0"
# dhcp_profile = "netctl/ethernet-dhcp"
# static_profile = "netctl/ethernet-static"
# active_profile = "/etc/netctl/eth0"

# [update]
# repo_dir = "."

# [transfer]
# time_limit_ms = 600000

# [panel]
# cols = 16
# rows = 2
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &PanelConfig, cli: &Overrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
pub fn resolve_with<E>(config: &PanelConfig, cli: &Overrides, env: E) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    // ROM dir: CLI → env → config → default
    let rom_dir = cli
        .rom_dir
        .clone()
        .or_else(|| env("NETDIMM_ROM_DIR").map(PathBuf::from))
        .or_else(|| config.general.rom_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROM_DIR));

    // Catalog: env → config (relative to config dir) → default
    let catalog_path = env("NETDIMM_CATALOG")
        .map(PathBuf::from)
        .or_else(|| config.general.catalog.clone())
        .map(|p| match config_dir() {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p,
        })
        .unwrap_or_else(default_catalog_path);

    // Targets: CLI → env → config → default; an empty list falls through
    let targets = Some(cli.targets.clone())
        .filter(|t| !t.is_empty())
        .or_else(|| env("NETDIMM_TARGETS").map(|s| split_targets(&s)))
        .filter(|t| !t.is_empty())
        .or_else(|| config.targets.addresses.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect());

    let poll_interval_ms = config
        .general
        .poll_interval_ms
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

    ResolvedConfig {
        rom_dir,
        catalog_path,
        targets,
        port: config.targets.port.unwrap_or(DEFAULT_PORT),
        time_limit_ms: config
            .transfer
            .time_limit_ms
            .unwrap_or(DEFAULT_TIME_LIMIT_MS),
        poll_interval: Duration::from_millis(poll_interval_ms),
        remount_root: config.general.remount_root.unwrap_or(true),
        interface: config
            .network
            .interface
            .clone()
            .unwrap_or_else(|| DEFAULT_INTERFACE.to_string()),
        dhcp_profile: config
            .network
            .dhcp_profile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DHCP_PROFILE)),
        static_profile: config
            .network
            .static_profile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_PROFILE)),
        active_profile: config
            .network
            .active_profile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACTIVE_PROFILE)),
        update_dir: config
            .update
            .repo_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
        cols: config.panel.cols.unwrap_or(DEFAULT_COLS),
        rows: config.panel.rows.unwrap_or(DEFAULT_ROWS),
    }
}

fn default_catalog_path() -> PathBuf {
    config_dir()
        .map(|d| d.join("catalog.json"))
        .unwrap_or_else(|| PathBuf::from("catalog.json"))
}

/// Split a comma-separated target list, dropping blanks.
fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
