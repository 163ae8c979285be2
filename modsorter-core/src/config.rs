//! modsorter configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. `--config <path>` - explicit override, must exist
//! 2. `./modsorter.yaml` - working directory config
//! 3. `~/.config/modsorter/config.yaml` - platform config directory
//! 4. Built-in defaults
//!
//! ```yaml
//! mods_dir: ./mods
//! client_output_dir: ./client_mods
//! server_output_dir: ./server_mods
//! client_backup_dir: ./client_mods_backup
//! server_backup_dir: ./server_mods_backup
//! catalog: modlist.csv
//! catalog_backup: modlist.csv.bak
//! reserved_dir: .connector
//! archive_extension: jar
//! lookup:
//!   api_base_url: https://api.modrinth.com/v2
//!   timeout_seconds: 15
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "modsorter.yaml";

/// File name inside the platform config directory
const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Directory holding every installed mod archive
    pub mods_dir: String,
    pub client_output_dir: String,
    pub server_output_dir: String,
    pub client_backup_dir: String,
    pub server_backup_dir: String,
    /// Catalog file
    pub catalog: String,
    /// Copy of the catalog taken before each write
    pub catalog_backup: String,
    /// Directory inside each output that survives replacement
    pub reserved_dir: String,
    /// Archive extension, without the dot
    pub archive_extension: String,
    pub lookup: LookupConfig,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            mods_dir: "./mods".to_string(),
            client_output_dir: "./client_mods".to_string(),
            server_output_dir: "./server_mods".to_string(),
            client_backup_dir: "./client_mods_backup".to_string(),
            server_backup_dir: "./server_mods_backup".to_string(),
            catalog: "modlist.csv".to_string(),
            catalog_backup: "modlist.csv.bak".to_string(),
            reserved_dir: ".connector".to_string(),
            archive_extension: "jar".to_string(),
            lookup: LookupConfig::default(),
        }
    }
}

/// Remote lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base of the canonical project page written to the catalog
    #[serde(default = "default_project_url_base")]
    pub project_url_base: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum lookups in flight; unbounded when unset
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            project_url_base: default_project_url_base(),
            timeout_seconds: default_timeout(),
            concurrency: None,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.modrinth.com/v2".to_string()
}

fn default_project_url_base() -> String {
    "https://modrinth.com/mod".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl SorterConfig {
    /// Resolve configuration using the documented precedence
    pub fn load(cli_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_override {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from_path(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.is_file() {
                return Self::load_from_path(&global);
            }
            debug!("No global configuration found at {}", global.display());
        }

        warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: SorterConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform config file, e.g. `~/.config/modsorter/config.yaml`
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "modsorter")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("modsorter")))
            .map(|dir| dir.join(GLOBAL_CONFIG_FILE))
    }

    /// Write configuration with every path value normalized
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let normalized = self.normalized();
        let content =
            serde_yaml_ng::to_string(&normalized).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Copy with all path fields made absolute and normalized
    pub fn normalized(&self) -> Self {
        let norm = |p: &str| normalize_path(p).to_string_lossy().replace('\\', "/");
        Self {
            mods_dir: norm(&self.mods_dir),
            client_output_dir: norm(&self.client_output_dir),
            server_output_dir: norm(&self.server_output_dir),
            client_backup_dir: norm(&self.client_backup_dir),
            server_backup_dir: norm(&self.server_backup_dir),
            catalog: norm(&self.catalog),
            catalog_backup: norm(&self.catalog_backup),
            ..self.clone()
        }
    }

    /// Set one value by its dotted key, e.g. `mods_dir` or `lookup.timeout_seconds`
    ///
    /// `lookup.concurrency` accepts `none` (or an empty value) to remove the bound.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let text = match key {
            "mods_dir" => &mut self.mods_dir,
            "client_output_dir" => &mut self.client_output_dir,
            "server_output_dir" => &mut self.server_output_dir,
            "client_backup_dir" => &mut self.client_backup_dir,
            "server_backup_dir" => &mut self.server_backup_dir,
            "catalog" => &mut self.catalog,
            "catalog_backup" => &mut self.catalog_backup,
            "reserved_dir" => &mut self.reserved_dir,
            "archive_extension" => &mut self.archive_extension,
            "lookup.api_base_url" => &mut self.lookup.api_base_url,
            "lookup.project_url_base" => &mut self.lookup.project_url_base,
            "lookup.timeout_seconds" => {
                self.lookup.timeout_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid {key}: {value}"))?;
                return Ok(());
            }
            "lookup.concurrency" => {
                self.lookup.concurrency = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid {key}: {value}"))?,
                    )
                };
                return Ok(());
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        };
        *text = value.to_string();
        Ok(())
    }

    pub fn mods_dir(&self) -> PathBuf {
        normalize_path(&self.mods_dir)
    }

    pub fn catalog_path(&self) -> PathBuf {
        normalize_path(&self.catalog)
    }

    pub fn catalog_backup_path(&self) -> PathBuf {
        normalize_path(&self.catalog_backup)
    }

    pub fn client_output_dir(&self) -> PathBuf {
        normalize_path(&self.client_output_dir)
    }

    pub fn server_output_dir(&self) -> PathBuf {
        normalize_path(&self.server_output_dir)
    }

    pub fn client_backup_dir(&self) -> PathBuf {
        normalize_path(&self.client_backup_dir)
    }

    pub fn server_backup_dir(&self) -> PathBuf {
        normalize_path(&self.server_backup_dir)
    }
}

/// Normalize a configured path
///
/// Backslashes become `/`, a leading `~` expands to the home directory,
/// relative paths are anchored at the working directory, and `.`/`..`
/// segments are resolved lexically (the path need not exist).
pub fn normalize_path(raw: &str) -> PathBuf {
    let unified = raw.trim().replace('\\', "/");
    if unified.is_empty() {
        return PathBuf::new();
    }

    let expanded = match unified.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(&unified),
        },
        _ => PathBuf::from(&unified),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(e) => {
                warn!("Failed to normalize path: {} - {}", raw, e);
                return expanded;
            }
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
