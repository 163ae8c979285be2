//! `modsorter config` subcommands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use modsorter_core::config::LOCAL_CONFIG_FILE;
use modsorter_core::SorterConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as YAML
    Show,

    /// Write the default configuration to ./modsorter.yaml (or --config)
    Init {
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },

    /// Change one setting and save to ./modsorter.yaml (or --config)
    Set {
        /// Setting name, e.g. mods_dir or lookup.timeout_seconds
        key: String,

        /// New value
        value: String,
    },
}

impl ConfigCommand {
    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = SorterConfig::load(config_path)?;
                let yaml = serde_yaml_ng::to_string(&config)
                    .context("Failed to serialize configuration")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigCommand::Init { force } => {
                let path = target_path(config_path);
                init_config(&path, *force)?;
                println!("Wrote default configuration to {}", path.display());
                Ok(())
            }
            ConfigCommand::Set { key, value } => {
                let path = target_path(config_path);
                let mut config = SorterConfig::load(config_path)?;
                set_config(&mut config, &path, key, value)?;
                println!("Set {} in {}", key, path.display());
                Ok(())
            }
        }
    }
}

fn target_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
}

/// Apply one change to the effective config and save it normalized
fn set_config(config: &mut SorterConfig, path: &Path, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    config.save_to_path(path)
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    SorterConfig::default().save_to_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_saves_normalized_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modsorter.yaml");
        let mods = temp_dir.path().join("a").join("..").join("mods");

        let mut config = SorterConfig::default();
        set_config(&mut config, &path, "mods_dir", &mods.to_string_lossy()).unwrap();

        let saved = SorterConfig::load_from_path(&path).unwrap();
        assert_eq!(
            saved.mods_dir,
            temp_dir.path().join("mods").to_string_lossy().replace('\\', "/")
        );
        assert_eq!(saved.reserved_dir, ".connector");
    }

    #[test]
    fn test_set_unknown_key_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modsorter.yaml");

        let mut config = SorterConfig::default();
        assert!(set_config(&mut config, &path, "colour", "blue").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modsorter.yaml");
        std::fs::write(&path, "reserved_dir: .mine\n").unwrap();

        assert!(init_config(&path, false).is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "reserved_dir: .mine\n"
        );

        init_config(&path, true).unwrap();
        let config = SorterConfig::load_from_path(&path).unwrap();
        assert_eq!(config.reserved_dir, ".connector");
    }
}
