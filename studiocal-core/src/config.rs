//! studiocal configuration.
//!
//! Read from `~/.config/studiocal/config.toml` with `STUDIOCAL_*` environment
//! variables layered on top (e.g. `STUDIOCAL_DATA_DIR=/srv/studiocal`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{StudioCalError, StudioCalResult};
use crate::import::ImportOptions;

static DEFAULT_DATA_DIR: &str = "~/.local/share/studiocal";
static DEFAULT_CREATE_TIMEOUT: &str = "10s";
const DEFAULT_SERVER_PORT: u16 = 4097;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_skip_duplicates() -> bool {
    true
}

fn default_create_timeout() -> String {
    DEFAULT_CREATE_TIMEOUT.to_string()
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioCalConfig {
    /// Where the event store lives
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Skip imported events whose UID is already in the target calendar
    #[serde(default = "default_skip_duplicates")]
    pub skip_duplicates: bool,

    /// Limit for a single event creation during import, e.g. "10s" or "1m".
    /// A create that finishes after the limit is still reported as failed.
    #[serde(default = "default_create_timeout")]
    pub create_timeout: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Default for StudioCalConfig {
    fn default() -> Self {
        StudioCalConfig {
            data_dir: default_data_dir(),
            skip_duplicates: default_skip_duplicates(),
            create_timeout: default_create_timeout(),
            server_port: default_server_port(),
        }
    }
}

impl StudioCalConfig {
    pub fn config_path() -> StudioCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| StudioCalError::Config("Could not determine config directory".into()))?
            .join("studiocal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, creating a commented default file on first use.
    pub fn load() -> StudioCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> StudioCalResult<Self> {
        Self::load_with_env(path, Environment::with_prefix("STUDIOCAL"))
    }

    fn load_with_env(path: &Path, env: Environment) -> StudioCalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(env.try_parsing(true))
            .build()
            .map_err(|e| StudioCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| StudioCalError::Config(e.to_string()))
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn create_timeout(&self) -> StudioCalResult<Duration> {
        humantime::parse_duration(&self.create_timeout).map_err(|e| {
            StudioCalError::Config(format!("Invalid create_timeout '{}': {e}", self.create_timeout))
        })
    }

    pub fn import_options(&self) -> StudioCalResult<ImportOptions> {
        Ok(ImportOptions {
            skip_duplicates: self.skip_duplicates,
            create_timeout: self.create_timeout()?,
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> StudioCalResult<()> {
        let contents = format!(
            "\
# studiocal configuration

# Where calendar events are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Skip imported events whose UID already exists in the target calendar:
# skip_duplicates = true

# Time limit for creating a single imported event:
# create_timeout = \"{DEFAULT_CREATE_TIMEOUT}\"

# Port for studiocal-server:
# server_port = {DEFAULT_SERVER_PORT}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StudioCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| StudioCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studiocal").join("config.toml");

        StudioCalConfig::create_default_config(&path).unwrap();
        let config = StudioCalConfig::load_from(&path).unwrap();

        assert!(config.skip_duplicates);
        assert_eq!(config.create_timeout().unwrap(), Duration::from_secs(10));
        assert_eq!(config.server_port, 4097);
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/studiocal\"\nskip_duplicates = false\ncreate_timeout = \"1m 30s\"\n",
        )
        .unwrap();

        let config = StudioCalConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/srv/studiocal"));

        let options = config.import_options().unwrap();
        assert!(!options.skip_duplicates);
        assert_eq!(options.create_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server_port = 5000\ncreate_timeout = \"30s\"\n").unwrap();

        let vars: config::Map<String, String> = [
            ("STUDIOCAL_SERVER_PORT".to_string(), "8080".to_string()),
            ("STUDIOCAL_SKIP_DUPLICATES".to_string(), "false".to_string()),
        ]
        .into_iter()
        .collect();
        let env = Environment::with_prefix("STUDIOCAL").source(Some(vars));

        let config = StudioCalConfig::load_with_env(&path, env).unwrap();
        assert_eq!(config.server_port, 8080);
        assert!(!config.skip_duplicates);
        assert_eq!(config.create_timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let config = StudioCalConfig {
            create_timeout: "soon".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.create_timeout(), Err(StudioCalError::Config(_))));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = StudioCalConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
