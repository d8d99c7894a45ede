//! Inventory settings and Hiera configuration
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (`hieraBackend` only)
//! 2. Settings file: `group_vars/hieraData.yml` (or `--settings`)
//! 3. Environment variables: `HIERA_INVENTORY__*` prefix

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{expand_env_vars, EnvironmentSelector, ServiceSelector};
use crate::infrastructure::traits::FileSystem;

/// Settings file location relative to the Ansible project directory.
pub const DEFAULT_SETTINGS_PATH: &str = "group_vars/hieraData.yml";

/// Hiera backend section holding `:datadir`, unless the settings say otherwise.
pub const DEFAULT_HIERA_BACKEND: &str = ":eyaml";

/// Key under the backend section naming the data directory.
pub const DATADIR_KEY: &str = ":datadir";

/// Prefix for environment variable overrides (`HIERA_INVENTORY__SERVICES=web,db`).
pub const ENV_PREFIX: &str = "HIERA_INVENTORY";

/// Raw settings as written in `hieraData.yml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawSettings {
    #[serde(rename = "dynInvEnv")]
    pub environments: Vec<String>,
    #[serde(rename = "dynInvServ")]
    pub services: Vec<String>,
    #[serde(rename = "dynInvServIgnore")]
    pub ignored_services: Vec<String>,
    #[serde(rename = "hieraFile")]
    pub hiera_file: String,
    #[serde(rename = "hieraBackend", default)]
    pub hiera_backend: Option<String>,
}

/// Resolved settings for one inventory run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySettings {
    pub environments: EnvironmentSelector,
    pub services: ServiceSelector,
    pub ignored_services: BTreeSet<String>,
    /// Hiera configuration file (`~` and `$VAR` expanded)
    pub hiera_file: PathBuf,
    /// Backend section of the Hiera config that carries `:datadir`
    pub hiera_backend: String,
}

impl From<RawSettings> for InventorySettings {
    fn from(raw: RawSettings) -> Self {
        Self {
            environments: EnvironmentSelector::from_list(raw.environments),
            services: ServiceSelector::from_list(raw.services),
            ignored_services: raw.ignored_services.into_iter().collect(),
            hiera_file: PathBuf::from(expand_env_vars(&raw.hiera_file)),
            hiera_backend: raw
                .hiera_backend
                .unwrap_or_else(|| DEFAULT_HIERA_BACKEND.to_string()),
        }
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl RawSettings {
    /// Parse settings YAML; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        })
    }

    /// Apply `HIERA_INVENTORY__*` variables from `env` as explicit overrides.
    ///
    /// Overrides replace values (lists are not merged). Lists are comma separated.
    pub fn apply_env_overrides(mut self, env: Environment) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                env.separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("environments")
                    .with_list_parse_key("services")
                    .with_list_parse_key("ignored_services"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("environments") {
            debug!("override environments: {:?}", val);
            self.environments = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("services") {
            debug!("override services: {:?}", val);
            self.services = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("ignored_services") {
            debug!("override ignored_services: {:?}", val);
            self.ignored_services = val;
        }
        if let Ok(val) = config.get_string("hiera_file") {
            debug!("override hiera_file: {}", val);
            self.hiera_file = val;
        }
        if let Ok(val) = config.get_string("hiera_backend") {
            debug!("override hiera_backend: {}", val);
            self.hiera_backend = Some(val);
        }

        Ok(self)
    }
}

impl InventorySettings {
    /// Load settings from `path`, then apply process environment overrides.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        Self::load_with_env(fs, path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings from `path` with an explicit environment source.
    pub fn load_with_env(
        fs: &dyn FileSystem,
        path: &Path,
        env: Environment,
    ) -> ApplicationResult<Self> {
        debug!("load settings: {}", path.display());
        let content = fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::Config {
                message: format!("read {}: {}", path.display(), e),
            })?;
        let raw = RawSettings::parse(&content, path)?.apply_env_overrides(env)?;
        Ok(raw.into())
    }
}

/// Parsed Hiera configuration (`hiera.yaml`, v3 layout).
#[derive(Debug, Clone)]
pub struct HieraConfig {
    path: PathBuf,
    root: Value,
}

impl HieraConfig {
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        let root = serde_yaml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Self> {
        debug!("load hiera config: {}", path.display());
        let content = fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::Config {
                message: format!("read {}: {}", path.display(), e),
            })?;
        Self::parse(&content, path)
    }

    /// Data directory declared under `<backend>` → `:datadir`.
    ///
    /// `~` and `$VAR` are expanded; relative paths stay relative to the working directory.
    pub fn data_dir(&self, backend: &str) -> ApplicationResult<PathBuf> {
        let section = self
            .root
            .get(backend)
            .ok_or_else(|| self.missing_key(backend.to_string()))?;
        let datadir = section
            .get(DATADIR_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing_key(format!("{backend} -> {DATADIR_KEY}")))?;
        Ok(PathBuf::from(expand_env_vars(datadir)))
    }

    fn missing_key(&self, key: String) -> ApplicationError {
        ApplicationError::MissingKey {
            path: self.path.clone(),
            key,
        }
    }
}
