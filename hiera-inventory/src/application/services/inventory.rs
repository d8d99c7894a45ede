//! Inventory service
//!
//! Builds the flat `environment.service` → DNS names inventory from Hiera node files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{HieraConfig, InventorySettings};
use crate::domain::{EnvironmentSelector, Inventory, NodeDocument, NodeEntries, ServiceSelector};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::{environment_name, node_file, nodes_dir};

/// Service for building the dynamic inventory.
pub struct InventoryService {
    fs: Arc<dyn FileSystem>,
}

impl InventoryService {
    /// Create a new inventory service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Build the inventory for `settings`.
    ///
    /// Every node file is loaded and validated before the inventory is returned,
    /// so a failure never leaves a partial result behind.
    pub fn build(&self, settings: &InventorySettings) -> ApplicationResult<Inventory> {
        let data_dir = self.resolve_data_dir(settings)?;
        let nodes_dir = nodes_dir(&data_dir);
        debug!("build: nodes_dir={}", nodes_dir.display());

        let mut inventory = Inventory::new();
        for (environment, path) in self.node_files(&nodes_dir, &settings.environments)? {
            let document = self.load_node_document(&path)?;
            debug!(
                "build: environment={} services={}",
                environment,
                document.len()
            );

            if let ServiceSelector::Explicit(requested) = &settings.services {
                for service in requested.iter().filter(|s| document.get(s).is_none()) {
                    debug!("build: {} has no service {}, skipping", environment, service);
                }
            }

            for (service, hosts) in settings
                .services
                .select(&document, &settings.ignored_services)
            {
                inventory.insert(&environment, service, hosts.to_vec());
            }
        }

        info!("inventory built: {} groups", inventory.len());
        Ok(inventory)
    }

    /// Hiera data directory declared by the settings' Hiera config file.
    pub fn resolve_data_dir(&self, settings: &InventorySettings) -> ApplicationResult<PathBuf> {
        let hiera = HieraConfig::load(self.fs.as_ref(), &settings.hiera_file)?;
        let data_dir = hiera.data_dir(&settings.hiera_backend)?;
        debug!("resolve_data_dir: {}", data_dir.display());
        Ok(data_dir)
    }

    /// Environment name and node file for every selected environment, in output order.
    ///
    /// `All` takes every regular file of `nodes_dir`, sorted by file name. Files whose
    /// name is not valid UTF-8 have no environment name and are skipped with a warning.
    pub fn node_files(
        &self,
        nodes_dir: &Path,
        selector: &EnvironmentSelector,
    ) -> ApplicationResult<Vec<(String, PathBuf)>> {
        match selector {
            EnvironmentSelector::Explicit(environments) => Ok(environments
                .iter()
                .map(|env| (env.clone(), node_file(nodes_dir, env)))
                .collect()),
            EnvironmentSelector::All => {
                if !self.fs.is_dir(nodes_dir) {
                    return Err(ApplicationError::NodesDirNotFound(nodes_dir.to_path_buf()));
                }
                let files = self
                    .fs
                    .list_files(nodes_dir)
                    .with_path_context("list node files", nodes_dir)?;
                debug!("node_files: found {} files", files.len());
                Ok(files
                    .into_iter()
                    .filter_map(|path| match environment_name(&path) {
                        Some(env) => Some((env, path)),
                        None => {
                            warn!("skipping node file without UTF-8 name: {}", path.display());
                            None
                        }
                    })
                    .collect())
            }
        }
    }

    /// Read and parse one node file.
    pub fn load_node_document(&self, path: &Path) -> ApplicationResult<NodeDocument> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::NodeFileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read node file", path)?;

        let entries = if content.trim().is_empty() {
            NodeEntries::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| {
                ApplicationError::MalformedDocument {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        };

        NodeDocument::from_entries(entries).map_err(|source| ApplicationError::InvalidNodeDocument {
            path: path.to_path_buf(),
            source,
        })
    }
}
