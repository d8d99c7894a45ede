//! Service container for dependency injection
//!
//! Wires up the inventory service with its filesystem.

use std::sync::Arc;

use crate::application::services::InventoryService;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub inventory: InventoryService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new() -> Self {
        Self::with_deps(Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(fs: Arc<dyn FileSystem>) -> Self {
        let inventory = InventoryService::new(Arc::clone(&fs));
        Self { fs, inventory }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}
