use std::path::{Path, PathBuf};

/// Extension of node files addressed by environment name.
pub const NODE_FILE_EXTENSION: &str = "yaml";

/// Subdirectory of the Hiera data directory holding one node file per environment.
pub const NODES_DIR: &str = "nodes";

pub fn nodes_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(NODES_DIR)
}

/// `<nodes_dir>/<environment>.yaml`
pub fn node_file(nodes_dir: &Path, environment: &str) -> PathBuf {
    nodes_dir.join(format!("{environment}.{NODE_FILE_EXTENSION}"))
}

/// Environment name of a node file: its file name minus the last extension.
///
/// `prod.yaml` → `prod`, `eu.prod.yml` → `eu.prod`, `.hidden` → `.hidden`.
/// `None` when the stem is not valid UTF-8.
pub fn environment_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
}
