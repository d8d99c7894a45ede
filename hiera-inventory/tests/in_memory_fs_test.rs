//! InventoryService against an in-memory FileSystem

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hiera_inventory::application::services::InventoryService;
use hiera_inventory::application::ApplicationError;
use hiera_inventory::config::InventorySettings;
use hiera_inventory::domain::{EnvironmentSelector, ServiceSelector};
use hiera_inventory::infrastructure::traits::FileSystem;

/// Files keyed by path; directories are implied by file paths.
/// Every read is recorded so tests can check what was touched.
#[derive(Default)]
struct InMemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    reads: Mutex<Vec<PathBuf>>,
}

impl InMemoryFileSystem {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }

    fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.keys().any(|file| file.starts_with(path) && file != path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|file| file.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

const HIERA: &str = ":eyaml:\n  :datadir: /hiera/data\n";

fn settings(environments: &[&str], services: &[&str]) -> InventorySettings {
    InventorySettings {
        environments: EnvironmentSelector::from_list(environments.iter().map(|s| s.to_string()).collect()),
        services: ServiceSelector::from_list(services.iter().map(|s| s.to_string()).collect()),
        ignored_services: Default::default(),
        hiera_file: PathBuf::from("/hiera/hiera.yaml"),
        hiera_backend: ":eyaml".to_string(),
    }
}

#[test]
fn given_explicit_environments_when_building_then_reads_hiera_then_each_node_file() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/hiera.yaml", HIERA)
            .with_file("/hiera/data/nodes/prod.yaml", "web: [p.example.com]\n")
            .with_file("/hiera/data/nodes/dev.yaml", "web: [d.example.com]\n")
            .with_file("/hiera/data/nodes/qa.yaml", "web: [q.example.com]\n"),
    );
    let service = InventoryService::new(fs.clone());

    let inventory = service.build(&settings(&["dev", "prod"], &["web"])).unwrap();

    assert_eq!(inventory.groups().collect::<Vec<_>>(), vec!["dev.web", "prod.web"]);
    assert_eq!(
        fs.reads(),
        vec![
            PathBuf::from("/hiera/hiera.yaml"),
            PathBuf::from("/hiera/data/nodes/dev.yaml"),
            PathBuf::from("/hiera/data/nodes/prod.yaml"),
        ]
    );
}

#[test]
fn given_hiera_without_datadir_when_building_then_missing_key_and_no_node_reads() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/hiera.yaml", ":eyaml:\n  :extension: eyaml\n")
            .with_file("/hiera/data/nodes/prod.yaml", "web: [p.example.com]\n"),
    );
    let service = InventoryService::new(fs.clone());

    let err = service.build(&settings(&["prod"], &["all"])).unwrap_err();

    assert!(matches!(err, ApplicationError::MissingKey { .. }), "unexpected error: {err}");
    assert_eq!(fs.reads(), vec![PathBuf::from("/hiera/hiera.yaml")]);
}

#[test]
fn given_second_env_broken_when_building_then_whole_build_fails() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/hiera.yaml", HIERA)
            .with_file("/hiera/data/nodes/a.yaml", "web: [a.example.com]\n")
            .with_file("/hiera/data/nodes/b.yaml", "web: {nested: true}\n"),
    );
    let service = InventoryService::new(fs);

    let result = service.build(&settings(&["all"], &["all"]));

    assert!(matches!(result, Err(ApplicationError::InvalidNodeDocument { .. })));
}

#[test]
fn given_empty_node_file_when_building_then_contributes_no_groups() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/hiera.yaml", HIERA)
            .with_file("/hiera/data/nodes/empty.yaml", "\n")
            .with_file("/hiera/data/nodes/prod.yaml", "web: [p.example.com]\n"),
    );
    let service = InventoryService::new(fs);

    let inventory = service.build(&settings(&["all"], &["all"])).unwrap();

    assert_eq!(inventory.groups().collect::<Vec<_>>(), vec!["prod.web"]);
}

#[test]
fn given_all_environments_when_listing_then_names_are_file_stems() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/data/nodes/eu.prod.yaml", "")
            .with_file("/hiera/data/nodes/us.yml", ""),
    );
    let service = InventoryService::new(fs);

    let files = service
        .node_files(Path::new("/hiera/data/nodes"), &EnvironmentSelector::All)
        .unwrap();

    let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["eu.prod", "us"]);
}

#[test]
fn given_repeated_service_in_node_file_when_building_then_last_value_wins() {
    let fs = Arc::new(
        InMemoryFileSystem::default()
            .with_file("/hiera/hiera.yaml", HIERA)
            .with_file(
                "/hiera/data/nodes/prod.yaml",
                "web: [old.example.com]\ndb: [d.example.com]\nweb: [new.example.com]\n",
            ),
    );
    let service = InventoryService::new(fs);

    let inventory = service.build(&settings(&["prod"], &["all"])).unwrap();

    assert_eq!(inventory.groups().collect::<Vec<_>>(), vec!["prod.web", "prod.db"]);
    assert_eq!(
        inventory.get("prod.web").unwrap()[0].as_str(),
        Some("new.example.com")
    );
}

#[cfg(unix)]
#[test]
fn given_node_file_with_non_utf8_name_when_listing_then_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let mut fs = InMemoryFileSystem::default().with_file("/hiera/data/nodes/prod.yaml", "");
    fs.files.insert(
        PathBuf::from(OsStr::from_bytes(b"/hiera/data/nodes/st\xffage.yaml")),
        String::new(),
    );
    let service = InventoryService::new(Arc::new(fs));

    let files = service
        .node_files(Path::new("/hiera/data/nodes"), &EnvironmentSelector::All)
        .unwrap();

    let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["prod"]);
}
