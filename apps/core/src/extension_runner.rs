use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::logging;

pub const SOCKET_ENV: &str = "LIGHTDASH_EXTENSION_SOCKET";
pub const EXTENSION_ID_ENV: &str = "LIGHTDASH_EXTENSION_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub started: usize,
    pub warnings: Vec<String>,
}

/// Starts every configured extension runner. One runner failing must not
/// keep the others from coming up.
pub trait RunnerManager: Send {
    fn run_all(&mut self) -> RunReport;
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ExtensionManifest {
    id: String,
    name: String,
    exec: Vec<String>,
    enabled: bool,
}

impl Default for ExtensionManifest {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            exec: Vec::new(),
            enabled: true,
        }
    }
}

pub struct ProcessRunnerManager {
    extensions_dir: PathBuf,
    socket_path: PathBuf,
    children: Vec<Child>,
}

impl ProcessRunnerManager {
    pub fn new(extensions_dir: PathBuf, socket_path: PathBuf) -> Self {
        Self {
            extensions_dir,
            socket_path,
            children: Vec::new(),
        }
    }

    fn spawn_extension(
        &mut self,
        manifest_path: &Path,
        manifest: &ExtensionManifest,
    ) -> Result<(), String> {
        if manifest.id.trim().is_empty() {
            return Err("manifest is missing an id".to_string());
        }
        if manifest.exec.is_empty() {
            return Err("manifest is missing an exec command".to_string());
        }

        let workdir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.extensions_dir.clone());

        let child = Command::new(&manifest.exec[0])
            .args(&manifest.exec[1..])
            .current_dir(&workdir)
            .env(SOCKET_ENV, &self.socket_path)
            .env(EXTENSION_ID_ENV, &manifest.id)
            .spawn()
            .map_err(|error| format!("spawn failed: {error}"))?;

        logging::info(&format!(
            "extension runner started: {} ({})",
            manifest.id,
            if manifest.name.is_empty() {
                "unnamed"
            } else {
                &manifest.name
            }
        ));
        self.children.push(child);
        Ok(())
    }
}

impl RunnerManager for ProcessRunnerManager {
    fn run_all(&mut self) -> RunReport {
        let mut report = RunReport::default();

        for manifest_path in discover_manifest_paths(&self.extensions_dir) {
            let manifest = match load_manifest(&manifest_path) {
                Ok(manifest) => manifest,
                Err(error) => {
                    report
                        .warnings
                        .push(format!("{}: {error}", manifest_path.display()));
                    continue;
                }
            };

            if !manifest.enabled {
                continue;
            }

            match self.spawn_extension(&manifest_path, &manifest) {
                Ok(()) => report.started += 1,
                Err(error) => report
                    .warnings
                    .push(format!("{}: {error}", manifest_path.display())),
            }
        }

        report
    }
}

impl Drop for ProcessRunnerManager {
    fn drop(&mut self) {
        for child in &mut self.children {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn discover_manifest_paths(extensions_dir: &Path) -> Vec<PathBuf> {
    if !extensions_dir.is_dir() {
        return Vec::new();
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(extensions_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name() == "manifest.json")
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

fn load_manifest(path: &Path) -> Result<ExtensionManifest, String> {
    let raw = fs::read_to_string(path).map_err(|error| format!("unreadable manifest: {error}"))?;
    json5::from_str(&raw).map_err(|error| format!("invalid manifest: {error}"))
}

pub struct MockRunnerManager {
    log: Arc<Mutex<Vec<String>>>,
}

impl MockRunnerManager {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Self {
        Self { log }
    }
}

impl RunnerManager for MockRunnerManager {
    fn run_all(&mut self) -> RunReport {
        self.log.lock().unwrap().push("runners:run_all".to_string());
        RunReport::default()
    }
}
