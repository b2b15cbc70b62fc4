use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::content::RawPage;

/// A content file that could not be read or decoded.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Read every `*.json` record under `dir` in file-name order. Bad files are
/// collected instead of aborting the load; only an unreadable directory is an
/// error.
pub fn load_dir(dir: &Path) -> Result<(Vec<RawPage>, Vec<LoadFailure>)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read content directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        match load_file(&path) {
            Ok(page) => pages.push(page),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                failures.push(LoadFailure {
                    path,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    info!(
        "Loaded {} page records from {} ({} unreadable)",
        pages.len(),
        dir.display(),
        failures.len()
    );
    Ok((pages, failures))
}

fn load_file(path: &Path) -> Result<RawPage> {
    let text = fs::read_to_string(path).context("read failed")?;
    serde_json::from_str(&text).context("not a valid page record")
}
