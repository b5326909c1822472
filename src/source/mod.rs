//! Resolves configured data locations into readable local files:
//! local files or directories as-is, http(s) URLs through the download
//! cache. `s3://` prefixes only make sense inside rendered COPY
//! statements and are rejected here.

pub mod cache;
pub mod client;

pub use cache::*;
pub use client::*;

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn reject_object_storage(location: &str) -> Result<()> {
    if location.starts_with("s3://") {
        bail!(
            "Cannot read {} directly; run the rendered copy statements against the warehouse, \
             or point the config at a local copy of the data",
            location
        );
    }
    Ok(())
}

/// Resolve a data location into local files: a single file, every
/// `.json`/`.jsonl` file under a directory (recursive, sorted), or a
/// cached download for http(s) URLs.
pub fn resolve_data_files(
    location: &str,
    cache: &CacheManager,
    refresh: bool,
) -> Result<Vec<PathBuf>> {
    if is_remote(location) {
        let client = HttpSource::new()?;
        return Ok(vec![cache.fetch(&client, location, refresh)?]);
    }
    reject_object_storage(location)?;

    let root = Path::new(location);
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        bail!("Data location not found: {:?}", root);
    }

    let mut files = Vec::new();
    collect_data_files(root, &mut files)
        .with_context(|| format!("Failed to scan data directory: {:?}", root))?;
    files.sort();

    if files.is_empty() {
        bail!("No .json or .jsonl files under {:?}", root);
    }
    Ok(files)
}

/// Fetch the text of a single location (for descriptor files)
pub fn fetch_text(location: &str, cache: &CacheManager, refresh: bool) -> Result<String> {
    if is_remote(location) {
        let client = HttpSource::new()?;
        let path = cache.fetch(&client, location, refresh)?;
        return fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cached file: {:?}", path));
    }
    reject_object_storage(location)?;

    fs::read_to_string(location).with_context(|| format!("Failed to read: {}", location))
}

fn collect_data_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_data_files(&path, files)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("jsonl")
        ) {
            files.push(path);
        }
    }
    Ok(())
}
