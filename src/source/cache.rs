use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use super::client::HttpSource;

/// Local cache for remote source files
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "playmart")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for a URL: hash of the full URL plus its file name, so
    /// equal file names from different locations cannot collide
    fn cached_path(&self, url: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let name = url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("download");
        self.cache_dir
            .join(format!("{:016x}-{}", hasher.finish(), name))
    }

    /// Return a local copy of the URL, downloading unless already cached
    pub fn fetch(&self, client: &HttpSource, url: &str, refresh: bool) -> Result<PathBuf> {
        let dest = self.cached_path(url);
        if dest.exists() && !refresh {
            return Ok(dest);
        }

        fs::create_dir_all(&self.cache_dir).context("Failed to create cache directory")?;
        client.download(url, &dest)?;
        Ok(dest)
    }
}
