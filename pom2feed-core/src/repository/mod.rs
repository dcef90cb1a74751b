// src/repository/mod.rs

//! Access to Maven repositories
//!
//! This module provides functionality for:
//! - Reading repository files from a local directory (`~/.m2/repository`,
//!   a mirror on disk, or a `file://` URL)
//! - Fetching repository files over HTTP with timeouts and retries
//! - Computing artifact hashes, preferring published checksums for remote
//!   repositories
//!
//! Both backends implement [`RepositorySource`], so feed generation and
//! digest annotation work the same way against either.

mod http;
mod local;

pub use http::HttpRepository;
pub use local::LocalRepository;

use crate::error::{Error, Result};
use crate::hash::{hash_bytes, Hash, ManifestAlgorithm};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for failed requests
pub const DEFAULT_RETRIES: u32 = 3;

/// Default delay between attempts, multiplied by the attempt number
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Transport settings for remote repositories
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Read access to a Maven repository
///
/// Paths are relative to the repository root and use `/` separators,
/// e.g. `org/slf4j/slf4j-api/maven-metadata.xml`.
pub trait RepositorySource {
    /// Root URL of the repository, always ending in `/`
    fn base_url(&self) -> &Url;

    /// Whether reads go over the network
    fn is_remote(&self) -> bool;

    /// Read a file completely
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Size of a file in bytes
    fn size(&self, path: &str) -> Result<u64>;

    /// Version directories of an artifact, for repositories without metadata
    fn list_versions(&self, _artifact_dir: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Hash a file's content
    fn hash_file(&self, path: &str, algorithm: ManifestAlgorithm) -> Result<Hash> {
        Ok(hash_bytes(algorithm, &self.fetch(path)?))
    }

    /// Read a file as UTF-8 text
    fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch(path)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("{} is not valid UTF-8: {}", path, e)))
    }

    /// First line of a text file, trimmed
    fn first_line(&self, path: &str) -> Result<String> {
        let text = self.fetch_text(path)?;
        Ok(text.lines().next().unwrap_or("").trim().to_string())
    }

    /// Whether a file exists
    fn exists(&self, path: &str) -> Result<bool> {
        match self.size(path) {
            Ok(_) => Ok(true),
            Err(Error::NotFoundError(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Absolute URL of a repository file, as written into feeds
    fn url_for(&self, path: &str) -> Result<String> {
        self.base_url()
            .join(path)
            .map(String::from)
            .map_err(|e| Error::ParseError(format!("Invalid repository path '{}': {}", path, e)))
    }

    /// Path of a URL relative to this repository, if it lies inside it
    fn relative_path(&self, href: &str) -> Option<String> {
        href.strip_prefix(self.base_url().as_str())
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

/// Open a repository from a path or URL
///
/// - `http://` and `https://` URLs use [`HttpRepository`]
/// - `file://` URLs and plain paths use [`LocalRepository`]; a leading `~/`
///   expands to the home directory
pub fn open_repository(location: &str, options: &RepositoryOptions) -> Result<Box<dyn RepositorySource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpRepository::new(location, options)?));
    }

    if location.starts_with("file://") {
        let url = Url::parse(location)
            .map_err(|e| Error::UnsupportedRepository(format!("{}: {}", location, e)))?;
        let path = url
            .to_file_path()
            .map_err(|_| Error::UnsupportedRepository(location.to_string()))?;
        return Ok(Box::new(LocalRepository::open(path)?));
    }

    if location.contains("://") {
        return Err(Error::UnsupportedRepository(location.to_string()));
    }

    Ok(Box::new(LocalRepository::open(expand_home(location))?))
}

fn expand_home(location: &str) -> PathBuf {
    match location.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(location)),
        None => PathBuf::from(location),
    }
}
