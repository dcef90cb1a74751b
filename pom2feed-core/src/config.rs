// src/config.rs

//! Configuration file parsing
//!
//! Optional TOML file with the following sections:
//! - [repository] - Request timeout and retry count for remote repositories
//! - [feed] - pom2feed service URL, digest algorithm, whether to annotate
//! - [signing] - GnuPG key, executable and timeout
//!
//! ```toml
//! [repository]
//! timeout_secs = 30
//! retries = 3
//!
//! [feed]
//! service_url = "http://maven.0install.net/"
//! algorithm = "sha1new"
//! digests = true
//!
//! [signing]
//! key = "0123456789ABCDEF"
//! gpg_program = "gpg"
//! timeout_secs = 60
//! ```
//!
//! Command-line options override values from the file.

use crate::error::{Error, Result};
use crate::hash::ManifestAlgorithm;
use crate::repository::{RepositoryOptions, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
use crate::sign::{GpgSigner, DEFAULT_GPG_PROGRAM, DEFAULT_SIGNING_TIMEOUT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Base URL of the public pom2feed service
pub const DEFAULT_SERVICE_URL: &str = "http://maven.0install.net/";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Remote repository settings
    #[serde(default)]
    pub repository: RepositorySection,

    /// Feed generation settings
    #[serde(default)]
    pub feed: FeedSection,

    /// Signing settings
    #[serde(default)]
    pub signing: SigningSection,
}

/// Repository configuration section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepositorySection {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

/// Feed configuration section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedSection {
    /// Base URL dependency feeds are published under
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Manifest digest algorithm (`sha1new` or `sha256`)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Annotate generated feeds with manifest digests
    #[serde(default = "default_true")]
    pub digests: bool,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            algorithm: default_algorithm(),
            digests: true,
        }
    }
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_algorithm() -> String {
    ManifestAlgorithm::default().name().to_string()
}

fn default_true() -> bool {
    true
}

/// Signing configuration section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SigningSection {
    /// Key to sign with; feeds are left unsigned when absent
    #[serde(default)]
    pub key: Option<String>,

    /// gpg executable
    #[serde(default = "default_gpg_program")]
    pub gpg_program: String,

    /// Time limit per gpg invocation in seconds
    #[serde(default = "default_signing_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SigningSection {
    fn default() -> Self {
        Self {
            key: None,
            gpg_program: default_gpg_program(),
            timeout_secs: default_signing_timeout_secs(),
        }
    }
}

fn default_gpg_program() -> String {
    DEFAULT_GPG_PROGRAM.to_string()
}

fn default_signing_timeout_secs() -> u64 {
    DEFAULT_SIGNING_TIMEOUT.as_secs()
}

impl Config {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::ConfigError(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Self::parse(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Default location: `<config dir>/pom2feed/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pom2feed").join("config.toml"))
    }

    /// Load an explicit file, or the default file when it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        self.algorithm()?;
        if self.feed.service_url.trim().is_empty() {
            return Err(Error::ConfigError("feed.service_url must not be empty".to_string()));
        }
        if self.repository.timeout_secs == 0 {
            return Err(Error::ConfigError("repository.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Configured manifest digest algorithm
    pub fn algorithm(&self) -> Result<ManifestAlgorithm> {
        self.feed
            .algorithm
            .parse()
            .map_err(|e| Error::ConfigError(format!("feed.algorithm: {e}")))
    }

    /// Transport settings for remote repositories
    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            timeout: Duration::from_secs(self.repository.timeout_secs),
            retries: self.repository.retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Signer for the configured key, if any
    pub fn signer(&self) -> Option<GpgSigner> {
        self.signing.key.as_ref().map(|key| {
            GpgSigner::new(key.as_str())
                .with_program(self.signing.gpg_program.as_str())
                .with_timeout(Duration::from_secs(self.signing.timeout_secs))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.feed.service_url, "http://maven.0install.net/");
        assert_eq!(config.algorithm().unwrap(), ManifestAlgorithm::Sha1New);
        assert!(config.feed.digests);
        assert_eq!(config.repository_options().timeout, Duration::from_secs(30));
        assert_eq!(config.repository_options().retries, 3);
        assert!(config.signer().is_none());
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
            [repository]
            timeout_secs = 5
            retries = 1

            [feed]
            service_url = "https://feeds.example.com/maven/"
            algorithm = "sha256"
            digests = false

            [signing]
            key = "ABCD1234"
            gpg_program = "gpg2"
            timeout_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.repository_options().timeout, Duration::from_secs(5));
        assert_eq!(config.algorithm().unwrap(), ManifestAlgorithm::Sha256);
        assert!(!config.feed.digests);

        let signer = config.signer().unwrap();
        assert_eq!(signer.key, "ABCD1234");
        assert_eq!(signer.program, "gpg2");
        assert_eq!(signer.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = Config::parse("[signing]\nkey = \"K\"\n").unwrap();
        assert_eq!(config.signing.gpg_program, "gpg");
        assert_eq!(config.signing.timeout_secs, 60);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::parse("[feed]\nalgorithm = \"md5\"\n"),
            Err(Error::ConfigError(_))
        ));
        assert!(Config::parse("[repository]\ntimeout_secs = 0\n").is_err());
        assert!(Config::parse("[feed\n").is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[repository]\nretries = 7\n").unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.repository.retries, 7);

        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }
}
