// src/pipeline.rs

//! End-to-end feed creation
//!
//! [`make_feed`] runs the whole conversion for one artifact:
//! resolve the artifact in the repository, generate the feed file, annotate
//! it with manifest digests and optionally sign it.

use crate::config::{Config, DEFAULT_SERVICE_URL};
use crate::digest::{add_digests, DigestSummary};
use crate::error::Result;
use crate::generator::run_xslt;
use crate::hash::ManifestAlgorithm;
use crate::maven::ArtifactRef;
use crate::repository::{open_repository, RepositoryOptions, RepositorySource};
use crate::sign::{sign_feed, GpgSigner};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings for [`make_feed`]
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Base URL dependency feeds are published under
    pub service_url: String,
    pub algorithm: ManifestAlgorithm,
    /// Whether to annotate the feed with manifest digests
    pub digests: bool,
    pub repository: RepositoryOptions,
    /// Sign the feed when set
    pub signer: Option<GpgSigner>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            algorithm: ManifestAlgorithm::default(),
            digests: true,
            repository: RepositoryOptions::default(),
            signer: None,
        }
    }
}

impl FeedOptions {
    /// Options as configured in a configuration file
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            service_url: config.feed.service_url.clone(),
            algorithm: config.algorithm()?,
            digests: config.feed.digests,
            repository: config.repository_options(),
            signer: config.signer(),
        })
    }
}

/// What [`make_feed`] produced
#[derive(Debug, Clone)]
pub struct FeedReport {
    pub artifact: ArtifactRef,
    pub feed_file: PathBuf,
    /// Number of implementations in the feed
    pub implementations: usize,
    /// Digest annotation outcome, when annotation ran
    pub digests: Option<DigestSummary>,
    /// Exported public key, when the feed was signed
    pub key_file: Option<PathBuf>,
}

/// Convert a Maven artifact into a feed file
pub fn make_feed(
    repository: &str,
    group: &str,
    artifact: &str,
    feed_file: &Path,
    options: &FeedOptions,
) -> Result<FeedReport> {
    let artifact = ArtifactRef::new(repository, group, artifact)?;
    info!("Resolving {} at {}", artifact, artifact.source_location());

    let source = open_repository(repository, &options.repository)?;
    make_feed_from(source.as_ref(), &artifact, feed_file, options)
}

/// Convert an artifact of an already opened repository
pub fn make_feed_from(
    source: &dyn RepositorySource,
    artifact: &ArtifactRef,
    feed_file: &Path,
    options: &FeedOptions,
) -> Result<FeedReport> {
    let feed = run_xslt(artifact, feed_file, source, &options.service_url)?;

    let digests = if options.digests {
        Some(add_digests(feed_file, source, options.algorithm)?)
    } else {
        info!("Skipping digest annotation");
        None
    };

    let key_file = match &options.signer {
        Some(signer) => Some(sign_feed(feed_file, signer)?),
        None => None,
    };

    Ok(FeedReport {
        artifact: artifact.clone(),
        feed_file: feed_file.to_path_buf(),
        implementations: feed.implementations.len(),
        digests,
        key_file,
    })
}
