// src/generator.rs

//! Feed generation from a Maven repository
//!
//! Reads an artifact's versioning metadata and the POM of every listed
//! version, then assembles a feed with [`FeedBuilder`]. Repositories without
//! `maven-metadata.xml` are handled too: local repositories written by
//! `mvn install` carry `maven-metadata-local.xml`, and as a last resort the
//! version directories themselves are listed.

use crate::builder::FeedBuilder;
use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::maven::{ArtifactRef, Coordinate, LOCAL_METADATA_FILE, METADATA_FILE};
use crate::metadata::MavenMetadata;
use crate::pom::ProjectModel;
use crate::repository::RepositorySource;
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum depth of `<parent>` chains followed when loading a POM
const MAX_PARENT_DEPTH: usize = 10;

/// Generates feeds for artifacts of one repository
pub struct FeedGenerator<'a> {
    repository: &'a dyn RepositorySource,
    service_url: String,
}

impl<'a> FeedGenerator<'a> {
    /// Create a generator publishing dependency feeds under `service_url`
    pub fn new(repository: &'a dyn RepositorySource, service_url: impl Into<String>) -> Self {
        Self {
            repository,
            service_url: service_url.into(),
        }
    }

    /// Load versioning metadata, falling back to local metadata and directory listing
    pub fn load_metadata(&self, artifact: &ArtifactRef) -> Result<MavenMetadata> {
        let dir = artifact.dir_path();

        for file in [METADATA_FILE, LOCAL_METADATA_FILE] {
            let path = format!("{}{}", dir, file);
            match self.repository.fetch_text(&path) {
                Ok(xml) => {
                    debug!("Loaded {}", path);
                    let metadata = MavenMetadata::parse(&xml)?;
                    if metadata.group_id != artifact.group_id || metadata.artifact_id != artifact.artifact_id {
                        warn!(
                            "{} describes {}:{}, expected {}",
                            path, metadata.group_id, metadata.artifact_id, artifact
                        );
                    }
                    return Ok(metadata);
                }
                Err(Error::NotFoundError(_)) => debug!("No {} for {}", file, artifact),
                Err(e) => return Err(e),
            }
        }

        let versions = self.repository.list_versions(&dir).or_else(|e| match e {
            Error::NotFoundError(_) => Ok(Vec::new()),
            other => Err(other),
        })?;
        let latest = versions
            .last()
            .cloned()
            .ok_or_else(|| Error::NotFoundError(format!("No versions of {} in repository", artifact)))?;

        info!("No metadata for {}, using {} version directories", artifact, versions.len());
        Ok(MavenMetadata::new(&artifact.group_id, &artifact.artifact_id, latest, versions))
    }

    /// Load a POM with its parent chain merged in
    pub fn load_model(&self, coordinate: &Coordinate) -> Result<ProjectModel> {
        self.load_model_at_depth(coordinate, 0)
    }

    fn load_model_at_depth(&self, coordinate: &Coordinate, depth: usize) -> Result<ProjectModel> {
        let path = coordinate.file_path("pom");
        let xml = self.repository.fetch_text(&path)?;
        let mut model = ProjectModel::parse(&xml)?;

        let Some(parent) = model.parent.clone() else {
            return Ok(model);
        };
        if depth >= MAX_PARENT_DEPTH {
            warn!("Parent chain of {} is deeper than {}, stopping", coordinate, MAX_PARENT_DEPTH);
            return Ok(model);
        }

        let parent_coordinate = match parent.coordinate() {
            Ok(c) => c,
            Err(e) => {
                warn!("Ignoring parent of {}: {}", coordinate, e);
                return Ok(model);
            }
        };

        match self.load_model_at_depth(&parent_coordinate, depth + 1) {
            Ok(parent_model) => {
                debug!("Merging parent {} into {}", parent_coordinate, coordinate);
                model.inherit(&parent_model);
            }
            Err(Error::NotFoundError(_)) => {
                warn!("Parent POM {} of {} not found", parent_coordinate, coordinate);
            }
            Err(e) => return Err(e),
        }

        Ok(model)
    }

    /// Build the feed for all versions of an artifact
    pub fn generate(&self, artifact: &ArtifactRef) -> Result<Feed> {
        let metadata = self.load_metadata(artifact)?;
        info!(
            "Generating feed for {} ({} versions, latest {})",
            artifact,
            metadata.versions.len(),
            metadata.latest_version
        );

        let mut models = Vec::with_capacity(metadata.versions.len());
        for version in &metadata.versions {
            let coordinate = match Coordinate::new(&artifact.group_id, &artifact.artifact_id, version) {
                Ok(coordinate) => coordinate,
                Err(e @ Error::InvalidCoordinate(_)) => {
                    warn!("Skipping version {}: {}", version, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            match self.load_model(&coordinate) {
                Ok(mut model) => {
                    // Files live where the POM was found, whatever it declares
                    if model.version != coordinate.version {
                        debug!(
                            "POM of {} declares version '{}'",
                            coordinate, model.version
                        );
                    }
                    model.group_id = coordinate.group_id;
                    model.artifact_id = coordinate.artifact_id;
                    model.version = coordinate.version;
                    models.push(model);
                }
                Err(e @ (Error::NotFoundError(_) | Error::ParseError(_))) => {
                    warn!("Skipping version {}: {}", version, e);
                }
                Err(e) => return Err(e),
            }
        }

        let latest = models
            .iter()
            .find(|m| m.version == metadata.latest_version)
            .or_else(|| models.last())
            .ok_or_else(|| Error::NotFoundError(format!("No POM found for any version of {}", artifact)))?;

        let mut builder = FeedBuilder::new(self.repository.base_url().as_str(), &self.service_url);
        builder.add_metadata(latest);
        for model in &models {
            builder.add_remote_implementation(model);
        }

        Ok(builder.build())
    }
}

/// Generate the feed of an artifact and write it to `output_file`
pub fn run_xslt(
    artifact: &ArtifactRef,
    output_file: &Path,
    repository: &dyn RepositorySource,
    service_url: &str,
) -> Result<Feed> {
    let feed = FeedGenerator::new(repository, service_url).generate(artifact)?;
    feed.write_to(output_file)?;
    info!(
        "Wrote {} implementations to {}",
        feed.implementations.len(),
        output_file.display()
    );
    Ok(feed)
}
