// src/builder.rs

//! Builds feeds from Maven project models
//!
//! [`FeedBuilder`] turns POM data into feed elements. Feed-level metadata
//! comes from one model (normally the latest version); every version then
//! contributes one implementation.
//!
//! Dependencies become `<requires>` on the feed the pom2feed service
//! publishes for them. Only dependencies needed at run time are kept:
//!
//! | Scope      | Result                          |
//! |------------|---------------------------------|
//! | `compile`  | `<requires>`                    |
//! | `runtime`  | `<requires>`                    |
//! | optional   | `<requires importance="recommended">` |
//! | `test`, `provided`, `system`, `import` | skipped |

use crate::feed::{EnvironmentBinding, Feed, FileRetrieval, Implementation, Importance, Requirement, Stability};
use crate::maven::{artifact_file_path, ensure_slash_end, service_uri};
use crate::pom::{Dependency, ProjectModel};
use crate::version::{convert_requirement, convert_version};
use tracing::debug;

/// Summary used when a POM has no description
pub const DEFAULT_SUMMARY: &str = "Maven artifact";

/// Accumulates a feed for one artifact
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    repository_base: String,
    service_url: String,
    feed: Feed,
}

impl FeedBuilder {
    /// Create a builder
    ///
    /// `repository_base` is the URL artifact files are downloaded from;
    /// `service_url` is the base of the pom2feed service that publishes feeds
    /// for dependencies.
    pub fn new(repository_base: &str, service_url: &str) -> Self {
        Self {
            repository_base: ensure_slash_end(repository_base),
            service_url: ensure_slash_end(service_url),
            feed: Feed::default(),
        }
    }

    /// Fill in name, summary, description, homepage and feed URI
    pub fn add_metadata(&mut self, model: &ProjectModel) -> &mut Self {
        self.feed.uri = Some(service_uri(&self.service_url, &model.group_id, &model.artifact_id));
        self.feed.name = model.display_name().to_string();

        let description = model
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        match description {
            Some(text) => {
                let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
                self.feed.summary = lines.next().unwrap_or(DEFAULT_SUMMARY).to_string();
                self.feed.description = if lines.next().is_some() {
                    Some(text.to_string())
                } else {
                    None
                };
            }
            None => {
                self.feed.summary = DEFAULT_SUMMARY.to_string();
                self.feed.description = None;
            }
        }

        self.feed.homepage = model.url.clone();
        self
    }

    /// Add an implementation downloaded from the repository
    ///
    /// Projects with `pom` packaging have no artifact file, so their
    /// implementation only carries dependencies.
    pub fn add_remote_implementation(&mut self, model: &ProjectModel) -> &mut Self {
        let mut implementation = self.implementation(model);

        if model.has_artifact_file() {
            let dest = model.artifact_file_name();
            let href = format!(
                "{}{}",
                self.repository_base,
                artifact_file_path(&model.group_id, &model.artifact_id, &model.version, model.file_extension())
            );
            debug!("Implementation {} downloads {}", model.version, href);

            if model.file_extension() == "jar" {
                implementation.bindings.push(EnvironmentBinding::classpath(&dest));
            }
            implementation.file = Some(FileRetrieval { href, size: None, dest });
        }

        self.feed.implementations.push(implementation);
        self
    }

    /// Add an implementation that already exists on disk, e.g. a local build
    pub fn add_local_implementation(&mut self, model: &ProjectModel, local_path: &str) -> &mut Self {
        let mut implementation = self.implementation(model);
        implementation.local_path = Some(local_path.to_string());
        if model.has_artifact_file() && model.file_extension() == "jar" {
            implementation
                .bindings
                .push(EnvironmentBinding::classpath(model.local_file_name()));
        }

        self.feed.implementations.push(implementation);
        self
    }

    /// Feed built so far
    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// Finish building
    pub fn build(self) -> Feed {
        self.feed
    }

    fn implementation(&self, model: &ProjectModel) -> Implementation {
        let stability = model
            .version
            .to_ascii_uppercase()
            .ends_with("SNAPSHOT")
            .then_some(Stability::Developer);

        Implementation {
            id: model.version.clone(),
            version: convert_version(&model.version),
            stability,
            requires: model
                .dependencies
                .iter()
                .filter_map(|dep| self.requirement(dep))
                .collect(),
            ..Default::default()
        }
    }

    fn requirement(&self, dependency: &Dependency) -> Option<Requirement> {
        if !dependency.scope.is_runtime() {
            debug!(
                "Skipping {}:{} in scope {}",
                dependency.group_id, dependency.artifact_id, dependency.scope
            );
            return None;
        }

        let version = dependency
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.contains("${"))
            .map(convert_requirement)
            .filter(|v| !v.is_empty());

        Some(Requirement {
            interface: service_uri(&self.service_url, &dependency.group_id, &dependency.artifact_id),
            version,
            importance: if dependency.optional {
                Importance::Recommended
            } else {
                Importance::Essential
            },
        })
    }
}
