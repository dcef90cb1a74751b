// src/pom.rs

//! Project model parsed from a POM file
//!
//! Only the subset of the POM that matters for a feed is read: coordinates,
//! descriptive text, the final name and dependencies. Two parts of Maven's
//! effective-model construction are reproduced:
//!
//! - **Inheritance**: `groupId` and `version` fall back to `<parent>`, and
//!   [`ProjectModel::inherit`] merges properties, description, managed
//!   versions and dependencies from a parsed parent POM.
//! - **Interpolation**: `${project.version}`, `${project.groupId}`,
//!   `${project.artifactId}`, their `pom.*` aliases, `${project.parent.*}`
//!   and `<properties>` entries are substituted. Unknown placeholders are
//!   left untouched.

use crate::error::{Error, Result};
use crate::maven::{artifact_file_name, packaging_extension, Coordinate};
use crate::xml::Element;
use std::collections::BTreeMap;
use std::fmt;

/// Nested placeholder resolution passes (properties referring to properties)
const MAX_INTERPOLATION_PASSES: usize = 8;

/// Maven dependency scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    /// Parse a `<scope>` value; unknown scopes are treated as compile scope
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "provided" => Self::Provided,
            "runtime" => Self::Runtime,
            "test" => Self::Test,
            "system" => Self::System,
            "import" => Self::Import,
            _ => Self::Compile,
        }
    }

    /// Whether dependencies in this scope are needed to run the artifact
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Compile | Self::Runtime)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        };
        write!(f, "{}", name)
    }
}

/// A `<dependency>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    /// Version or version range; absent when managed elsewhere and unresolved
    pub version: Option<String>,
    pub scope: Scope,
    pub optional: bool,
}

impl Dependency {
    fn parse(element: &Element) -> Option<Self> {
        Some(Self {
            group_id: element.child_text("groupId")?,
            artifact_id: element.child_text("artifactId")?,
            version: element.child_text("version"),
            scope: element
                .child_text("scope")
                .map(|s| Scope::parse(&s))
                .unwrap_or_default(),
            optional: element
                .child_text("optional")
                .is_some_and(|o| o.eq_ignore_ascii_case("true")),
        })
    }

    fn same_artifact(&self, other: &Dependency) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

/// Coordinates of a `<parent>` POM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ParentRef {
    /// Coordinate of the parent, for locating its POM in a repository
    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(&self.group_id, &self.artifact_id, &self.version)
    }
}

/// The parts of a Maven project model used to build feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub final_name: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
}

impl ProjectModel {
    /// Parse a POM document
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;
        if root.name != "project" {
            return Err(Error::ParseError(format!(
                "Expected <project> root, found <{}>",
                root.name
            )));
        }

        let parent = root.child("parent").and_then(|p| {
            Some(ParentRef {
                group_id: p.child_text("groupId")?,
                artifact_id: p.child_text("artifactId")?,
                version: p.child_text("version")?,
            })
        });

        let artifact_id = root
            .child_text("artifactId")
            .ok_or_else(|| Error::ParseError("POM is missing <artifactId>".to_string()))?;
        let group_id = root
            .child_text("groupId")
            .or_else(|| parent.as_ref().map(|p| p.group_id.clone()))
            .ok_or_else(|| Error::ParseError(format!("POM of {} is missing <groupId>", artifact_id)))?;
        let version = root
            .child_text("version")
            .or_else(|| parent.as_ref().map(|p| p.version.clone()))
            .ok_or_else(|| Error::ParseError(format!("POM of {} is missing <version>", artifact_id)))?;

        let properties = root
            .child("properties")
            .map(|props| {
                props
                    .children
                    .iter()
                    .map(|p| (p.name.clone(), p.text.trim().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let dependencies = root
            .child("dependencies")
            .map(|deps| deps.children("dependency").filter_map(Dependency::parse).collect())
            .unwrap_or_default();

        let managed_dependencies = root
            .find(&["dependencyManagement", "dependencies"])
            .map(|deps| deps.children("dependency").filter_map(Dependency::parse).collect())
            .unwrap_or_default();

        let mut model = Self {
            group_id,
            artifact_id,
            version,
            packaging: root.child_text("packaging").unwrap_or_else(|| "jar".to_string()),
            name: root.child_text("name"),
            description: root.child_text("description"),
            url: root.child_text("url"),
            final_name: root.find(&["build", "finalName"]).map(|f| f.text.trim().to_string()),
            parent,
            properties,
            dependencies,
            managed_dependencies,
        };
        model.resolve();
        Ok(model)
    }

    /// Merge inheritable values from a parsed parent model
    ///
    /// Values already present in this model win. Placeholders left unresolved
    /// by the child's own properties get a second chance with the merged set.
    pub fn inherit(&mut self, parent: &ProjectModel) {
        for (key, value) in &parent.properties {
            self.properties.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if self.description.is_none() {
            self.description = parent.description.clone();
        }
        for managed in &parent.managed_dependencies {
            if !self.managed_dependencies.iter().any(|m| m.same_artifact(managed)) {
                self.managed_dependencies.push(managed.clone());
            }
        }
        for dependency in &parent.dependencies {
            if !self.dependencies.iter().any(|d| d.same_artifact(dependency)) {
                self.dependencies.push(dependency.clone());
            }
        }
        self.resolve();
    }

    /// Interpolate placeholders and fill dependency versions from management
    fn resolve(&mut self) {
        self.group_id = self.interpolate(&self.group_id);
        self.version = self.interpolate(&self.version);

        let name = self.name.as_deref().map(|v| self.interpolate(v));
        let description = self.description.as_deref().map(|v| self.interpolate(v));
        let url = self.url.as_deref().map(|v| self.interpolate(v));
        let final_name = self.final_name.as_deref().map(|v| self.interpolate(v));
        self.name = name;
        self.description = description;
        self.url = url;
        self.final_name = final_name;

        let managed: Vec<Dependency> = self
            .managed_dependencies
            .iter()
            .map(|d| self.interpolate_dependency(d))
            .collect();
        let dependencies: Vec<Dependency> = self
            .dependencies
            .iter()
            .map(|d| {
                let mut dep = self.interpolate_dependency(d);
                if dep.version.is_none() {
                    dep.version = managed
                        .iter()
                        .find(|m| m.same_artifact(&dep))
                        .and_then(|m| m.version.clone());
                }
                dep
            })
            .collect();

        self.managed_dependencies = managed;
        self.dependencies = dependencies;
    }

    fn interpolate_dependency(&self, dependency: &Dependency) -> Dependency {
        Dependency {
            group_id: self.interpolate(&dependency.group_id),
            artifact_id: self.interpolate(&dependency.artifact_id),
            version: dependency.version.as_deref().map(|v| self.interpolate(v)),
            scope: dependency.scope,
            optional: dependency.optional,
        }
    }

    /// Substitute `${...}` placeholders in a value
    pub fn interpolate(&self, value: &str) -> String {
        let mut result = value.to_string();
        for _ in 0..MAX_INTERPOLATION_PASSES {
            if !result.contains("${") {
                break;
            }
            let next = self.interpolate_once(&result);
            if next == result {
                break;
            }
            result = next;
        }
        result
    }

    fn interpolate_once(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.lookup(key) {
                        Some(replacement) => out.push_str(&replacement),
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let key = key.trim();
        let project_key = key
            .strip_prefix("project.")
            .or_else(|| key.strip_prefix("pom."));

        match project_key {
            Some("version") => Some(self.version.clone()),
            Some("groupId") => Some(self.group_id.clone()),
            Some("artifactId") => Some(self.artifact_id.clone()),
            Some("packaging") => Some(self.packaging.clone()),
            Some("parent.version") => self.parent.as_ref().map(|p| p.version.clone()),
            Some("parent.groupId") => self.parent.as_ref().map(|p| p.group_id.clone()),
            Some("parent.artifactId") => self.parent.as_ref().map(|p| p.artifact_id.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Coordinate of this project
    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(&self.group_id, &self.artifact_id, &self.version)
    }

    /// Display name: `<name>`, falling back to the artifact id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.artifact_id)
    }

    /// Extension of the main artifact file
    pub fn file_extension(&self) -> &str {
        packaging_extension(&self.packaging)
    }

    /// Whether the project publishes a binary beside its POM
    pub fn has_artifact_file(&self) -> bool {
        self.packaging != "pom"
    }

    /// Name of the artifact file in the repository
    pub fn artifact_file_name(&self) -> String {
        artifact_file_name(&self.artifact_id, &self.version, &self.packaging)
    }

    /// Name of the artifact file produced by a local build (`<finalName>`)
    pub fn local_file_name(&self) -> String {
        match &self.final_name {
            Some(final_name) if !final_name.is_empty() => {
                format!("{}.{}", final_name, self.file_extension())
            }
            _ => self.artifact_file_name(),
        }
    }
}
