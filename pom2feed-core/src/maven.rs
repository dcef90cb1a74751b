// src/maven.rs

//! Maven repository layout and artifact coordinates
//!
//! A Maven repository stores every artifact under a directory derived from
//! its coordinates:
//!
//! ```text
//! <root>/<group with dots as slashes>/<artifact>/<version>/<artifact>-<version>.<ext>
//! <root>/<group with dots as slashes>/<artifact>/maven-metadata.xml
//! ```
//!
//! Example: `org.slf4j:slf4j-api:2.0.9` lives at
//! `org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// File name of the versioning metadata stored beside every artifact
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Metadata file written by `mvn install` into local repositories
pub const LOCAL_METADATA_FILE: &str = "maven-metadata-local.xml";

/// Characters Maven accepts in group ids, artifact ids and versions
fn is_coordinate_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'
}

/// Check a single coordinate component
pub fn validate_coordinate(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidCoordinate(format!("{} is empty", kind)));
    }
    if !value.chars().all(is_coordinate_char) {
        return Err(Error::InvalidCoordinate(format!("{} '{}'", kind, value)));
    }
    Ok(())
}

/// A Maven artifact within a repository
///
/// Identifies the artifact across all of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef {
    /// Repository root (path or URL) as given by the user
    pub repository: String,
    /// Dotted group id, e.g. `org.slf4j`
    pub group_id: String,
    /// Artifact id, e.g. `slf4j-api`
    pub artifact_id: String,
}

impl ArtifactRef {
    /// Create a reference, normalising a slash-separated group to dotted form
    pub fn new(
        repository: impl Into<String>,
        group: impl AsRef<str>,
        artifact: impl Into<String>,
    ) -> Result<Self> {
        let group_id = group.as_ref().trim_matches('/').replace('/', ".");
        let artifact_id = artifact.into();

        validate_coordinate("group id", &group_id)?;
        validate_coordinate("artifact id", &artifact_id)?;

        Ok(Self {
            repository: repository.into(),
            group_id,
            artifact_id,
        })
    }

    /// Directory of the artifact relative to the repository root
    pub fn dir_path(&self) -> String {
        artifact_dir(&self.group_id, &self.artifact_id)
    }

    /// Path of `maven-metadata.xml` relative to the repository root
    pub fn metadata_path(&self) -> String {
        format!("{}{}", self.dir_path(), METADATA_FILE)
    }

    /// Full location of the artifact directory, joined onto the repository root
    pub fn source_location(&self) -> String {
        format!("{}{}", ensure_slash_end(&self.repository), self.dir_path())
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A fully versioned artifact coordinate `group:artifact:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let coordinate = Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        };
        validate_coordinate("group id", &coordinate.group_id)?;
        validate_coordinate("artifact id", &coordinate.artifact_id)?;
        validate_coordinate("version", &coordinate.version)?;
        Ok(coordinate)
    }

    /// Path of a file belonging to this version, relative to the repository root
    pub fn file_path(&self, extension: &str) -> String {
        artifact_file_path(&self.group_id, &self.artifact_id, &self.version, extension)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version),
            _ => Err(Error::InvalidCoordinate(format!(
                "expected group:artifact:version, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Append a trailing slash unless one is already present
pub fn ensure_slash_end(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Directory of an artifact relative to the repository root, with trailing slash
pub fn artifact_dir(group_id: &str, artifact_id: &str) -> String {
    format!("{}/{}/", group_id.replace('.', "/"), artifact_id)
}

/// File extension Maven uses for a packaging type
pub fn packaging_extension(packaging: &str) -> &str {
    match packaging {
        "" | "maven-plugin" | "bundle" | "ejb" | "jar" => "jar",
        other => other,
    }
}

/// File name of an artifact file, e.g. `slf4j-api-2.0.9.jar`
pub fn artifact_file_name(artifact_id: &str, version: &str, packaging: &str) -> String {
    format!("{}-{}.{}", artifact_id, version, packaging_extension(packaging))
}

/// Path of an artifact file relative to the repository root
pub fn artifact_file_path(group_id: &str, artifact_id: &str, version: &str, extension: &str) -> String {
    format!(
        "{}{}/{}-{}.{}",
        artifact_dir(group_id, artifact_id),
        version,
        artifact_id,
        version,
        extension
    )
}

/// URI of the feed a pom2feed service publishes for an artifact
///
/// The service mirrors the repository layout: `<service>/<group path>/<artifact>/`.
pub fn service_uri(service: &str, group_id: &str, artifact_id: &str) -> String {
    format!("{}{}", ensure_slash_end(service), artifact_dir(group_id, artifact_id))
}

/// Check that a service request path names an artifact directory
///
/// Valid paths have at least a group segment and an artifact segment,
/// no leading slash and a trailing slash: `org/slf4j/slf4j-api/`.
pub fn validate_artifact_path(path: &str) -> bool {
    let Some(body) = path.strip_suffix('/') else {
        return false;
    };
    let parts: Vec<&str> = body.split('/').collect();
    if parts.len() < 2 {
        return false;
    }
    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(is_coordinate_char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_ref_paths() {
        let artifact = ArtifactRef::new("https://repo.example.com/maven2", "org.example", "demo-lib").unwrap();

        assert_eq!(artifact.dir_path(), "org/example/demo-lib/");
        assert_eq!(artifact.metadata_path(), "org/example/demo-lib/maven-metadata.xml");
        assert_eq!(
            artifact.source_location(),
            "https://repo.example.com/maven2/org/example/demo-lib/"
        );
        assert_eq!(artifact.to_string(), "org.example:demo-lib");
    }

    #[test]
    fn test_artifact_ref_slash_group() {
        let artifact = ArtifactRef::new("/srv/m2", "org/example/", "demo").unwrap();
        assert_eq!(artifact.group_id, "org.example");
        assert_eq!(artifact.source_location(), "/srv/m2/org/example/demo/");
    }

    #[test]
    fn test_artifact_ref_rejects_invalid() {
        assert!(ArtifactRef::new("/srv/m2", "org example", "demo").is_err());
        assert!(ArtifactRef::new("/srv/m2", "org.example", "").is_err());
        assert!(ArtifactRef::new("/srv/m2", "org.example", "../etc").is_err());
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("artifact.subartifact", "1.0", "jar"), "artifact.subartifact-1.0.jar");
        assert_eq!(artifact_file_name("artifact.subartifact", "1.0", "war"), "artifact.subartifact-1.0.war");
        assert_eq!(
            artifact_file_name("artifact.subartifact", "1.0", "maven-plugin"),
            "artifact.subartifact-1.0.jar"
        );
        assert_eq!(artifact_file_name("a", "2", "bundle"), "a-2.jar");
    }

    #[test]
    fn test_artifact_file_path() {
        assert_eq!(
            artifact_file_path("group.subgroup", "artifact", "1.0", "pom"),
            "group/subgroup/artifact/1.0/artifact-1.0.pom"
        );
    }

    #[test]
    fn test_service_uri() {
        assert_eq!(
            service_uri("http://0install.de/maven", "group.subgroup", "artifact"),
            "http://0install.de/maven/group/subgroup/artifact/"
        );
        assert_eq!(
            service_uri("http://0install.de/maven/", "group.subgroup", "artifact"),
            "http://0install.de/maven/group/subgroup/artifact/"
        );
    }

    #[test]
    fn test_validate_artifact_path() {
        assert!(!validate_artifact_path("group/artifact"));
        assert!(!validate_artifact_path("artifact"));
        assert!(!validate_artifact_path("artifact/"));
        assert!(!validate_artifact_path("/group/artifact/"));
        assert!(!validate_artifact_path("group//artifact/"));
        assert!(validate_artifact_path("group/artifact/"));
        assert!(validate_artifact_path("org/slf4j/slf4j-api/"));
    }

    #[test]
    fn test_ensure_slash_end() {
        assert_eq!(ensure_slash_end("http://localhost/test"), "http://localhost/test/");
        assert_eq!(ensure_slash_end("http://localhost/test/"), "http://localhost/test/");
    }

    #[test]
    fn test_coordinate_parse() {
        let coordinate: Coordinate = "org.slf4j:slf4j-api:2.0.9".parse().unwrap();
        assert_eq!(coordinate.group_id, "org.slf4j");
        assert_eq!(coordinate.version, "2.0.9");
        assert_eq!(coordinate.file_path("jar"), "org/slf4j/slf4j-api/2.0.9/slf4j-api-2.0.9.jar");
        assert_eq!(coordinate.to_string(), "org.slf4j:slf4j-api:2.0.9");

        assert!("org.slf4j:slf4j-api".parse::<Coordinate>().is_err());
        assert!("org.slf4j:slf4j api:1".parse::<Coordinate>().is_err());
    }
}
