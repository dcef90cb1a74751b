// tests/common/mod.rs

//! Shared test utilities for integration tests.
//!
//! Builds a small Maven repository:
//!
//! ```text
//! org/example/demo/maven-metadata.xml        (1.0, 1.1, 2.0-SNAPSHOT)
//! org/example/demo/<version>/demo-<version>.pom
//! org/example/demo/<version>/demo-<version>.jar
//! org/example/parent/1/parent-1.pom
//! org/example/bom/1.0/bom-1.0.pom            (pom packaging)
//! ```

#![allow(dead_code)]

use pom2feed_core::hash::{hash_bytes, manifest_digest, ManifestAlgorithm};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const GROUP: &str = "org.example";
pub const ARTIFACT: &str = "demo";
pub const VERSIONS: &[&str] = &["1.0", "1.1", "2.0-SNAPSHOT"];
pub const SERVICE: &str = "http://maven.0install.net/";

/// Write a file, creating parent directories
pub fn write_file(root: &Path, path: &str, content: &[u8]) {
    let file = root.join(path);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

/// Content of the demo jar for a version
pub fn jar_content(version: &str) -> Vec<u8> {
    format!("PK fake jar for demo {}", version).into_bytes()
}

pub fn metadata_xml() -> String {
    let versions: String = VERSIONS
        .iter()
        .map(|v| format!("<version>{}</version>", v))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<metadata>\n  <groupId>{GROUP}</groupId>\n  \
         <artifactId>{ARTIFACT}</artifactId>\n  <versioning>\n    <latest>1.1</latest>\n    \
         <release>1.1</release>\n    <versions>{versions}</versions>\n  </versioning>\n</metadata>\n"
    )
}

pub fn demo_pom(version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1</version>
  </parent>
  <artifactId>demo</artifactId>
  <version>{version}</version>
  <name>Demo {version}</name>
  <description>Demo library</description>
  <dependencies>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>${{slf4j.version}}</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#
    )
}

pub fn parent_pom() -> &'static str {
    r#"<project>
  <groupId>org.example</groupId>
  <artifactId>parent</artifactId>
  <version>1</version>
  <packaging>pom</packaging>
  <url>https://example.com/demo</url>
  <properties>
    <slf4j.version>[1.7,2.0)</slf4j.version>
  </properties>
</project>
"#
}

/// Repository-relative files of the demo repository
pub fn repository_files() -> Vec<(String, Vec<u8>)> {
    let mut files = vec![
        ("org/example/demo/maven-metadata.xml".to_string(), metadata_xml().into_bytes()),
        ("org/example/parent/1/parent-1.pom".to_string(), parent_pom().as_bytes().to_vec()),
        (
            "org/example/bom/1.0/bom-1.0.pom".to_string(),
            b"<project><groupId>org.example</groupId><artifactId>bom</artifactId>\
              <version>1.0</version><packaging>pom</packaging></project>"
                .to_vec(),
        ),
    ];
    for version in VERSIONS {
        files.push((
            format!("org/example/demo/{v}/demo-{v}.pom", v = version),
            demo_pom(version).into_bytes(),
        ));
        files.push((format!("org/example/demo/{v}/demo-{v}.jar", v = version), jar_content(version)));
    }
    files
}

/// Create the demo repository in a temporary directory.
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn setup_repository() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in repository_files() {
        write_file(dir.path(), &path, &content);
    }
    dir
}

/// Manifest digest of the demo jar for a version, computed directly
pub fn expected_digest(version: &str, algorithm: ManifestAlgorithm) -> String {
    let content = jar_content(version);
    let hash = hash_bytes(algorithm, &content);
    manifest_digest(
        algorithm,
        hash.as_str(),
        content.len() as u64,
        &format!("demo-{}.jar", version),
    )
    .0
    .value
}
