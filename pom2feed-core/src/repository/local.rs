// src/repository/local.rs

//! Maven repository on the local filesystem

use crate::error::{Error, Result};
use crate::hash::{self, Hash, ManifestAlgorithm};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use url::Url;

use super::RepositorySource;

/// Repository rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    base_url: Url,
}

impl LocalRepository {
    /// Open an existing repository directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            Error::NotFoundError(format!("Repository directory {}: {}", root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(Error::UnsupportedRepository(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let base_url = Url::from_directory_path(&root).map_err(|_| {
            Error::UnsupportedRepository(format!("Cannot express {} as a URL", root.display()))
        })?;

        debug!("Opened local repository at {}", root.display());
        Ok(Self { root, base_url })
    }

    /// Root directory of the repository
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository path to a file path, refusing to leave the root
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::InvalidCoordinate(format!(
                "Path '{}' escapes the repository",
                path
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn map_io_error(path: &Path, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::NotFoundError(path.display().to_string())
    } else {
        Error::IoError(format!("Failed to read {}: {}", path.display(), e))
    }
}

impl RepositorySource for LocalRepository {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn is_remote(&self) -> bool {
        false
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.resolve(path)?;
        debug!("Reading {}", file.display());
        fs::read(&file).map_err(|e| map_io_error(&file, e))
    }

    fn size(&self, path: &str) -> Result<u64> {
        let file = self.resolve(path)?;
        let metadata = fs::metadata(&file).map_err(|e| map_io_error(&file, e))?;
        if !metadata.is_file() {
            return Err(Error::NotFoundError(format!("{} is not a file", file.display())));
        }
        Ok(metadata.len())
    }

    /// Version directories that contain a POM, sorted by name
    fn list_versions(&self, artifact_dir: &str) -> Result<Vec<String>> {
        let dir = self.resolve(artifact_dir)?;
        let entries = fs::read_dir(&dir).map_err(|e| map_io_error(&dir, e))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let has_pom = fs::read_dir(entry.path())?
                .filter_map(|e| e.ok())
                .any(|e| e.path().extension().is_some_and(|ext| ext == "pom"));
            if has_pom {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        versions.sort();
        Ok(versions)
    }

    fn hash_file(&self, path: &str, algorithm: ManifestAlgorithm) -> Result<Hash> {
        let file = self.resolve(path)?;
        hash::hash_file(algorithm, &file).map_err(|e| map_io_error(&file, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalRepository) {
        let dir = tempfile::tempdir().unwrap();
        let version_dir = dir.path().join("org/example/demo/1.0");
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join("demo-1.0.pom"), "<project/>").unwrap();
        fs::write(version_dir.join("demo-1.0.jar"), b"jar-bytes").unwrap();
        fs::create_dir_all(dir.path().join("org/example/demo/0.9")).unwrap();
        fs::write(dir.path().join("org/example/demo/0.9/demo-0.9.pom"), "<project/>").unwrap();
        fs::create_dir_all(dir.path().join("org/example/demo/empty")).unwrap();

        let repo = LocalRepository::open(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_fetch_and_size() {
        let (_dir, repo) = setup();

        assert_eq!(repo.fetch("org/example/demo/1.0/demo-1.0.jar").unwrap(), b"jar-bytes");
        assert_eq!(repo.size("org/example/demo/1.0/demo-1.0.jar").unwrap(), 9);
        assert!(repo.exists("org/example/demo/1.0/demo-1.0.pom").unwrap());
        assert!(!repo.exists("org/example/demo/1.0/demo-1.0.war").unwrap());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (_dir, repo) = setup();
        let err = repo.fetch("org/example/demo/maven-metadata.xml").unwrap_err();
        assert!(matches!(err, Error::NotFoundError(_)));
    }

    #[test]
    fn test_rejects_traversal() {
        let (_dir, repo) = setup();
        assert!(repo.fetch("../etc/passwd").is_err());
        assert!(repo.fetch("/etc/passwd").is_err());
    }

    #[test]
    fn test_list_versions() {
        let (_dir, repo) = setup();
        assert_eq!(repo.list_versions("org/example/demo/").unwrap(), vec!["0.9", "1.0"]);
    }

    #[test]
    fn test_hash_file_streams_from_disk() {
        let (_dir, repo) = setup();
        let hash = repo
            .hash_file("org/example/demo/1.0/demo-1.0.jar", ManifestAlgorithm::Sha1New)
            .unwrap();
        assert_eq!(hash, hash_bytes(ManifestAlgorithm::Sha1New, b"jar-bytes"));
    }

    #[test]
    fn test_url_round_trip() {
        let (_dir, repo) = setup();
        let url = repo.url_for("org/example/demo/1.0/demo-1.0.jar").unwrap();
        assert!(url.starts_with("file:///"));
        assert_eq!(
            repo.relative_path(&url).as_deref(),
            Some("org/example/demo/1.0/demo-1.0.jar")
        );
    }
}
