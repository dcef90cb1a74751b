// src/hash.rs

//! Hashing for 0install manifest digests
//!
//! 0install identifies an implementation by the digest of its *manifest*,
//! a text listing of every file with its hash, mtime, size and name. A
//! Maven artifact is a single file, so its manifest is exactly one line:
//!
//! ```text
//! F <file-hash> 0 <size> <file-name>
//! ```
//!
//! The manifest digest is the algorithm's hash of that line. The mtime is
//! always written as `0` so digests are reproducible from the repository
//! checksums alone.
//!
//! | Algorithm | Feed attribute | Maven sidecar |
//! |-----------|----------------|---------------|
//! | SHA-1     | `sha1new`      | `.sha1`       |
//! | SHA-256   | `sha256`       | `.sha256`     |

use crate::error::Error;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Manifest digest algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManifestAlgorithm {
    /// SHA-1 over the manifest (`sha1new=` digests)
    ///
    /// Every Maven repository publishes `.sha1` sidecars, so remote
    /// artifacts can be digested without downloading them.
    #[default]
    Sha1New,

    /// SHA-256 over the manifest (`sha256=` digests)
    Sha256,
}

impl ManifestAlgorithm {
    /// Get the hash output length in bytes
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Sha1New => 20,
            Self::Sha256 => 32,
        }
    }

    /// Get the hash output length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    /// Attribute name used on `<manifest-digest>`
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1New => "sha1new",
            Self::Sha256 => "sha256",
        }
    }

    /// Extension of the checksum file Maven stores beside each artifact
    #[inline]
    pub const fn sidecar_extension(&self) -> &'static str {
        match self {
            Self::Sha1New => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for ManifestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ManifestAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1new" | "sha1" | "sha-1" => Ok(Self::Sha1New),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Hash computation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Unknown hash algorithm name
    UnknownAlgorithm(String),
    /// Hash string has wrong length for algorithm
    InvalidLength { expected: usize, got: usize },
    /// Hash string contains invalid hex characters
    InvalidHex(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(name) => write!(f, "unknown hash algorithm: {}", name),
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid hash length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in hash: {}", s),
        }
    }
}

impl std::error::Error for HashError {}

impl From<HashError> for Error {
    fn from(e: HashError) -> Self {
        Error::InvalidHash(e.to_string())
    }
}

/// A hash value with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    /// The algorithm used
    pub algorithm: ManifestAlgorithm,
    /// The hash value as a lowercase hex string
    pub value: String,
}

impl Hash {
    /// Create a new hash value, validating length and hex characters
    pub fn new(algorithm: ManifestAlgorithm, value: impl Into<String>) -> Result<Self, HashError> {
        let value = value.into();
        let expected_len = algorithm.hex_len();

        if value.len() != expected_len {
            return Err(HashError::InvalidLength {
                expected: expected_len,
                got: value.len(),
            });
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex(value));
        }

        Ok(Self {
            algorithm,
            value: value.to_lowercase(),
        })
    }

    fn new_unchecked(algorithm: ManifestAlgorithm, value: String) -> Self {
        Self { algorithm, value }
    }

    /// Parse the content of a Maven checksum sidecar
    ///
    /// Sidecars hold either the bare hex digest or `<digest>  <file name>`,
    /// possibly followed by a newline.
    pub fn parse_sidecar(algorithm: ManifestAlgorithm, content: &str) -> Result<Self, HashError> {
        let token = content.split_whitespace().next().unwrap_or("");
        Self::new(algorithm, token)
    }

    /// Get the hash value as a hex string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Hasher that can compute hashes using any supported algorithm
pub struct Hasher {
    algorithm: ManifestAlgorithm,
    state: HasherState,
}

enum HasherState {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    /// Create a new hasher with the specified algorithm
    pub fn new(algorithm: ManifestAlgorithm) -> Self {
        let state = match algorithm {
            ManifestAlgorithm::Sha1New => HasherState::Sha1(Sha1::new()),
            ManifestAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
        };
        Self { algorithm, state }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Sha1(hasher) => hasher.update(data),
            HasherState::Sha256(hasher) => hasher.update(data),
        }
    }

    /// Finalize and return the hash
    pub fn finalize(self) -> Hash {
        let value = match self.state {
            HasherState::Sha1(hasher) => hex::encode(hasher.finalize()),
            HasherState::Sha256(hasher) => hex::encode(hasher.finalize()),
        };
        Hash::new_unchecked(self.algorithm, value)
    }

    /// Get the algorithm being used
    #[inline]
    pub fn algorithm(&self) -> ManifestAlgorithm {
        self.algorithm
    }
}

/// Compute hash of a byte slice
pub fn hash_bytes(algorithm: ManifestAlgorithm, data: &[u8]) -> Hash {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Compute hash of data from a reader
pub fn hash_reader<R: Read>(algorithm: ManifestAlgorithm, reader: &mut R) -> io::Result<Hash> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Compute hash of a file, streaming its content
pub fn hash_file(algorithm: ManifestAlgorithm, path: &Path) -> io::Result<Hash> {
    let mut file = std::fs::File::open(path)?;
    hash_reader(algorithm, &mut file)
}

// =============================================================================
// Manifest digests
// =============================================================================

/// Build the manifest text for a single file
pub fn single_file_manifest(file_hash: &str, size: u64, file_name: &str) -> String {
    format!("F {} 0 {} {}\n", file_hash, size, file_name)
}

/// Digest of the manifest of an implementation consisting of one file
pub fn manifest_digest(
    algorithm: ManifestAlgorithm,
    file_hash: &str,
    size: u64,
    file_name: &str,
) -> ManifestDigest {
    let manifest = single_file_manifest(file_hash, size, file_name);
    ManifestDigest(hash_bytes(algorithm, manifest.as_bytes()))
}

/// A 0install manifest digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestDigest(pub Hash);

impl ManifestDigest {
    /// Attribute pair for the `<manifest-digest>` element
    pub fn attribute(&self) -> (&'static str, &str) {
        (self.0.algorithm.name(), self.0.as_str())
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.0.algorithm.name(), self.0.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_hash() {
        let hash = hash_bytes(ManifestAlgorithm::Sha1New, b"hello world");
        assert_eq!(hash.algorithm, ManifestAlgorithm::Sha1New);
        assert_eq!(hash.value, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
    }

    #[test]
    fn test_sha256_hash() {
        let hash = hash_bytes(ManifestAlgorithm::Sha256, b"Hello, World!");
        assert_eq!(
            hash.value,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(hash.value.len(), ManifestAlgorithm::Sha256.hex_len());
    }

    #[test]
    fn test_hasher_incremental() {
        let full_hash = hash_bytes(ManifestAlgorithm::Sha1New, b"Hello, World!");

        let mut hasher = Hasher::new(ManifestAlgorithm::Sha1New);
        hasher.update(b"Hello, ");
        hasher.update(b"World!");

        assert_eq!(full_hash, hasher.finalize());
    }

    #[test]
    fn test_hash_reader() {
        let data = b"Hello, World!";
        let mut cursor = std::io::Cursor::new(data);

        let hash = hash_reader(ManifestAlgorithm::Sha256, &mut cursor).unwrap();
        assert_eq!(hash, hash_bytes(ManifestAlgorithm::Sha256, data));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("sha1new".parse::<ManifestAlgorithm>().unwrap(), ManifestAlgorithm::Sha1New);
        assert_eq!("SHA1".parse::<ManifestAlgorithm>().unwrap(), ManifestAlgorithm::Sha1New);
        assert_eq!("sha-256".parse::<ManifestAlgorithm>().unwrap(), ManifestAlgorithm::Sha256);
        assert!("md5".parse::<ManifestAlgorithm>().is_err());
        assert_eq!(ManifestAlgorithm::default(), ManifestAlgorithm::Sha1New);
    }

    #[test]
    fn test_hash_validation() {
        assert!(Hash::new(ManifestAlgorithm::Sha1New, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed").is_ok());
        assert!(matches!(
            Hash::new(ManifestAlgorithm::Sha1New, "abc123"),
            Err(HashError::InvalidLength { expected: 40, got: 6 })
        ));
        assert!(matches!(
            Hash::new(ManifestAlgorithm::Sha1New, "zaae6c35c94fcfb415dbe95f408b9ce91ee846ed"),
            Err(HashError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_parse_sidecar_formats() {
        let bare = Hash::parse_sidecar(
            ManifestAlgorithm::Sha1New,
            "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED\n",
        )
        .unwrap();
        assert_eq!(bare.value, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");

        let with_name = Hash::parse_sidecar(
            ManifestAlgorithm::Sha1New,
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed  artifact-1.0.jar",
        )
        .unwrap();
        assert_eq!(with_name, bare);

        assert!(Hash::parse_sidecar(ManifestAlgorithm::Sha1New, "").is_err());
    }

    #[test]
    fn test_single_file_manifest() {
        assert_eq!(
            single_file_manifest("123abc", 1024, "filename.jar"),
            "F 123abc 0 1024 filename.jar\n"
        );
    }

    #[test]
    fn test_sha1new_manifest_digest() {
        let digest = manifest_digest(ManifestAlgorithm::Sha1New, "123abc", 1024, "filename.jar");
        assert_eq!(digest.0.value, "67600f59b06e4a3857e696f165d9dae02dc8a772");
        assert_eq!(
            digest.to_string(),
            "sha1new=67600f59b06e4a3857e696f165d9dae02dc8a772"
        );
        assert_eq!(
            digest.attribute(),
            ("sha1new", "67600f59b06e4a3857e696f165d9dae02dc8a772")
        );
    }

    #[test]
    fn test_sha256_manifest_digest_matches_manual() {
        let digest = manifest_digest(ManifestAlgorithm::Sha256, "ab", 3, "x.jar");
        let manual = hash_bytes(ManifestAlgorithm::Sha256, b"F ab 0 3 x.jar\n");
        assert_eq!(digest.0, manual);
    }
}
