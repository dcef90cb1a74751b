// src/lib.rs

//! pom2feed core library
//!
//! Converts artifacts stored in Maven repositories into 0install feeds.
//!
//! # Architecture
//!
//! - Input resolution: group and artifact ids map onto the Maven repository
//!   layout ([`maven`]), read from a local directory or over HTTP
//!   ([`repository`])
//! - Transformation: `maven-metadata.xml` and the POM of every version become
//!   one feed with one implementation per version ([`generator`], [`builder`])
//! - Digest annotation: implementations get `<manifest-digest>` elements
//!   computed from the artifact files ([`digest`])
//! - Signing: optional GnuPG signature block and exported key ([`sign`])

pub mod builder;
pub mod config;
pub mod digest;
mod error;
pub mod feed;
pub mod generator;
pub mod hash;
pub mod maven;
pub mod metadata;
pub mod pipeline;
pub mod pom;
pub mod repository;
pub mod sign;
pub mod version;
pub mod xml;

pub use builder::FeedBuilder;
pub use config::Config;
pub use digest::{add_digests, DigestSummary};
pub use error::{Error, Result};
pub use feed::Feed;
pub use generator::{run_xslt, FeedGenerator};
pub use hash::{Hash, Hasher, ManifestAlgorithm, ManifestDigest};
pub use maven::{ArtifactRef, Coordinate};
pub use metadata::MavenMetadata;
pub use pipeline::{make_feed, make_feed_from, FeedOptions, FeedReport};
pub use pom::ProjectModel;
pub use repository::{open_repository, HttpRepository, LocalRepository, RepositoryOptions, RepositorySource};
pub use sign::GpgSigner;
