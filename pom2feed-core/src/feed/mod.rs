// src/feed/mod.rs

//! 0install feed documents
//!
//! A feed (`<interface>`) describes one component and lists its
//! implementations. pom2feed produces one implementation per Maven version:
//!
//! ```xml
//! <interface xmlns="http://zero-install.sourceforge.net/2004/injector/interface"
//!            uri="http://maven.0install.net/org/slf4j/slf4j-api/">
//!   <name>SLF4J API Module</name>
//!   <summary>The slf4j API</summary>
//!   <implementation id="2.0.9" version="2.0.9">
//!     <manifest-digest sha1new="..."/>
//!     <file href=".../slf4j-api-2.0.9.jar" size="64579" dest="slf4j-api-2.0.9.jar"/>
//!     <environment name="CLASSPATH" insert="slf4j-api-2.0.9.jar"/>
//!   </implementation>
//! </interface>
//! ```

mod writer;

use crate::hash::ManifestDigest;
use std::fmt;

/// Namespace of 0install feed documents
pub const FEED_NAMESPACE: &str = "http://zero-install.sourceforge.net/2004/injector/interface";

/// A 0install feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    /// URI the feed is published under
    pub uri: Option<String>,
    pub name: String,
    pub summary: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub implementations: Vec<Implementation>,
}

/// One version of the component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Implementation {
    pub id: String,
    pub version: String,
    pub stability: Option<Stability>,
    /// Directory of an implementation that is already on disk
    pub local_path: Option<String>,
    pub manifest_digest: Option<ManifestDigest>,
    pub file: Option<FileRetrieval>,
    pub bindings: Vec<EnvironmentBinding>,
    pub requires: Vec<Requirement>,
}

/// `<file>` retrieval method: download a single file into the implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRetrieval {
    pub href: String,
    /// Size in bytes; filled in by digest annotation when unknown
    pub size: Option<u64>,
    /// File name inside the implementation directory
    pub dest: String,
}

/// `<environment>` binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentBinding {
    pub name: String,
    pub insert: String,
}

impl EnvironmentBinding {
    /// Put a jar of the implementation on the Java class path
    pub fn classpath(jar: impl Into<String>) -> Self {
        Self {
            name: "CLASSPATH".to_string(),
            insert: jar.into(),
        }
    }
}

/// Dependency on another feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub interface: String,
    /// 0install version expression
    pub version: Option<String>,
    pub importance: Importance,
}

/// How strongly a dependency is required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Importance {
    #[default]
    Essential,
    Recommended,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Essential => write!(f, "essential"),
            Self::Recommended => write!(f, "recommended"),
        }
    }
}

/// Stability rating of an implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Testing,
    Developer,
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Testing => write!(f, "testing"),
            Self::Developer => write!(f, "developer"),
        }
    }
}
