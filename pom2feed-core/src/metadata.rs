// src/metadata.rs

//! Maven versioning metadata (`maven-metadata.xml`)
//!
//! ```xml
//! <metadata>
//!   <groupId>org.example</groupId>
//!   <artifactId>demo</artifactId>
//!   <versioning>
//!     <latest>1.2</latest>
//!     <release>1.2</release>
//!     <versions>
//!       <version>1.0</version>
//!       <version>1.2</version>
//!     </versions>
//!   </versioning>
//! </metadata>
//! ```

use crate::error::{Error, Result};
use crate::xml::Element;

/// Versioning metadata for one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenMetadata {
    pub group_id: String,
    pub artifact_id: String,
    /// Latest version, used as the source of feed-level metadata
    pub latest_version: String,
    /// All published versions in repository order
    pub versions: Vec<String>,
}

impl MavenMetadata {
    /// Create metadata from its parts
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        latest_version: impl Into<String>,
        versions: Vec<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            latest_version: latest_version.into(),
            versions,
        }
    }

    /// Parse `maven-metadata.xml`
    ///
    /// `<latest>` is preferred, then `<release>`, then the last listed
    /// version. Metadata without any version is rejected.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml)?;
        if root.name != "metadata" {
            return Err(Error::ParseError(format!(
                "Expected <metadata> root, found <{}>",
                root.name
            )));
        }

        let group_id = root
            .child_text("groupId")
            .ok_or_else(|| Error::ParseError("Metadata is missing <groupId>".to_string()))?;
        let artifact_id = root
            .child_text("artifactId")
            .ok_or_else(|| Error::ParseError("Metadata is missing <artifactId>".to_string()))?;

        let versioning = root.child("versioning");
        let versions: Vec<String> = versioning
            .and_then(|v| v.child("versions"))
            .map(|list| {
                list.children("version")
                    .map(|v| v.text.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if versions.is_empty() {
            return Err(Error::ParseError(format!(
                "Metadata for {}:{} lists no versions",
                group_id, artifact_id
            )));
        }

        let latest_version = versioning
            .and_then(|v| v.child_text("latest").or_else(|| v.child_text("release")))
            .or_else(|| versions.last().cloned())
            .unwrap_or_default();

        Ok(Self {
            group_id,
            artifact_id,
            latest_version,
            versions,
        })
    }
}
