// src/digest.rs

//! Manifest digest annotation of feed files
//!
//! A generated feed names each artifact with a `<file>` retrieval method but
//! cannot know its digest until the artifact is read. [`add_digests`] fills
//! the gap in an existing feed file:
//!
//! 1. The document is parsed once to reject malformed feeds.
//! 2. A streaming pass records each implementation's `<file>` tag (with its
//!    byte span) and whether it already has a `<manifest-digest>`.
//! 3. For every implementation that needs one, the artifact is hashed, a
//!    `<manifest-digest>` element is spliced in before `<file>` and a `size`
//!    attribute is added when missing.
//!
//! Everything outside the edited tags is copied byte-for-byte, so running the
//! step again leaves the file untouched.

use crate::error::{Error, Result};
use crate::hash::{manifest_digest, Hash, ManifestAlgorithm, ManifestDigest};
use crate::repository::RepositorySource;
use crate::xml::Element;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Marker of a 0install signature block
const SIGNATURE_MARKER: &str = "<!-- Base64 Signature";

/// Outcome of annotating a feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSummary {
    /// Implementations that received a digest
    pub annotated: usize,
    /// Implementations that already carried a digest
    pub already_digested: usize,
    /// Implementations left alone (file outside the repository, missing artifact)
    pub skipped: usize,
}

impl fmt::Display for DigestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} annotated, {} already digested, {} skipped",
            self.annotated, self.already_digested, self.skipped
        )
    }
}

/// A `<file>` tag found inside an implementation
#[derive(Debug, Clone)]
struct FileTag {
    href: Option<String>,
    dest: Option<String>,
    size: Option<String>,
    /// Byte range of the tag in the document
    start: usize,
    end: usize,
}

#[derive(Debug, Default)]
struct ImplementationScan {
    id: String,
    has_digest: bool,
    file: Option<FileTag>,
}

/// Text inserted into the document at one `<file>` tag
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

fn xml_error(position: u64, e: impl fmt::Display) -> Error {
    Error::ParseError(format!("Malformed feed at position {}: {}", position, e))
}

fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::ParseError(format!("Invalid attribute in feed: {e}")))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ParseError(format!("Invalid attribute value in feed: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Record implementations in document order
fn scan(xml: &str) -> Result<Vec<ImplementationScan>> {
    let mut reader = Reader::from_str(xml);
    let mut implementations = Vec::new();
    let mut current: Option<ImplementationScan> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| xml_error(reader.buffer_position() as u64, e))?;
        let end = reader.buffer_position() as usize;
        let empty = matches!(event, Event::Empty(_));

        match event {
            Event::Start(tag) | Event::Empty(tag) => {
                match tag.local_name().as_ref() {
                    b"implementation" => {
                        let scan = ImplementationScan {
                            id: attribute(&tag, "id")?.unwrap_or_default(),
                            ..Default::default()
                        };
                        if empty {
                            implementations.push(scan);
                        } else {
                            current = Some(scan);
                        }
                    }
                    b"manifest-digest" => {
                        if let Some(scan) = current.as_mut() {
                            scan.has_digest = true;
                        }
                    }
                    b"file" => {
                        if let Some(scan) = current.as_mut().filter(|s| s.file.is_none()) {
                            scan.file = Some(FileTag {
                                href: attribute(&tag, "href")?,
                                dest: attribute(&tag, "dest")?,
                                size: attribute(&tag, "size")?,
                                start,
                                end,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::End(tag) if tag.local_name().as_ref() == b"implementation" => {
                if let Some(scan) = current.take() {
                    implementations.push(scan);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(implementations)
}

/// Hash of an artifact file
///
/// Remote repositories are asked for the published checksum first; local
/// repositories hash the file directly.
pub fn artifact_hash(
    repository: &dyn RepositorySource,
    path: &str,
    algorithm: ManifestAlgorithm,
) -> Result<Hash> {
    if repository.is_remote() {
        let sidecar = format!("{}.{}", path, algorithm.sidecar_extension());
        match repository.first_line(&sidecar) {
            Ok(content) => match Hash::parse_sidecar(algorithm, &content) {
                Ok(hash) => {
                    debug!("Using published checksum {}", sidecar);
                    return Ok(hash);
                }
                Err(e) => warn!("Ignoring malformed checksum {}: {}", sidecar, e),
            },
            Err(Error::NotFoundError(_)) => debug!("No checksum at {}, downloading", sidecar),
            Err(e) => return Err(e),
        }
    }

    repository.hash_file(path, algorithm)
}

/// Manifest digest of the single-file implementation at `path`
pub fn artifact_digest(
    repository: &dyn RepositorySource,
    path: &str,
    file_name: &str,
    size: u64,
    algorithm: ManifestAlgorithm,
) -> Result<ManifestDigest> {
    let hash = artifact_hash(repository, path, algorithm)?;
    Ok(manifest_digest(algorithm, hash.as_str(), size, file_name))
}

/// Indentation of the line a tag starts on, if only whitespace precedes it
fn indentation(xml: &str, start: usize) -> Option<&str> {
    let line_start = xml[..start].rfind('\n').map(|i| i + 1)?;
    let indent = &xml[line_start..start];
    indent.chars().all(char::is_whitespace).then_some(indent)
}

/// Insert ` size="N"` before the end of a start tag
fn with_size(tag: &str, size: u64) -> String {
    let body = tag
        .strip_suffix("/>")
        .map(|b| (b, "/>"))
        .or_else(|| tag.strip_suffix('>').map(|b| (b, ">")));

    match body {
        Some((body, close)) => {
            let trimmed = body.trim_end();
            format!("{} size=\"{}\"{}{}", trimmed, size, &body[trimmed.len()..], close)
        }
        None => tag.to_string(),
    }
}

fn plan_edit(
    xml: &str,
    implementation: &ImplementationScan,
    file: &FileTag,
    repository: &dyn RepositorySource,
    algorithm: ManifestAlgorithm,
) -> Result<Option<Edit>> {
    let Some(href) = file.href.as_deref() else {
        warn!("Implementation {} has a <file> without href", implementation.id);
        return Ok(None);
    };
    let Some(path) = repository.relative_path(href) else {
        warn!(
            "Implementation {}: {} is outside the repository, skipping",
            implementation.id, href
        );
        return Ok(None);
    };

    let file_name = file
        .dest
        .clone()
        .or_else(|| path.rsplit('/').next().map(str::to_string))
        .unwrap_or_default();

    let known_size = match file.size.as_deref() {
        Some(size) => Some(size.trim().parse::<u64>().map_err(|_| {
            Error::ParseError(format!(
                "Implementation {} has invalid size '{}'",
                implementation.id, size
            ))
        })?),
        None => None,
    };

    let size = match known_size {
        Some(size) => size,
        None => match repository.size(&path) {
            Ok(size) => size,
            Err(Error::NotFoundError(_)) => {
                warn!("Implementation {}: {} not found, skipping", implementation.id, href);
                return Ok(None);
            }
            Err(e) => return Err(e),
        },
    };

    let digest = match artifact_digest(repository, &path, &file_name, size, algorithm) {
        Ok(digest) => digest,
        Err(Error::NotFoundError(_)) => {
            warn!("Implementation {}: {} not found, skipping", implementation.id, href);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    debug!("Implementation {}: {}", implementation.id, digest);

    let tag = &xml[file.start..file.end];
    let tag = match known_size {
        Some(_) => tag.to_string(),
        None => with_size(tag, size),
    };

    let (name, value) = digest.attribute();
    let separator = match indentation(xml, file.start) {
        Some(indent) => format!("\n{}", indent),
        None => String::new(),
    };

    Ok(Some(Edit {
        start: file.start,
        end: file.end,
        replacement: format!("<manifest-digest {}=\"{}\"/>{}{}", name, value, separator, tag),
    }))
}

/// Annotate a feed document held in memory
///
/// Returns the rewritten document and a summary. The document is returned
/// unchanged when nothing needed a digest.
pub fn annotate(
    xml: &str,
    repository: &dyn RepositorySource,
    algorithm: ManifestAlgorithm,
) -> Result<(String, DigestSummary)> {
    let root = Element::parse(xml)?;
    if root.name != "interface" {
        return Err(Error::ParseError(format!(
            "Expected <interface> root in feed, found <{}>",
            root.name
        )));
    }

    let mut summary = DigestSummary::default();
    let mut edits = Vec::new();

    for implementation in scan(xml)? {
        if implementation.has_digest {
            summary.already_digested += 1;
            continue;
        }
        let Some(file) = &implementation.file else {
            debug!("Implementation {} has no <file>, skipping", implementation.id);
            summary.skipped += 1;
            continue;
        };

        match plan_edit(xml, &implementation, file, repository, algorithm)? {
            Some(edit) => {
                edits.push(edit);
                summary.annotated += 1;
            }
            None => summary.skipped += 1,
        }
    }

    if edits.is_empty() {
        return Ok((xml.to_string(), summary));
    }

    let mut output = String::with_capacity(xml.len() + edits.len() * 80);
    let mut copied = 0;
    for edit in &edits {
        output.push_str(&xml[copied..edit.start]);
        output.push_str(&edit.replacement);
        copied = edit.end;
    }
    output.push_str(&xml[copied..]);

    Ok((output, summary))
}

/// Add manifest digests to a feed file in place
///
/// The file is rewritten through a temporary file in the same directory and
/// only when at least one implementation was annotated.
pub fn add_digests(
    feed_file: &Path,
    repository: &dyn RepositorySource,
    algorithm: ManifestAlgorithm,
) -> Result<DigestSummary> {
    let xml = fs::read_to_string(feed_file)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", feed_file.display(), e)))?;

    let (annotated, summary) = annotate(&xml, repository, algorithm)?;
    if summary.annotated == 0 {
        info!("{}: {}", feed_file.display(), summary);
        return Ok(summary);
    }

    if xml.contains(SIGNATURE_MARKER) {
        warn!("{} is signed; adding digests invalidates the signature", feed_file.display());
    }

    write_atomic(feed_file, annotated.as_bytes())?;
    info!("{}: {}", feed_file.display(), summary);
    Ok(summary)
}

/// Replace a file's content through a temporary file in the same directory
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::IoError(format!("Failed to create temp file in {}: {}", dir.display(), e)))?;
    temp.write_all(content)?;
    temp.flush()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }
    temp.persist(path)
        .map_err(|e| Error::IoError(format!("Failed to replace {}: {}", path.display(), e.error)))?;
    Ok(())
}
