// src/feed/writer.rs

//! Serialization of feeds to XML

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::fs;
use std::path::Path;

use super::{Feed, Implementation, FEED_NAMESPACE};

type XmlWriter = Writer<Vec<u8>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::IoError(format!("Failed to write feed XML: {e}")))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

impl Feed {
    /// Render the feed as an indented UTF-8 document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("interface");
        root.push_attribute(("xmlns", FEED_NAMESPACE));
        if let Some(uri) = &self.uri {
            root.push_attribute(("uri", uri.as_str()));
        }
        write(&mut writer, Event::Start(root))?;

        write_text_element(&mut writer, "name", &self.name)?;
        write_text_element(&mut writer, "summary", &self.summary)?;
        if let Some(description) = &self.description {
            write_text_element(&mut writer, "description", description)?;
        }
        if let Some(homepage) = &self.homepage {
            write_text_element(&mut writer, "homepage", homepage)?;
        }

        for implementation in &self.implementations {
            implementation.write(&mut writer)?;
        }

        write(&mut writer, Event::End(BytesEnd::new("interface")))?;

        let mut xml = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::IoError(format!("Feed XML is not UTF-8: {e}")))?;
        xml.push('\n');
        Ok(xml)
    }

    /// Write the feed to a file, creating parent directories
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::IoError(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        fs::write(path, self.to_xml()?)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))
    }
}

impl Implementation {
    fn write(&self, writer: &mut XmlWriter) -> Result<()> {
        let mut start = BytesStart::new("implementation");
        start.push_attribute(("id", self.id.as_str()));
        start.push_attribute(("version", self.version.as_str()));
        let stability = self.stability.map(|s| s.to_string());
        if let Some(stability) = &stability {
            start.push_attribute(("stability", stability.as_str()));
        }
        if let Some(local_path) = &self.local_path {
            start.push_attribute(("local-path", local_path.as_str()));
        }
        write(writer, Event::Start(start))?;

        if let Some(digest) = &self.manifest_digest {
            let mut element = BytesStart::new("manifest-digest");
            element.push_attribute(digest.attribute());
            write(writer, Event::Empty(element))?;
        }

        if let Some(file) = &self.file {
            let mut element = BytesStart::new("file");
            element.push_attribute(("href", file.href.as_str()));
            let size = file.size.map(|s| s.to_string());
            if let Some(size) = &size {
                element.push_attribute(("size", size.as_str()));
            }
            element.push_attribute(("dest", file.dest.as_str()));
            write(writer, Event::Empty(element))?;
        }

        for binding in &self.bindings {
            let mut element = BytesStart::new("environment");
            element.push_attribute(("name", binding.name.as_str()));
            element.push_attribute(("insert", binding.insert.as_str()));
            write(writer, Event::Empty(element))?;
        }

        for requirement in &self.requires {
            let mut element = BytesStart::new("requires");
            element.push_attribute(("interface", requirement.interface.as_str()));
            if let Some(version) = &requirement.version {
                element.push_attribute(("version", version.as_str()));
            }
            if requirement.importance != super::Importance::Essential {
                let importance = requirement.importance.to_string();
                element.push_attribute(("importance", importance.as_str()));
            }
            write(writer, Event::Empty(element))?;
        }

        write(writer, Event::End(BytesEnd::new("implementation")))
    }
}
