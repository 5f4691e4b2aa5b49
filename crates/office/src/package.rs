//! Read access to OOXML packages (`.docx`, `.pptx`).
//!
//! An OOXML file is a ZIP archive of XML parts linked together by
//! relationship parts (`_rels/*.rels`).

use doctext_core::{classify_io_error, Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// An opened OOXML package held in memory.
pub struct OoxmlPackage {
    name: String,
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl OoxmlPackage {
    /// Open a package from a file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| classify_io_error(e, path))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        Self::from_bytes(bytes, name)
    }

    /// Open a package from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>, name: &str) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP '{}': {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            archive,
        })
    }

    /// Filename the package was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the package contains a part with this name.
    pub fn has_part(&self, part: &str) -> bool {
        self.archive.file_names().any(|n| n == part)
    }

    /// Names of all parts in the package.
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Read a part as UTF-8 text.
    pub fn read_part(&mut self, part: &str) -> Result<String> {
        let mut file = self
            .archive
            .by_name(part)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", part, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", part, e)))?;

        Ok(content)
    }

    /// Name of the main document part (`word/document.xml`,
    /// `ppt/presentation.xml`, ...), taken from the package relationships
    /// with `fallback` used when the package does not declare one.
    pub fn main_part(&mut self, fallback: &str) -> Result<String> {
        let main = self
            .relationships("")?
            .into_iter()
            .find(|rel| rel.is_type("officeDocument"))
            .map(|rel| rel.target)
            .filter(|target| self.has_part(target));

        Ok(main.unwrap_or_else(|| fallback.to_string()))
    }

    /// Read the relationships declared for `source_part`.
    ///
    /// Pass `""` for the package-level relationships (`_rels/.rels`).
    ///
    /// Targets are resolved to absolute part names. A missing relationship
    /// part yields an empty list.
    pub fn relationships(&mut self, source_part: &str) -> Result<Vec<Relationship>> {
        let rels_part = rels_part_for(source_part);
        if !self.has_part(&rels_part) {
            return Ok(Vec::new());
        }

        let content = self.read_part(&rels_part)?;
        let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let mut rels = Vec::new();
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let mut rel = Relationship::default();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .decode_and_unescape_value(&reader)
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => external = value == "External",
                            _ => {}
                        }
                    }

                    if !external {
                        rel.target = resolve_target(base_dir, &rel.target);
                    }
                    rels.push(rel);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships '{}': {}",
                        rels_part, e
                    )));
                }
                _ => {}
            }
        }

        Ok(rels)
    }
}

/// A relationship from one package part to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Absolute part name for internal targets, raw URI for external ones.
    pub target: String,
}

impl Relationship {
    /// Whether the relationship type URI ends with `/<kind>`.
    pub fn is_type(&self, kind: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last == kind)
    }
}

/// Name of the relationship part for `part`, e.g. `ppt/presentation.xml` ->
/// `ppt/_rels/presentation.xml.rels`.
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
