//! Domain types for representing a source document and its extracted text.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The format of a source document, as selected by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word-processor document; `legacy` is the binary `.doc` variant.
    WordDocument { legacy: bool },
    /// Spreadsheet workbook; `legacy` is the binary `.xls` variant.
    Spreadsheet { legacy: bool },
    /// Presentation; `legacy` is the binary `.ppt` variant.
    Presentation { legacy: bool },
}

impl DocumentFormat {
    /// Detect format from a file extension (without the leading dot).
    ///
    /// Matching is case-sensitive: only the literal lower-case extensions
    /// are recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::WordDocument { legacy: true }),
            "docx" => Some(Self::WordDocument { legacy: false }),
            "xls" => Some(Self::Spreadsheet { legacy: true }),
            "xlsx" => Some(Self::Spreadsheet { legacy: false }),
            "ppt" => Some(Self::Presentation { legacy: true }),
            "pptx" => Some(Self::Presentation { legacy: false }),
            _ => None,
        }
    }

    /// Guess the container kind from file magic bytes.
    ///
    /// Only distinguishes containers (PDF, ZIP-based OOXML, OLE/CFB), so the
    /// result is useful for consistency checks but not for routing.
    pub fn container_from_magic(bytes: &[u8]) -> Option<Container> {
        if bytes.len() < 4 {
            return None;
        }

        if bytes.starts_with(b"%PDF") {
            return Some(Container::Pdf);
        }

        // OOXML is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Container::Zip);
        }

        // Legacy Office is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Container::Cfb);
        }

        None
    }

    /// The container this format is expected to be stored in.
    pub fn expected_container(&self) -> Container {
        match self {
            Self::Pdf => Container::Pdf,
            Self::WordDocument { legacy: true }
            | Self::Spreadsheet { legacy: true }
            | Self::Presentation { legacy: true } => Container::Cfb,
            _ => Container::Zip,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::WordDocument { legacy: true } => "doc",
            Self::WordDocument { legacy: false } => "docx",
            Self::Spreadsheet { legacy: true } => "xls",
            Self::Spreadsheet { legacy: false } => "xlsx",
            Self::Presentation { legacy: true } => "ppt",
            Self::Presentation { legacy: false } => "pptx",
        };
        f.write_str(name)
    }
}

/// Physical container of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Pdf,
    Zip,
    Cfb,
}

/// A document selected for extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Absolute path of the file.
    pub path: PathBuf,

    /// Lower-cased extension, empty if the file has none.
    pub extension: String,

    /// Whether the file existed when the document was inspected.
    pub exists: bool,

    /// Format selected by the literal extension, if recognized.
    pub format: Option<DocumentFormat>,
}

impl SourceDocument {
    /// Inspect a path. Never fails: a missing file is recorded, not raised.
    pub fn inspect(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let raw_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            exists: path.is_file(),
            format: DocumentFormat::from_extension(&raw_extension),
            extension: raw_extension.to_lowercase(),
            path,
        }
    }

    /// Original filename (without path).
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

/// Text extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Format of the source document.
    pub format: DocumentFormat,

    /// Flat extracted text (possibly empty).
    pub text: String,
}

impl Extraction {
    /// Create a new extraction result.
    pub fn new(format: DocumentFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            text: text.into(),
        }
    }
}
