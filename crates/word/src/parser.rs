//! WordprocessingML paragraph walker.

use doctext_core::{Error, Result};
use doctext_office::{local_name, OfficeApplication, OoxmlPackage};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Main document part used when the package does not declare one.
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// End-of-paragraph mark appended to every paragraph's text.
const PARAGRAPH_MARK: char = '\n';

/// Extractor for word-processor documents.
pub struct WordExtractor;

impl WordExtractor {
    /// Create a new word-processor extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every body paragraph of the document at `path`,
    /// opened read-only through `app`.
    pub fn extract(&self, app: &mut OfficeApplication, path: &Path) -> Result<String> {
        let mut package = app.open(path)?;
        self.extract_package(&mut package)
    }

    /// Extract paragraph text from an opened package.
    pub fn extract_package(&self, package: &mut OoxmlPackage) -> Result<String> {
        let part = package.main_part(DEFAULT_DOCUMENT_PART)?;
        let xml = package.read_part(&part)?;
        let paragraphs = parse_paragraphs(&xml)?;

        log::debug!(
            "Read {} paragraphs from '{}' in {}",
            paragraphs.len(),
            part,
            package.name()
        );

        Ok(paragraphs.concat())
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the document XML and return each body paragraph's text, in
/// document order, each ending with its paragraph mark.
///
/// Paragraphs inside table cells are included. Text boxes belong to a
/// separate story and are skipped, as are deleted runs and field
/// instructions.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut text_box_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"txbxContent" => text_box_depth += 1,
                    _ if text_box_depth > 0 => {}
                    b"p" => {
                        paragraph_depth += 1;
                        if paragraph_depth == 1 {
                            current.clear();
                        }
                    }
                    b"r" => run_depth += 1,
                    b"t" if run_depth > 0 => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if text_box_depth > 0 {
                    continue;
                }
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" if paragraph_depth == 0 => {
                        paragraphs.push(PARAGRAPH_MARK.to_string());
                    }
                    b"tab" if run_depth > 0 => current.push('\t'),
                    b"br" | b"cr" if run_depth > 0 => current.push('\n'),
                    b"noBreakHyphen" if run_depth > 0 => current.push('-'),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text && text_box_depth == 0 {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Invalid text content: {}", err)))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"txbxContent" => text_box_depth = text_box_depth.saturating_sub(1),
                    _ if text_box_depth > 0 => {}
                    b"p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            current.push(PARAGRAPH_MARK);
                            paragraphs.push(std::mem::take(&mut current));
                        }
                    }
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing document at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
