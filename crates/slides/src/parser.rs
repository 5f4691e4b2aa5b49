//! PresentationML slide walker.

use doctext_core::{Error, Result};
use doctext_office::{local_name, OfficeApplication, OoxmlPackage};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extractor for presentations.
pub struct PresentationExtractor;

impl PresentationExtractor {
    /// Create a new presentation extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract shape text of every slide of the presentation at `path`,
    /// opened read-only through `app`.
    pub fn extract(&self, app: &mut OfficeApplication, path: &Path) -> Result<String> {
        let mut package = app.open(path)?;
        self.extract_package(&mut package)
    }

    /// Extract shape text from an opened package.
    ///
    /// Each text-bearing shape contributes its text followed by one space.
    /// Slide boundaries are not marked.
    pub fn extract_package(&self, package: &mut OoxmlPackage) -> Result<String> {
        let slides = slide_order(package)?;
        let mut text = String::new();

        for (idx, slide_part) in slides.iter().enumerate() {
            let xml = package.read_part(slide_part)?;
            let shapes = parse_shapes(&xml)?;

            log::debug!(
                "Slide {} ('{}'): {} text shapes",
                idx + 1,
                slide_part,
                shapes.len()
            );

            for shape in shapes {
                text.push_str(&shape);
                text.push(' ');
            }
        }

        Ok(text)
    }
}

impl Default for PresentationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide part names in presentation order.
///
/// Uses the slide id list of the presentation part. Packages without one
/// fall back to the numeric order of `ppt/slides/slideN.xml`.
fn slide_order(package: &mut OoxmlPackage) -> Result<Vec<String>> {
    let presentation_part = package.main_part(DEFAULT_PRESENTATION_PART)?;

    if package.has_part(&presentation_part) {
        let xml = package.read_part(&presentation_part)?;
        let ids = slide_ids(&xml)?;

        if !ids.is_empty() {
            let rels = package.relationships(&presentation_part)?;
            let slides: Vec<String> = ids
                .iter()
                .filter_map(|id| {
                    let target = rels.iter().find(|rel| &rel.id == id).map(|rel| rel.target.clone());
                    if target.is_none() {
                        log::warn!("Slide relationship '{}' not found, skipping", id);
                    }
                    target
                })
                .filter(|target| package.has_part(target))
                .collect();

            if !slides.is_empty() {
                return Ok(slides);
            }
        }
    }

    log::debug!("No slide list in {}, ordering slides by part name", package.name());

    let mut slides: Vec<(String, usize)> = package
        .part_names()
        .into_iter()
        .filter(|name| name.starts_with(SLIDE_PREFIX) && !name[SLIDE_PREFIX.len()..].contains('/'))
        .filter_map(|name| extract_slide_number(&name).map(|n| (name, n)))
        .collect();
    slides.sort_by_key(|(_, number)| *number);

    Ok(slides.into_iter().map(|(name, _)| name).collect())
}

/// Relationship ids of `p:sldId` entries, in list order.
fn slide_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                let id = e
                    .attributes()
                    .flatten()
                    .find(|attr| local_name(attr.key.as_ref()) == b"id" && attr.key.as_ref() != b"id")
                    .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
                if let Some(id) = id {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Text of each text-bearing shape on a slide, in shape-tree order.
///
/// Shapes nested in groups are visited in place. Graphic frames (tables,
/// charts) and pictures are not `p:sp` elements and contribute nothing.
/// Of an `mc:AlternateContent` block only the `mc:Choice` branch is read;
/// `mc:Fallback` repeats the same shapes.
fn parse_shapes(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut shapes = Vec::new();
    let mut shape_depth = 0usize;
    let mut in_text_body = false;
    let mut paragraph_count = 0usize;
    let mut in_text = false;
    let mut fallback_depth = 0usize;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"Fallback" => fallback_depth += 1,
                    _ if fallback_depth > 0 => {}
                    b"sp" => {
                        shape_depth += 1;
                        current.clear();
                        paragraph_count = 0;
                    }
                    b"txBody" if shape_depth > 0 => in_text_body = true,
                    b"p" if in_text_body => {
                        if paragraph_count > 0 {
                            current.push('\n');
                        }
                        paragraph_count += 1;
                    }
                    b"t" if in_text_body => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if fallback_depth > 0 {
                    continue;
                }
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" if in_text_body => {
                        if paragraph_count > 0 {
                            current.push('\n');
                        }
                        paragraph_count += 1;
                    }
                    b"br" if in_text_body => current.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text && fallback_depth == 0 {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Invalid text content: {}", err)))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                    _ if fallback_depth > 0 => {}
                    b"sp" => {
                        shape_depth = shape_depth.saturating_sub(1);
                        if !current.trim().is_empty() {
                            shapes.push(std::mem::take(&mut current));
                        }
                        current.clear();
                        in_text_body = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Extract a slide number from a part name like "ppt/slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
