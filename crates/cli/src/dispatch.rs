//! Route a document to the extractor for its format.

use doctext_core::{
    DocumentFormat, Error, Extraction, OutputSink, Result, SourceDocument, TextNormalizer,
};
use doctext_office::{with_external_application, ApplicationKind, OfficeLauncher};
use doctext_pdf::PdfExtractor;
use doctext_sheet::{SheetLayout, SpreadsheetExtractor};
use doctext_slides::PresentationExtractor;
use doctext_word::WordExtractor;
use std::fs::File;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Settings shared by every extraction of a run.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// How the external office application is started.
    pub launcher: OfficeLauncher,
    /// How worksheet rows are rendered.
    pub sheet: SheetLayout,
}

/// Selects and runs exactly one extractor per document.
pub struct Dispatcher {
    config: DispatchConfig,
    normalizer: TextNormalizer,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Extract the text of `path` and, when `output` is a non-empty path,
    /// write it there.
    ///
    /// A missing input fails before any extractor runs and before the
    /// output file is touched. The format is chosen by the literal file
    /// extension only.
    pub fn extract(&self, path: &Path, output: Option<&Path>) -> Result<Extraction> {
        let document = SourceDocument::inspect(path);

        if !document.exists {
            return Err(Error::NotFound(document.path));
        }

        let format = document.format.ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "'{}' (expected .pdf, .doc, .docx, .xls, .xlsx, .ppt or .pptx)",
                document.filename()
            ))
        })?;

        log::debug!("Extracting {} as {}", document.path.display(), format);
        warn_on_content_mismatch(&document.path, format);

        let raw = self.run_extractor(&document.path, format)?;
        let text = self.normalizer.normalize(&raw);

        OutputSink::from_path(output).deliver(&text)?;

        Ok(Extraction::new(format, text))
    }

    /// Run the extractor for `format`, containing any panic it raises.
    fn run_extractor(&self, path: &Path, format: DocumentFormat) -> Result<String> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match format {
            DocumentFormat::Pdf => PdfExtractor::new().extract(path),
            DocumentFormat::Spreadsheet { .. } => {
                SpreadsheetExtractor::new(self.config.sheet.clone()).extract(path)
            }
            DocumentFormat::WordDocument { .. } | DocumentFormat::Presentation { .. } => {
                self.run_office_extractor(path, format)
            }
        }));

        outcome.unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::ExtractorPanic(message))
        })
    }

    /// Run a word-processor or presentation extractor with a live office
    /// application.
    fn run_office_extractor(&self, path: &Path, format: DocumentFormat) -> Result<String> {
        let kind = ApplicationKind::for_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;

        with_external_application(kind, &self.config.launcher, |app| match kind {
            ApplicationKind::WordProcessor => WordExtractor::new().extract(app, path),
            ApplicationKind::Presentation => PresentationExtractor::new().extract(app, path),
        })
    }
}

/// Log a warning when the file content does not look like its extension.
fn warn_on_content_mismatch(path: &Path, format: DocumentFormat) {
    let mut magic = [0u8; 8];
    let read = File::open(path).and_then(|mut file| file.read(&mut magic));

    let Ok(len) = read else {
        return;
    };

    match DocumentFormat::container_from_magic(&magic[..len]) {
        Some(found) if found == format.expected_container() => {}
        found => log::warn!(
            "Content of {} does not look like a .{} file (detected {:?})",
            path.display(),
            format,
            found
        ),
    }
}
