//! Error types for office document text extraction.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting text from a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file does not exist.
    #[error("Input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The file extension is not one of the recognized formats.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// A workbook is locked by another process.
    #[error("Could not read {}: the file is in use by another process. Please make sure it is not open in Excel or another spreadsheet application.", .0.display())]
    ResourceBusy(PathBuf),

    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    /// Failed to write the extracted text.
    #[error("Failed to write output to {}: {source}", .path.display())]
    OutputError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// PDF loading or text stripping failed.
    #[error("PDF extraction error: {0}")]
    PdfError(String),

    /// Workbook loading or cell reading failed.
    #[error("Spreadsheet extraction error: {0}")]
    SpreadsheetError(String),

    /// The external office application could not be started or failed to
    /// convert the document.
    #[error("Office application error: {0}")]
    ApplicationError(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error (for OOXML packages).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for OOXML parts).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// OLE/CFB container error (for legacy documents).
    #[error("OLE/CFB error: {0}")]
    CfbError(String),

    /// An extractor panicked.
    #[error("Extractor failed unexpectedly: {0}")]
    ExtractorPanic(String),
}

impl Error {
    /// The user-facing failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::ResourceBusy(_) => ErrorKind::ResourceBusy,
            _ => ErrorKind::ExtractionFailed,
        }
    }
}

/// Failure categories reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input path is missing.
    NotFound,
    /// The input is locked by another process.
    ResourceBusy,
    /// The document is malformed, unreadable, or could not be processed.
    ExtractionFailed,
    /// The extension is not a recognized document format.
    UnsupportedFormat,
}

impl ErrorKind {
    /// Process exit code for this failure category.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::NotFound => 2,
            ErrorKind::UnsupportedFormat => 3,
            ErrorKind::ResourceBusy => 4,
            ErrorKind::ExtractionFailed => 5,
        }
    }
}

/// Classify an I/O error raised while opening `path`.
///
/// Missing files become [`Error::NotFound`]; everything else is kept as a
/// plain I/O error.
pub fn classify_io_error(err: io::Error, path: impl Into<PathBuf>) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        return Error::NotFound(path.into());
    }
    Error::IoError(err)
}

/// Like [`classify_io_error`], but sharing and lock violations on a
/// workbook become [`Error::ResourceBusy`].
pub fn classify_workbook_io_error(err: io::Error, path: impl Into<PathBuf>) -> Error {
    if is_lock_violation(&err) {
        return Error::ResourceBusy(path.into());
    }
    classify_io_error(err, path)
}

fn is_lock_violation(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION on Windows, EBUSY / ETXTBSY elsewhere
    let code = err.raw_os_error();
    if cfg!(windows) {
        matches!(code, Some(32) | Some(33))
    } else {
        matches!(code, Some(16) | Some(26))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::NotFound(PathBuf::from("a.doc")).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::UnsupportedFormat("xyz".to_string()).kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(
            Error::ResourceBusy(PathBuf::from("a.xlsx")).kind(),
            ErrorKind::ResourceBusy
        );
        assert_eq!(Error::PdfError("bad".to_string()).kind(), ErrorKind::ExtractionFailed);
        assert_eq!(Error::ZipError("bad".to_string()).kind(), ErrorKind::ExtractionFailed);
    }

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let codes = [
            ErrorKind::NotFound.exit_code(),
            ErrorKind::UnsupportedFormat.exit_code(),
            ErrorKind::ResourceBusy.exit_code(),
            ErrorKind::ExtractionFailed.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert!(*a > 1);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_classify_io_error() {
        let busy = io::Error::new(io::ErrorKind::WouldBlock, "locked");
        assert!(matches!(classify_io_error(busy, "letter.docx"), Error::IoError(_)));

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(classify_io_error(missing, "book.xlsx"), Error::NotFound(_)));

        let other = io::Error::new(io::ErrorKind::InvalidData, "garbage");
        assert!(matches!(classify_io_error(other, "book.xlsx"), Error::IoError(_)));
    }

    #[test]
    fn test_classify_workbook_io_error() {
        let busy = io::Error::new(io::ErrorKind::WouldBlock, "locked");
        assert!(matches!(
            classify_workbook_io_error(busy, "book.xlsx"),
            Error::ResourceBusy(_)
        ));

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            classify_workbook_io_error(missing, "book.xlsx"),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_resource_busy_message_is_user_facing() {
        let msg = Error::ResourceBusy(PathBuf::from("book.xlsx")).to_string();
        assert!(msg.contains("book.xlsx"));
        assert!(msg.contains("in use by another process"));
        assert!(msg.contains("not open in Excel or another spreadsheet application"));
    }
}
