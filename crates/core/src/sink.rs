//! Output sink: persist extracted text to a file or hand it back.

use crate::error::{Error, Result};
use crate::normalize::{LineEnding, TextNormalizer};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where extracted text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Write the text to this path, replacing any existing file.
    File(PathBuf),
    /// Return the text to the caller.
    Caller,
}

impl OutputSink {
    /// Select a sink from an optional output path; an empty path means
    /// [`OutputSink::Caller`].
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) if !p.as_os_str().is_empty() => OutputSink::File(p.to_path_buf()),
            _ => OutputSink::Caller,
        }
    }

    /// Deliver normalized text.
    ///
    /// Returns `Some(text)` for [`OutputSink::Caller`] and `None` once the
    /// file has been written.
    pub fn deliver(&self, text: &str) -> Result<Option<String>> {
        match self {
            OutputSink::Caller => Ok(Some(text.to_string())),
            OutputSink::File(path) => {
                write_output(path, text, LineEnding::platform())?;
                Ok(None)
            }
        }
    }
}

/// Write `text` to `path` with the given line ending, overwriting any
/// existing file.
pub fn write_output(path: &Path, text: &str, line_ending: LineEnding) -> Result<()> {
    let content = TextNormalizer::new().to_file_content(text, line_ending);

    let to_error = |source| Error::OutputError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(to_error)?;
    file.write_all(content.as_bytes()).map_err(to_error)?;
    file.flush().map_err(to_error)?;

    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
