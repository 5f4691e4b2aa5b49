//! Machine-readable summary of one run.

use doctext_core::{interesting_words, ErrorKind, Extraction, Result, SourceDocument};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
}

/// Outcome of a run, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub input: String,
    pub output: Option<String>,
    /// Extension of the recognized format, `None` if unsupported.
    pub format: Option<String>,
    pub status: Status,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
    pub characters: usize,
    pub words: Option<Vec<String>>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn new(
        input: &Path,
        output: Option<&Path>,
        outcome: &Result<Extraction>,
        with_words: bool,
        elapsed: Duration,
    ) -> Self {
        let format = match outcome {
            Ok(extraction) => Some(extraction.format),
            Err(_) => SourceDocument::inspect(input).format,
        };

        let mut report = Self {
            input: input.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            format: format.map(|f| f.to_string()),
            status: Status::Ok,
            error_kind: None,
            message: None,
            characters: 0,
            words: None,
            elapsed_ms: elapsed.as_millis() as u64,
        };

        match outcome {
            Ok(extraction) => {
                report.characters = extraction.text.chars().count();
                if with_words {
                    report.words = Some(interesting_words(&extraction.text));
                }
            }
            Err(e) => {
                report.status = Status::Error;
                report.error_kind = Some(e.kind());
                report.message = Some(e.to_string());
            }
        }

        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
