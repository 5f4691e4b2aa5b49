//! Core domain types, error taxonomy, text normalization and output
//! handling for office document text extraction.

pub mod error;
pub mod normalize;
pub mod sink;
pub mod tokenize;
pub mod types;

pub use error::{classify_io_error, classify_workbook_io_error, Error, ErrorKind, Result};
pub use normalize::{LineEnding, TextNormalizer};
pub use sink::{write_output, OutputSink};
pub use tokenize::{interesting_words, interesting_words_with_min, TokenList};
pub use types::{Container, DocumentFormat, Extraction, SourceDocument};
