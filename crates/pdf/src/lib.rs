//! PDF backend for office document text extraction.
//!
//! Strips the visible text of every page, in page order, using
//! `pdf-extract`.

pub mod extractor;

pub use extractor::PdfExtractor;
