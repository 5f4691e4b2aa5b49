//! Word-processor document backend for office document text extraction.
//!
//! Documents are opened through the office application handle and read as
//! WordprocessingML packages.

pub mod parser;

pub use parser::WordExtractor;
