//! Presentation backend for office document text extraction.
//!
//! Reads slide parts of a `.pptx` package (legacy `.ppt` files are
//! converted by the office application first) and collects shape text in
//! slide order.

pub mod parser;

pub use parser::PresentationExtractor;
