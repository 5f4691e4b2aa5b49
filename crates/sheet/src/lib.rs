//! Spreadsheet backend for office document text extraction.
//!
//! Reads the first worksheet of a workbook with `calamine` and renders it
//! as delimiter-separated lines, one per row.

pub mod extractor;
pub mod layout;

pub use extractor::SpreadsheetExtractor;
pub use layout::SheetLayout;
