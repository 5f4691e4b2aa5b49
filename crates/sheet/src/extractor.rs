//! Worksheet text extractor implementation.

use crate::layout::SheetLayout;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use doctext_core::{classify_workbook_io_error, Error, Result};
use std::io::Cursor;
use std::path::Path;

/// Extractor for `.xls` and `.xlsx` workbooks.
pub struct SpreadsheetExtractor {
    layout: SheetLayout,
}

impl SpreadsheetExtractor {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    /// Render the first worksheet of the workbook at `path` as text, one
    /// line per row from row 1 to the last used row.
    ///
    /// A workbook held open for writing by another process fails with
    /// [`Error::ResourceBusy`]. A workbook without worksheets yields an
    /// empty string.
    pub fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| classify_workbook_io_error(e, path))?;
        self.extract_from_mem(bytes)
    }

    /// Render the first worksheet of an in-memory workbook.
    pub fn extract_from_mem(&self, bytes: Vec<u8>) -> Result<String> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| Error::SpreadsheetError(format!("Failed to open workbook: {}", e)))?;

        let sheet_name = workbook.sheet_names().first().cloned();
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| {
                Error::SpreadsheetError(format!("Failed to read first worksheet: {}", e))
            })?,
            None => {
                log::debug!("Workbook has no worksheets");
                return Ok(String::new());
            }
        };

        let lines = self.render(&range);
        log::debug!(
            "Read {} rows from worksheet '{}'",
            lines.len(),
            sheet_name.unwrap_or_default()
        );

        Ok(lines.join("\n"))
    }

    /// Render rows 1..=last used row over columns 1..=last used column.
    ///
    /// Leading empty rows and columns are kept so positions stay aligned
    /// with the sheet.
    fn render(&self, range: &Range<Data>) -> Vec<String> {
        let Some((last_row, last_col)) = range.end() else {
            return Vec::new();
        };

        (0..=last_row)
            .map(|row| {
                let cells: Vec<String> = (0..=last_col)
                    .map(|col| range.get_value((row, col)).map(cell_text).unwrap_or_default())
                    .collect();
                self.layout.format_row(&cells)
            })
            .collect()
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new(SheetLayout::default())
    }
}

/// Display text of a single cell.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    /// Build a minimal `.xlsx` workbook. Each sheet is given as raw
    /// `<sheetData>` content; strings are written inline.
    fn build_xlsx(sheets: &[&str]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#)
            .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#)
            .unwrap();

        let mut sheet_entries = String::new();
        let mut rel_entries = String::new();
        for i in 1..=sheets.len() {
            sheet_entries.push_str(&format!(
                r#"<sheet name="Sheet{i}" sheetId="{i}" r:id="rId{i}"/>"#
            ));
            rel_entries.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="{MAIN_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>{sheet_entries}</sheets>
</workbook>"#
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rel_entries}</Relationships>"#
            )
            .as_bytes(),
        )
        .unwrap();

        for (i, data) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="{MAIN_NS}"><sheetData>{data}</sheetData></worksheet>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn text_cell(reference: &str, value: &str) -> String {
        format!(r#"<c r="{reference}" t="inlineStr"><is><t>{value}</t></is></c>"#)
    }

    fn number_cell(reference: &str, value: &str) -> String {
        format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
    }

    fn two_by_two() -> String {
        format!(
            r#"<row r="1">{}{}</row><row r="2">{}{}</row>"#,
            text_cell("A1", "a"),
            number_cell("B1", "1"),
            text_cell("A2", "b"),
            number_cell("B2", "2")
        )
    }

    #[test]
    fn test_first_sheet_rows_as_lines() {
        let bytes = build_xlsx(&[&two_by_two()]);
        let text = SpreadsheetExtractor::default().extract_from_mem(bytes).unwrap();
        assert_eq!(text, "a,1\nb,2");
    }

    #[test]
    fn test_only_first_sheet_is_read() {
        let second = format!(r#"<row r="1">{}</row>"#, text_cell("A1", "hidden"));
        let bytes = build_xlsx(&[&two_by_two(), &second]);
        let text = SpreadsheetExtractor::default().extract_from_mem(bytes).unwrap();
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_leading_empty_rows_and_columns_kept() {
        let data = format!(
            r#"<row r="2">{}</row><row r="3">{}</row>"#,
            text_cell("B2", "x"),
            number_cell("C3", "2.5")
        );
        let bytes = build_xlsx(&[&data]);
        let text = SpreadsheetExtractor::default().extract_from_mem(bytes).unwrap();

        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines, vec![",,", ",x,", ",,2.5"]);
    }

    #[test]
    fn test_custom_delimiter_and_quoting() {
        let data = format!(
            r#"<row r="1">{}{}</row>"#,
            text_cell("A1", "Smith, Jane"),
            text_cell("B1", "tab\there")
        );
        let bytes = build_xlsx(&[&data]);

        let comma = SpreadsheetExtractor::default()
            .extract_from_mem(bytes.clone())
            .unwrap();
        assert_eq!(comma, "\"Smith, Jane\",tab\there");

        let tab = SpreadsheetExtractor::new(SheetLayout::new().with_delimiter('\t'))
            .extract_from_mem(bytes)
            .unwrap();
        assert_eq!(tab, "Smith, Jane\t\"tab\there\"");
    }

    #[test]
    fn test_empty_sheet_and_empty_workbook() {
        let bytes = build_xlsx(&[""]);
        assert_eq!(SpreadsheetExtractor::default().extract_from_mem(bytes).unwrap(), "");

        let bytes = build_xlsx(&[]);
        assert_eq!(SpreadsheetExtractor::default().extract_from_mem(bytes).unwrap(), "");
    }

    #[test]
    fn test_extract_from_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.xlsx");
        std::fs::write(&path, build_xlsx(&[&two_by_two()])).unwrap();

        let extractor = SpreadsheetExtractor::default();
        let first = extractor.extract(&path).unwrap();
        assert_eq!(first, "a,1\nb,2");
        assert_eq!(extractor.extract(&path).unwrap(), first);
    }

    #[test]
    fn test_not_a_workbook() {
        let err = SpreadsheetExtractor::default()
            .extract_from_mem(b"name,value\nplain,text".to_vec())
            .unwrap_err();
        assert!(matches!(err, Error::SpreadsheetError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SpreadsheetExtractor::default()
            .extract(Path::new("no/such/budget.xlsx"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(1.0)), "1");
        assert_eq!(cell_text(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_text(&Data::Int(-7)), "-7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::String("x".into())), "x");
    }
}
