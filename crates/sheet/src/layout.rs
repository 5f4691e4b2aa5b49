//! Row serialization for worksheet text.

/// How worksheet rows are rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    delimiter: char,
}

impl SheetLayout {
    /// Comma-separated layout.
    pub fn new() -> Self {
        Self { delimiter: ',' }
    }

    /// Use a different field delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Join one row of cell values into a line.
    ///
    /// Values containing the delimiter, a double quote or a line break are
    /// wrapped in double quotes with inner quotes doubled.
    pub fn format_row<S: AsRef<str>>(&self, cells: &[S]) -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            self.push_field(&mut line, cell.as_ref());
        }
        line
    }

    fn push_field(&self, line: &mut String, value: &str) {
        let needs_quotes = value
            .chars()
            .any(|c| c == self.delimiter || c == '"' || c == '\n' || c == '\r');

        if needs_quotes {
            line.push('"');
            line.push_str(&value.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(value);
        }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_row() {
        let layout = SheetLayout::new();
        assert_eq!(layout.format_row(&["a", "1"]), "a,1");
        assert_eq!(layout.format_row(&["", "", "x"]), ",,x");
        assert_eq!(layout.format_row::<&str>(&[]), "");
    }

    #[test]
    fn test_quoting() {
        let layout = SheetLayout::new();
        assert_eq!(layout.format_row(&["1,5", "ok"]), "\"1,5\",ok");
        assert_eq!(layout.format_row(&["say \"hi\""]), "\"say \"\"hi\"\"\"");
        assert_eq!(layout.format_row(&["two\nlines"]), "\"two\nlines\"");
    }

    #[test]
    fn test_tab_delimiter() {
        let layout = SheetLayout::new().with_delimiter('\t');
        assert_eq!(layout.delimiter(), '\t');
        assert_eq!(layout.format_row(&["a", "1,5"]), "a\t1,5");
        assert_eq!(layout.format_row(&["a\tb"]), "\"a\tb\"");
    }
}
