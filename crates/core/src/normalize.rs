//! Text normalization for extracted document text.
//!
//! Every extractor hands back text in whatever shape its format produces:
//! Word paragraph marks, PowerPoint soft breaks, PDF form feeds. The
//! normalizer folds these into one flat `\n`-separated stream in NFC form.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Matches every line-break flavour produced by the supported formats:
/// CRLF, lone CR (Word paragraph mark), vertical tab (soft line break) and
/// form feed (page break).
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|[\r\x0B\x0C]").unwrap());

/// C0 control characters that carry no text, i.e. everything except tab and
/// newline (line breaks are already folded by the time this runs).
static CONTROL_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0E-\x1F\x7F]").unwrap());

/// Line ending used when writing text files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The line ending native to the current platform.
    pub fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Text normalizer for extracted document text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Whether to apply Unicode NFC composition.
    compose_unicode: bool,
}

impl TextNormalizer {
    /// Create a new text normalizer with default settings.
    pub fn new() -> Self {
        Self {
            compose_unicode: true,
        }
    }

    /// Set whether to apply Unicode NFC composition.
    pub fn with_compose_unicode(mut self, compose: bool) -> Self {
        self.compose_unicode = compose;
        self
    }

    /// Normalize extracted text.
    ///
    /// - Folds `\r\n`, `\r`, vertical tab and form feed into `\n`
    /// - Drops NUL and other non-printing control characters
    /// - Composes to Unicode NFC
    ///
    /// Normalizing already-normalized text returns it unchanged.
    pub fn normalize(&self, text: &str) -> String {
        let unified = LINE_BREAK_REGEX.replace_all(text, "\n");
        let cleaned = CONTROL_CHAR_REGEX.replace_all(&unified, "");

        if self.compose_unicode {
            cleaned.nfc().collect()
        } else {
            cleaned.into_owned()
        }
    }

    /// Render normalized text as file content: `\n` becomes `line_ending`
    /// and the content ends with exactly one line ending.
    pub fn to_file_content(&self, text: &str, line_ending: LineEnding) -> String {
        let body = text.trim_end_matches('\n');
        let mut content = match line_ending {
            LineEnding::Lf => body.to_string(),
            LineEnding::CrLf => body.replace('\n', "\r\n"),
        };
        content.push_str(line_ending.as_str());
        content
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_line_breaks() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("a\r\nb\rc\x0Bd\x0Ce"), "a\nb\nc\nd\ne");
    }

    #[test]
    fn test_word_paragraph_marks() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("First paragraph\rSecond paragraph\r"),
            "First paragraph\nSecond paragraph\n"
        );
    }

    #[test]
    fn test_strip_control_chars_keeps_tabs() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("a\u{0}b\tc\u{7}d"), "ab\tcd");
    }

    #[test]
    fn test_nfc_composition() {
        let normalizer = TextNormalizer::new();
        // "e" + combining acute accent
        assert_eq!(normalizer.normalize("caf\u{65}\u{301}"), "caf\u{e9}");

        let raw = TextNormalizer::new().with_compose_unicode(false);
        assert_eq!(raw.normalize("caf\u{65}\u{301}"), "caf\u{65}\u{301}");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let once = normalizer.normalize("Title\r\n\x0BBody\u{0} text caf\u{65}\u{301}\x0C");
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_to_file_content_lf() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.to_file_content("a\nb", LineEnding::Lf), "a\nb\n");
        assert_eq!(normalizer.to_file_content("a\nb\n\n", LineEnding::Lf), "a\nb\n");
        assert_eq!(normalizer.to_file_content("", LineEnding::Lf), "\n");
    }

    #[test]
    fn test_to_file_content_crlf() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.to_file_content("a\nb", LineEnding::CrLf), "a\r\nb\r\n");
    }

    #[test]
    fn test_platform_line_ending() {
        if cfg!(windows) {
            assert_eq!(LineEnding::platform(), LineEnding::CrLf);
        } else {
            assert_eq!(LineEnding::platform(), LineEnding::Lf);
        }
    }
}
