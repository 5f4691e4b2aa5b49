//! Whitespace tokenizer for a quick "interesting words" view of extracted
//! text.

/// Tokens must be longer than this many characters to be kept.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 3;

/// Ordered list of tokens derived from extracted text.
pub type TokenList = Vec<String>;

/// Split `text` on whitespace and keep tokens longer than
/// [`DEFAULT_MIN_TOKEN_LENGTH`] characters, in order of appearance.
pub fn interesting_words(text: &str) -> TokenList {
    interesting_words_with_min(text, DEFAULT_MIN_TOKEN_LENGTH)
}

/// Split `text` on whitespace and keep tokens with more than `min_len`
/// characters.
pub fn interesting_words_with_min(text: &str, min_len: usize) -> TokenList {
    text.split_whitespace()
        .filter(|token| token.chars().count() > min_len)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_tokens_longer_than_three() {
        let words = interesting_words("the quick brown fox jumps over a lazy dog");
        assert_eq!(words, vec!["quick", "brown", "jumps", "over", "lazy"]);
    }

    #[test]
    fn test_exactly_three_chars_dropped() {
        assert!(interesting_words("one two six").is_empty());
        assert_eq!(interesting_words("four"), vec!["four"]);
    }

    #[test]
    fn test_splits_on_any_whitespace() {
        let words = interesting_words("alpha\tbravo\ncharlie\r\ndelta  echo");
        assert_eq!(words, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Three characters, six bytes.
        assert!(interesting_words("äöü").is_empty());
        assert_eq!(interesting_words("äöüß"), vec!["äöüß"]);
    }

    #[test]
    fn test_custom_minimum() {
        assert_eq!(interesting_words_with_min("a bb ccc", 1), vec!["bb", "ccc"]);
        assert!(interesting_words_with_min("", 0).is_empty());
    }
}
