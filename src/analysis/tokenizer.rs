//! Whitespace tokenization of query text.
//!
//! # Examples
//!
//! ```
//! use recordseek::analysis::tokenizer::tokenize;
//!
//! assert_eq!(tokenize("  Framing   LUMBER "), vec!["framing", "lumber"]);
//! assert!(tokenize("   ").is_empty());
//! ```

/// Trait for tokenizers that convert query text into normalized tokens.
pub trait Tokenizer: Send + Sync {
    /// Split text into ordered tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}

/// A tokenizer that splits on runs of whitespace and lowercases each token.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect()
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Tokenize query text with the [`WhitespaceTokenizer`].
pub fn tokenize(text: &str) -> Vec<String> {
    WhitespaceTokenizer.tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("Hello\tWORLD\n  again"),
            vec!["hello", "world", "again"]
        );
        assert_eq!(tokenizer.name(), "whitespace");
    }

    #[test]
    fn test_punctuation_is_kept() {
        assert_eq!(tokenize("$1,250.00 (net)"), vec!["$1,250.00", "(net)"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }
}
