//! Word extraction for model training: case folding and word-character
//! run scanning.
//!
//! Splits input text into a sequence of lowercase word tokens, discarding
//! whitespace and punctuation entirely. Contractions split at the apostrophe
//! ("Don't" becomes `don` and `t`), so the vocabulary stays free of
//! punctuation-bearing entries.
//!
//! This crate has no dependencies on other babble crates: it is a pure text
//! processing utility that produces `Vec<String>`.

/// Tokenize input text into lowercase words.
///
/// 1. Converts to lowercase.
/// 2. Extracts maximal runs of word characters (alphanumeric or `_`);
///    every other character is a separator and is dropped.
///
/// Never produces an empty token. Text containing no word characters
/// tokenizes to an empty vector.
///
/// # Examples
///
/// ```
/// use babble_tokenizer::tokenize;
///
/// let tokens = tokenize("Don't you think so?");
/// assert_eq!(tokens, vec!["don", "t", "you", "think", "so"]);
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    let lowered = input.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in lowered.chars() {
        if is_word_char(ch) {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Word characters are alphanumerics (Unicode) plus the underscore.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
