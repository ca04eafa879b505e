/// Splits text into word-like tokens.
pub trait Tokenizer {
    /// Tokenizes a text.
    ///
    /// # Arguments
    ///
    /// * `text` - Input text.
    ///
    /// # Returns
    ///
    /// Tokens in the order of appearance.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Whitespace tokenizer for OCR output.
///
/// Tokens are separated by spaces and line breaks. A token that ends with a hyphen at a line
/// break continues on the next line, with the hyphen removed. One non-alphabetic character is
/// trimmed from each end of every token.
///
/// # Examples
///
/// ```
/// use text_quality::{OcrTokenizer, Tokenizer};
///
/// let tokenizer = OcrTokenizer;
/// assert_eq!(vec!["test", "token"], tokenizer.tokenize("test token"));
/// assert_eq!(vec!["example"], tokenizer.tokenize("exam-\nple"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct OcrTokenizer;

impl OcrTokenizer {
    const HYPHENS: [char; 3] = ['-', '\u{2E17}', '='];

    fn trim(mut token: String) -> String {
        if token.chars().next_back().is_some_and(|c| !c.is_alphabetic()) {
            token.pop();
        }
        // The first trim may have emptied the token.
        if token.chars().next().is_some_and(|c| !c.is_alphabetic()) {
            token.remove(0);
        }
        token
    }
}

impl Tokenizer for OcrTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = vec![];
        let mut token = String::new();
        for c in text.chars() {
            match c {
                ' ' if !token.is_empty() => {
                    tokens.push(std::mem::take(&mut token));
                }
                '\n' if !token.is_empty() => {
                    if token.ends_with(Self::HYPHENS) {
                        token.pop();
                    } else {
                        tokens.push(std::mem::take(&mut token));
                    }
                }
                _ => token.push(c),
            }
        }
        if !token.is_empty() {
            tokens.push(token);
        }
        tokens.into_iter().map(Self::trim).collect()
    }
}
