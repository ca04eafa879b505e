//! Language identification.

#[cfg(feature = "fasttext")]
mod fasttext;

#[cfg(feature = "fasttext")]
pub use self::fasttext::FastTextLanguageClassifier;

use crate::errors::Result;

/// Trait of language classifiers.
pub trait LanguageClassifier: Send + Sync {
    /// Identifies the language of a text.
    ///
    /// # Returns
    ///
    /// The language code (e.g. `nl`) and the confidence in `[0, 1]`. If the language cannot be
    /// determined, the code is empty and the confidence is `0.0`.
    fn classify(&self, text: &str) -> Result<(String, f64)>;
}

/// Replaces ASCII punctuation and the low double quotation mark with spaces and trims the result.
///
/// # Examples
///
/// ```
/// use text_quality::language::preprocess;
///
/// assert_eq!("test       text", preprocess("„test . . . text."));
/// ```
pub fn preprocess(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_punctuation() || c == '\u{201E}' {
                ' '
            } else {
                c
            }
        })
        .collect();
    replaced.trim().to_string()
}

/// Aggregates per-line predictions into a prediction for the whole text.
///
/// Confidences are summed per label over all lines; the label with the highest sum wins, and its
/// confidence is its share of the total. Ties go to the label seen first.
///
/// # Arguments
///
/// * `predictions` - `(label, confidence)` pairs of each line. Lines may have no prediction.
///
/// # Returns
///
/// The label and its confidence, or `("", 0.0)` if no line has a prediction.
pub fn aggregate_lines(predictions: &[Vec<(String, f64)>]) -> (String, f64) {
    let mut totals: Vec<(&str, f64)> = vec![];
    for (label, confidence) in predictions.iter().flatten() {
        if let Some(total) = totals.iter_mut().find(|(l, _)| l == label) {
            total.1 += confidence;
        } else {
            totals.push((label, *confidence));
        }
    }
    let sum: f64 = totals.iter().map(|(_, c)| c).sum();
    let mut best: Option<(&str, f64)> = None;
    for &(label, total) in &totals {
        if best.map_or(true, |(_, t)| total > t) {
            best = Some((label, total));
        }
    }
    match best {
        Some((label, total)) if sum > 0.0 => (label.to_string(), total / sum),
        _ => (String::new(), 0.0),
    }
}
