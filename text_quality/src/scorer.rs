//! Scorers computing a single feature value from a token sequence.

mod dictionary;
mod garbage;
mod q_gram;

pub use dictionary::{DictionaryScorer, HunspellDictionary, TokenDictionary};
pub use garbage::GarbageScorer;
pub use q_gram::QGramScorer;

/// Trait of scorers.
///
/// Scorers hold immutable reference data only, so the same scorer can be shared by any number
/// of concurrent callers.
pub trait Scorer {
    /// Computes the score of a token sequence.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens produced by a [`Tokenizer`](crate::Tokenizer).
    ///
    /// # Returns
    ///
    /// A score, typically in `[0, 1]`.
    fn score(&self, tokens: &[String]) -> f64;
}
