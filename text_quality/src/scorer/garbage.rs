use hashbrown::HashSet;

use crate::scorer::Scorer;

/// Heuristic detector of malformed tokens.
///
/// The score is the fraction of tokens that violate at least one of the rules described in
/// Wudtke et al. (2011), "Recognizing garbage in OCR output on historical documents".
#[derive(Clone, Copy, Debug, Default)]
pub struct GarbageScorer;

impl GarbageScorer {
    const VOWELS: &'static str = "aäàáâǎeéèêëěiîïíìıoöôòóǒuüûùúǔ";

    const MAX_TOKEN_LENGTH: usize = 21;
    const MAX_REPETITION: usize = 3;
    const MAX_VOWEL_RUN: usize = 4;
    const MAX_CONSONANT_RUN: usize = 6;
    const IMBALANCE_FACTOR: usize = 8;
    const MAX_INNER_SPECIALS: usize = 2;

    fn is_vowel(c: char) -> bool {
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => Self::VOWELS.contains(l),
            _ => false,
        }
    }

    /// Checks whether a token is garbage.
    pub fn is_garbage(token: &str) -> bool {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() >= Self::MAX_TOKEN_LENGTH {
            return true;
        }

        let mut n_vowels = 0;
        let mut n_consonants = 0;
        let mut n_lower = 0;
        let mut n_upper = 0;
        let mut n_specials = 0;
        let mut inner_specials = HashSet::new();
        let mut alpha = true;
        let mut last_char = None;
        let mut repetition_run = 0;
        let mut vowel_run = 0;
        let mut consonant_run = 0;

        for (i, &c) in chars.iter().enumerate() {
            if c.is_alphabetic() {
                if Self::is_vowel(c) {
                    n_vowels += 1;
                    vowel_run += 1;
                    consonant_run = 0;
                } else {
                    n_consonants += 1;
                    consonant_run += 1;
                    vowel_run = 0;
                }
                if c.is_uppercase() {
                    n_upper += 1;
                } else {
                    n_lower += 1;
                }
            } else {
                alpha = false;
                vowel_run = 0;
                consonant_run = 0;
                if !c.is_alphanumeric() {
                    n_specials += 1;
                    if i != 0 && i != chars.len() - 1 {
                        inner_specials.insert(c);
                    }
                }
            }

            if vowel_run >= Self::MAX_VOWEL_RUN || consonant_run >= Self::MAX_CONSONANT_RUN {
                return true;
            }

            if last_char == Some(c) {
                repetition_run += 1;
                if repetition_run >= Self::MAX_REPETITION {
                    return true;
                }
            } else {
                repetition_run = 0;
            }
            last_char = Some(c);
        }

        if alpha
            && n_vowels > 0
            && n_consonants > 0
            && (n_vowels * Self::IMBALANCE_FACTOR < n_consonants
                || n_consonants * Self::IMBALANCE_FACTOR < n_vowels)
        {
            return true;
        }

        if n_lower > 0 && n_upper > n_lower {
            return true;
        }

        if n_upper > 0
            && chars.first().is_some_and(|c| c.is_lowercase())
            && chars.last().is_some_and(|c| c.is_lowercase())
        {
            return true;
        }

        let n_regular = chars.len() - n_specials;
        if n_regular > 0 && n_specials >= n_regular {
            return true;
        }

        inner_specials.len() >= Self::MAX_INNER_SPECIALS
    }
}

impl Scorer for GarbageScorer {
    fn score(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }
        let n_garbage = tokens.iter().filter(|t| Self::is_garbage(t)).count();
        n_garbage as f64 / tokens.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(xs: &[&str]) -> f64 {
        let tokens: Vec<String> = xs.iter().map(|x| x.to_string()).collect();
        GarbageScorer.score(&tokens)
    }

    #[test]
    fn test_score_empty() {
        assert_eq!(0.0, score(&[]));
    }

    #[test]
    fn test_score_clean() {
        assert_eq!(0.0, score(&["token1", "token2", "token3"]));
    }

    #[test]
    fn test_score_ratio() {
        let s = score(&[&"a".repeat(22), "token", "token"]);
        assert!((s - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_token() {
        assert!(GarbageScorer::is_garbage(&"a".repeat(21)));
        assert!(!GarbageScorer::is_garbage("onderwijsvernieuwing"));
    }

    #[test]
    fn test_vowel_run() {
        assert!(GarbageScorer::is_garbage(&"î".repeat(5)));
        assert!(GarbageScorer::is_garbage("kaeiou"));
        assert!(!GarbageScorer::is_garbage("beeld"));
    }

    #[test]
    fn test_consonant_run() {
        assert!(GarbageScorer::is_garbage("kbcdfgh"));
        assert!(!GarbageScorer::is_garbage("angst"));
    }

    #[test]
    fn test_repetition() {
        assert!(GarbageScorer::is_garbage(&"k".repeat(7)));
        assert!(GarbageScorer::is_garbage("x...."));
        assert!(!GarbageScorer::is_garbage("boom"));
    }

    #[test]
    fn test_imbalance() {
        assert!(GarbageScorer::is_garbage("bcdfgabcdf"));
        assert!(!GarbageScorer::is_garbage("straat"));
    }

    #[test]
    fn test_case() {
        assert!(GarbageScorer::is_garbage("TEsT"));
        assert!(GarbageScorer::is_garbage("teSt"));
        assert!(!GarbageScorer::is_garbage("Test"));
        assert!(!GarbageScorer::is_garbage("TEST"));
    }

    #[test]
    fn test_special_characters() {
        assert!(GarbageScorer::is_garbage("a$%"));
        assert!(GarbageScorer::is_garbage("ab$c%de"));
        assert!(!GarbageScorer::is_garbage("auto's"));
        assert!(!GarbageScorer::is_garbage("%%"));
    }

    #[test]
    fn test_empty_token() {
        assert!(!GarbageScorer::is_garbage(""));
    }
}
