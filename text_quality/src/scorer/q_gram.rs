use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use hashbrown::HashMap;
use log::info;

use crate::errors::{Result, TextQualityError};
use crate::scorer::Scorer;
use crate::tokenizer::Tokenizer;

/// Character trigram frequency scorer.
///
/// Every trigram extracted from the tokens that appears in a ranked reference list contributes
/// `1 - rank / N`, where `N` is the size of the list. The score is the sum divided by the number
/// of extracted trigrams.
#[derive(Clone, Debug)]
pub struct QGramScorer {
    q_grams: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl QGramScorer {
    /// Length of q-grams.
    pub const Q: usize = 3;

    /// Default number of q-grams read from a file.
    pub const DEFAULT_GAMMA: usize = 1000;

    /// Creates a scorer from q-grams ordered by descending frequency.
    pub fn new(q_grams: Vec<String>) -> Self {
        let mut ranks = HashMap::with_capacity(q_grams.len());
        for (rank, q_gram) in q_grams.iter().enumerate() {
            ranks.entry(q_gram.clone()).or_insert(rank);
        }
        Self { q_grams, ranks }
    }

    /// Ranks the trigrams of a text by frequency.
    ///
    /// Trigrams with the same frequency keep the order of their first appearance.
    ///
    /// # Arguments
    ///
    /// * `text` - Reference text in the target language.
    /// * `tokenizer` - Tokenizer applied to `text`.
    /// * `max_rank` - Maximum number of q-grams to keep.
    pub fn from_text<T>(text: &str, tokenizer: &T, max_rank: usize) -> Self
    where
        T: Tokenizer + ?Sized,
    {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (i, q_gram) in Self::q_grams(&tokenizer.tokenize(text))
            .into_iter()
            .enumerate()
        {
            counts.entry(q_gram).or_insert((0, i)).0 += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_unstable_by_key(|&(_, (count, first))| (std::cmp::Reverse(count), first));
        Self::new(
            counts
                .into_iter()
                .take(max_rank)
                .map(|(q_gram, _)| q_gram)
                .collect(),
        )
    }

    /// Reads q-grams from a file, one per line, highest rank first.
    ///
    /// # Arguments
    ///
    /// * `path` - Input path.
    /// * `gamma` - Number of q-grams to read. `0` reads the whole file.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::MissingResource`] if the file does not exist, or an I/O error.
    pub fn from_file<P>(path: P, gamma: usize) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TextQualityError::MissingResource(path.to_path_buf()));
        }
        info!("Reading character q-grams from file {path:?}, with gamma={gamma}.");
        let rdr = BufReader::new(fs::File::open(path)?);
        let mut q_grams = vec![];
        for line in rdr.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            q_grams.push(line.to_string());
            if gamma != 0 && q_grams.len() >= gamma {
                info!("Stopping reading q-grams list, {} q-grams read.", q_grams.len());
                break;
            }
        }
        Ok(Self::new(q_grams))
    }

    /// Writes the q-grams to a file, one per line, highest rank first.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::ResourceExists`] if the file exists and `overwrite` is false.
    pub fn to_file<P>(&self, path: P, overwrite: bool) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(TextQualityError::ResourceExists(path.to_path_buf()));
        }
        info!("Writing {} q-grams to file {path:?}.", self.q_grams.len());
        let mut f = fs::File::create(path)?;
        f.write_all(self.q_grams.join("\n").as_bytes())?;
        Ok(())
    }

    /// Extracts lower-cased trigrams from the alphabetic runs of each token.
    pub fn q_grams(tokens: &[String]) -> Vec<String> {
        let mut result = vec![];
        for token in tokens {
            for split in token.split(|c: char| !c.is_alphabetic()) {
                let chars: Vec<char> = split.chars().collect();
                for window in chars.windows(Self::Q) {
                    result.push(window.iter().collect::<String>().to_lowercase());
                }
            }
        }
        result
    }

    /// Gets the rank of a q-gram, or `None` if it is not in the list.
    pub fn rank(&self, q_gram: &str) -> Option<usize> {
        self.ranks.get(q_gram).copied()
    }

    /// Gets the q-grams, highest rank first.
    pub fn as_slice(&self) -> &[String] {
        &self.q_grams
    }
}

impl Scorer for QGramScorer {
    fn score(&self, tokens: &[String]) -> f64 {
        let q_grams = Self::q_grams(tokens);
        if q_grams.is_empty() {
            return 0.0;
        }
        let n = self.q_grams.len() as f64;
        let total: f64 = q_grams
            .iter()
            .filter_map(|q_gram| self.rank(q_gram))
            .map(|rank| 1.0 - rank as f64 / n)
            .sum();
        total / q_grams.len() as f64
    }
}
