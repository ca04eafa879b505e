use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use hashbrown::HashSet;
use log::info;

use crate::errors::{Result, TextQualityError};
use crate::scorer::Scorer;
use crate::tokenizer::Tokenizer;

/// Dictionary coverage scorer.
///
/// The score is the ratio of characters in tokens found in the dictionary to all characters.
pub enum DictionaryScorer {
    Token(TokenDictionary),
    Hunspell(HunspellDictionary),
}

impl DictionaryScorer {
    fn lookup(&self, token: &str) -> bool {
        match self {
            Self::Token(dict) => dict.contains(token),
            Self::Hunspell(dict) => dict.lookup(token),
        }
    }
}

impl Scorer for DictionaryScorer {
    fn score(&self, tokens: &[String]) -> f64 {
        let mut matched_count = 0;
        let mut total_count = 0;
        for token in tokens {
            let len = token.chars().count();
            total_count += len;
            if len != 0 && self.lookup(token) {
                matched_count += len;
            }
        }
        if total_count == 0 {
            return 0.0;
        }
        matched_count as f64 / total_count as f64
    }
}

impl From<TokenDictionary> for DictionaryScorer {
    fn from(dict: TokenDictionary) -> Self {
        Self::Token(dict)
    }
}

impl From<HunspellDictionary> for DictionaryScorer {
    fn from(dict: HunspellDictionary) -> Self {
        Self::Hunspell(dict)
    }
}

/// Closed vocabulary with exact, case-sensitive lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenDictionary {
    tokens: HashSet<String>,
}

impl TokenDictionary {
    /// Creates a dictionary from tokens. Duplicates are merged.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a dictionary from all tokens in a text.
    pub fn from_text<T>(text: &str, tokenizer: &T) -> Self
    where
        T: Tokenizer + ?Sized,
    {
        Self::from_tokens(
            tokenizer
                .tokenize(text)
                .into_iter()
                .filter(|token| !token.is_empty()),
        )
    }

    /// Reads a dictionary file.
    ///
    /// The file contains one token per line. Lines starting with `#` are comments.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::MissingResource`] if the file does not exist, or an I/O error.
    pub fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TextQualityError::MissingResource(path.to_path_buf()));
        }
        info!("Reading token dictionary from file {path:?}.");
        let rdr = BufReader::new(fs::File::open(path)?);
        let mut tokens = HashSet::new();
        for line in rdr.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            tokens.insert(line.to_string());
        }
        Ok(Self { tokens })
    }

    /// Writes the dictionary to a file, one token per line.
    ///
    /// # Arguments
    ///
    /// * `path` - Output path.
    /// * `sort` - Writes tokens in lexicographic order.
    /// * `overwrite` - Replaces an existing file.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::ResourceExists`] if the file exists and `overwrite` is false.
    pub fn to_file<P>(&self, path: P, sort: bool, overwrite: bool) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(TextQualityError::ResourceExists(path.to_path_buf()));
        }
        let mut tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        if sort {
            tokens.sort_unstable();
        }
        info!("Writing {} tokens to file {path:?}.", tokens.len());
        let mut f = fs::File::create(path)?;
        f.write_all(tokens.join("\n").as_bytes())?;
        Ok(())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Affix-aware Hunspell dictionary.
pub struct HunspellDictionary {
    dict: spellbook::Dictionary,
}

impl HunspellDictionary {
    /// Reads `<language>.aff` and `<language>.dic` in a directory.
    ///
    /// # Errors
    ///
    /// [`TextQualityError::MissingResource`] if a file is missing,
    /// [`TextQualityError::InvalidResource`] if the files cannot be parsed.
    pub fn from_path<P>(dir: P, language: &str) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        info!("Reading Hunspell dictionary '{language}' in directory {dir:?}.");
        let aff_path = dir.join(format!("{language}.aff"));
        let dic_path = dir.join(format!("{language}.dic"));
        for path in [&aff_path, &dic_path] {
            if !path.is_file() {
                return Err(TextQualityError::MissingResource(path.clone()));
            }
        }
        let aff = fs::read_to_string(&aff_path)?;
        let dic = fs::read_to_string(&dic_path)?;
        Self::from_strs(&aff, &dic)
    }

    /// Creates a dictionary from the contents of an affix file and a dictionary file.
    pub fn from_strs(aff: &str, dic: &str) -> Result<Self> {
        let dict = spellbook::Dictionary::new(aff, dic)
            .map_err(|e| TextQualityError::invalid_resource(format!("hunspell: {e}")))?;
        Ok(Self { dict })
    }

    /// Blank tokens never match.
    pub fn lookup(&self, token: &str) -> bool {
        !token.trim().is_empty() && self.dict.check(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tokenizer::OcrTokenizer;

    fn token_scorer() -> DictionaryScorer {
        TokenDictionary::from_tokens(["token"]).into()
    }

    fn tokens(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_lookup() {
        let dict = TokenDictionary::from_tokens(["token"]);
        assert!(dict.contains("token"));
        assert!(!dict.contains("test"));
        assert!(!dict.contains(""));
        assert!(!dict.contains("Token"));
    }

    #[test]
    fn test_score_empty() {
        assert_eq!(0.0, token_scorer().score(&[]));
        assert_eq!(0.0, token_scorer().score(&tokens(&["", ""])));
    }

    #[test]
    fn test_score() {
        let scorer = token_scorer();
        assert_eq!(1.0, scorer.score(&tokens(&["token"])));
        assert_eq!(0.0, scorer.score(&tokens(&["Token"])));
        let score = scorer.score(&tokens(&["token", "token2"]));
        assert!((score - 5.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_counts_characters() {
        let scorer: DictionaryScorer = TokenDictionary::from_tokens(["één"]).into();
        let score = scorer.score(&tokens(&["één", "a"]));
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.txt");
        fs::write(&path, "# comment\ntoken1\n token2 \n\n").unwrap();
        let dict = TokenDictionary::from_file(&path).unwrap();
        assert_eq!(TokenDictionary::from_tokens(["token1", "token2"]), dict);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = TokenDictionary::from_file(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(TextQualityError::MissingResource(_))));
    }

    #[test]
    fn test_to_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary");
        let dict = TokenDictionary::from_tokens(["zeta", "alpha", "token"]);
        dict.to_file(&path, true, false).unwrap();
        assert_eq!("alpha\ntoken\nzeta", fs::read_to_string(&path).unwrap());
        assert_eq!(dict, TokenDictionary::from_file(&path).unwrap());
    }

    #[test]
    fn test_to_file_unsorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary");
        let dict = TokenDictionary::from_tokens(["b", "a", "c"]);
        dict.to_file(&path, false, false).unwrap();
        assert_eq!(dict, TokenDictionary::from_file(&path).unwrap());
    }

    #[test]
    fn test_to_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary");
        fs::write(&path, "old").unwrap();
        let dict = TokenDictionary::from_tokens(["token"]);

        let result = dict.to_file(&path, true, false);
        assert!(matches!(result, Err(TextQualityError::ResourceExists(_))));
        assert_eq!("old", fs::read_to_string(&path).unwrap());

        dict.to_file(&path, true, true).unwrap();
        assert_eq!("token", fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_from_text() {
        let dict = TokenDictionary::from_text("een test, een tekst. 1", &OcrTokenizer);
        assert_eq!(TokenDictionary::from_tokens(["een", "test", "tekst"]), dict);
    }

    #[test]
    fn test_hunspell_lookup() {
        let dict = HunspellDictionary::from_strs("SET UTF-8\n", "2\ntest\ntoken\n").unwrap();
        assert!(dict.lookup("test"));
        assert!(!dict.lookup("tset"));
        assert!(!dict.lookup(" "));
        assert!(!dict.lookup(""));

        let scorer = DictionaryScorer::from(dict);
        assert_eq!(1.0, scorer.score(&tokens(&["test", "token"])));
    }

    #[test]
    fn test_hunspell_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = HunspellDictionary::from_path(dir.path(), "nl");
        assert!(matches!(result, Err(TextQualityError::MissingResource(_))));
    }

    #[test]
    fn test_hunspell_from_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nl.aff"), "SET UTF-8\n").unwrap();
        fs::write(dir.path().join("nl.dic"), "1\neen\n").unwrap();
        let dict = HunspellDictionary::from_path(dir.path(), "nl").unwrap();
        assert!(dict.lookup("een"));
    }
}
