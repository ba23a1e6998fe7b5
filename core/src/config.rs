//! Building a search handle from a corpus path, plus the vectorizer flags shared by the binaries
//! (the latter behind the `cli` feature).

use crate::corpus::load_documents;
use crate::{SearchHandle, Vectorizer, VectorizerConfig};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Reads a stop-word file: one term per line, `#` starts a comment line.
pub fn load_stop_words<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading stop words from {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}

/// Loads the corpus at `input`, fits it and builds a search handle. Blocks until done.
pub fn fit_from_path<P: AsRef<Path>>(input: P, config: VectorizerConfig) -> Result<SearchHandle> {
    let documents = load_documents(input)?;
    let index = Vectorizer::new(config).fit(&documents)?;
    Ok(SearchHandle::build(index))
}

#[cfg(feature = "cli")]
pub use args::VectorizerArgs;

#[cfg(feature = "cli")]
mod args {
    use super::load_stop_words;
    use crate::tokenizer::english_stop_words;
    use crate::VectorizerConfig;
    use anyhow::Result;
    use clap::Args;

    #[derive(Args, Debug, Clone)]
    pub struct VectorizerArgs {
        /// Stop-word file, one term per line (`#` starts a comment). Defaults to the built-in English list
        #[arg(long)]
        pub stop_words: Option<String>,
        /// Minimum token length in characters
        #[arg(long, default_value_t = 2)]
        pub min_token_len: usize,
        /// Minimum number of documents a term must occur in
        #[arg(long, default_value_t = 1)]
        pub min_df: usize,
        /// Maximum fraction of documents a term may occur in
        #[arg(long, default_value_t = 1.0)]
        pub max_df: f64,
        /// Apply English stemming to tokens
        #[arg(long, default_value_t = false)]
        pub stem: bool,
        /// Use 1 + ln(tf) instead of raw term counts
        #[arg(long, default_value_t = false)]
        pub sublinear_tf: bool,
        /// Use idf = ln(N/df) + 1 instead of the smoothed ln((1+N)/(1+df)) + 1
        #[arg(long, default_value_t = false)]
        pub no_smooth_idf: bool,
    }

    impl Default for VectorizerArgs {
        fn default() -> Self {
            Self {
                stop_words: None,
                min_token_len: 2,
                min_df: 1,
                max_df: 1.0,
                stem: false,
                sublinear_tf: false,
                no_smooth_idf: false,
            }
        }
    }

    impl VectorizerArgs {
        pub fn to_config(&self) -> Result<VectorizerConfig> {
            let stop_words = match &self.stop_words {
                Some(path) => load_stop_words(path)?,
                None => english_stop_words(),
            };
            Ok(VectorizerConfig {
                stop_words,
                min_token_len: self.min_token_len,
                stem: self.stem,
                min_df: self.min_df,
                max_df: self.max_df,
                sublinear_tf: self.sublinear_tf,
                smooth_idf: !self.no_smooth_idf,
            })
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stop_word_file_skips_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "# custom list\nIn\n\n  the  \n").unwrap();
        let words = load_stop_words(&path).unwrap();
        assert_eq!(words, ["in", "the"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn fits_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.jsonl");
        fs::write(
            &path,
            "{\"title\":\"A\",\"text\":\"space adventure robots\"}\n{\"title\":\"B\",\"text\":\"robots in space\"}\n{\"title\":\"C\",\"text\":\"romantic drama in paris\"}\n",
        )
        .unwrap();
        let handle = fit_from_path(&path, VectorizerConfig::default()).unwrap();
        let recs = handle.recommend("a", 1).unwrap();
        assert_eq!(recs[0].identity, "B");
    }

    #[test]
    fn fit_errors_surface_through_anyhow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop.json");
        fs::write(&path, r#"[{"title":"A","text":"the and of"}]"#).unwrap();
        let err = fit_from_path(&path, VectorizerConfig::default()).unwrap_err();
        assert_eq!(err.downcast_ref::<crate::EngineError>(), Some(&crate::EngineError::EmptyVocabulary));
    }
}
