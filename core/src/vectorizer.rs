use crate::error::{EngineError, Result};
use crate::index::{CorpusIndex, Document, DocumentVector, TermId, Vocabulary};
use crate::tokenizer::{english_stop_words, Tokenizer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct VectorizerConfig {
    pub stop_words: HashSet<String>,
    /// Minimum token length in characters.
    pub min_token_len: usize,
    pub stem: bool,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum share of documents a term may appear in, in (0, 1].
    pub max_df: f64,
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
    /// `ln((1 + N) / (1 + df)) + 1` when set, `ln(N / df) + 1` otherwise.
    pub smooth_idf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            stop_words: english_stop_words(),
            min_token_len: 2,
            stem: false,
            min_df: 1,
            max_df: 1.0,
            sublinear_tf: false,
            smooth_idf: true,
        }
    }
}

impl VectorizerConfig {
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(EngineError::InvalidConfig("min_df must be at least 1".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(EngineError::InvalidConfig(format!("max_df must be in (0, 1], got {}", self.max_df)));
        }
        Ok(())
    }
}

/// Fits TF-IDF vectors over a whole corpus in one blocking pass.
#[derive(Debug, Clone, Default)]
pub struct Vectorizer {
    config: VectorizerConfig,
}

impl Vectorizer {
    pub fn new(config: VectorizerConfig) -> Self { Self { config } }

    pub fn fit(&self, documents: &[Document]) -> Result<CorpusIndex> {
        self.config.validate()?;
        if documents.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        let start = std::time::Instant::now();
        let tokenizer = Tokenizer::new(self.config.stop_words.clone(), self.config.min_token_len, self.config.stem);
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenizer.tokenize(&d.text)).collect();

        // Ordered map gives the lexicographic vocabulary layout.
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len();
        let max_count = self.config.max_df * n as f64;
        let kept: Vec<(&str, u32)> = df
            .into_iter()
            .filter(|(_, d)| *d as usize >= self.config.min_df && *d as f64 <= max_count)
            .collect();
        if kept.is_empty() {
            return Err(EngineError::EmptyVocabulary);
        }

        let idf: Vec<f32> = kept.iter().map(|(_, d)| self.idf(n, *d)).collect();
        let vocabulary = Vocabulary::from_ordered(kept.iter().map(|(t, _)| t.to_string()).collect());

        let vectors: Vec<DocumentVector> = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: HashMap<TermId, u32> = HashMap::new();
                for term in tokens {
                    if let Some(tid) = vocabulary.get(term) {
                        *counts.entry(tid).or_insert(0) += 1;
                    }
                }
                DocumentVector::from_counts(vocabulary.len(), counts, &idf, self.config.sublinear_tf)
            })
            .collect();

        let empty_rows = vectors.iter().filter(|v| v.is_zero()).count();
        tracing::info!(
            num_docs = n,
            num_terms = vocabulary.len(),
            empty_rows,
            took_s = start.elapsed().as_secs_f64(),
            "fitted corpus"
        );

        let identities = documents.iter().map(|d| d.identity.clone()).collect();
        Ok(CorpusIndex::new(tokenizer, self.config.sublinear_tf, vocabulary, idf, identities, vectors))
    }

    fn idf(&self, n: usize, df: u32) -> f32 {
        let (n, df) = (n as f64, df as f64);
        let idf = if self.config.smooth_idf { ((1.0 + n) / (1.0 + df)).ln() } else { (n / df).ln() };
        (idf + 1.0) as f32
    }
}
