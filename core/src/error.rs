use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("corpus is empty")]
    EmptyCorpus,
    #[error("vocabulary is empty: every token was filtered out")]
    EmptyVocabulary,
    #[error("unknown document row {row} (corpus has {len} documents)")]
    UnknownDocument { row: usize, len: usize },
    #[error("document not found: {0}")]
    DocumentNotFound(String),
    #[error("identity {0:?} matches more than one document")]
    AmbiguousIdentity(String),
    #[error("requested {requested} neighbors but only {available} are available")]
    InsufficientNeighbors { requested: usize, available: usize },
    #[error("neighbor count must be at least 1")]
    InvalidNeighborCount,
    #[error("invalid vectorizer config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
