pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod search;
pub mod tokenizer;
pub mod vectorizer;

pub use error::{EngineError, Result};
pub use index::{CorpusIndex, DocId, Document, DocumentVector, TermId, Vocabulary};
pub use search::{cosine_distance, Neighbor, Recommendation, SearchHandle};
pub use vectorizer::{Vectorizer, VectorizerConfig};
