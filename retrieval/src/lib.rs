pub mod error;
pub mod fuzzy;
pub mod index;
pub mod persist;
pub mod postings;
pub mod query;
pub mod rotation;
pub mod tokenizer;

pub use error::{IndexFormatError, QueryError};
pub use index::{build_index, DocId, InvertedIndex, StemEntry, WordEntry};
pub use postings::PostingList;
pub use query::QueryEngine;
pub use tokenizer::{EnglishStopwords, Normalizer, PorterNormalizer, StopwordFilter};
