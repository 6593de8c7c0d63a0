pub mod error;
pub mod index;
pub mod ingest;
pub mod persist;
pub mod scorer;
pub mod shared;
pub mod tokenizer;

pub use error::{IndexError, Result};
pub use index::{InvertedIndex, Posting};
pub use ingest::{IngestReport, DOCUMENT_SUFFIX};
pub use scorer::{Bm25Params, ScoredDoc};
pub use shared::SharedIndex;

/// Document identifier: the file name with its extension stripped.
pub type DocId = String;
