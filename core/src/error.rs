use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Input path (document, directory or saved index) does not exist.
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// Input is neither a document, a directory nor a loadable index.
    #[error("could not create index from {}: {reason}", path.display())]
    UnsupportedInput { path: PathBuf, reason: String },

    /// Operation needs `num_docs` or `avg_doc_len` but nothing is indexed.
    #[error("index contains no documents")]
    EmptyIndex,

    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    #[error("document already indexed: {doc_id}")]
    DuplicateDocument { doc_id: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IndexError {
    /// Tag an I/O error with the path it happened on. Missing paths become `NotFound`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            IndexError::NotFound { path: path.to_path_buf() }
        } else {
            IndexError::Io { path: path.to_path_buf(), source }
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        IndexError::CorruptIndex { reason: reason.into() }
    }
}
