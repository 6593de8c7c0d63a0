use crate::error::Result;
use crate::index::InvertedIndex;
use crate::ingest::IngestReport;
use crate::scorer::{Bm25Params, ScoredDoc};
use crate::DocId;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::Path;
use std::sync::Arc;

/// Cloneable handle for using one index from several threads.
///
/// Ingestion, `load` and `clear` hold the write lock for the whole operation;
/// queries, `save` and `display` share the read lock.
#[derive(Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<InvertedIndex>>,
}

impl SharedIndex {
    pub fn new(index: InvertedIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(index)) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, InvertedIndex> { self.inner.read() }

    pub fn write(&self) -> RwLockWriteGuard<'_, InvertedIndex> { self.inner.write() }

    pub fn index_document(&self, path: impl AsRef<Path>) -> Result<DocId> {
        self.inner.write().index_document(path)
    }

    pub fn index_directory(&self, dir: impl AsRef<Path>) -> Result<IngestReport> {
        self.inner.write().index_directory(dir)
    }

    pub fn index_text(&self, doc_id: impl Into<DocId>, text: &str) -> Result<()> {
        self.inner.write().index_text(doc_id, text)
    }

    /// Decodes outside the lock, then swaps the tables in.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let fresh = InvertedIndex::from_file(path)?;
        *self.inner.write() = fresh;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> { self.inner.read().save(path) }

    pub fn clear(&self) { self.inner.write().clear(); }

    pub fn query_tfidf(&self, query: &str) -> Vec<ScoredDoc> { self.inner.read().query_tfidf(query) }

    pub fn query_bm25(&self, query: &str, params: Bm25Params) -> Result<Vec<ScoredDoc>> {
        self.inner.read().query_bm25(query, params)
    }

    pub fn num_docs(&self) -> usize { self.inner.read().num_docs() }

    pub fn display(&self) -> String { self.inner.read().display() }

    /// Consume the handle, returning the index if no other clone is alive.
    pub fn into_inner(self) -> std::result::Result<InvertedIndex, Self> {
        Arc::try_unwrap(self.inner).map(RwLock::into_inner).map_err(|inner| Self { inner })
    }
}

impl From<InvertedIndex> for SharedIndex {
    fn from(index: InvertedIndex) -> Self { Self::new(index) }
}
