use crate::error::{IndexError, Result};
use crate::index::InvertedIndex;
use crate::tokenizer::tokenize;
use crate::DocId;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Suffix a directory entry must carry to be indexed.
pub const DOCUMENT_SUFFIX: &str = ".txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// Per-document term counts in first-occurrence order.
#[derive(Debug, Default)]
struct TermCounts {
    order: Vec<String>,
    counts: HashMap<String, u32>,
    total: u32,
}

impl TermCounts {
    fn add_line(&mut self, line: &str) {
        for term in tokenize(line) {
            match self.counts.get_mut(term) {
                Some(c) => *c += 1,
                None => {
                    self.order.push(term.to_string());
                    self.counts.insert(term.to_string(), 1);
                }
            }
            self.total += 1;
        }
    }

    fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut counts = Self::default();
        for line in reader.lines() {
            counts.add_line(&line?);
        }
        Ok(counts)
    }
}

/// Document id for a path: its file name without the extension.
pub fn document_id(path: &Path) -> Option<DocId> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

impl InvertedIndex {
    /// Index the document at `path` under its file stem.
    ///
    /// The file is read completely before the index is touched, so a read
    /// failure leaves the index unchanged.
    pub fn index_document(&mut self, path: impl AsRef<Path>) -> Result<DocId> {
        let path = path.as_ref();
        let doc_id = document_id(path).ok_or_else(|| IndexError::UnsupportedInput {
            path: path.to_path_buf(),
            reason: "path has no file name".into(),
        })?;
        self.ensure_new(&doc_id)?;
        info!(doc_id = %doc_id, path = %path.display(), "indexing document");
        let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
        let counts = TermCounts::read(BufReader::new(file)).map_err(|e| IndexError::io(path, e))?;
        self.fold(&doc_id, counts);
        Ok(doc_id)
    }

    /// Index a document read from an arbitrary buffered reader.
    pub fn index_reader<R: BufRead>(&mut self, doc_id: impl Into<DocId>, reader: R) -> Result<()> {
        let doc_id = doc_id.into();
        self.ensure_new(&doc_id)?;
        let counts = TermCounts::read(reader).map_err(|e| IndexError::io(Path::new(&doc_id), e))?;
        self.fold(&doc_id, counts);
        Ok(())
    }

    pub fn index_text(&mut self, doc_id: impl Into<DocId>, text: &str) -> Result<()> {
        self.index_reader(doc_id, text.as_bytes())
    }

    /// Index every `.txt` file directly inside `dir`. See [`Self::index_directory_with_suffix`].
    pub fn index_directory(&mut self, dir: impl AsRef<Path>) -> Result<IngestReport> {
        self.index_directory_with_suffix(dir, DOCUMENT_SUFFIX)
    }

    /// Index every file directly inside `dir` whose name ends with `suffix`.
    ///
    /// Entries are visited in file-name order. Anything else, including
    /// sub-directories, is counted as skipped. The first failing document
    /// aborts the walk; documents indexed before it stay indexed.
    pub fn index_directory_with_suffix(&mut self, dir: impl AsRef<Path>, suffix: &str) -> Result<IngestReport> {
        let dir = dir.as_ref();
        let meta = fs::metadata(dir).map_err(|e| IndexError::io(dir, e))?;
        if !meta.is_dir() {
            return Err(IndexError::NotADirectory { path: dir.to_path_buf() });
        }

        let mut report = IngestReport::default();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| IndexError::io(dir, io::Error::from(e)))?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() || !name.ends_with(suffix) {
                debug!(entry = %name, "skipping");
                report.skipped += 1;
                continue;
            }
            self.index_document(entry.path())?;
            report.indexed += 1;
        }
        info!(indexed = report.indexed, skipped = report.skipped, "indexed documents");
        Ok(report)
    }

    fn ensure_new(&self, doc_id: &str) -> Result<()> {
        if self.contains_doc(doc_id) {
            return Err(IndexError::DuplicateDocument { doc_id: doc_id.to_string() });
        }
        Ok(())
    }

    fn fold(&mut self, doc_id: &str, counts: TermCounts) {
        for term in &counts.order {
            self.append_posting(term, doc_id, counts.counts[term]);
        }
        self.set_length(doc_id, counts.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_terms_across_lines() {
        let mut idx = InvertedIndex::new();
        idx.index_text("d", "a b a\n\n  b a c \n").unwrap();
        assert_eq!(idx.postings("a")[0].tf, 3);
        assert_eq!(idx.postings("b")[0].tf, 2);
        assert_eq!(idx.postings("c")[0].tf, 1);
        assert_eq!(idx.doc_len("d"), Some(6));
    }

    #[test]
    fn empty_document_is_recorded_with_zero_length() {
        let mut idx = InvertedIndex::new();
        idx.index_text("empty", "").unwrap();
        assert_eq!(idx.num_docs(), 1);
        assert_eq!(idx.doc_len("empty"), Some(0));
        assert_eq!(idx.num_terms(), 0);
    }

    #[test]
    fn reindexing_is_rejected_without_side_effects() {
        let mut idx = InvertedIndex::new();
        idx.index_text("d", "x y").unwrap();
        let before = idx.clone();
        let err = idx.index_text("d", "x y z").unwrap_err();
        assert!(matches!(err, IndexError::DuplicateDocument { ref doc_id } if doc_id == "d"));
        assert_eq!(idx, before);
    }

    #[test]
    fn document_id_strips_only_last_extension() {
        assert_eq!(document_id(Path::new("dir/a.b.txt")).as_deref(), Some("a.b"));
        assert_eq!(document_id(Path::new("notes")).as_deref(), Some("notes"));
    }
}
