use sift_core::{IndexError, InvertedIndex};
use std::fs;
use tempfile::tempdir;

#[test]
fn directory_ingestion_filters_by_suffix() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha beta").unwrap();
    fs::write(dir.path().join("b.txt"), "beta gamma gamma").unwrap();
    fs::write(dir.path().join("readme.md"), "not indexed").unwrap();

    let mut idx = InvertedIndex::new();
    let report = idx.index_directory(dir.path()).unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(idx.num_docs(), 2);
    assert!(idx.postings("not").is_empty());
    assert_eq!(idx.doc_len("b"), Some(3));
}

#[test]
fn directory_entries_are_visited_in_name_order() {
    let dir = tempdir().unwrap();
    for name in ["c.txt", "a.txt", "b.txt"] {
        fs::write(dir.path().join(name), "shared").unwrap();
    }
    let mut idx = InvertedIndex::new();
    idx.index_directory(dir.path()).unwrap();
    let order: Vec<&str> = idx.postings("shared").iter().map(|p| p.doc_id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn subdirectories_are_skipped() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested.txt")).unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    let mut idx = InvertedIndex::new();
    let report = idx.index_directory(dir.path()).unwrap();
    assert_eq!((report.indexed, report.skipped), (1, 1));
}

#[test]
fn single_document_uses_file_stem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "one two\nthree\n").unwrap();
    let mut idx = InvertedIndex::new();
    let doc_id = idx.index_document(&path).unwrap();
    assert_eq!(doc_id, "notes");
    assert_eq!(idx.doc_len("notes"), Some(3));
}

#[test]
fn missing_paths_are_not_found() {
    let dir = tempdir().unwrap();
    let mut idx = InvertedIndex::new();
    assert!(matches!(idx.index_document(dir.path().join("gone.txt")), Err(IndexError::NotFound { .. })));
    assert!(matches!(idx.index_directory(dir.path().join("gone")), Err(IndexError::NotFound { .. })));
    assert!(idx.is_empty());
}

#[test]
fn file_is_not_a_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "x").unwrap();
    let mut idx = InvertedIndex::new();
    assert!(matches!(idx.index_directory(&path), Err(IndexError::NotADirectory { .. })));
}

#[test]
fn unreadable_document_aborts_the_walk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "fine").unwrap();
    fs::write(dir.path().join("b.txt"), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(dir.path().join("c.txt"), "never reached").unwrap();

    let mut idx = InvertedIndex::new();
    let err = idx.index_directory(dir.path()).unwrap_err();
    assert!(matches!(err, IndexError::Io { .. }));
    assert!(idx.contains_doc("a"));
    assert!(!idx.contains_doc("b"));
    assert!(!idx.contains_doc("c"));
}

#[test]
fn same_stem_in_directory_is_a_duplicate() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    let mut idx = InvertedIndex::new();
    idx.index_document(dir.path().join("a.txt")).unwrap();
    let err = idx.index_directory(dir.path()).unwrap_err();
    assert!(matches!(err, IndexError::DuplicateDocument { .. }));
    assert_eq!(idx.postings("x").len(), 1);
}
