//! On-disk index format.
//!
//! ```text
//! doc_count: u32
//! doc_entries[doc_count]:   { doc_id: str, length: u32 }
//! term_count: u32
//! term_entries[term_count]: { term: str, posting_count: u32,
//!                             postings[posting_count]: { doc_id: str, tf: u32 } }
//! ```
//!
//! Integers are little-endian; `str` is a u32 byte length followed by UTF-8.
//! Documents and postings are written in insertion order and terms in
//! lexicographic order, so equal indexes encode to equal bytes.

use crate::error::{IndexError, Result};
use crate::index::{InvertedIndex, Posting};
use crate::DocId;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use tracing::info;

// Upper bound on speculative preallocation from untrusted counts.
const MAX_PREALLOC: usize = 4096;

pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    info!(path = %path.display(), "writing index");
    let bytes = encode_index(index).map_err(|e| IndexError::io(path, e))?;
    let mut f = File::create(path).map_err(|e| IndexError::io(path, e))?;
    f.write_all(&bytes).map_err(|e| IndexError::io(path, e))?;
    f.sync_all().map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    info!(path = %path.display(), "loading index");
    let mut f = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| IndexError::io(path, e))?;
    decode_index(&buf)
}

pub fn encode_index(index: &InvertedIndex) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_count(&mut buf, index.num_docs())?;
    for (doc_id, len) in index.doc_lengths() {
        write_str(&mut buf, doc_id)?;
        buf.write_u32::<LittleEndian>(len)?;
    }
    write_count(&mut buf, index.num_terms())?;
    for (term, postings) in index.terms() {
        write_str(&mut buf, term)?;
        write_count(&mut buf, postings.len())?;
        for p in postings {
            write_str(&mut buf, &p.doc_id)?;
            buf.write_u32::<LittleEndian>(p.tf)?;
        }
    }
    Ok(buf)
}

/// Decode and validate a serialized index.
pub fn decode_index(bytes: &[u8]) -> Result<InvertedIndex> {
    let mut r = Cursor::new(bytes);

    let doc_count = read_u32(&mut r, "doc_count")? as usize;
    let mut doc_lengths: Vec<(DocId, u32)> = Vec::with_capacity(doc_count.min(MAX_PREALLOC));
    let mut lengths: HashMap<DocId, u32> = HashMap::with_capacity(doc_count.min(MAX_PREALLOC));
    for _ in 0..doc_count {
        let doc_id = read_str(&mut r, "doc_id")?;
        let len = read_u32(&mut r, "doc length")?;
        if lengths.insert(doc_id.clone(), len).is_some() {
            return Err(IndexError::corrupt(format!("duplicate doc_id {doc_id:?}")));
        }
        doc_lengths.push((doc_id, len));
    }

    let term_count = read_u32(&mut r, "term_count")? as usize;
    let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    let mut tf_sums: HashMap<DocId, u64> = HashMap::new();
    for _ in 0..term_count {
        let term = read_str(&mut r, "term")?;
        let posting_count = read_u32(&mut r, "posting_count")? as usize;
        let mut list = Vec::with_capacity(posting_count.min(MAX_PREALLOC));
        let mut seen: HashSet<DocId> = HashSet::new();
        for _ in 0..posting_count {
            let doc_id = read_str(&mut r, "posting doc_id")?;
            let tf = read_u32(&mut r, "tf")?;
            if tf == 0 {
                return Err(IndexError::corrupt(format!("zero tf for {term:?} in {doc_id:?}")));
            }
            if !lengths.contains_key(&doc_id) {
                return Err(IndexError::corrupt(format!("posting for {term:?} references unknown doc {doc_id:?}")));
            }
            if !seen.insert(doc_id.clone()) {
                return Err(IndexError::corrupt(format!("doc {doc_id:?} listed twice for {term:?}")));
            }
            *tf_sums.entry(doc_id.clone()).or_default() += u64::from(tf);
            list.push(Posting { doc_id, tf });
        }
        if postings.insert(term.clone(), list).is_some() {
            return Err(IndexError::corrupt(format!("duplicate term {term:?}")));
        }
    }

    if (r.position() as usize) != bytes.len() {
        return Err(IndexError::corrupt(format!(
            "{} trailing bytes after index",
            bytes.len() - r.position() as usize
        )));
    }
    for (doc_id, len) in &doc_lengths {
        let sum = tf_sums.get(doc_id).copied().unwrap_or(0);
        if sum != u64::from(*len) {
            return Err(IndexError::corrupt(format!(
                "length of {doc_id:?} is {len} but its term frequencies sum to {sum}"
            )));
        }
    }

    Ok(InvertedIndex::from_parts(postings, doc_lengths))
}

impl InvertedIndex {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> { save_index(path.as_ref(), self) }

    /// Replace both tables with the index stored at `path`. On failure `self` is untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = load_index(path.as_ref())?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> { load_index(path.as_ref()) }
}

fn write_count<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    let n = u32::try_from(n).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "count exceeds u32"))?;
    w.write_u32::<LittleEndian>(n)
}

fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_count(w, s.len())?;
    w.write_all(s.as_bytes())
}

fn read_u32(r: &mut Cursor<&[u8]>, field: &str) -> Result<u32> {
    r.read_u32::<LittleEndian>()
        .map_err(|_| IndexError::corrupt(format!("truncated stream reading {field}")))
}

fn read_str(r: &mut Cursor<&[u8]>, field: &str) -> Result<String> {
    let len = read_u32(r, field)? as usize;
    let remaining = r.get_ref().len() - r.position() as usize;
    if len > remaining {
        return Err(IndexError::corrupt(format!("truncated stream reading {field}")));
    }
    let mut raw = vec![0u8; len];
    r.read_exact(&mut raw)
        .map_err(|_| IndexError::corrupt(format!("truncated stream reading {field}")))?;
    String::from_utf8(raw).map_err(|_| IndexError::corrupt(format!("{field} is not valid UTF-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        idx.index_text("b", "y x y").unwrap();
        idx.index_text("a", "x z").unwrap();
        idx
    }

    #[test]
    fn layout_starts_with_doc_table() {
        let bytes = encode_index(&sample()).unwrap();
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..9], b"b");
        assert_eq!(&bytes[9..13], &3u32.to_le_bytes());
    }

    #[test]
    fn decode_restores_orders() {
        let idx = sample();
        let back = decode_index(&encode_index(&idx).unwrap()).unwrap();
        assert_eq!(back, idx);
        let docs: Vec<&str> = back.doc_lengths().map(|(d, _)| d).collect();
        assert_eq!(docs, vec!["b", "a"]);
    }

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(decode_index(&[]), Err(IndexError::CorruptIndex { .. })));
    }

    #[test]
    fn every_truncation_is_rejected() {
        let bytes = encode_index(&sample()).unwrap();
        for cut in 0..bytes.len() {
            assert!(
                matches!(decode_index(&bytes[..cut]), Err(IndexError::CorruptIndex { .. })),
                "prefix of {cut} bytes decoded"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_index(&sample()).unwrap();
        bytes.push(0);
        assert!(matches!(decode_index(&bytes), Err(IndexError::CorruptIndex { .. })));
    }

    #[test]
    fn duplicate_doc_id_is_rejected() {
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        for _ in 0..2 {
            write_str(&mut bytes, "d").unwrap();
            bytes.write_u32::<LittleEndian>(0).unwrap();
        }
        bytes.write_u32::<LittleEndian>(0).unwrap();
        let err = decode_index(&bytes).unwrap_err();
        assert!(err.to_string().contains("duplicate doc_id"));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(1).unwrap();
        write_str(&mut bytes, "d").unwrap();
        bytes.write_u32::<LittleEndian>(5).unwrap();
        bytes.write_u32::<LittleEndian>(1).unwrap();
        write_str(&mut bytes, "t").unwrap();
        bytes.write_u32::<LittleEndian>(1).unwrap();
        write_str(&mut bytes, "d").unwrap();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        let err = decode_index(&bytes).unwrap_err();
        assert!(matches!(err, IndexError::CorruptIndex { .. }));
    }
}
