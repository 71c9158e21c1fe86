use crate::error::IndexFormatError;
use crate::InvertedIndex;
use anyhow::{Context, Result};
use bincode;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_stems: u32,
    pub num_words: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_index(index: &InvertedIndex, created_at: String) -> Self {
        Self {
            num_docs: index.num_docs() as u32,
            num_stems: index.stems.len() as u32,
            num_words: index.words.len() as u32,
            created_at,
            version: FORMAT_VERSION,
        }
    }
}

/// Framed, checksummed form of a serialized index.
#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: u32,
    payload: Vec<u8>,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Serialize the whole index into a versioned, checksummed byte buffer.
pub fn encode(index: &InvertedIndex) -> Result<Vec<u8>> {
    let payload = bincode::serialize(index)?;
    let envelope = Envelope { version: FORMAT_VERSION, checksum: crc32fast::hash(&payload), payload };
    Ok(bincode::serialize(&envelope)?)
}

/// Inverse of [`encode`]. Rejects unknown versions and corrupted payloads.
pub fn decode(bytes: &[u8]) -> Result<InvertedIndex> {
    let envelope: Envelope = bincode::deserialize(bytes).context("reading index envelope")?;
    if envelope.version != FORMAT_VERSION {
        return Err(IndexFormatError::Version { found: envelope.version, expected: FORMAT_VERSION }.into());
    }
    let computed = crc32fast::hash(&envelope.payload);
    if computed != envelope.checksum {
        return Err(IndexFormatError::Checksum { stored: envelope.checksum, computed }.into());
    }
    let index = bincode::deserialize(&envelope.payload).context("reading index payload")?;
    Ok(index)
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let bytes = encode(index)?;
    let mut f = File::create(paths.index())?;
    f.write_all(&bytes)?;
    tracing::info!(path = %paths.index().display(), bytes = bytes.len(), "saved index");
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let path = paths.index();
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = decode(&buf).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(path = %path.display(), num_docs = index.num_docs(), "loaded index");
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}
