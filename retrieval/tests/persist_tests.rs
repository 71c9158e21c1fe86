use retrieval::persist::{decode, encode, load_index, load_meta, save_index, save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use retrieval::{build_index, IndexFormatError, PorterNormalizer};
use std::collections::HashSet;
use tempfile::tempdir;

fn sample() -> retrieval::InvertedIndex {
    let docs = vec![
        ("a.txt".to_string(), "The cat sat on the mat.".to_string()),
        ("b.txt".to_string(), "Dogs chase cats; the dog's bark is well-known.".to_string()),
    ];
    let stopwords: HashSet<String> = ["the", "on", "is"].iter().map(|s| s.to_string()).collect();
    build_index(docs, &PorterNormalizer::new(), &stopwords)
}

#[test]
fn bytes_round_trip() {
    let index = sample();
    let restored = decode(&encode(&index).unwrap()).unwrap();
    assert_eq!(restored.id_to_file, index.id_to_file);
    assert_eq!(restored.stems, index.stems);
    assert_eq!(restored.words, index.words);
    assert_eq!(restored.bigrams, index.bigrams);
}

#[test]
fn files_round_trip() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = sample();
    save_index(&paths, &index).unwrap();
    let meta = MetaFile::for_index(&index, "2024-01-01T00:00:00Z".into());
    save_meta(&paths, &meta).unwrap();

    assert_eq!(load_index(&paths).unwrap(), index);
    let loaded = load_meta(&paths).unwrap();
    assert_eq!(loaded, meta);
    assert_eq!(loaded.num_docs, 2);
    assert_eq!(loaded.version, FORMAT_VERSION);
}

#[test]
fn corrupted_payload_is_rejected() {
    let mut bytes = encode(&sample()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err.downcast_ref::<IndexFormatError>(), Some(IndexFormatError::Checksum { .. })));
}

#[test]
fn unknown_version_is_rejected() {
    let mut bytes = encode(&sample()).unwrap();
    // bincode writes the leading u32 version little-endian.
    bytes[0] = bytes[0].wrapping_add(1);
    let err = decode(&bytes).unwrap_err();
    assert!(matches!(err.downcast_ref::<IndexFormatError>(), Some(IndexFormatError::Version { .. })));
}

#[test]
fn missing_index_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_index(&IndexPaths::new(dir.path().join("absent"))).is_err());
}
