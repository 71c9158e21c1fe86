use crate::postings::PostingList;
use crate::rotation::rotations;
use crate::tokenizer::{tokenize, Normalizer, StopwordFilter};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type DocId = u32;

/// Everything known about one stem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemEntry {
    /// Number of distinct documents containing any of `words`.
    pub count: u32,
    /// Surface words that normalize to this stem.
    pub words: BTreeSet<String>,
}

/// Everything known about one lower-cased surface word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub count: u32,
    pub postings: BTreeSet<DocId>,
    /// Permuterm rotations of `$word`.
    pub rotations: BTreeSet<String>,
}

/// Immutable index over a static corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub id_to_file: BTreeMap<DocId, String>,
    pub stems: BTreeMap<String, StemEntry>,
    pub words: HashMap<String, WordEntry>,
    /// Two-character substring -> stems having a word that contains it.
    pub bigrams: HashMap<String, BTreeSet<String>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.id_to_file.len() }

    pub fn lookup_filename(&self, doc_id: DocId) -> Option<&str> {
        self.id_to_file.get(&doc_id).map(String::as_str)
    }

    /// Every document id, used as the universe for complements.
    pub fn universe(&self) -> PostingList {
        PostingList::from_sorted_iter(self.id_to_file.keys().copied())
    }

    pub fn word_postings(&self, word: &str) -> PostingList {
        self.words
            .get(word)
            .map(|w| PostingList::from_sorted_iter(w.postings.iter().copied()))
            .unwrap_or_default()
    }

    /// Union of the postings of every surface word under `stem`.
    pub fn stem_postings(&self, stem: &str) -> Option<PostingList> {
        let entry = self.stems.get(stem)?;
        Some(entry.words.iter().fold(PostingList::new(), |acc, w| acc.union(&self.word_postings(w))))
    }
}

/// Build the index from `(filename, text)` pairs. Document ids follow the
/// order of `documents`.
pub fn build_index<I, N, S>(documents: I, normalizer: &N, stopwords: &S) -> InvertedIndex
where
    I: IntoIterator<Item = (String, String)>,
    N: Normalizer + ?Sized,
    S: StopwordFilter + ?Sized,
{
    let mut index = InvertedIndex::new();

    for (doc_id, (filename, text)) in documents.into_iter().enumerate() {
        let doc_id = doc_id as DocId;
        index.id_to_file.insert(doc_id, filename);
        for word in tokenize(&text) {
            let stem = normalizer.normalize(&word);
            if stopwords.is_stopword(&stem) { continue; }
            index.words.entry(word.clone()).or_default().postings.insert(doc_id);
            index.stems.entry(stem).or_default().words.insert(word);
        }
    }

    finalize_counts(&mut index);
    build_bigrams(&mut index);
    tracing::info!(
        num_docs = index.num_docs(),
        num_stems = index.stems.len(),
        num_words = index.words.len(),
        num_bigrams = index.bigrams.len(),
        "built index"
    );
    index
}

fn finalize_counts(index: &mut InvertedIndex) {
    let InvertedIndex { stems, words, .. } = index;
    for entry in stems.values_mut() {
        let mut docs: BTreeSet<DocId> = BTreeSet::new();
        for w in &entry.words {
            let Some(word) = words.get_mut(w) else { continue };
            word.count = word.postings.len() as u32;
            word.rotations = rotations(w).into_iter().collect();
            docs.extend(word.postings.iter().copied());
        }
        entry.count = docs.len() as u32;
    }
}

fn build_bigrams(index: &mut InvertedIndex) {
    for (stem, entry) in &index.stems {
        for word in &entry.words {
            for bigram in bigrams(word) {
                index.bigrams.entry(bigram).or_default().insert(stem.clone());
            }
        }
    }
}

/// Contiguous two-character substrings, in order, duplicates kept.
pub fn bigrams(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.windows(2).map(|w| w.iter().collect()).collect()
}
