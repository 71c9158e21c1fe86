use crate::index::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Document ids, always sorted ascending without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList(Vec<DocId>);

impl PostingList {
    pub fn new() -> Self { Self::default() }

    /// Build from ids in any order; sorts and deduplicates.
    pub fn from_unsorted(mut ids: Vec<DocId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Build from an ordered set iterator such as `BTreeSet::iter`.
    pub fn from_sorted_iter<I: IntoIterator<Item = DocId>>(ids: I) -> Self {
        let ids: Vec<DocId> = ids.into_iter().collect();
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must be strictly ascending");
        Self(ids)
    }

    pub fn as_slice(&self) -> &[DocId] { &self.0 }
    pub fn into_vec(self) -> Vec<DocId> { self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &DocId> { self.0.iter() }
    pub fn contains(&self, id: DocId) -> bool { self.0.binary_search(&id).is_ok() }

    /// `self OR other`.
    pub fn union(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => { out.push(a[i]); i += 1; }
                Ordering::Greater => { out.push(b[j]); j += 1; }
                Ordering::Equal => { out.push(a[i]); i += 1; j += 1; }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        PostingList(out)
    }

    /// `self AND other`.
    pub fn intersection(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => { out.push(a[i]); i += 1; j += 1; }
            }
        }
        PostingList(out)
    }

    /// `universe - self`.
    pub fn complement(&self, universe: &PostingList) -> PostingList {
        universe.and_not(self)
    }

    /// `self AND NOT other`, merging both lists in one pass.
    pub fn and_not(&self, other: &PostingList) -> PostingList {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => { out.push(a[i]); i += 1; }
                Ordering::Greater => j += 1,
                Ordering::Equal => { i += 1; j += 1; }
            }
        }
        out.extend_from_slice(&a[i..]);
        PostingList(out)
    }

    /// `self OR NOT other`.
    pub fn or_not(&self, other: &PostingList, universe: &PostingList) -> PostingList {
        self.union(&other.complement(universe))
    }
}

impl FromIterator<DocId> for PostingList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = &'a DocId;
    type IntoIter = std::slice::Iter<'a, DocId>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
