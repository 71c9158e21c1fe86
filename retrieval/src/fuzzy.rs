use crate::index::{bigrams, InvertedIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Words whose length differs from the query by more than this are skipped.
pub const MAX_LENGTH_DIFF: usize = 4;
/// Candidates farther than this are discarded.
pub const MAX_EDIT_DISTANCE: usize = 5;

/// Propose the single best stem for `misspelled`, or `None` if nothing is
/// close enough.
pub fn correct(misspelled: &str, index: &InvertedIndex) -> Option<String> {
    let mut votes: HashMap<&str, u32> = HashMap::new();
    for bigram in bigrams(misspelled) {
        if let Some(stems) = index.bigrams.get(&bigram) {
            for stem in stems {
                *votes.entry(stem.as_str()).or_insert(0) += 1;
            }
        }
    }
    let top = *votes.values().max()?;

    let query_len = misspelled.chars().count();
    let mut by_distance: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
    for (stem, _) in votes.iter().filter(|(_, v)| **v == top) {
        let Some(entry) = index.stems.get(*stem) else { continue };
        for word in &entry.words {
            if word.chars().count().abs_diff(query_len) > MAX_LENGTH_DIFF { continue; }
            let d = levenshtein(misspelled, word);
            if d <= MAX_EDIT_DISTANCE {
                by_distance.entry(d).or_default().insert(*stem);
            }
        }
    }

    let (distance, closest) = by_distance.into_iter().next()?;
    // Highest document count wins; BTreeSet order makes the smallest stem win ties.
    let best = closest
        .into_iter()
        .max_by(|a, b| {
            let (ca, cb) = (index.stems[*a].count, index.stems[*b].count);
            ca.cmp(&cb).then_with(|| b.cmp(a))
        })?;
    tracing::debug!(misspelled, correction = best, distance, votes = top, "spelling correction");
    Some(best.to_string())
}

/// Classic unit-cost edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            cur[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                1 + prev[j].min(cur[j - 1]).min(prev[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
