use crate::error::QueryError;

pub const SENTINEL: char = '$';
pub const WILDCARD: char = '*';

/// All rotations of `$word`, starting with `$word` itself and moving the last
/// character to the front each step. Yields `len(word) + 1` strings.
pub fn rotations(word: &str) -> Vec<String> {
    let mut chars: Vec<char> = std::iter::once(SENTINEL).chain(word.chars()).collect();
    let mut out = Vec::with_capacity(chars.len());
    out.push(chars.iter().collect());
    for _ in 1..chars.len() {
        chars.rotate_right(1);
        out.push(chars.iter().collect());
    }
    out
}

/// Re-anchor a query term so its wildcard sits at the end.
///
/// Returns `(term, false)` when there is no wildcard, otherwise the prefix
/// `Y$X` for a term `X*Y`.
pub fn anchor_wildcard(term: &str) -> Result<(String, bool), QueryError> {
    let mut parts = term.splitn(2, WILDCARD);
    let before = parts.next().unwrap_or_default();
    let Some(after) = parts.next() else {
        return Ok((term.to_string(), false));
    };
    if after.contains(WILDCARD) {
        return Err(QueryError::BadWildcard(term.to_string()));
    }
    let mut anchored = String::with_capacity(term.len() + 1);
    anchored.push_str(after);
    anchored.push(SENTINEL);
    anchored.push_str(before);
    Ok((anchored, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_word_gets_all_rotations(word in "[a-z'-]{0,12}") {
            let term = format!("{SENTINEL}{word}");
            let r = rotations(&word);
            prop_assert_eq!(r.len(), word.chars().count() + 1);
            prop_assert_eq!(&r[0], &term);
            let doubled = format!("{term}{term}");
            for rot in &r {
                prop_assert_eq!(rot.len(), term.len());
                prop_assert!(doubled.contains(rot.as_str()));
            }
        }

        #[test]
        fn wildcard_prefix_matches_its_own_word(word in "[a-z]{1,10}", cut in 0usize..10) {
            let cut = cut.min(word.len());
            let pattern = format!("{}{WILDCARD}{}", &word[..cut], &word[cut..]);
            let (anchored, wild) = anchor_wildcard(&pattern).unwrap();
            prop_assert!(wild);
            prop_assert!(rotations(&word).iter().any(|r| r.starts_with(&anchored)));
        }
    }

    #[test]
    fn rotations_cover_every_shift() {
        let r = rotations("cat");
        assert_eq!(r, vec!["$cat", "t$ca", "at$c", "cat$"]);
    }

    #[test]
    fn rotations_of_empty_word() {
        assert_eq!(rotations(""), vec!["$"]);
    }

    #[test]
    fn rotations_count_chars_not_bytes() {
        let r = rotations("né");
        assert_eq!(r.len(), 3);
        assert_eq!(r[1], "é$n");
    }

    #[test]
    fn anchor_without_wildcard_is_identity() {
        assert_eq!(anchor_wildcard("cat").unwrap(), ("cat".to_string(), false));
    }

    #[test]
    fn anchor_moves_wildcard_to_end() {
        assert_eq!(anchor_wildcard("ca*").unwrap().0, "$ca");
        assert_eq!(anchor_wildcard("*at").unwrap().0, "at$");
        assert_eq!(anchor_wildcard("c*t").unwrap().0, "t$c");
        assert_eq!(anchor_wildcard("*").unwrap().0, "$");
    }

    #[test]
    fn anchor_rejects_two_wildcards() {
        assert_eq!(
            anchor_wildcard("c*t*"),
            Err(QueryError::BadWildcard("c*t*".to_string()))
        );
    }
}
