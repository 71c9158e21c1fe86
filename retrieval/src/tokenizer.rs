use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use std::collections::HashSet;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\w+(?:['\-]\w+)*").expect("valid regex");
    static ref VALID_RE: Regex = Regex::new(r"^[-'a-zA-Z]+$").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Maps a surface word to the stem it is indexed under.
pub trait Normalizer {
    fn normalize(&self, token: &str) -> String;
}

/// Decides whether a stem is excluded from the index.
pub trait StopwordFilter {
    fn is_stopword(&self, stem: &str) -> bool;
}

/// English Snowball stemmer.
pub struct PorterNormalizer {
    stemmer: Stemmer,
}

impl PorterNormalizer {
    pub fn new() -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English) }
    }
}

impl Default for PorterNormalizer {
    fn default() -> Self { Self::new() }
}

impl Normalizer for PorterNormalizer {
    fn normalize(&self, token: &str) -> String {
        self.stemmer.stem(&token.to_lowercase()).into_owned()
    }
}

impl<F: Fn(&str) -> String> Normalizer for F {
    fn normalize(&self, token: &str) -> String { self(token) }
}

/// Built-in English stopword list. Both the listed words and their stems
/// count as stopwords, so the filter behaves the same before and after
/// normalization.
pub struct EnglishStopwords {
    stems: HashSet<String>,
}

impl EnglishStopwords {
    pub fn new<N: Normalizer + ?Sized>(normalizer: &N) -> Self {
        let stems = STOPWORDS.iter().map(|w| normalizer.normalize(w)).collect();
        Self { stems }
    }
}

impl StopwordFilter for EnglishStopwords {
    fn is_stopword(&self, stem: &str) -> bool {
        STOPWORDS.contains(stem) || self.stems.contains(stem)
    }
}

impl StopwordFilter for HashSet<String> {
    fn is_stopword(&self, stem: &str) -> bool { self.contains(stem) }
}

/// Parse a stopword file: one word per line, blank lines and `#` comments
/// ignored. Words are normalized so the set can be tested against stems.
pub fn parse_stopwords<N: Normalizer + ?Sized>(text: &str, normalizer: &N) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|w| normalizer.normalize(&w.to_lowercase()))
        .collect()
}

/// Split text into lower-cased surface words: NFKC, then sentences, then
/// word tokens. Apostrophes and hyphens only join letters inside a word, so
/// `Nay--I` is two words and quotes around `'Hello'` are dropped. Only tokens
/// made entirely of ASCII letters, apostrophes and hyphens survive.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    let mut words = Vec::new();
    for sentence in normalized.unicode_sentences() {
        for mat in WORD_RE.find_iter(sentence) {
            let token = mat.as_str();
            if !VALID_RE.is_match(token) { continue; }
            words.push(token.to_lowercase());
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run! Well-known 42 cafés.");
        assert_eq!(t, vec!["running", "runner's", "run", "well-known"]);
    }

    #[test]
    fn dashes_and_quotes_split_words() {
        let t = tokenize("Nay--I will. 'Hello,' she said. O Romeo, Romeo!--wherefore");
        assert_eq!(
            t,
            vec!["nay", "i", "will", "hello", "she", "said", "o", "romeo", "romeo", "wherefore"]
        );
    }

    #[test]
    fn trailing_apostrophe_is_not_kept() {
        assert_eq!(tokenize("the players' parts -- all"), vec!["the", "players", "parts", "all"]);
    }

    #[test]
    fn porter_lowercases_and_stems() {
        let n = PorterNormalizer::new();
        assert_eq!(n.normalize("Running"), "run");
        assert_eq!(n.normalize("cats"), "cat");
    }

    #[test]
    fn stopword_file_skips_comments() {
        let n = PorterNormalizer::new();
        let set = parse_stopwords("# common\nThe\n\n  and \n", &n);
        assert!(set.is_stopword("the"));
        assert!(set.is_stopword("and"));
        assert_eq!(set.len(), 2);
    }
}
