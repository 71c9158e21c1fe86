use crate::error::QueryError;
use crate::fuzzy;
use crate::index::{DocId, InvertedIndex};
use crate::postings::PostingList;
use crate::rotation::anchor_wildcard;
use crate::tokenizer::Normalizer;
use std::fmt;
use std::ops::Bound;

const SYMBOL_PREFIX: char = '@';

/// Name of an intermediate result, rendered as `@n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SYMBOL_PREFIX, self.0)
    }
}

/// Results of already-reduced groups. Lives for one `compute` call.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<PostingList>,
}

impl SymbolTable {
    fn mint(&mut self, postings: PostingList) -> Label {
        self.entries.push(postings);
        Label(self.entries.len() - 1)
    }

    fn get(&self, label: Label) -> &PostingList {
        &self.entries[label.0]
    }

    fn into_last(mut self) -> Option<PostingList> {
        self.entries.pop()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'q> {
    Open,
    Close,
    Word(&'q str),
}

fn lex(query: &str) -> Result<Vec<Token<'_>>, QueryError> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in query.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(word(&query[s..i])?);
            }
            match c {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(word(&query[s..])?);
    }
    Ok(tokens)
}

fn word(w: &str) -> Result<Token<'_>, QueryError> {
    if w.starts_with(SYMBOL_PREFIX) {
        return Err(QueryError::ReservedSymbol(w.to_string()));
    }
    Ok(Token::Word(w))
}

/// Reduction stack entry.
#[derive(Debug, Clone, Copy)]
enum Item<'q> {
    Open,
    Word(&'q str),
    Symbol(Label),
}

#[derive(Debug, Clone, Copy)]
enum Operand<'q> {
    Term(&'q str),
    Symbol(Label),
}

#[derive(Debug, Clone, Copy)]
enum Part<'q> {
    And,
    Or,
    Not,
    Open,
    Operand(Operand<'q>),
}

impl<'q> Part<'q> {
    fn classify(item: &Item<'q>) -> Part<'q> {
        match *item {
            Item::Word(w) if w.eq_ignore_ascii_case("and") => Part::And,
            Item::Word(w) if w.eq_ignore_ascii_case("or") => Part::Or,
            Item::Word(w) if w.eq_ignore_ascii_case("not") => Part::Not,
            Item::Word(w) => Part::Operand(Operand::Term(w)),
            Item::Symbol(l) => Part::Operand(Operand::Symbol(l)),
            Item::Open => Part::Open,
        }
    }
}

fn render(items: &[Item<'_>]) -> String {
    items
        .iter()
        .map(|i| match i {
            Item::Open => "(".to_string(),
            Item::Word(w) => w.to_string(),
            Item::Symbol(l) => l.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Evaluates parenthesized `and` / `or` / `not` queries against a borrowed,
/// read-only index. Groups are reduced innermost first.
pub struct QueryEngine<'a, N: Normalizer + ?Sized> {
    index: &'a InvertedIndex,
    normalizer: &'a N,
    universe: PostingList,
}

impl<'a, N: Normalizer + ?Sized> QueryEngine<'a, N> {
    pub fn new(index: &'a InvertedIndex, normalizer: &'a N) -> Self {
        Self { index, normalizer, universe: index.universe() }
    }

    pub fn index(&self) -> &'a InvertedIndex { self.index }

    pub fn lookup_filename(&self, doc_id: DocId) -> Option<&'a str> {
        self.index.lookup_filename(doc_id)
    }

    /// Evaluate a full query and return the matching documents in ascending order.
    pub fn compute(&self, query: &str) -> Result<PostingList, QueryError> {
        let tokens = lex(query)?;
        if tokens.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut symbols = SymbolTable::default();
        let mut stack: Vec<Item<'_>> = Vec::new();
        for token in tokens {
            match token {
                Token::Open => stack.push(Item::Open),
                Token::Word(w) => stack.push(Item::Word(w)),
                Token::Close => {
                    let open = stack
                        .iter()
                        .rposition(|i| matches!(i, Item::Open))
                        .ok_or(QueryError::UnbalancedParentheses)?;
                    let clause = stack.split_off(open + 1);
                    stack.pop();
                    let label = self.evaluate_clause(&clause, &mut symbols)?;
                    stack.push(Item::Symbol(label));
                }
            }
        }

        if stack.iter().any(|i| matches!(i, Item::Open)) {
            return Err(QueryError::UnbalancedParentheses);
        }
        if !stack.is_empty() {
            self.evaluate_clause(&stack, &mut symbols)?;
        }
        symbols.into_last().ok_or(QueryError::Empty)
    }

    /// Evaluate one elementary clause and bind its result to a fresh label.
    fn evaluate_clause(&self, items: &[Item<'_>], symbols: &mut SymbolTable) -> Result<Label, QueryError> {
        let parts: Vec<Part<'_>> = items.iter().map(Part::classify).collect();
        let result = match parts.as_slice() {
            [Part::Operand(t)] => self.resolve(t, symbols)?,
            [Part::Not, Part::Operand(t)] => self.resolve(t, symbols)?.complement(&self.universe),
            [Part::Operand(a), Part::And, Part::Operand(b)] => {
                self.resolve(a, symbols)?.intersection(&self.resolve(b, symbols)?)
            }
            [Part::Operand(a), Part::And, Part::Not, Part::Operand(b)] => {
                self.resolve(a, symbols)?.and_not(&self.resolve(b, symbols)?)
            }
            [Part::Operand(a), Part::Or, Part::Operand(b)] => {
                self.resolve(a, symbols)?.union(&self.resolve(b, symbols)?)
            }
            [Part::Operand(a), Part::Or, Part::Not, Part::Operand(b)] => {
                self.resolve(a, symbols)?.or_not(&self.resolve(b, symbols)?, &self.universe)
            }
            _ => return Err(QueryError::MalformedClause(render(items))),
        };
        let label = symbols.mint(result);
        tracing::trace!(clause = %render(items), %label, "reduced clause");
        Ok(label)
    }

    fn resolve(&self, operand: &Operand<'_>, symbols: &SymbolTable) -> Result<PostingList, QueryError> {
        match *operand {
            Operand::Symbol(label) => Ok(symbols.get(label).clone()),
            Operand::Term(term) => self.match_term(term),
        }
    }

    /// Resolve a single user term: wildcard scan, exact stem, or spelling
    /// correction, in that order. A term that matches nothing yields an
    /// empty list.
    pub fn match_term(&self, term: &str) -> Result<PostingList, QueryError> {
        let term = term.to_lowercase();
        let (anchored, wildcard) = anchor_wildcard(&term)?;
        if wildcard {
            return Ok(self.match_wildcard(&term, &anchored));
        }

        let stem = self.normalizer.normalize(&term);
        if let Some(postings) = self.index.stem_postings(&stem) {
            return Ok(postings);
        }

        match fuzzy::correct(&term, self.index) {
            Some(corrected) => {
                tracing::debug!(term = %term, corrected = %corrected, "term corrected");
                Ok(self.index.stem_postings(&corrected).unwrap_or_default())
            }
            None => {
                tracing::debug!(term = %term, "term matched nothing");
                Ok(PostingList::new())
            }
        }
    }

    fn match_wildcard(&self, term: &str, anchored: &str) -> PostingList {
        let min_len = term.chars().count().saturating_sub(1);
        let mut ids: Vec<DocId> = Vec::new();
        let mut matched: Vec<&str> = Vec::new();
        for entry in self.index.stems.values() {
            for w in &entry.words {
                if w.chars().count() < min_len { continue; }
                let Some(word) = self.index.words.get(w) else { continue };
                // Rotations are ordered, so the first one not below the prefix
                // is the only candidate that can start with it.
                let hit = word
                    .rotations
                    .range::<str, _>((Bound::Included(anchored), Bound::Unbounded))
                    .next()
                    .is_some_and(|r| r.starts_with(anchored));
                if hit {
                    ids.extend(word.postings.iter().copied());
                    matched.push(w);
                }
            }
        }
        tracing::debug!(term, matches = %matched.join(", "), "wildcard expanded");
        PostingList::from_unsorted(ids)
    }
}
