use thiserror::Error;

/// Reasons a query string is rejected before or during evaluation.
///
/// A term that simply matches nothing is not an error; it resolves to an
/// empty posting list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    Empty,

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("malformed clause: '{0}'")]
    MalformedClause(String),

    #[error("term '{0}' has more than one wildcard")]
    BadWildcard(String),

    #[error("term '{0}' uses the reserved '@' prefix")]
    ReservedSymbol(String),
}

/// Integrity failures when decoding a persisted index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexFormatError {
    #[error("unsupported index version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("index checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Checksum { stored: u32, computed: u32 },
}
