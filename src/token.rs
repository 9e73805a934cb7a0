//! Token sequences the automaton can match over.
//!
//! The engine never looks inside a token. Everything it needs is expressed by
//! the [`Token`] trait, so the same compiled pattern machinery works for plain
//! text ([`Text`]), for sequences of multi-character symbols ([`Segments`]),
//! or for any richer domain a caller supplies.

use std::fmt;

use itertools::Itertools;

/// A sequence of tokens that patterns can be matched against.
///
/// All indices are token positions, never byte offsets.
pub trait Token: Clone + PartialEq + fmt::Debug {
    /// Number of tokens in the sequence.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the tokens from `index` onwards begin with `prefix`.
    ///
    /// Returns false when `index` is past the end.
    fn starts_with_at(&self, index: usize, prefix: &Self) -> bool;

    /// Build a sequence from a literal pattern fragment.
    fn from_literal(literal: &str) -> Self;

    /// The same tokens in reverse order.
    fn reversed(&self) -> Self;

    /// True if the token at `index` is a boundary marker embedded in the input.
    fn is_boundary_at(&self, _index: usize) -> bool {
        false
    }
}

/// Plain text, one token per `char`.
///
/// A literal `#` in the input is a boundary token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Text(Vec<char>);

impl Text {
    pub fn new(text: &str) -> Self {
        Self(text.chars().collect())
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().collect::<String>())
    }
}

impl Token for Text {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn starts_with_at(&self, index: usize, prefix: &Self) -> bool {
        self.0
            .get(index..)
            .is_some_and(|rest| rest.starts_with(&prefix.0))
    }

    fn from_literal(literal: &str) -> Self {
        Self::new(literal)
    }

    fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    fn is_boundary_at(&self, index: usize) -> bool {
        self.0.get(index) == Some(&'#')
    }
}

/// A sequence of atomic symbols, each of which may span several characters.
///
/// Written as whitespace-separated symbols: `"tʃ a ɪ"` is three tokens. A
/// literal with no whitespace is a single token, so a pattern symbol `tʃ`
/// matches exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Segments(Vec<String>);

impl Segments {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(symbols.into_iter().map(Into::into).collect())
    }

    /// Split on whitespace.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

impl Token for Segments {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn starts_with_at(&self, index: usize, prefix: &Self) -> bool {
        self.0
            .get(index..)
            .is_some_and(|rest| rest.starts_with(&prefix.0))
    }

    fn from_literal(literal: &str) -> Self {
        Self::parse(literal)
    }

    fn reversed(&self) -> Self {
        Self(self.0.iter().rev().cloned().collect())
    }

    fn is_boundary_at(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|s| s == "#")
    }
}
