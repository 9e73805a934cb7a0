//! Builds [`Expression`] trees from pattern strings.

use tracing::{debug, trace};

use super::ast::*;
use super::lexer::{Delimiter, Lexeme, Lexer, check_adjacency, split_alternatives};

/// Errors that make a pattern string malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    DoubleNegation,
    NegatedQuantifier,
    StackedQuantifiers,
    QuantifiedBoundary,
    NegatedBoundary,
    UnclosedGroup(char),
    UnexpectedClose(char),
    DanglingQuantifier,
    DanglingNegation,
    EmptyGroup(char),
    MisplacedBoundary,
    NegatedCompound,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DoubleNegation => write!(f, "Double negation '!!' in pattern"),
            Self::NegatedQuantifier => write!(f, "Quantifier cannot be negated"),
            Self::StackedQuantifiers => write!(f, "Quantifiers cannot be stacked"),
            Self::QuantifiedBoundary => write!(f, "Boundary '#' cannot be quantified"),
            Self::NegatedBoundary => write!(f, "Boundary '#' cannot be negated"),
            Self::UnclosedGroup(c) => write!(f, "Unclosed group '{c}' in pattern"),
            Self::UnexpectedClose(c) => write!(f, "Unexpected '{c}' in pattern"),
            Self::DanglingQuantifier => write!(f, "Quantifier has nothing to repeat"),
            Self::DanglingNegation => write!(f, "Negation '!' has nothing to negate"),
            Self::EmptyGroup(c) => write!(f, "Empty group '{c}' in pattern"),
            Self::MisplacedBoundary => {
                write!(f, "Boundary '#' is only allowed at the start or end")
            }
            Self::NegatedCompound => {
                write!(f, "Only a literal symbol or a choice of literals can be negated")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Matching direction a tree is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    /// Right to left; the tree is mirrored.
    Backward,
}

/// Parse `pattern` with no multi-character symbols.
pub fn parse(pattern: &str, direction: Direction) -> Result<Expression, PatternError> {
    PatternParser::new().parse(pattern, direction)
}

/// Pattern parser configured with the multi-character symbols it should keep
/// whole.
#[derive(Debug, Clone, Default)]
pub struct PatternParser {
    /// Longest first.
    symbols: Vec<String>,
}

impl PatternParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare literal symbols longer than one character, such as `tʃ`.
    pub fn with_special_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_symbols(symbols);
        self
    }

    /// Declare macro keys, which are tokenized like special symbols.
    pub fn with_macro_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_symbols(keys);
        self
    }

    fn add_symbols<I, S>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for symbol in symbols {
            let symbol = symbol.into();
            if !symbol.is_empty() && !self.symbols.contains(&symbol) {
                self.symbols.push(symbol);
            }
        }
        // Stable, so equal-length symbols keep declaration order.
        self.symbols.sort_by_key(|s| std::cmp::Reverse(s.len()));
    }

    pub fn special_symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Parse a full pattern. Never returns a partial tree.
    pub fn parse(&self, pattern: &str, direction: Direction) -> Result<Expression, PatternError> {
        check_adjacency(pattern)?;

        let mut items = self.parse_items(pattern)?;
        let mut tree = match items.len() {
            0 => Expression::epsilon(),
            1 => items.remove(0),
            _ => Expression::sequence(items),
        };

        tree.resolve_boundaries(true, true);
        if tree.has_unresolved_boundary() {
            return Err(PatternError::MisplacedBoundary);
        }
        if direction == Direction::Backward {
            tree = tree.reverse();
        }
        debug!(%pattern, ?direction, tree = %tree, "parsed pattern");
        Ok(tree)
    }

    /// Fold one nesting level into a list of completed nodes.
    fn parse_items(&self, src: &str) -> Result<Vec<Expression>, PatternError> {
        let mut buffer = Buffer::default();
        for lexeme in Lexer::new(src, &self.symbols) {
            let lexeme = lexeme?;
            trace!(?lexeme, "lexeme");
            match lexeme {
                Lexeme::Symbol(text) => buffer.push(Expression::literal(text))?,
                Lexeme::Wildcard => buffer.push(Expression::terminal(Symbol::Wildcard))?,
                Lexeme::Boundary => buffer.push(Expression::terminal(Symbol::Boundary))?,
                Lexeme::Negation => buffer.negate()?,
                Lexeme::Quantifier(q) => buffer.quantify(q)?,
                Lexeme::Group(Delimiter::Paren, body) => {
                    let children = self.parse_items(body)?;
                    if children.is_empty() {
                        return Err(PatternError::EmptyGroup('('));
                    }
                    buffer.push(Expression::sequence(children))?;
                }
                Lexeme::Group(Delimiter::Brace, body) => {
                    let branches = self.parse_alternatives(body)?;
                    buffer.push(Expression::alternation(branches))?;
                }
            }
        }
        buffer.finish()
    }

    fn parse_alternatives(&self, body: &str) -> Result<Vec<Expression>, PatternError> {
        let parts = split_alternatives(body);
        if parts.is_empty() {
            return Err(PatternError::EmptyGroup('{'));
        }
        parts
            .into_iter()
            .map(|part| {
                let mut items = self.parse_items(part)?;
                Ok(if items.len() == 1 {
                    items.remove(0)
                } else {
                    Expression::sequence(items)
                })
            })
            .collect()
    }
}

/// Nodes completed so far at one level, plus a pending `!`.
#[derive(Default)]
struct Buffer {
    items: Vec<Expression>,
    negate_next: bool,
}

impl Buffer {
    fn push(&mut self, mut expr: Expression) -> Result<(), PatternError> {
        if std::mem::take(&mut self.negate_next) {
            if matches!(expr.node, Node::Terminal(Symbol::Boundary)) {
                return Err(PatternError::NegatedBoundary);
            }
            if expr.choice_symbols().is_none() {
                return Err(PatternError::NegatedCompound);
            }
            expr.negative = true;
        }
        self.items.push(expr);
        Ok(())
    }

    fn negate(&mut self) -> Result<(), PatternError> {
        if self.negate_next {
            return Err(PatternError::DoubleNegation);
        }
        self.negate_next = true;
        Ok(())
    }

    /// Attach `q` to the most recently completed node.
    fn quantify(&mut self, q: Quantifier) -> Result<(), PatternError> {
        if self.negate_next {
            return Err(PatternError::NegatedQuantifier);
        }
        let last = self
            .items
            .last_mut()
            .ok_or(PatternError::DanglingQuantifier)?;
        if last.quantifier != Quantifier::None {
            return Err(PatternError::StackedQuantifiers);
        }
        // Covers `#` wrapped in a group too: `(#)?` would make the anchor optional.
        if last.has_unresolved_boundary() {
            return Err(PatternError::QuantifiedBoundary);
        }
        last.quantifier = q;
        Ok(())
    }

    fn finish(self) -> Result<Vec<Expression>, PatternError> {
        if self.negate_next {
            return Err(PatternError::DanglingNegation);
        }
        Ok(self.items)
    }
}
