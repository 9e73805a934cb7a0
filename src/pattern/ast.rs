//! Expression tree for parsed patterns.

use std::fmt;

/// One node of a parsed pattern.
///
/// A pattern like `{r l}i?` is a [`Node::Sequence`] holding an alternation and
/// an optional terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub node: Node,
    pub quantifier: Quantifier,
    /// Matches one token where the underlying node does not match.
    pub negative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Terminal(Symbol),
    /// Children match one after another.
    Sequence(Vec<Expression>),
    /// Exactly one child matches.
    Alternation(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A literal symbol or macro key.
    Literal(String),
    Wildcard, // .
    /// A `#` not yet resolved to an edge.
    Boundary,
    Start,
    End,
    /// Zero-width, always matches.
    Epsilon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    #[default]
    None,
    Optional,   // ?
    ZeroOrMore, // *
    OneOrMore,  // +
}

impl Quantifier {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Self::Optional),
            '*' => Some(Self::ZeroOrMore),
            '+' => Some(Self::OneOrMore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

impl Expression {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            quantifier: Quantifier::None,
            negative: false,
        }
    }

    pub fn terminal(symbol: Symbol) -> Self {
        Self::new(Node::Terminal(symbol))
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::terminal(Symbol::Literal(text.into()))
    }

    pub fn epsilon() -> Self {
        Self::terminal(Symbol::Epsilon)
    }

    pub fn sequence(children: Vec<Expression>) -> Self {
        Self::new(Node::Sequence(children))
    }

    pub fn alternation(children: Vec<Expression>) -> Self {
        Self::new(Node::Alternation(children))
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negative = true;
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.node, Node::Terminal(_))
    }

    pub fn children(&self) -> &[Expression] {
        match &self.node {
            Node::Terminal(_) => &[],
            Node::Sequence(children) | Node::Alternation(children) => children,
        }
    }

    /// True if some terminal in the tree is an unresolved `#`.
    pub fn has_unresolved_boundary(&self) -> bool {
        match &self.node {
            Node::Terminal(sym) => *sym == Symbol::Boundary,
            Node::Sequence(children) | Node::Alternation(children) => {
                children.iter().any(Expression::has_unresolved_boundary)
            }
        }
    }

    /// Rewrite a `#` in the first structural position to [`Symbol::Start`] and
    /// one in the last position to [`Symbol::End`].
    ///
    /// Each branch of an alternation inherits its parent's position. Any other
    /// `#` is left unresolved.
    pub fn resolve_boundaries(&mut self, first: bool, last: bool) {
        match &mut self.node {
            Node::Terminal(sym) => {
                if *sym == Symbol::Boundary {
                    if first {
                        *sym = Symbol::Start;
                    } else if last {
                        *sym = Symbol::End;
                    }
                }
            }
            Node::Sequence(children) => {
                let n = children.len();
                for (i, child) in children.iter_mut().enumerate() {
                    child.resolve_boundaries(first && i == 0, last && i + 1 == n);
                }
            }
            Node::Alternation(children) => {
                for child in children.iter_mut() {
                    child.resolve_boundaries(first, last);
                }
            }
        }
    }

    /// Mirror the tree for right-to-left matching.
    ///
    /// Sequences reverse their child order; alternations reverse each branch
    /// but keep branch order. START and END trade places.
    pub fn reverse(&self) -> Expression {
        let mut reversed = self.mirror();
        reversed.resolve_boundaries(true, true);
        reversed
    }

    fn mirror(&self) -> Expression {
        let node = match &self.node {
            Node::Terminal(sym) => Node::Terminal(match sym {
                Symbol::Start => Symbol::End,
                Symbol::End => Symbol::Start,
                other => other.clone(),
            }),
            Node::Sequence(children) => {
                Node::Sequence(children.iter().rev().map(Expression::mirror).collect())
            }
            Node::Alternation(children) => {
                Node::Alternation(children.iter().map(Expression::mirror).collect())
            }
        };
        Expression {
            node,
            quantifier: self.quantifier,
            negative: self.negative,
        }
    }

    /// The symbols a negated node chooses between, if it is a single choice.
    ///
    /// A literal is its own choice. A group qualifies when every branch is
    /// an unquantified, non-negated literal, possibly wrapped in a
    /// one-element group. The wildcard is excluded: `!.` could never match.
    pub fn choice_symbols(&self) -> Option<Vec<&Symbol>> {
        fn plain(expr: &Expression) -> Option<Vec<&Symbol>> {
            if expr.negative || expr.quantifier != Quantifier::None {
                return None;
            }
            expr.choice_symbols()
        }

        match &self.node {
            Node::Terminal(sym @ Symbol::Literal(_)) => Some(vec![sym]),
            Node::Terminal(_) => None,
            Node::Sequence(children) if children.len() == 1 => plain(&children[0]),
            Node::Sequence(_) => None,
            Node::Alternation(children) => {
                let mut symbols = Vec::new();
                for child in children {
                    symbols.extend(plain(child)?);
                }
                Some(symbols)
            }
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Expression::size).sum::<usize>()
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, top: bool) -> fmt::Result {
        if self.negative {
            write!(f, "!")?;
        }
        match &self.node {
            Node::Terminal(sym) => write!(f, "{sym}")?,
            Node::Sequence(children) => {
                let bare = top
                    && !self.negative
                    && self.quantifier == Quantifier::None
                    && children.len() > 1;
                if !bare {
                    write!(f, "(")?;
                }
                for child in children {
                    child.fmt_nested(f, false)?;
                }
                if !bare {
                    write!(f, ")")?;
                }
            }
            Node::Alternation(children) => {
                write!(f, "{{")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    // An unadorned sequence reads the same with or without parens.
                    child.fmt_nested(f, true)?;
                }
                write!(f, "}}")?;
            }
        }
        write!(f, "{}", self.quantifier.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Literal(text) => write!(f, "{text}"),
            Symbol::Wildcard => write!(f, "."),
            Symbol::Boundary | Symbol::Start | Symbol::End => write!(f, "#"),
            Symbol::Epsilon => Ok(()),
        }
    }
}

/// Renders the tree back to pattern syntax.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, true)
    }
}
