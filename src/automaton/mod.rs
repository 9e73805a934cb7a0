//! Compiled patterns and the interface for matching them.
//!
//! ```rust
//! use seqmatch::{Automaton, Text};
//!
//! let automaton = Automaton::<Text>::new("{r l}{i u}s").unwrap();
//! assert!(automaton.matches(&Text::new("lus")));
//! assert!(!automaton.matches(&Text::new("rs")));
//!
//! let runs = Automaton::<Text>::new("aa*").unwrap();
//! let ends: Vec<_> = runs.find(&Text::new("aaa"), 0).into_iter().collect();
//! assert_eq!(ends, vec![1, 2, 3]);
//! ```

pub mod compiler;
pub mod engine;
pub mod graph;
pub mod matcher;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::pattern::{Direction, Expression, PatternError, PatternParser};
use crate::specials::Specials;
use crate::token::Token;

pub use compiler::{CompileError, Compiled, GroupId, compile};
pub use engine::find_match_ends;
pub use graph::{Arc, Atom, Graph, Label, StateId, StateMachine};

/// Failure to build an [`Automaton`] from a pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    Pattern(PatternError),
    Compile(CompileError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "{e}"),
            Self::Compile(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Compile(e) => Some(e),
        }
    }
}

impl From<PatternError> for BuildError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

impl From<CompileError> for BuildError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

/// A compiled pattern, ready to match.
///
/// Matching never mutates the automaton, so one instance can serve many
/// threads at once.
#[derive(Debug, Clone)]
pub struct Automaton<T> {
    tree: Expression,
    direction: Direction,
    machine: StateMachine<T>,
    groups: BTreeMap<GroupId, StateMachine<T>>,
    specials: Specials<T>,
}

impl<T: Token> Automaton<T> {
    /// Forward automaton with no special symbols or macros.
    pub fn new(pattern: &str) -> Result<Self, BuildError> {
        Self::builder(pattern).build()
    }

    pub fn builder(pattern: &str) -> AutomatonBuilder<'_, T> {
        AutomatonBuilder {
            pattern,
            direction: Direction::Forward,
            symbols: Vec::new(),
            specials: Specials::new(),
        }
    }

    /// Compile an already parsed tree. `direction` is the one it was parsed for.
    pub fn from_expression(
        tree: Expression,
        specials: &Specials<T>,
        direction: Direction,
    ) -> Result<Self, BuildError> {
        let Compiled {
            machine,
            groups,
            specials,
        } = compile(&tree, specials, direction)?;
        Ok(Self {
            tree,
            direction,
            machine,
            groups,
            specials,
        })
    }

    /// Every end index of a match starting at `start`.
    ///
    /// For a backward automaton, `input` must already be reversed.
    pub fn find(&self, input: &T, start: usize) -> BTreeSet<usize> {
        find_match_ends(&self.machine, &self.specials, input, start)
    }

    /// True if some prefix of `input` matches.
    pub fn matches(&self, input: &T) -> bool {
        !self.find(input, 0).is_empty()
    }

    /// True if the whole of `input` matches.
    pub fn full_match(&self, input: &T) -> bool {
        self.find(input, 0).contains(&input.len())
    }

    /// Every start index with a non-empty set of end indices.
    pub fn search(&self, input: &T) -> Vec<(usize, BTreeSet<usize>)> {
        (0..=input.len())
            .filter_map(|start| {
                let ends = self.find(input, start);
                (!ends.is_empty()).then_some((start, ends))
            })
            .collect()
    }

    /// Every start index of a match that ends exactly at `end`.
    ///
    /// `input` is given in its natural left-to-right order for either
    /// direction. A backward automaton runs over the reversed input from
    /// `end`; a forward one tries each start up to `end`.
    pub fn find_ending_at(&self, input: &T, end: usize) -> BTreeSet<usize> {
        let len = input.len();
        if end > len {
            return BTreeSet::new();
        }
        match self.direction {
            Direction::Backward => self
                .find(&input.reversed(), len - end)
                .into_iter()
                .map(|e| len - e)
                .collect(),
            Direction::Forward => (0..=end)
                .filter(|&start| self.find(input, start).contains(&end))
                .collect(),
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.tree
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn machine(&self) -> &StateMachine<T> {
        &self.machine
    }

    pub fn groups(&self) -> &BTreeMap<GroupId, StateMachine<T>> {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&StateMachine<T>> {
        self.groups.get(&id)
    }

    /// The macro table as the engine sees it (reversed for backward automata).
    pub fn specials(&self) -> &Specials<T> {
        &self.specials
    }
}

/// Collects parser and compiler settings for one pattern.
pub struct AutomatonBuilder<'a, T> {
    pattern: &'a str,
    direction: Direction,
    symbols: Vec<String>,
    specials: Specials<T>,
}

impl<T: Token> AutomatonBuilder<'_, T> {
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn backward(self) -> Self {
        self.direction(Direction::Backward)
    }

    pub fn special_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Macro table; its keys are also tokenized whole.
    pub fn specials(mut self, specials: Specials<T>) -> Self {
        self.specials = specials;
        self
    }

    pub fn build(self) -> Result<Automaton<T>, BuildError> {
        let parser = PatternParser::new()
            .with_special_symbols(self.symbols)
            .with_macro_keys(self.specials.keys());
        let tree = parser.parse(self.pattern, self.direction)?;
        Automaton::from_expression(tree, &self.specials, self.direction)
    }
}
