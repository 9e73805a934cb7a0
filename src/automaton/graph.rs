//! Arena-backed automaton graph.
//!
//! States are dense indices into a vector; each state owns its outgoing arcs.
//! Several arcs with the same label model non-determinism, several labels from
//! one state model alternation.

use std::fmt;

use crate::specials::{MacroId, Specials};
use crate::token::Token;

use super::matcher;

/// Index of a state within its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }

    /// The id this state gets when its graph is spliced at `by`.
    pub fn shifted(self, by: usize) -> Self {
        Self(self.0 + by)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A matchable unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom<T> {
    Literal(T),
    Macro(MacroId),
    Wildcard,
    Start,
    End,
}

/// What an arc needs to see in the input to be taken.
#[derive(Debug, Clone, PartialEq)]
pub enum Label<T> {
    /// Zero-width, always taken.
    Epsilon,
    Match(Atom<T>),
    /// One token where none of the atoms match.
    Exclude(Vec<Atom<T>>),
}

impl<T: Token> Label<T> {
    /// Index after taking this arc from `index`, if it can be taken.
    ///
    /// Polarity lives here: an [`Label::Exclude`] arc inverts the matcher's
    /// answer for each of its atoms.
    pub fn step(&self, input: &T, index: usize, specials: &Specials<T>) -> Option<usize> {
        match self {
            Label::Epsilon => Some(index),
            Label::Match(atom) => matcher::advance(input, atom, index, specials),
            Label::Exclude(atoms) => {
                if index >= input.len() || input.is_boundary_at(index) {
                    return None;
                }
                let any = atoms
                    .iter()
                    .any(|atom| matcher::advance(input, atom, index, specials).is_some());
                if any { None } else { Some(index + 1) }
            }
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arc<T> {
    pub label: Label<T>,
    pub target: StateId,
}

#[derive(Debug, Clone, PartialEq)]
struct State<T> {
    arcs: Vec<Arc<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph<T> {
    states: Vec<State<T>>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State { arcs: Vec::new() });
        StateId(self.states.len() - 1)
    }

    pub fn add_arc(&mut self, from: StateId, label: Label<T>, to: StateId) {
        self.states[from.0].arcs.push(Arc { label, target: to });
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_arc(from, Label::Epsilon, to);
    }

    /// Outgoing arcs of `state`; empty for an id from another graph.
    pub fn arcs(&self, state: StateId) -> &[Arc<T>] {
        self.states
            .get(state.0)
            .map(|s| s.arcs.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn arc_count(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId)
    }

}

impl<T: Clone> Graph<T> {
    /// Copy every state of `other` into this graph.
    ///
    /// Returns the offset to pass to [`StateId::shifted`] for ids of `other`.
    pub fn splice(&mut self, other: &Graph<T>) -> usize {
        let offset = self.states.len();
        self.states.extend(other.states.iter().map(|state| State {
            arcs: state
                .arcs
                .iter()
                .map(|arc| Arc {
                    label: arc.label.clone(),
                    target: arc.target.shifted(offset),
                })
                .collect(),
        }));
        offset
    }
}

/// A graph with designated start and accepting states.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine<T> {
    pub graph: Graph<T>,
    pub start: StateId,
    pub accept: StateId,
}

impl<T: fmt::Display> fmt::Display for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Literal(t) => write!(f, "'{t}'"),
            Atom::Macro(id) => write!(f, "macro#{}", id.index()),
            Atom::Wildcard => write!(f, "."),
            Atom::Start => write!(f, "START"),
            Atom::End => write!(f, "END"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Match(atom) => write!(f, "{atom}"),
            Label::Exclude(atoms) => {
                write!(f, "!{{")?;
                for (i, atom) in atoms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{atom}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One line per arc: `s0 -'a'-> s1`.
impl<T: fmt::Display> fmt::Display for Graph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.state_ids() {
            let arcs = self.arcs(id);
            if arcs.is_empty() {
                writeln!(f, "{id}")?;
            }
            for arc in arcs {
                writeln!(f, "{id} -{}-> {}", arc.label, arc.target)?;
            }
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for StateMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start {} accept {}", self.start, self.accept)?;
        write!(f, "{}", self.graph)
    }
}
