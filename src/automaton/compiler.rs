//! Thompson-style construction of a [`StateMachine`] from an [`Expression`].
//!
//! Every node becomes a fragment with its own start and accept state:
//!
//! ```text
//! terminal     s ──sym──> t
//! sequence     s₁ ─…─ t₁ ──ε──> s₂ ─…─ t₂
//! alternation  s ──ε──> sᵢ ─…─ tᵢ ──ε──> t      (one branch per child)
//! ```
//!
//! Quantifiers wrap the fragment in fresh outer states so a skip arc can never
//! be reached from inside a loop:
//!
//! ```text
//! X?   s' ──ε──> s ─X─ t ──ε──> t'    plus s' ──ε──> t'
//! X*   as X?, plus t ──ε──> s
//! X+   s' ──ε──> s ─X─ t ──ε──> t'    plus t ──ε──> s
//! ```
//!
//! Each bracketed group below the root is also compiled on its own and kept,
//! keyed by [`GroupId`], for inspection.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::pattern::{Direction, Expression, Node, Quantifier, Symbol};
use crate::specials::Specials;
use crate::token::Token;

use super::graph::{Atom, Graph, Label, StateId, StateMachine};

/// Errors raised while compiling a tree into an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern uses a macro key registered with no expansions.
    UnresolvedMacro(String),
    /// A `#` that is neither first nor last survived into the tree.
    MisplacedBoundary,
    /// A negated node that is not a single choice of symbols.
    NegatedCompound,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedMacro(key) => write!(f, "Macro '{key}' has no expansions"),
            Self::MisplacedBoundary => write!(f, "Unresolved boundary '#' in expression"),
            Self::NegatedCompound => write!(f, "Negated node is not a single choice"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Synthetic id of a bracketed group, numbered in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Output of [`compile`].
#[derive(Debug, Clone)]
pub struct Compiled<T> {
    pub machine: StateMachine<T>,
    pub groups: BTreeMap<GroupId, StateMachine<T>>,
    /// The macro table oriented for the tree's direction.
    pub specials: Specials<T>,
}

/// Compile `tree` into an automaton.
///
/// `direction` must be the one the tree was parsed for: backward trees get
/// their literals and macro expansions reversed.
pub fn compile<T: Token>(
    tree: &Expression,
    specials: &Specials<T>,
    direction: Direction,
) -> Result<Compiled<T>, CompileError> {
    let specials = match direction {
        Direction::Forward => specials.clone(),
        Direction::Backward => specials.reversed(),
    };
    let mut compiler = Compiler {
        graph: Graph::new(),
        specials: &specials,
        direction,
        groups: BTreeMap::new(),
        next_group: 0,
    };
    let fragment = compiler.expression(tree)?;
    let Compiler { graph, groups, .. } = compiler;
    debug!(
        states = graph.len(),
        arcs = graph.arc_count(),
        groups = groups.len(),
        "compiled automaton"
    );
    Ok(Compiled {
        machine: StateMachine {
            graph,
            start: fragment.start,
            accept: fragment.accept,
        },
        groups,
        specials,
    })
}

#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

struct Compiler<'a, T> {
    graph: Graph<T>,
    specials: &'a Specials<T>,
    direction: Direction,
    groups: BTreeMap<GroupId, StateMachine<T>>,
    next_group: usize,
}

impl<T: Token> Compiler<'_, T> {
    fn expression(&mut self, expr: &Expression) -> Result<Fragment, CompileError> {
        let base = if expr.negative {
            self.exclusion(expr)?
        } else {
            match &expr.node {
                Node::Terminal(sym) => {
                    let label = self.label(sym)?;
                    self.arc_fragment(label)
                }
                Node::Sequence(children) => self.sequence(children)?,
                Node::Alternation(children) => self.alternation(children)?,
            }
        };
        Ok(self.quantify(base, expr.quantifier))
    }

    /// Compile a child, recording it as a group if it is bracketed.
    fn child(&mut self, expr: &Expression) -> Result<Fragment, CompileError> {
        if expr.is_terminal() {
            return self.expression(expr);
        }
        let id = GroupId(self.next_group);
        self.next_group += 1;

        let outer = std::mem::take(&mut self.graph);
        let inner = self.expression(expr);
        let sub = std::mem::replace(&mut self.graph, outer);
        let inner = inner?;

        let offset = self.graph.splice(&sub);
        self.groups.insert(
            id,
            StateMachine {
                graph: sub,
                start: inner.start,
                accept: inner.accept,
            },
        );
        Ok(Fragment {
            start: inner.start.shifted(offset),
            accept: inner.accept.shifted(offset),
        })
    }

    fn sequence(&mut self, children: &[Expression]) -> Result<Fragment, CompileError> {
        let mut fragments = Vec::with_capacity(children.len());
        for child in children {
            fragments.push(self.child(child)?);
        }
        let (Some(first), Some(last)) = (fragments.first(), fragments.last()) else {
            return Ok(self.arc_fragment(Label::Epsilon));
        };
        let whole = Fragment {
            start: first.start,
            accept: last.accept,
        };
        for pair in fragments.windows(2) {
            self.graph.add_epsilon(pair[0].accept, pair[1].start);
        }
        Ok(whole)
    }

    fn alternation(&mut self, children: &[Expression]) -> Result<Fragment, CompileError> {
        let start = self.graph.add_state();
        let accept = self.graph.add_state();
        for child in children {
            let branch = self.child(child)?;
            self.graph.add_epsilon(start, branch.start);
            self.graph.add_epsilon(branch.accept, accept);
        }
        Ok(Fragment { start, accept })
    }

    /// A negated node: one arc that consumes a token none of its symbols match.
    fn exclusion(&mut self, expr: &Expression) -> Result<Fragment, CompileError> {
        let symbols = expr.choice_symbols().ok_or(CompileError::NegatedCompound)?;
        let mut atoms = Vec::with_capacity(symbols.len());
        for sym in symbols {
            match self.label(sym)? {
                Label::Match(atom) => atoms.push(atom),
                _ => return Err(CompileError::NegatedCompound),
            }
        }
        Ok(self.arc_fragment(Label::Exclude(atoms)))
    }

    fn label(&self, sym: &Symbol) -> Result<Label<T>, CompileError> {
        let atom = match sym {
            Symbol::Epsilon => return Ok(Label::Epsilon),
            Symbol::Boundary => return Err(CompileError::MisplacedBoundary),
            Symbol::Wildcard => Atom::Wildcard,
            Symbol::Start => Atom::Start,
            Symbol::End => Atom::End,
            Symbol::Literal(text) => match self.specials.lookup(text) {
                Some(id) if self.specials.expansions(id).is_empty() => {
                    return Err(CompileError::UnresolvedMacro(text.clone()));
                }
                Some(id) => Atom::Macro(id),
                None => {
                    let literal = T::from_literal(text);
                    Atom::Literal(match self.direction {
                        Direction::Forward => literal,
                        Direction::Backward => literal.reversed(),
                    })
                }
            },
        };
        Ok(Label::Match(atom))
    }

    fn arc_fragment(&mut self, label: Label<T>) -> Fragment {
        let start = self.graph.add_state();
        let accept = self.graph.add_state();
        self.graph.add_arc(start, label, accept);
        Fragment { start, accept }
    }

    fn quantify(&mut self, inner: Fragment, quantifier: Quantifier) -> Fragment {
        if quantifier == Quantifier::None {
            return inner;
        }
        let start = self.graph.add_state();
        let accept = self.graph.add_state();
        self.graph.add_epsilon(start, inner.start);
        self.graph.add_epsilon(inner.accept, accept);
        if matches!(quantifier, Quantifier::Optional | Quantifier::ZeroOrMore) {
            self.graph.add_epsilon(start, accept);
        }
        if matches!(quantifier, Quantifier::ZeroOrMore | Quantifier::OneOrMore) {
            self.graph.add_epsilon(inner.accept, inner.start);
        }
        Fragment { start, accept }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternParser, parse};
    use crate::token::Text;

    fn compile_str(pattern: &str) -> Compiled<Text> {
        let tree = parse(pattern, Direction::Forward).unwrap();
        compile(&tree, &Specials::new(), Direction::Forward).unwrap()
    }

    #[test]
    fn terminal_is_one_arc() {
        let c = compile_str("a");
        let m = &c.machine;
        assert_eq!(m.graph.len(), 2);
        let arcs = m.graph.arcs(m.start);
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].label, Label::Match(Atom::Literal(Text::new("a"))));
        assert_eq!(arcs[0].target, m.accept);
    }

    #[test]
    fn empty_pattern_is_epsilon() {
        let c = compile_str("");
        let arcs = c.machine.graph.arcs(c.machine.start);
        assert!(arcs[0].label.is_epsilon());
    }

    #[test]
    fn sequence_joins_with_epsilon() {
        let c = compile_str("ab");
        let m = &c.machine;
        // two terminals, no extra states
        assert_eq!(m.graph.len(), 4);
        assert_eq!(m.graph.arc_count(), 3);
        assert!(c.groups.is_empty());
    }

    #[test]
    fn optional_adds_skip_but_no_loop() {
        let c = compile_str("a?");
        let m = &c.machine;
        let skip = m
            .graph
            .arcs(m.start)
            .iter()
            .any(|arc| arc.label.is_epsilon() && arc.target == m.accept);
        assert!(skip);
        assert_eq!(m.graph.arc_count(), 4);
    }

    #[test]
    fn plus_has_no_skip() {
        let c = compile_str("a+");
        let m = &c.machine;
        let skip = m
            .graph
            .arcs(m.start)
            .iter()
            .any(|arc| arc.target == m.accept);
        assert!(!skip);
    }

    #[test]
    fn groups_are_recorded_in_preorder() {
        let c = compile_str("(a{b c})(d)");
        let ids: Vec<_> = c.groups.keys().map(|g| g.index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        // g1 is the alternation inside g0
        let g1 = &c.groups[&GroupId(1)];
        assert_eq!(g1.graph.arcs(g1.start).len(), 2);
    }

    #[test]
    fn negation_compiles_to_exclusion() {
        let c = compile_str("!{a b}");
        let m = &c.machine;
        assert_eq!(
            m.graph.arcs(m.start)[0].label,
            Label::Exclude(vec![
                Atom::Literal(Text::new("a")),
                Atom::Literal(Text::new("b")),
            ])
        );
    }

    #[test]
    fn macro_keys_resolve_to_macro_atoms() {
        let specials = Specials::<Text>::new().with_literals("V", &["a", "e"]);
        let parser = PatternParser::new().with_macro_keys(specials.keys());
        let tree = parser.parse("V", Direction::Forward).unwrap();
        let c = compile(&tree, &specials, Direction::Forward).unwrap();
        let id = specials.lookup("V").unwrap();
        assert_eq!(
            c.machine.graph.arcs(c.machine.start)[0].label,
            Label::Match(Atom::Macro(id))
        );
    }

    #[test]
    fn empty_macro_is_unresolved() {
        let mut specials = Specials::<Text>::new();
        specials.insert("V", Vec::new());
        let parser = PatternParser::new().with_macro_keys(specials.keys());
        let tree = parser.parse("kV", Direction::Forward).unwrap();
        let err = compile(&tree, &specials, Direction::Forward).unwrap_err();
        assert_eq!(err, CompileError::UnresolvedMacro("V".into()));
    }

    #[test]
    fn backward_reverses_literals_and_macros() {
        let specials = Specials::<Text>::new().with_literals("D", &["ch"]);
        let parser = PatternParser::new()
            .with_special_symbols(["sh"])
            .with_macro_keys(specials.keys());
        let tree = parser.parse("sh", Direction::Backward).unwrap();
        let c = compile(&tree, &specials, Direction::Backward).unwrap();
        assert_eq!(
            c.machine.graph.arcs(c.machine.start)[0].label,
            Label::Match(Atom::Literal(Text::new("hs")))
        );
        assert_eq!(c.specials.get("D").unwrap(), &[Text::new("hc")]);
    }

    #[test]
    fn hand_built_trees_are_checked() {
        let stray = Expression::sequence(vec![
            Expression::literal("a"),
            Expression::terminal(Symbol::Boundary),
            Expression::literal("b"),
        ]);
        let err = compile::<Text>(&stray, &Specials::new(), Direction::Forward).unwrap_err();
        assert_eq!(err, CompileError::MisplacedBoundary);

        let compound =
            Expression::sequence(vec![Expression::literal("a"), Expression::literal("b")]).negated();
        let err = compile::<Text>(&compound, &Specials::new(), Direction::Forward).unwrap_err();
        assert_eq!(err, CompileError::NegatedCompound);
    }
}
