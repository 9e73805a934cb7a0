//! Decides how far one atom advances through the input.
//!
//! All positions are token indices. The matcher knows nothing about negation;
//! see [`Label::step`](super::graph::Label::step).

use crate::specials::Specials;
use crate::token::Token;

use super::graph::Atom;

/// Try to match `atom` at `index`. Returns the index after the match.
///
/// Macro expansions are tried in declaration order and the first that fits
/// wins, even if a later one is longer.
pub fn advance<T: Token>(
    input: &T,
    atom: &Atom<T>,
    index: usize,
    specials: &Specials<T>,
) -> Option<usize> {
    match atom {
        Atom::Macro(id) => specials
            .expansions(*id)
            .iter()
            .find(|exp| input.starts_with_at(index, exp))
            .map(|exp| index + exp.len()),
        Atom::Start => (index == 0).then_some(index),
        Atom::End => (index == input.len()).then_some(index),
        Atom::Wildcard => {
            (index < input.len() && !input.is_boundary_at(index)).then_some(index + 1)
        }
        Atom::Literal(lit) => input
            .starts_with_at(index, lit)
            .then(|| index + lit.len()),
    }
}
