//! Breadth-first simulation of a [`StateMachine`] over an input.
//!
//! The engine does not pick a winner. It walks every `(state, index)` pair
//! reachable from the start and reports every index at which the accepting
//! state is reached.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::trace;

use crate::specials::Specials;
use crate::token::Token;

use super::graph::{StateId, StateMachine};

/// Every end index of a match of `machine` that begins at `start_index`.
///
/// An empty set means no match from this index. A `start_index` past the end
/// of the input yields an empty set.
pub fn find_match_ends<T: Token>(
    machine: &StateMachine<T>,
    specials: &Specials<T>,
    input: &T,
    start_index: usize,
) -> BTreeSet<usize> {
    let mut ends = BTreeSet::new();
    if start_index > input.len() {
        return ends;
    }

    let mut visited: HashSet<(StateId, usize)> = HashSet::new();
    let mut frontier = VecDeque::new();
    visited.insert((machine.start, start_index));
    frontier.push_back((machine.start, start_index));

    while let Some((state, index)) = frontier.pop_front() {
        if state == machine.accept {
            ends.insert(index);
        }
        for arc in machine.graph.arcs(state) {
            let Some(next) = arc.label.step(input, index, specials) else {
                continue;
            };
            if visited.insert((arc.target, next)) {
                frontier.push_back((arc.target, next));
            }
        }
    }

    trace!(start_index, visited = visited.len(), ends = ends.len(), "match simulated");
    ends
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::compiler::compile;
    use crate::pattern::{Direction, parse};
    use crate::token::Text;

    fn ends(pattern: &str, input: &str, start: usize) -> Vec<usize> {
        let tree = parse(pattern, Direction::Forward).unwrap();
        let compiled = compile::<Text>(&tree, &Specials::new(), Direction::Forward).unwrap();
        find_match_ends(&compiled.machine, &compiled.specials, &Text::new(input), start)
            .into_iter()
            .collect()
    }

    #[test]
    fn literal_single_end() {
        assert_eq!(ends("ab", "abc", 0), vec![2]);
        assert_eq!(ends("ab", "abc", 1), Vec::<usize>::new());
    }

    #[test]
    fn star_reports_every_length() {
        assert_eq!(ends("a*", "aaab", 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn plus_requires_one() {
        assert_eq!(ends("a+", "aa", 0), vec![1, 2]);
        assert_eq!(ends("a+", "b", 0), Vec::<usize>::new());
    }

    #[test]
    fn optional_group() {
        assert_eq!(ends("a(bc)?", "abcd", 0), vec![1, 3]);
    }

    #[test]
    fn start_offset() {
        assert_eq!(ends("b+", "abbb", 1), vec![2, 3, 4]);
    }

    #[test]
    fn start_past_end_is_empty() {
        assert!(ends("a*", "a", 2).is_empty());
    }

    #[test]
    fn nested_loops_terminate() {
        // epsilon cycles through both loops
        assert_eq!(ends("(a*)*", "aa", 0), vec![0, 1, 2]);
        assert_eq!(ends("((a?)+)*b", "aab", 0), vec![3]);
    }

    #[test]
    fn skip_cannot_escape_a_loop() {
        // "aa" alone must not satisfy (a*b)?: only 0 or a full "a*b"
        assert_eq!(ends("(a*b)?", "aa", 0), vec![0]);
        assert_eq!(ends("(a*b)?", "aab", 0), vec![0, 3]);
    }

    #[test]
    fn alternation_branches_of_different_width() {
        assert_eq!(ends("{a ab abc}", "abcd", 0), vec![1, 2, 3]);
    }

    #[test]
    fn negated_symbol_consumes_one() {
        assert_eq!(ends("!a", "b", 0), vec![1]);
        assert_eq!(ends("!a", "a", 0), Vec::<usize>::new());
        assert_eq!(ends("!a", "", 0), Vec::<usize>::new());
        assert_eq!(ends("!{a b}c", "xc", 0), vec![2]);
        assert_eq!(ends("!{a b}*", "xyb", 0), vec![0, 1, 2]);
    }

    #[test]
    fn anchors() {
        assert_eq!(ends("#a", "ab", 0), vec![1]);
        assert_eq!(ends("#a", "ba", 1), Vec::<usize>::new());
        assert_eq!(ends("a#", "a", 0), vec![1]);
        assert_eq!(ends("a#", "ab", 0), Vec::<usize>::new());
    }
}
