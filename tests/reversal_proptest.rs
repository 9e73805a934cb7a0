//! Property-based tests for tree reversal and direction symmetry.
//!
//! Patterns are generated structurally over the alphabet `a b c` so that every
//! generated string is well-formed.

use proptest::prelude::*;
use seqmatch::pattern::{Direction, parse};
use seqmatch::{Automaton, Text, Token};

fn leaf_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just(".".to_string()),
        Just("!a".to_string()),
        Just("!{b c}".to_string()),
    ]
}

fn quantifier_strategy() -> impl Strategy<Value = &'static str> + Clone {
    prop_oneof![Just(""), Just(""), Just("?"), Just("*"), Just("+")]
}

/// A sequence of quantified items, possibly containing nested groups.
fn sequence_strategy() -> impl Strategy<Value = String> {
    let item = leaf_strategy().prop_recursive(3, 16, 3, |inner| {
        let items = prop::collection::vec(
            (inner, quantifier_strategy()).prop_map(|(i, q)| format!("{i}{q}")),
            1..3,
        );
        prop_oneof![
            items.clone().prop_map(|v| format!("({})", v.concat())),
            prop::collection::vec(items.prop_map(|v| v.concat()), 1..3)
                .prop_map(|branches| format!("{{{}}}", branches.join(" "))),
        ]
    });
    prop::collection::vec(
        (item, quantifier_strategy()).prop_map(|(i, q)| format!("{i}{q}")),
        1..4,
    )
    .prop_map(|v| v.concat())
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    (any::<bool>(), sequence_strategy(), any::<bool>()).prop_map(|(start, body, end)| {
        format!(
            "{}{body}{}",
            if start { "#" } else { "" },
            if end { "#" } else { "" }
        )
    })
}

proptest! {
    #[test]
    fn reverse_twice_is_identity(pattern in pattern_strategy()) {
        let tree = parse(&pattern, Direction::Forward).unwrap();
        prop_assert_eq!(tree.reverse().reverse(), tree);
    }

    #[test]
    fn backward_parse_is_reverse_of_forward(pattern in pattern_strategy()) {
        let forward = parse(&pattern, Direction::Forward).unwrap();
        let backward = parse(&pattern, Direction::Backward).unwrap();
        prop_assert_eq!(forward.reverse(), backward);
    }

    #[test]
    fn display_reparses_to_same_tree(pattern in pattern_strategy()) {
        let tree = parse(&pattern, Direction::Forward).unwrap();
        let again = parse(&tree.to_string(), Direction::Forward).unwrap();
        prop_assert_eq!(again, tree);
    }

    #[test]
    fn full_match_is_direction_independent(
        pattern in pattern_strategy(),
        input in "[abc]{0,6}",
    ) {
        let forward = Automaton::<Text>::new(&pattern).unwrap();
        let backward = Automaton::<Text>::builder(&pattern).backward().build().unwrap();
        let text = Text::new(&input);
        prop_assert_eq!(
            forward.full_match(&text),
            backward.full_match(&text.reversed())
        );
    }

    #[test]
    fn ends_lie_within_input(
        pattern in pattern_strategy(),
        input in "[abc]{0,6}",
    ) {
        let automaton = Automaton::<Text>::new(&pattern).unwrap();
        let text = Text::new(&input);
        for start in 0..=text.len() {
            for end in automaton.find(&text, start) {
                prop_assert!(start <= end && end <= text.len());
            }
        }
    }
}
