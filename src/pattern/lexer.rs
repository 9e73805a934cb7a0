//! Splits pattern strings into lexemes.

use itertools::Itertools;
use phf::{Map, phf_map};

use super::ast::Quantifier;
use super::parser::PatternError;

/// Bracket pair around a subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `( … )`: children in sequence.
    Paren,
    /// `{ … }`: whitespace-separated alternatives.
    Brace,
}

impl Delimiter {
    pub fn open(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Brace => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reserved {
    Wildcard,
    Boundary,
    Negation,
    Quantifier(Quantifier),
    Open(Delimiter),
    Close(Delimiter),
}

const RESERVED: Map<char, Reserved> = phf_map! {
    '.' => Reserved::Wildcard,
    '#' => Reserved::Boundary,
    '!' => Reserved::Negation,
    '?' => Reserved::Quantifier(Quantifier::Optional),
    '*' => Reserved::Quantifier(Quantifier::ZeroOrMore),
    '+' => Reserved::Quantifier(Quantifier::OneOrMore),
    '(' => Reserved::Open(Delimiter::Paren),
    ')' => Reserved::Close(Delimiter::Paren),
    '{' => Reserved::Open(Delimiter::Brace),
    '}' => Reserved::Close(Delimiter::Brace),
};

/// One unit of pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme<'a> {
    /// A literal symbol: a declared multi-character special, a macro key, or a
    /// single character.
    Symbol(&'a str),
    Wildcard,
    Boundary,
    Negation,
    Quantifier(Quantifier),
    /// A bracketed subgroup with its delimiters stripped.
    Group(Delimiter, &'a str),
}

/// Iterator over the lexemes of one nesting level.
///
/// `symbols` must be sorted longest first so the greediest special wins.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    symbols: &'a [String],
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, symbols: &'a [String]) -> Self {
        Self {
            src,
            pos: 0,
            symbols,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_space(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume a bracketed group whose opening delimiter starts at `self.pos`.
    fn group(&mut self, delim: Delimiter) -> Result<Lexeme<'a>, PatternError> {
        let src = self.src;
        let body_start = self.pos + delim.open().len_utf8();
        let mut stack = vec![delim];
        for (offset, c) in src[body_start..].char_indices() {
            match RESERVED.get(&c) {
                Some(Reserved::Open(inner)) => stack.push(*inner),
                Some(Reserved::Close(inner)) => {
                    if stack.last() != Some(inner) {
                        return Err(PatternError::UnexpectedClose(c));
                    }
                    stack.pop();
                    if stack.is_empty() {
                        let body_end = body_start + offset;
                        self.pos = body_end + c.len_utf8();
                        return Ok(Lexeme::Group(delim, &src[body_start..body_end]));
                    }
                }
                _ => {}
            }
        }
        let innermost = stack.last().copied().unwrap_or(delim);
        Err(PatternError::UnclosedGroup(innermost.open()))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme<'a>, PatternError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_space();
        let rest = self.rest();
        let c = rest.chars().next()?;

        if let Some(symbol) = self.symbols.iter().find(|s| rest.starts_with(s.as_str())) {
            self.pos += symbol.len();
            return Some(Ok(Lexeme::Symbol(&rest[..symbol.len()])));
        }

        let lexeme = match RESERVED.get(&c) {
            Some(Reserved::Open(delim)) => return Some(self.group(*delim)),
            Some(Reserved::Close(_)) => return Some(Err(PatternError::UnexpectedClose(c))),
            Some(Reserved::Wildcard) => Lexeme::Wildcard,
            Some(Reserved::Boundary) => Lexeme::Boundary,
            Some(Reserved::Negation) => Lexeme::Negation,
            Some(Reserved::Quantifier(q)) => Lexeme::Quantifier(*q),
            None => Lexeme::Symbol(&rest[..c.len_utf8()]),
        };
        self.pos += c.len_utf8();
        Some(Ok(lexeme))
    }
}

/// Reject illegal adjacent symbol pairs anywhere in the raw pattern.
pub fn check_adjacency(pattern: &str) -> Result<(), PatternError> {
    for (a, b) in pattern.chars().tuple_windows() {
        let b_quantifier = Quantifier::from_char(b).is_some();
        match a {
            '!' if b == '!' => return Err(PatternError::DoubleNegation),
            '!' if b == '#' => return Err(PatternError::NegatedBoundary),
            '!' if b_quantifier => return Err(PatternError::NegatedQuantifier),
            '#' if b_quantifier => return Err(PatternError::QuantifiedBoundary),
            _ if b_quantifier && Quantifier::from_char(a).is_some() => {
                return Err(PatternError::StackedQuantifiers);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Split an alternation body on whitespace outside nested brackets.
///
/// The body must already be bracket-balanced.
pub fn split_alternatives(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in body.char_indices() {
        match RESERVED.get(&c) {
            Some(Reserved::Open(_)) => depth += 1,
            Some(Reserved::Close(_)) => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                parts.push(&body[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&body[s..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Lexeme<'_>> {
        Lexer::new(src, &[]).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn single_characters() {
        assert_eq!(
            lex("a.!b?"),
            vec![
                Lexeme::Symbol("a"),
                Lexeme::Wildcard,
                Lexeme::Negation,
                Lexeme::Symbol("b"),
                Lexeme::Quantifier(Quantifier::Optional),
            ]
        );
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(lex("  a  b "), vec![Lexeme::Symbol("a"), Lexeme::Symbol("b")]);
    }

    #[test]
    fn groups_are_atomic() {
        assert_eq!(
            lex("(a{b c})+x"),
            vec![
                Lexeme::Group(Delimiter::Paren, "a{b c}"),
                Lexeme::Quantifier(Quantifier::OneOrMore),
                Lexeme::Symbol("x"),
            ]
        );
    }

    #[test]
    fn specials_are_greedy() {
        let symbols = vec!["tʃ".to_string(), "t".to_string()];
        let lexemes: Vec<_> = Lexer::new("tʃat", &symbols)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            lexemes,
            vec![Lexeme::Symbol("tʃ"), Lexeme::Symbol("a"), Lexeme::Symbol("t")]
        );
    }

    #[test]
    fn unclosed_group() {
        let err = Lexer::new("(a", &[]).next().unwrap().unwrap_err();
        assert_eq!(err, PatternError::UnclosedGroup('('));
        let err = Lexer::new("{a(b)", &[]).next().unwrap().unwrap_err();
        assert_eq!(err, PatternError::UnclosedGroup('{'));
    }

    #[test]
    fn mismatched_close() {
        let err = Lexer::new("(a}", &[]).next().unwrap().unwrap_err();
        assert_eq!(err, PatternError::UnexpectedClose('}'));
        let err = Lexer::new(")", &[]).next().unwrap().unwrap_err();
        assert_eq!(err, PatternError::UnexpectedClose(')'));
    }

    #[test]
    fn adjacency_rules() {
        assert_eq!(check_adjacency("a!!b"), Err(PatternError::DoubleNegation));
        assert_eq!(check_adjacency("!*a"), Err(PatternError::NegatedQuantifier));
        assert_eq!(check_adjacency("a*?"), Err(PatternError::StackedQuantifiers));
        assert_eq!(check_adjacency("a+?"), Err(PatternError::StackedQuantifiers));
        assert_eq!(check_adjacency("a#?"), Err(PatternError::QuantifiedBoundary));
        assert_eq!(check_adjacency("#*a"), Err(PatternError::QuantifiedBoundary));
        assert_eq!(check_adjacency("!#a"), Err(PatternError::NegatedBoundary));
        assert_eq!(check_adjacency("#!a*(bc)?#"), Ok(()));
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(split_alternatives(" a (b c) {d e}f "), vec!["a", "(b c)", "{d e}f"]);
        assert!(split_alternatives("   ").is_empty());
    }

    #[test]
    fn reserved_table() {
        assert_eq!(RESERVED.get(&'#'), Some(&Reserved::Boundary));
        assert_eq!(RESERVED.get(&'}'), Some(&Reserved::Close(Delimiter::Brace)));
        assert!(RESERVED.get(&'a').is_none());
    }
}
