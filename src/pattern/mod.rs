//! Pattern language.
//!
//! # Pattern syntax
//!
//! | Token         | Meaning                                            |
//! |---------------|----------------------------------------------------|
//! | `a`           | A literal symbol (one character, unless declared)  |
//! | `.`           | Any one token that is not a boundary               |
//! | `#`           | Start of input (first) or end of input (last)      |
//! | `!X`          | One token where `X` does not match                 |
//! | `X?`          | Zero or one                                        |
//! | `X*`          | Zero or more                                       |
//! | `X+`          | One or more                                        |
//! | `(…)`         | Sequential group                                   |
//! | `{a b c}`     | Alternation, branches separated by whitespace      |
//!
//! Multi-character symbols and macro keys declared on the
//! [`PatternParser`] are kept whole.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Expression, Node, Quantifier, Symbol};
pub use parser::{Direction, PatternError, PatternParser, parse};
