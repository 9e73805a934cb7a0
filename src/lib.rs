//! Pattern matching over pluggable token sequences.
//!
//! Patterns are parsed into an [`Expression`] tree, compiled into a
//! non-deterministic automaton, and simulated to find *every* index at which a
//! match can end. Tokens need not be characters: any type implementing
//! [`Token`] works, such as [`Segments`] of multi-character phonetic symbols.
//!
//! # Example
//!
//! ```rust
//! use seqmatch::{Automaton, Segments, Specials};
//!
//! let specials = Specials::<Segments>::new()
//!     .with_literals("V", &["a", "e", "aɪ"])
//!     .with_literals("C", &["tʃ", "k", "t"]);
//!
//! let syllable = Automaton::builder("#C?V+").specials(specials).build().unwrap();
//!
//! assert!(syllable.matches(&Segments::parse("tʃ aɪ")));
//! assert!(syllable.matches(&Segments::parse("e")));
//! assert!(!syllable.matches(&Segments::parse("k k a")));
//! ```

pub mod automaton;
pub mod pattern;
mod specials;
mod token;

pub use automaton::{Automaton, AutomatonBuilder, BuildError, CompileError, GroupId};
pub use pattern::{Direction, Expression, PatternError, PatternParser};
pub use specials::{MacroId, Specials};
pub use token::{Segments, Text, Token};
