//! Macro classes: named sets of alternative token sequences.
//!
//! A key registered here may appear in a pattern wherever a literal symbol can.
//! At match time each expansion is tried in declaration order and the first
//! one that fits wins.

use crate::token::Token;

/// Index of a macro key within a [`Specials`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(usize);

impl MacroId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Macro key to ordered expansions.
#[derive(Debug, Clone, PartialEq)]
pub struct Specials<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> Default for Specials<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Token> Specials<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`, replacing any earlier expansions for it.
    pub fn insert<I>(&mut self, key: impl Into<String>, expansions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let key = key.into();
        let expansions: Vec<T> = expansions.into_iter().collect();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = expansions,
            None => self.entries.push((key, expansions)),
        }
        self
    }

    /// Register `key` with expansions written as literal pattern fragments.
    pub fn insert_literals<S: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        literals: &[S],
    ) -> &mut Self {
        self.insert(key, literals.iter().map(|l| T::from_literal(l.as_ref())))
    }

    /// Builder-style [`insert_literals`](Self::insert_literals).
    pub fn with_literals<S: AsRef<str>>(mut self, key: impl Into<String>, literals: &[S]) -> Self {
        self.insert_literals(key, literals);
        self
    }

    pub fn lookup(&self, key: &str) -> Option<MacroId> {
        self.entries.iter().position(|(k, _)| k == key).map(MacroId)
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.lookup(key).map(|id| self.expansions(id))
    }

    /// Expansions for `id`, in declaration order.
    ///
    /// Returns an empty slice for an id from another table.
    pub fn expansions(&self, id: MacroId) -> &[T] {
        self.entries
            .get(id.0)
            .map(|(_, exps)| exps.as_slice())
            .unwrap_or(&[])
    }

    pub fn key(&self, id: MacroId) -> Option<&str> {
        self.entries.get(id.0).map(|(k, _)| k.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every expansion reversed, keys and declaration order unchanged.
    pub fn reversed(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, exps)| (k.clone(), exps.iter().map(Token::reversed).collect()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Text;

    #[test]
    fn insert_preserves_expansion_order() {
        let specials = Specials::<Text>::new().with_literals("V", &["a", "e", "ai"]);
        let exps = specials.get("V").unwrap();
        assert_eq!(exps, &[Text::new("a"), Text::new("e"), Text::new("ai")]);
    }

    #[test]
    fn reinsert_replaces() {
        let mut specials = Specials::<Text>::new();
        specials.insert_literals("C", &["p", "t"]);
        specials.insert_literals("C", &["k"]);
        assert_eq!(specials.len(), 1);
        assert_eq!(specials.get("C").unwrap(), &[Text::new("k")]);
    }

    #[test]
    fn lookup_ids_are_stable() {
        let specials = Specials::<Text>::new()
            .with_literals("C", &["p"])
            .with_literals("V", &["a"]);
        let v = specials.lookup("V").unwrap();
        assert_eq!(v.index(), 1);
        assert_eq!(specials.key(v), Some("V"));
        assert!(specials.lookup("X").is_none());
    }

    #[test]
    fn reversed_flips_each_expansion() {
        let specials = Specials::<Text>::new().with_literals("D", &["ch", "sh"]);
        let rev = specials.reversed();
        assert_eq!(rev.get("D").unwrap(), &[Text::new("hc"), Text::new("hs")]);
    }
}
