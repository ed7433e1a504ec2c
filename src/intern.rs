//! Symbol interning for atom, predicate and variable names.
//!
//! Formulas are compared and hashed constantly during validation (every rule
//! check walks up the branch tree looking up prior formulas); interning
//! names once into a small [`Copy`] [`Atom`] makes every later comparison an
//! integer compare instead of a string compare, the same trade the teacher
//! crate makes for its own `nameck::Atom`.

use crate::util::{new_map, HashMap};

/// An interned name: a predicate, propositional atom, or variable symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Atom(u32);

/// Bidirectional name table. One [`Interner`] is shared by a whole proof
/// script; names are never removed once interned.
#[derive(Debug, Default)]
pub struct Interner {
    names: Vec<Box<str>>,
    lookup: HashMap<Box<str>, Atom>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Interner {
            names: Vec::new(),
            lookup: new_map(),
        }
    }

    /// Interns `name`, returning its existing [`Atom`] or allocating a new one.
    pub fn intern(&mut self, name: &str) -> Atom {
        if let Some(&atom) = self.lookup.get(name) {
            return atom;
        }
        let atom = Atom(self.names.len() as u32);
        self.names.push(name.into());
        self.lookup.insert(self.names[atom.0 as usize].clone(), atom);
        atom
    }

    /// Resolves an [`Atom`] back to its original string.
    #[must_use]
    pub fn name(&self, atom: Atom) -> &str {
        &self.names[atom.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_and_deduplicates() {
        let mut ns = Interner::new();
        let a = ns.intern("P");
        let b = ns.intern("Q");
        let a2 = ns.intern("P");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(ns.name(a), "P");
        assert_eq!(ns.name(b), "Q");
    }
}
