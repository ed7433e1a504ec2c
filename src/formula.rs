//! `Formula` is the tagged-variant algebra of signed analytic tableaux:
//! propositional atoms, predicates over variables, negation, the four
//! binary connectives, and the two quantifiers. There are no function
//! symbols or constants distinct from variables in this object language.
//!
//! Formulas are immutable once built and compared structurally: two
//! formulas built from unrelated parses are equal whenever their shape and
//! leaves match, which is what branch-closure and rule checks rely on.

use crate::intern::{Atom, Interner};
use crate::util::{new_set, HashSet};
use std::fmt;
use std::sync::Arc;
use tinyvec::TinyVec;

/// The binary connectives, ordered weakest-to-strongest precedence is
/// `Iff, Imp, Or, And` (see [`crate::fparser`]); all are right-associative.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinOp {
    And,
    Or,
    Imp,
    Iff,
}

impl BinOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Imp => "->",
            BinOp::Iff => "<->",
        }
    }

    #[must_use]
    pub const fn latex_symbol(self) -> &'static str {
        match self {
            BinOp::And => "\\land ",
            BinOp::Or => "\\lor ",
            BinOp::Imp => "\\rightarrow ",
            BinOp::Iff => "\\leftrightarrow ",
        }
    }
}

/// Universal or existential quantification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum QuantKind {
    ForAll,
    Exists,
}

/// The distinguished contradiction atom `⊥`, spelled `@` in scripts.
pub const BOTTOM: &str = "@";

/// An immutable, structurally-compared formula.
///
/// Predicate argument lists use a small inline buffer: real scripts almost
/// never pass more than a handful of variables to a predicate, so the
/// common case never touches the heap.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Formula {
    /// A propositional atom, or `⊥` when the name is [`BOTTOM`].
    Atom(Atom),
    /// A predicate applied to an ordered list of variables, arity >= 1.
    Predicate(Atom, TinyVec<[Atom; 4]>),
    Not(Arc<Formula>),
    Binary(BinOp, Arc<Formula>, Arc<Formula>),
    Quantifier(QuantKind, Atom, Arc<Formula>),
}

impl Formula {
    #[must_use]
    pub fn not(f: Formula) -> Self {
        Formula::Not(Arc::new(f))
    }

    #[must_use]
    pub fn binary(op: BinOp, left: Formula, right: Formula) -> Self {
        Formula::Binary(op, Arc::new(left), Arc::new(right))
    }

    #[must_use]
    pub fn quantifier(kind: QuantKind, var: Atom, body: Formula) -> Self {
        Formula::Quantifier(kind, var, Arc::new(body))
    }

    /// True for the distinguished contradiction atom `⊥`.
    #[must_use]
    pub fn is_bottom(&self, ns: &Interner) -> bool {
        matches!(self, Formula::Atom(a) if ns.name(*a) == BOTTOM)
    }

    #[must_use]
    pub fn is_first_order(&self) -> bool {
        match self {
            Formula::Atom(_) => false,
            Formula::Predicate(..) | Formula::Quantifier(..) => true,
            Formula::Not(f) => f.is_first_order(),
            Formula::Binary(_, l, r) => l.is_first_order() || r.is_first_order(),
        }
    }

    /// All variable occurrences, bound or free.
    #[must_use]
    pub fn all_vars(&self) -> HashSet<Atom> {
        let mut out = new_set();
        self.collect_all_vars(&mut out);
        out
    }

    fn collect_all_vars(&self, out: &mut HashSet<Atom>) {
        match self {
            Formula::Atom(_) => {}
            Formula::Predicate(_, args) => out.extend(args.iter().copied()),
            Formula::Not(f) => f.collect_all_vars(out),
            Formula::Binary(_, l, r) => {
                l.collect_all_vars(out);
                r.collect_all_vars(out);
            }
            Formula::Quantifier(_, v, body) => {
                out.insert(*v);
                body.collect_all_vars(out);
            }
        }
    }

    /// Free variable occurrences: `free_vars(Quantifier(k, x, phi)) = free_vars(phi) \ {x}`.
    #[must_use]
    pub fn free_vars(&self) -> HashSet<Atom> {
        match self {
            Formula::Atom(_) => new_set(),
            Formula::Predicate(_, args) => args.iter().copied().collect(),
            Formula::Not(f) => f.free_vars(),
            Formula::Binary(_, l, r) => {
                let mut out = l.free_vars();
                out.extend(r.free_vars());
                out
            }
            Formula::Quantifier(_, v, body) => {
                let mut out = body.free_vars();
                out.remove(v);
                out
            }
        }
    }

    /// `all_vars \ free_vars`.
    #[must_use]
    pub fn bound_vars(&self) -> HashSet<Atom> {
        let all = self.all_vars();
        let free = self.free_vars();
        all.into_iter().filter(|v| !free.contains(v)).collect()
    }

    /// Substitutes every free occurrence of `x` by the variable `t`.
    ///
    /// A quantifier binding `x` shadows the substitution below it and the
    /// recursion simply stops there; this does *not* check whether `t`
    /// would be captured by an inner quantifier binding `t` — callers that
    /// care must consult [`Formula::is_substitutable`] first. Preserved
    /// verbatim from the system this is modelled on.
    #[must_use]
    pub fn substitute(&self, x: Atom, t: Atom) -> Formula {
        match self {
            Formula::Atom(_) => self.clone(),
            Formula::Predicate(name, args) => {
                let new_args = args
                    .iter()
                    .map(|&v| if v == x { t } else { v })
                    .collect::<TinyVec<[Atom; 4]>>();
                Formula::Predicate(*name, new_args)
            }
            Formula::Not(f) => Formula::not(f.substitute(x, t)),
            Formula::Binary(op, l, r) => {
                Formula::binary(*op, l.substitute(x, t), r.substitute(x, t))
            }
            Formula::Quantifier(kind, v, body) => {
                if *v == x {
                    self.clone()
                } else {
                    Formula::quantifier(*kind, *v, body.substitute(x, t))
                }
            }
        }
    }

    /// True iff no free occurrence of `x` lies under a quantifier binding `t`.
    #[must_use]
    pub fn is_substitutable(&self, x: Atom, t: Atom) -> bool {
        match self {
            Formula::Atom(_) | Formula::Predicate(..) => true,
            Formula::Not(f) => f.is_substitutable(x, t),
            Formula::Binary(_, l, r) => l.is_substitutable(x, t) && r.is_substitutable(x, t),
            Formula::Quantifier(_, v, body) => {
                if *v == t && body.free_vars().contains(&x) {
                    return false;
                }
                body.is_substitutable(x, t)
            }
        }
    }

    /// True iff there exists a variable `t` (free in `g`) such that
    /// `g == self.body[self.var := t]`, where `self` must be a [`Formula::Quantifier`].
    ///
    /// This iterates the free variables of `g`, the candidate substitution
    /// result, rather than the free variables of the quantifier body — a
    /// narrower search than the name suggests, but it is what the source
    /// system this checker is modelled on actually does, and every
    /// `AllT`/`ExF`/`AllF`/`ExT` rule check depends on this exact behaviour.
    #[must_use]
    pub fn valid_substitution(&self, g: &Formula) -> bool {
        let Formula::Quantifier(_, var, body) = self else {
            return false;
        };
        g.free_vars()
            .into_iter()
            .any(|v| body.substitute(*var, v) == *g)
    }

    /// Walks `self` (a discharged quantifier's body) alongside `result` (the
    /// formula a rule claims to substitute into it), collecting whatever
    /// value occupies `var`'s position in `result` at every point `self`
    /// names `var` directly. A predicate position is the only source of a
    /// value: atoms contribute nothing, and any shape, connective or
    /// predicate-name/arity mismatch between `self` and `result` contributes
    /// nothing for that subformula either — the substitution is only read
    /// off where the two formulas actually line up.
    #[must_use]
    pub fn substituted_vars(&self, var: Atom, result: &Formula) -> HashSet<Atom> {
        match (self, result) {
            (Formula::Predicate(name, args), Formula::Predicate(name2, args2))
                if name == name2 && args.len() == args2.len() =>
            {
                args.iter()
                    .zip(args2.iter())
                    .filter(|(a, _)| **a == var)
                    .map(|(_, b)| *b)
                    .collect()
            }
            (Formula::Not(f), Formula::Not(g)) => f.substituted_vars(var, g),
            (Formula::Binary(op, l, r), Formula::Binary(op2, l2, r2)) if op == op2 => {
                let mut out = l.substituted_vars(var, l2);
                out.extend(r.substituted_vars(var, r2));
                out
            }
            (Formula::Quantifier(kind, _, body), Formula::Quantifier(kind2, _, body2))
                if kind == kind2 =>
            {
                body.substituted_vars(var, body2)
            }
            _ => new_set(),
        }
    }

    /// Renders this formula in infix notation. Nested binary subformulas are
    /// always parenthesized, which keeps `parse(print(formula)) == formula`
    /// true regardless of the right-associative precedence rules used when
    /// parsing.
    #[must_use]
    pub fn render<'a>(&'a self, ns: &'a Interner) -> Print<'a> {
        Print { formula: self, ns }
    }

    #[must_use]
    pub fn render_latex<'a>(&'a self, ns: &'a Interner) -> Latex<'a> {
        Latex { formula: self, ns }
    }
}

fn sub_string(f: &Formula, ns: &Interner) -> String {
    match f {
        Formula::Binary(..) => format!("({})", f.render(ns)),
        _ => format!("{}", f.render(ns)),
    }
}

fn sub_latex(f: &Formula, ns: &Interner) -> String {
    match f {
        Formula::Binary(..) => format!("({})", f.render_latex(ns)),
        _ => format!("{}", f.render_latex(ns)),
    }
}

/// Display wrapper pairing a [`Formula`] with the [`Interner`] needed to
/// resolve its atoms back to source names.
pub struct Print<'a> {
    formula: &'a Formula,
    ns: &'a Interner,
}

impl fmt::Display for Print<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formula {
            Formula::Atom(a) => write!(f, "{}", self.ns.name(*a)),
            Formula::Predicate(name, args) => {
                write!(f, "{}(", self.ns.name(*name))?;
                for (i, v) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", self.ns.name(*v))?;
                }
                write!(f, ")")
            }
            Formula::Not(inner) => write!(f, "~{}", sub_string(inner, self.ns)),
            Formula::Binary(op, l, r) => write!(
                f,
                "{}{}{}",
                sub_string(l, self.ns),
                op.symbol(),
                sub_string(r, self.ns)
            ),
            Formula::Quantifier(kind, v, body) => {
                let letter = match kind {
                    QuantKind::ForAll => 'A',
                    QuantKind::Exists => 'E',
                };
                write!(f, "{letter}{} {}", self.ns.name(*v), sub_string(body, self.ns))
            }
        }
    }
}

/// LaTeX rendering wrapper; see [`Print`].
pub struct Latex<'a> {
    formula: &'a Formula,
    ns: &'a Interner,
}

impl fmt::Display for Latex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formula {
            Formula::Atom(a) if self.ns.name(*a) == BOTTOM => write!(f, "\\bot"),
            Formula::Atom(a) => write!(f, "{}", self.ns.name(*a)),
            Formula::Predicate(name, args) => {
                write!(f, "{}(", self.ns.name(*name))?;
                for (i, v) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", self.ns.name(*v))?;
                }
                write!(f, ")")
            }
            Formula::Not(inner) => write!(f, "\\lnot {}", sub_latex(inner, self.ns)),
            Formula::Binary(op, l, r) => write!(
                f,
                "{}{}{}",
                sub_latex(l, self.ns),
                op.latex_symbol(),
                sub_latex(r, self.ns)
            ),
            Formula::Quantifier(kind, v, body) => {
                let name = match kind {
                    QuantKind::ForAll => "\\forall",
                    QuantKind::Exists => "\\exists",
                };
                write!(f, "{name} {} {}", self.ns.name(*v), sub_latex(body, self.ns))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fparser::parse_formula;
    use crate::lexer::tokenize;

    fn parse(ns: &mut Interner, s: &str) -> Formula {
        let toks = tokenize(s.as_bytes(), ns).unwrap();
        parse_formula(&toks, ns).unwrap()
    }

    #[test]
    fn free_vars_strips_the_bound_variable() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "Ax P(x)");
        let x = ns.intern("x");
        assert!(!f.free_vars().contains(&x));
        assert!(f.all_vars().contains(&x));
    }

    #[test]
    fn substitute_identity_on_absent_variable() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "P(x)");
        let y = ns.intern("y");
        let x = ns.intern("x");
        assert_eq!(f.substitute(y, x), f);
    }

    #[test]
    fn substitute_self_is_identity() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "P(x)");
        let x = ns.intern("x");
        assert_eq!(f.substitute(x, x), f);
    }

    #[test]
    fn substituted_vars_reads_off_the_quantifier_position() {
        let mut ns = Interner::new();
        let body = parse(&mut ns, "P(x)");
        let result = parse(&mut ns, "P(x)");
        let x = ns.intern("x");
        assert_eq!(body.substituted_vars(x, &result), [x].into_iter().collect());
    }

    #[test]
    fn substituted_vars_is_empty_when_the_variable_is_unused() {
        let mut ns = Interner::new();
        let body = parse(&mut ns, "P(y)");
        let result = parse(&mut ns, "P(y)");
        let x = ns.intern("x");
        assert!(body.substituted_vars(x, &result).is_empty());
    }

    #[test]
    fn roundtrip_through_print_and_parse() {
        let mut ns = Interner::new();
        for src in ["A&B", "A->B->C", "Ax Ex P(x,y)", "~(A|B)"] {
            let f = parse(&mut ns, src);
            let printed = f.render(&ns).to_string();
            let reparsed = parse(&mut ns, &printed);
            assert_eq!(f, reparsed, "roundtrip failed for {src} -> {printed}");
        }
    }

    #[test]
    fn right_associative_implication() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "A->B->C");
        let Formula::Binary(BinOp::Imp, _, r) = &f else {
            panic!("expected top-level ->")
        };
        assert!(matches!(**r, Formula::Binary(BinOp::Imp, ..)));
    }
}
