//! Branch analysis: classifies each leaf branch as closed, saturated-open
//! or unsaturated-open, extracts countermodels, and folds the leaves into
//! one verdict.
//!
//! Grounded on `anita`'s `SymbolTable.get_open_saturated_branches`: a rule
//! is "used" when some later visible rule cites it as a reference, and
//! `Closed` lines, propositional atoms and predicates are exempt from that
//! requirement. A branch touching any first-order formula is conservatively
//! never saturated — quantifier rules are never declared exhausted.

use crate::formula::Formula;
use crate::intern::{Atom, Interner};
use crate::lexer::Sign;
use crate::rule::{Rule, RuleKind};
use crate::tableau::{BranchId, Tableau};
use crate::util::{new_set, HashSet};

/// One leaf's classification after decomposition is exhausted (or not).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafStatus {
    Closed,
    SaturatedOpen,
    UnsaturatedOpen,
}

/// A truth assignment read off a saturated open branch's signed atoms.
pub type Countermodel = Vec<(String, Sign)>;

#[derive(Clone, Debug)]
pub struct LeafReport {
    pub branch: BranchId,
    pub status: LeafStatus,
    /// Every rule visible from this leaf, root-to-leaf.
    pub rules: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every leaf closed, and no diagnostics were raised anywhere in the script.
    Valid,
    /// At least one leaf is saturated and open: the theorem is not a
    /// consequence of the premises. One countermodel per such leaf.
    Invalid { countermodels: Vec<Countermodel> },
    /// No leaf is saturated-open, but at least one leaf remains
    /// unsaturated: the proof neither closes nor witnesses invalidity yet.
    Incomplete { open_leaves: Vec<Vec<u32>> },
}

/// Rules exempt from the "has this reference been used" requirement:
/// `Closed` lines never get re-cited, and atoms/predicates have no
/// primitive decomposition rule to apply.
fn exempt_from_saturation(rule: &Rule) -> bool {
    matches!(rule.kind, RuleKind::Closed)
        || matches!(rule.formula, Formula::Atom(_) | Formula::Predicate(..))
}

fn branch_has_contradiction(rules: &[&Rule]) -> bool {
    for (i, a) in rules.iter().enumerate() {
        for b in &rules[i + 1..] {
            if a.formula == b.formula && a.sign.is_some() && a.sign != b.sign {
                return true;
            }
        }
    }
    false
}

fn branch_is_saturated(rules: &[&Rule]) -> bool {
    rules.iter().all(|rule| {
        if exempt_from_saturation(rule) {
            return true;
        }
        rules
            .iter()
            .any(|other| other.ref1 == Some(rule.line) || other.ref2 == Some(rule.line))
    })
}

fn is_first_order_branch(rules: &[&Rule]) -> bool {
    rules.iter().any(|r| r.formula.is_first_order())
}

fn countermodel(rules: &[&Rule], ns: &Interner) -> Countermodel {
    let mut assignment: Vec<(String, Sign)> = Vec::new();
    let mut seen: HashSet<Atom> = new_set();
    for rule in rules {
        if let (Formula::Atom(name), Some(sign)) = (&rule.formula, rule.sign) {
            if seen.insert(*name) {
                assignment.push((ns.name(*name).to_string(), sign));
            }
        }
    }
    assignment.sort_by(|a, b| a.0.cmp(&b.0));
    assignment
}

/// Rules visible from `leaf`, in root-to-leaf order (ancestors first).
fn visible_root_to_leaf<'a>(tableau: &'a Tableau, leaf: BranchId) -> Vec<&'a Rule> {
    let mut chain = Vec::new();
    let mut cur = Some(leaf);
    while let Some(id) = cur {
        let b = tableau.branch(id);
        chain.push(b);
        cur = b.parent;
    }
    chain.reverse();
    chain
        .into_iter()
        .flat_map(|b| b.lines.iter().map(|l| &tableau.rules[l]))
        .collect()
}

/// Classifies every leaf branch per §4.6.
#[must_use]
pub fn analyse_leaves(tableau: &Tableau, ns: &Interner) -> Vec<LeafReport> {
    tableau
        .leaves()
        .into_iter()
        .map(|leaf| {
            let rules = visible_root_to_leaf(tableau, leaf);
            let line_nums: Vec<u32> = rules.iter().map(|r| r.line).collect();
            let last_is_closed = rules.last().is_some_and(|r| r.kind == RuleKind::Closed);
            let status = if last_is_closed {
                LeafStatus::Closed
            } else if is_first_order_branch(&rules) {
                LeafStatus::UnsaturatedOpen
            } else if branch_is_saturated(&rules) && !branch_has_contradiction(&rules) {
                LeafStatus::SaturatedOpen
            } else {
                LeafStatus::UnsaturatedOpen
            };
            LeafReport {
                branch: leaf,
                status,
                rules: line_nums,
            }
        })
        .collect()
}

/// Folds every leaf's classification into one script-level verdict,
/// per the aggregation rule of §4.6. `diagnostics_empty` gates `Valid`:
/// a script with outstanding structural or rule diagnostics is never
/// reported valid even when every leaf happens to close.
#[must_use]
pub fn verdict(tableau: &Tableau, ns: &Interner, diagnostics_empty: bool) -> Verdict {
    let leaves = analyse_leaves(tableau, ns);
    if diagnostics_empty && leaves.iter().all(|l| l.status == LeafStatus::Closed) {
        return Verdict::Valid;
    }

    let saturated: Vec<&LeafReport> = leaves
        .iter()
        .filter(|l| l.status == LeafStatus::SaturatedOpen)
        .collect();
    if !saturated.is_empty() {
        let countermodels = saturated
            .iter()
            .map(|l| {
                let rules = visible_root_to_leaf(tableau, l.branch);
                countermodel(&rules, ns)
            })
            .collect();
        return Verdict::Invalid { countermodels };
    }

    let open_leaves = leaves
        .iter()
        .filter(|l| l.status == LeafStatus::UnsaturatedOpen)
        .map(|l| l.rules.clone())
        .collect();
    Verdict::Incomplete { open_leaves }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tableau::build;

    fn analyse(src: &str) -> (Verdict, Vec<crate::diag::Diagnostic>) {
        let mut ns = Interner::new();
        let (tableau, mut diags) = build(src.as_bytes(), &mut ns).unwrap();
        diags.extend(crate::validate::validate(&tableau, &ns));
        let v = verdict(&tableau, &ns, diags.is_empty());
        (v, diags)
    }

    const VALID_PROOF: &str = "1. T A->B pre\n\
         2. T A pre\n\
         3. F B conclusion\n\
         4. { F A ->T 1\n\
         5. @ closed 2,4\n\
         }\n\
         6. { T B ->T 1\n\
         7. @ closed 3,6\n\
         }";

    #[test]
    fn every_leaf_closed_is_valid() {
        let (v, diags) = analyse(VALID_PROOF);
        assert!(diags.is_empty());
        assert_eq!(v, Verdict::Valid);
    }

    #[test]
    fn saturated_open_branch_yields_countermodel() {
        let src = "1. T A|B pre\n\
                   2. F A&B conclusion\n\
                   3. { T A |T 1\n\
                   }\n\
                   4. { T B |T 1\n\
                   }";
        let (v, _) = analyse(src);
        let Verdict::Invalid { countermodels } = v else {
            panic!("expected Invalid, got {v:?}")
        };
        assert!(countermodels
            .iter()
            .any(|cm| cm.iter().any(|(name, sign)| name == "A" && *sign == Sign::T)));
    }

    #[test]
    fn unclosed_alpha_only_branch_is_incomplete() {
        let src = "1. T A&B pre\n2. F A conclusion";
        let (v, _) = analyse(src);
        assert!(matches!(v, Verdict::Incomplete { .. }));
    }

    #[test]
    fn first_order_branch_is_never_saturated() {
        let src = "1. T Ax P(x) pre\n2. F P(y) conclusion";
        let (v, _) = analyse(src);
        assert!(matches!(v, Verdict::Incomplete { .. }));
    }

    #[test]
    fn diagnostics_block_valid_even_if_every_leaf_closes() {
        let src = "1. T A pre\n3. F A conclusion\n4. @ closed 1,3";
        let (v, diags) = analyse(src);
        assert!(!diags.is_empty());
        assert_ne!(v, Verdict::Valid);
    }
}
