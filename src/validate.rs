//! Per-line rule validation: reference order, visibility, and the
//! kind-specific shape checks from the rule table.
//!
//! Every line is visited exactly once per root-to-leaf path that contains
//! it; a line shared by several leaves (everything above the first branch
//! point) is therefore revisited once per leaf, and duplicate diagnostics
//! are collapsed by `(line, code)` before the result is returned, since a
//! check failing on a shared prefix fails identically for every leaf below.

use crate::diag::Diagnostic;
use crate::formula::{BinOp, Formula};
use crate::intern::{Atom, Interner};
use crate::lexer::Sign;
use crate::rule::{Rule, RuleKind};
use crate::tableau::{BranchId, Tableau};
use crate::util::{new_set, HashMap, HashSet};

/// Runs every check in §4.5 over the whole tree, returning an ordered,
/// deduplicated diagnostic list.
#[must_use]
pub fn validate(tableau: &Tableau, ns: &Interner) -> Vec<Diagnostic> {
    let mut seen: HashSet<(u32, &'static str)> = new_set();
    let mut out = Vec::new();
    let mut push = |d: Diagnostic, seen: &mut HashSet<(u32, &'static str)>| {
        if seen.insert((d.line(), d.code())) {
            out.push(d);
        }
    };

    for leaf in tableau.leaves() {
        let path = root_to_leaf(tableau, leaf);
        let mut state = PathState::default();
        for &line in &path {
            let rule = &tableau.rules[&line];
            for d in check_rule(tableau, &path, rule, &mut state, ns) {
                push(d, &mut seen);
            }
        }
    }

    out.sort_by_key(Diagnostic::line);
    out
}

fn root_to_leaf(tableau: &Tableau, leaf: BranchId) -> Vec<u32> {
    let mut chain = Vec::new();
    let mut cur = Some(leaf);
    while let Some(id) = cur {
        let b = tableau.branch(id);
        chain.push(b);
        cur = b.parent;
    }
    chain.reverse();
    chain.into_iter().flat_map(|b| b.lines.iter().copied()).collect()
}

#[derive(Default)]
struct PathState {
    /// For AndT/OrF/ImpF: how many of the two discharge lines have been seen
    /// for a given referenced line.
    alpha_pair_progress: HashMap<u32, (u32, u32)>,
    /// References already discharged by a single-use alpha kind
    /// (NegT/NegF/AllT/ExF/AllF/ExT) along this path.
    single_use: HashSet<u32>,
}

fn visible_and_defined<'a>(
    tableau: &'a Tableau,
    path: &[u32],
    line: u32,
    reference: u32,
) -> Result<&'a Rule, Diagnostic> {
    let Some(referenced) = tableau.rules.get(&reference) else {
        return Err(Diagnostic::ReferencedLineNotDefined { line, reference });
    };
    if reference >= line {
        return Err(Diagnostic::ReferencedLineNotDefined { line, reference });
    }
    if !path[..path.iter().position(|&l| l == line).unwrap()].contains(&reference) {
        return Err(Diagnostic::UsingDiscardedRule { line, reference });
    }
    Ok(referenced)
}

fn check_rule(
    tableau: &Tableau,
    path: &[u32],
    rule: &Rule,
    state: &mut PathState,
    ns: &Interner,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let line = rule.line;

    match rule.kind {
        RuleKind::Premise => {
            if rule.sign != Some(Sign::T) {
                out.push(Diagnostic::PremiseShouldBeTrue { line });
            }
            return out;
        }
        RuleKind::Conclusion => {
            if rule.sign != Some(Sign::F) {
                out.push(Diagnostic::ConclusionShouldBeFalse { line });
            }
            return out;
        }
        _ => {}
    }

    if rule.opens_branch != rule.kind.is_beta() {
        out.push(if rule.kind.is_beta() {
            Diagnostic::RuleMustBeBeta { line }
        } else {
            Diagnostic::RuleMustBeAlpha { line }
        });
    }

    let Some(reference) = rule.ref1 else { return out };
    let referenced = match visible_and_defined(tableau, path, line, reference) {
        Ok(r) => r,
        Err(d) => {
            out.push(d);
            return out;
        }
    };

    match rule.kind {
        RuleKind::NegT => check_negation(rule, referenced, Sign::F, Sign::T, state, &mut out),
        RuleKind::NegF => check_negation(rule, referenced, Sign::T, Sign::F, state, &mut out),
        RuleKind::AndT => check_alpha_pair(
            tableau, path, rule, referenced, BinOp::And, Sign::T, Sign::T, Sign::T, state, &mut out,
        ),
        RuleKind::OrF => check_alpha_pair(
            tableau, path, rule, referenced, BinOp::Or, Sign::F, Sign::F, Sign::F, state, &mut out,
        ),
        RuleKind::ImpF => check_alpha_pair(
            tableau, path, rule, referenced, BinOp::Imp, Sign::F, Sign::F, Sign::T, state, &mut out,
        ),
        RuleKind::AndF => check_beta(tableau, rule, referenced, BinOp::And, Sign::F, Sign::F, Sign::F, &mut out),
        RuleKind::OrT => check_beta(tableau, rule, referenced, BinOp::Or, Sign::T, Sign::T, Sign::T, &mut out),
        RuleKind::ImpT => check_beta(tableau, rule, referenced, BinOp::Imp, Sign::T, Sign::F, Sign::T, &mut out),
        RuleKind::AllT => check_quantifier(rule, referenced, true, Sign::T, false, &mut out),
        RuleKind::ExF => check_quantifier(rule, referenced, false, Sign::F, false, &mut out),
        RuleKind::AllF => {
            check_quantifier(rule, referenced, true, Sign::F, true, &mut out);
            check_freshness(tableau, path, rule, &mut out);
        }
        RuleKind::ExT => {
            check_quantifier(rule, referenced, false, Sign::T, true, &mut out);
            check_freshness(tableau, path, rule, &mut out);
        }
        RuleKind::Closed => check_closed(tableau, path, rule, ns, &mut out),
        RuleKind::Premise | RuleKind::Conclusion => unreachable!(),
    }

    if matches!(
        rule.kind,
        RuleKind::NegT | RuleKind::NegF | RuleKind::AllT | RuleKind::ExF | RuleKind::AllF | RuleKind::ExT
    ) {
        if !state.single_use.insert(reference) {
            out.push(Diagnostic::AlreadyUsedRuleInBranch { line, reference });
        }
    }

    out
}

fn check_negation(
    rule: &Rule,
    referenced: &Rule,
    expect_ref_sign: Sign,
    expect_own_sign: Sign,
    _state: &mut PathState,
    out: &mut Vec<Diagnostic>,
) {
    let reference = referenced.line;
    let Formula::Not(phi) = &referenced.formula else {
        out.push(if expect_own_sign == Sign::T {
            Diagnostic::IsNotNegationTrue { line: rule.line, reference }
        } else {
            Diagnostic::IsNotNegationFalse { line: rule.line, reference }
        });
        return;
    };
    if referenced.sign != Some(expect_ref_sign) {
        out.push(if expect_own_sign == Sign::T {
            Diagnostic::IsNotNegationTrue { line: rule.line, reference }
        } else {
            Diagnostic::IsNotNegationFalse { line: rule.line, reference }
        });
        return;
    }
    if rule.sign != Some(expect_own_sign) {
        out.push(Diagnostic::WrongTrueValue { line: rule.line });
    }
    if rule.formula != **phi {
        out.push(Diagnostic::InvalidNegation { line: rule.line, reference });
    }
}

#[allow(clippy::too_many_arguments)]
fn check_alpha_pair(
    tableau: &Tableau,
    path: &[u32],
    rule: &Rule,
    referenced: &Rule,
    op: BinOp,
    ref_sign: Sign,
    first_sign: Sign,
    second_sign: Sign,
    state: &mut PathState,
    out: &mut Vec<Diagnostic>,
) {
    let reference = referenced.line;
    let line = rule.line;
    let Formula::Binary(actual_op, left, right) = &referenced.formula else {
        out.push(shape_diag(op, ref_sign, line, reference));
        return;
    };
    if *actual_op != op || referenced.sign != Some(ref_sign) {
        out.push(shape_diag(op, ref_sign, line, reference));
        return;
    }

    let progress = state.alpha_pair_progress.entry(reference).or_insert((0, 0));
    match progress.0 {
        0 => {
            if rule.sign != Some(first_sign) {
                out.push(Diagnostic::WrongTrueValue { line });
            }
            if rule.formula != **left {
                out.push(left_conjunct_diag(op, line, reference));
            }
            progress.0 = 1;
            progress.1 = line;
        }
        1 => {
            if line != progress.1 + 1 || !same_branch(tableau, path, progress.1, line) {
                out.push(Diagnostic::InvalidAlphaNextPrevious { line, reference, kind: rule.kind });
            }
            if rule.sign != Some(second_sign) {
                out.push(Diagnostic::WrongTrueValue { line });
            }
            if rule.formula != **right {
                out.push(right_conjunct_diag(op, line, reference));
            }
            progress.0 = 2;
        }
        _ => out.push(Diagnostic::AlreadyUsedRuleInBranch { line, reference }),
    }
}

fn same_branch(tableau: &Tableau, path: &[u32], a: u32, b: u32) -> bool {
    let branch_of = |l: u32| tableau.line_branch.get(&l).copied();
    branch_of(a).is_some() && branch_of(a) == branch_of(b) && path.contains(&a) && path.contains(&b)
}

fn shape_diag(op: BinOp, sign: Sign, line: u32, reference: u32) -> Diagnostic {
    match (op, sign) {
        (BinOp::And, Sign::T) => Diagnostic::IsNotConjunctionTrue { line, reference },
        (BinOp::And, Sign::F) => Diagnostic::IsNotConjunctionFalse { line, reference },
        (BinOp::Or, Sign::T) => Diagnostic::IsNotDisjunctionTrue { line, reference },
        (BinOp::Or, Sign::F) => Diagnostic::IsNotDisjunctionFalse { line, reference },
        (BinOp::Imp, _) | (BinOp::Iff, _) => Diagnostic::IsNotImplication { line, reference },
    }
}

fn left_conjunct_diag(op: BinOp, line: u32, reference: u32) -> Diagnostic {
    match op {
        BinOp::And => Diagnostic::InvalidLeftConjunction { line, reference },
        BinOp::Or => Diagnostic::InvalidLeftOrRightDisjunction { line, reference },
        BinOp::Imp | BinOp::Iff => Diagnostic::InvalidLeftImplication { line, reference },
    }
}

fn right_conjunct_diag(op: BinOp, line: u32, reference: u32) -> Diagnostic {
    match op {
        BinOp::And => Diagnostic::InvalidRightConjunction { line, reference },
        BinOp::Or => Diagnostic::InvalidLeftOrRightDisjunction { line, reference },
        BinOp::Imp | BinOp::Iff => Diagnostic::InvalidRightImplication { line, reference },
    }
}

#[allow(clippy::too_many_arguments)]
fn check_beta(
    tableau: &Tableau,
    rule: &Rule,
    referenced: &Rule,
    op: BinOp,
    ref_sign: Sign,
    left_sign: Sign,
    right_sign: Sign,
    out: &mut Vec<Diagnostic>,
) {
    let reference = referenced.line;
    let line = rule.line;
    let Formula::Binary(actual_op, left, right) = &referenced.formula else {
        out.push(shape_diag(op, ref_sign, line, reference));
        return;
    };
    if *actual_op != op || referenced.sign != Some(ref_sign) {
        out.push(shape_diag(op, ref_sign, line, reference));
        return;
    }

    let Some(branch_id) = tableau.line_branch.get(&line).copied() else { return };
    let branch = tableau.branch(branch_id);
    let Some(parent_id) = branch.parent else { return };
    let parent = tableau.branch(parent_id);
    if parent.children.len() != 2 {
        out.push(Diagnostic::InvalidBetaRule { line, reference });
        return;
    }
    let mut children: Vec<_> = parent.children.iter().map(|&id| tableau.branch(id)).collect();
    children.sort_by_key(|b| b.start_line);
    let Some(first_end) = children[0].end_line else {
        out.push(Diagnostic::InvalidBetaRule { line, reference });
        return;
    };
    if children[1].start_line != first_end + 1 {
        out.push(Diagnostic::InvalidBetaRule { line, reference });
        return;
    }
    let first_line = children[0].lines.first().copied();
    let second_line = children[1].lines.first().copied();
    let (Some(fl), Some(sl)) = (first_line, second_line) else {
        out.push(Diagnostic::InvalidBetaRule { line, reference });
        return;
    };
    let first_rule = &tableau.rules[&fl];
    let second_rule = &tableau.rules[&sl];
    let ok = first_rule.sign == Some(left_sign)
        && first_rule.formula == **left
        && second_rule.sign == Some(right_sign)
        && second_rule.formula == **right;
    if !ok {
        out.push(Diagnostic::InvalidBetaRule { line, reference });
    }
}

fn check_quantifier(
    rule: &Rule,
    referenced: &Rule,
    universal: bool,
    ref_sign: Sign,
    _fresh: bool,
    out: &mut Vec<Diagnostic>,
) {
    let reference = referenced.line;
    let line = rule.line;
    let expected_kind = if universal {
        crate::formula::QuantKind::ForAll
    } else {
        crate::formula::QuantKind::Exists
    };
    let Formula::Quantifier(kind, ..) = &referenced.formula else {
        out.push(if universal {
            Diagnostic::InvalidUniversalFormula { line, reference }
        } else {
            Diagnostic::InvalidExistentialFormula { line, reference }
        });
        return;
    };
    if *kind != expected_kind || referenced.sign != Some(ref_sign) {
        out.push(if universal {
            Diagnostic::InvalidUniversalFormula { line, reference }
        } else {
            Diagnostic::InvalidExistentialFormula { line, reference }
        });
        return;
    }
    if rule.sign != Some(ref_sign) {
        out.push(Diagnostic::WrongTrueValue { line });
    }
    if !referenced.formula.valid_substitution(&rule.formula) {
        out.push(if universal {
            Diagnostic::InvalidSubstitutionUniversal { line, reference }
        } else {
            Diagnostic::InvalidSubstitutionExistential { line, reference }
        });
    }
}

fn check_freshness(tableau: &Tableau, path: &[u32], rule: &Rule, out: &mut Vec<Diagnostic>) {
    let Some(reference) = rule.ref1 else { return };
    let Some(referenced) = tableau.rules.get(&reference) else { return };
    let Formula::Quantifier(_, bound_var, body) = &referenced.formula else { return };
    let new_vars: HashSet<Atom> = body.substituted_vars(*bound_var, &rule.formula);
    if new_vars.is_empty() {
        // a vacuous quantifier: the discharged variable never occupies the
        // bound variable's position, so nothing was introduced to check.
        return;
    }

    let up_to = path.iter().position(|&l| l == rule.line).unwrap_or(path.len());
    let mut branch_vars: HashSet<Atom> = new_set();
    for &earlier in &path[..up_to] {
        let earlier_rule = &tableau.rules[&earlier];
        if earlier_rule.kind.is_quantifier_fresh() {
            if let Some(r) = earlier_rule.ref1.and_then(|r| tableau.rules.get(&r)) {
                if let Formula::Quantifier(_, v, b) = &r.formula {
                    branch_vars.extend(b.substituted_vars(*v, &earlier_rule.formula));
                }
            }
        }
        if new_vars.iter().any(|v| earlier_rule.formula.free_vars().contains(v)) {
            out.push(Diagnostic::VariableIsNotFresh { line: rule.line, reference });
            return;
        }
    }
    if new_vars.iter().any(|v| branch_vars.contains(v)) {
        out.push(Diagnostic::VariableIsNotFresh { line: rule.line, reference });
    }
}

fn check_closed(tableau: &Tableau, path: &[u32], rule: &Rule, ns: &Interner, out: &mut Vec<Diagnostic>) {
    let line = rule.line;
    let (Some(r1), Some(r2)) = (rule.ref1, rule.ref2) else { return };
    let a = match visible_and_defined(tableau, path, line, r1) {
        Ok(r) => r,
        Err(d) => {
            out.push(d);
            return;
        }
    };
    let b = match visible_and_defined(tableau, path, line, r2) {
        Ok(r) => r,
        Err(d) => {
            out.push(d);
            return;
        }
    };
    if !rule.formula.is_bottom(ns) {
        out.push(Diagnostic::InvalidResult { line });
        return;
    }
    let closes = a.formula == b.formula && a.sign.is_some() && a.sign != b.sign;
    if !closes {
        out.push(Diagnostic::InvalidResult { line });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::tableau::build;

    fn diags(src: &str) -> Vec<Diagnostic> {
        let mut ns = Interner::new();
        let (tableau, mut ds) = build(src.as_bytes(), &mut ns).unwrap();
        ds.extend(validate(&tableau, &ns));
        ds
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
    fn a_correct_proof_has_no_diagnostics() {
        assert!(diags(VALID_PROOF).is_empty(), "{:?}", diags(VALID_PROOF));
    }

    #[test]
    fn beta_rule_without_brace_is_rejected() {
        let src = "1. T A|B pre\n2. F A&B conclusion\n3. T A |T 1";
        let ds = diags(src);
        assert!(ds.iter().any(|d| matches!(d, Diagnostic::RuleMustBeBeta { line: 3 })));
    }

    #[test]
    fn alpha_rule_with_brace_is_rejected() {
        let src = "1. T A&B pre\n2. { T A &T 1";
        let ds = diags(src);
        assert!(ds.iter().any(|d| matches!(d, Diagnostic::RuleMustBeAlpha { line: 2 })));
    }

    #[test]
    fn freshness_violation_is_detected() {
        let src = "1. F Ax P(x) pre\n2. T P(x) pre\n3. F P(x) AF 1";
        let ds = diags(src);
        assert!(ds.iter().any(|d| matches!(d, Diagnostic::VariableIsNotFresh { .. })));
    }
}
