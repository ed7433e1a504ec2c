//! Wires the lexer -> formula parser -> line parser -> tableau builder ->
//! validator -> branch analyser pipeline together behind one entry point,
//! [`run`]. The binary and the end-to-end tests both drive this function
//! rather than poking at individual stages.

pub mod analyser;
pub mod diag;
pub mod formula;
pub mod fparser;
pub mod intern;
pub mod lexer;
pub mod present;
pub mod rule;
pub mod tableau;
pub mod theorem;
pub mod util;
pub mod validate;

use analyser::Verdict;
use diag::Diagnostic;
use formula::Formula;
use intern::Interner;
use rule::RuleKind;
use tableau::Tableau;

/// Everything one invocation of the pipeline produces over a script: the
/// built tableau, every diagnostic raised while building and validating it,
/// the verdict folded from its leaves, and the theorem read off the root
/// branch's premises and conclusion.
pub struct Proof {
    pub tableau: Tableau,
    pub diagnostics: Vec<Diagnostic>,
    pub verdict: Verdict,
    pub premises: Vec<Formula>,
    pub conclusion: Formula,
}

/// Runs the full pipeline over one proof script.
///
/// Only a lexer/parser-level syntax error short-circuits with `Err`; every
/// other failure (unclosed branches, bad references, rule mismatches) is
/// collected into `Proof::diagnostics` instead, so callers always get a
/// verdict back when the script at least tokenizes.
pub fn run(script: &str, ns: &mut Interner) -> Result<Proof, Diagnostic> {
    let (tableau, mut diagnostics) = tableau::build(script.as_bytes(), ns)?;
    diagnostics.extend(validate::validate(&tableau, ns));
    log::debug!(
        "built {} branch(es), {} diagnostic(s) before branch analysis",
        tableau.branches.len(),
        diagnostics.len()
    );

    let (premises, conclusion) = root_theorem(&tableau, ns);
    let verdict = analyser::verdict(&tableau, ns, diagnostics.is_empty());
    log::debug!("verdict: {verdict:?}");

    Ok(Proof {
        tableau,
        diagnostics,
        verdict,
        premises,
        conclusion,
    })
}

/// Reads the premises and conclusion off the root branch, in source order.
/// A conclusion-less root (already flagged by `InvalidInitialTableau`)
/// falls back to the distinguished bottom atom rather than panicking.
fn root_theorem(tableau: &Tableau, ns: &mut Interner) -> (Vec<Formula>, Formula) {
    let root = tableau.root();
    let mut premises = Vec::new();
    let mut conclusion = None;
    for &line in &root.lines {
        let rule = &tableau.rules[&line];
        match rule.kind {
            RuleKind::Premise => premises.push(rule.formula.clone()),
            RuleKind::Conclusion => conclusion = Some(rule.formula.clone()),
            _ => {}
        }
    }
    let conclusion = conclusion.unwrap_or_else(|| Formula::Atom(ns.intern(formula::BOTTOM)));
    (premises, conclusion)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn a_valid_proof_runs_clean_to_a_valid_verdict() {
        let mut ns = Interner::new();
        let proof = run(VALID_PROOF, &mut ns).unwrap();
        assert!(proof.diagnostics.is_empty());
        assert_eq!(proof.verdict, Verdict::Valid);
        assert_eq!(proof.premises.len(), 2);
    }

    #[test]
    fn a_lexer_error_short_circuits_with_err() {
        let mut ns = Interner::new();
        assert!(run("1. T $ pre", &mut ns).is_err());
    }
}
