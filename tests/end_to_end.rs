//! Black-box scenarios driven through the public `run` entry point, one per
//! end-to-end case in `spec.md` §8.

use proof_tableau::analyser::Verdict;
use proof_tableau::diag::Diagnostic;
use proof_tableau::intern::Interner;
use proof_tableau::run;

fn run_script(src: &str) -> proof_tableau::Proof {
    let mut ns = Interner::new();
    run(src, &mut ns).expect("script should at least tokenize")
}

fn run_script_with_interner(src: &str) -> (proof_tableau::Proof, Interner) {
    let mut ns = Interner::new();
    let proof = run(src, &mut ns).expect("script should at least tokenize");
    (proof, ns)
}

#[test]
fn valid_propositional_proof() {
    let src = "1. T A->B pre\n\
               2. T A pre\n\
               3. F B conclusion\n\
               4. { F A ->T 1\n\
               5. @ closed 2,4\n\
               }\n\
               6. { T B ->T 1\n\
               7. @ closed 3,6\n\
               }";
    let proof = run_script(src);
    assert!(proof.diagnostics.is_empty(), "{:?}", proof.diagnostics);
    assert_eq!(proof.verdict, Verdict::Valid);
    assert_eq!(proof.premises.len(), 2);
}

#[test]
fn invalid_theorem_with_countermodel() {
    let src = "1. T A|B pre\n\
               2. F A&B conclusion\n\
               3. { T A |T 1\n\
               }\n\
               4. { T B |T 1\n\
               }";
    let proof = run_script(src);
    let Verdict::Invalid { countermodels } = &proof.verdict else {
        panic!("expected Invalid, got {:?}", proof.verdict)
    };
    assert!(countermodels.iter().any(|cm| cm
        .iter()
        .any(|(name, sign)| name == "A" && *sign == proof_tableau::lexer::Sign::T)));
}

#[test]
fn non_sequential_numbering_is_reported_with_a_caret() {
    let src = "1. T A pre\n3. F B conclusion";
    let proof = run_script(src);
    assert!(proof
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::NonSequentialLineNumbering { found: 3, .. })));
}

#[test]
fn freshness_violation_is_reported() {
    let src = "1. F Ax P(x) pre\n2. T P(x) pre\n3. F P(x) AF 1";
    let proof = run_script(src);
    assert!(proof
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::VariableIsNotFresh { .. })));
}

#[test]
fn unclosed_branch_is_reported_at_its_opener() {
    let src = "1. T A|B pre\n\
               2. F A&B conclusion\n\
               3. { T A |T 1";
    let proof = run_script(src);
    assert!(proof
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::BoxMustBeDisposed { line: 3 })));
}

#[test]
fn rule_kind_mismatch_when_alpha_rule_opens_a_branch() {
    let src = "1. T A&B pre\n2. { T A &T 1";
    let proof = run_script(src);
    assert!(proof
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::RuleMustBeAlpha { line: 2 })));
}

#[test]
fn diagnostics_prevent_a_valid_verdict_even_when_every_leaf_closes() {
    // line 2 is skipped, so NonSequentialLineNumbering fires, but every leaf
    // still closes -- the script must not be reported Valid regardless.
    let src = "1. T A pre\n3. F A conclusion\n4. @ closed 1,3";
    let proof = run_script(src);
    assert!(!proof.diagnostics.is_empty());
    assert_ne!(proof.verdict, Verdict::Valid);
}

#[test]
fn theorem_matching_accepts_reordered_premises() {
    let src = "1. T A pre\n\
               2. T B pre\n\
               3. F A&B conclusion\n\
               4. { F A &F 3\n\
               5. @ closed 1,4\n\
               }\n\
               6. { F B &F 3\n\
               7. @ closed 2,6\n\
               }";
    let (proof, mut ns) = run_script_with_interner(src);
    assert_eq!(proof.verdict, Verdict::Valid);

    // same interner as the proof, so atoms compare structurally.
    let expected = proof_tableau::theorem::parse_theorem("B, A |- A&B", &mut ns).unwrap();
    assert!(proof_tableau::theorem::matches(&proof.premises, &proof.conclusion, &expected));

    let wrong = proof_tableau::theorem::parse_theorem("A |- A&B", &mut ns).unwrap();
    assert!(!proof_tableau::theorem::matches(&proof.premises, &proof.conclusion, &wrong));
}
