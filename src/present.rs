//! Turns a built [`Tableau`] and its [`Verdict`] into the two output forms
//! the CLI exposes: the plain-text report and the LaTeX qtree.
//!
//! Grounded on `anita`'s `DeductionResult` rendering (`toString`,
//! `get_counter_examples_toString`) and `SymbolTable.toLatex`: the qtree
//! recurses the branch tree exactly as `branch_to_latex` does, and the
//! coloured variant highlights only the lines a closure or a saturated-open
//! branch actually cites.

use crate::analyser::Verdict;
use crate::diag::{Diagnostic, Locale};
use crate::formula::Formula;
use crate::intern::Interner;
use crate::tableau::{BranchId, Tableau};
use std::fmt::Write as _;

/// Assembles the three-heading plain-text report of `spec.md` §6.
///
/// `show_countermodels` gates the `-dc` flag: the "not valid" heading is
/// always printed for an `Invalid` verdict, but the countermodel listing
/// underneath it is only included when the caller asks for it.
#[must_use]
pub fn render(
    tableau: &Tableau,
    verdict: &Verdict,
    diagnostics: &[Diagnostic],
    premises: &[Formula],
    conclusion: &Formula,
    ns: &Interner,
    locale: Locale,
    show_countermodels: bool,
) -> String {
    let mut out = String::new();

    if !diagnostics.is_empty() {
        let _ = writeln!(out, "{}", header_errors(locale));
        for d in diagnostics {
            let _ = writeln!(out, "  line {}: {}", d.line(), d.message(locale));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", theorem_line(premises, conclusion, ns));

    match verdict {
        Verdict::Valid => {
            let _ = writeln!(out, "{}", header_valid(locale));
        }
        Verdict::Invalid { countermodels } => {
            let _ = writeln!(out, "{}", header_invalid(locale));
            if show_countermodels {
                let _ = writeln!(out, "{}", countermodels_header(locale));
                for cm in countermodels {
                    let assignment: Vec<String> =
                        cm.iter().map(|(name, sign)| format!("v({name})={sign:?}")).collect();
                    let _ = writeln!(out, "  {}", assignment.join(", "));
                }
            }
        }
        Verdict::Incomplete { open_leaves } => {
            let _ = writeln!(out, "{}", header_incomplete(locale));
            for lines in open_leaves {
                let rendered: Vec<String> = lines
                    .iter()
                    .map(|&line| {
                        let rule = &tableau.rules[&line];
                        format!("{line}. {}", rule.formula.render(ns))
                    })
                    .collect();
                let _ = writeln!(out, "  {}", rendered.join(" / "));
            }
        }
    }

    out
}

fn header_errors(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The following errors were found:",
        Locale::Pt => "Os seguintes erros foram encontrados:",
    }
}

fn header_valid(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The proof below is valid.",
        Locale::Pt => "A prova abaixo e valida.",
    }
}

fn header_invalid(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The theorem is not valid.",
        Locale::Pt => "O teorema nao e valido.",
    }
}

fn header_incomplete(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "The proof below is not complete.",
        Locale::Pt => "A prova abaixo nao esta completa.",
    }
}

fn countermodels_header(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Countermodels:",
        Locale::Pt => "Contraexemplos:",
    }
}

fn theorem_line(premises: &[Formula], conclusion: &Formula, ns: &Interner) -> String {
    let premises: Vec<String> = premises.iter().map(|p| p.render(ns).to_string()).collect();
    format!("{} |- {}", premises.join(", "), conclusion.render(ns))
}

/// Renders the whole tableau as a LaTeX `qtree` string, recursing the branch
/// tree root to leaves. No line is highlighted.
#[must_use]
pub fn latex(tableau: &Tableau, ns: &Interner) -> String {
    latex_colored(tableau, ns, &[])
}

/// As [`latex`], but wraps every line named in `rules` in `\color{...}`:
/// lines on a `Closed` branch's justification get `\color{blue}`, every
/// other named line (a saturated-open branch's visible rules) gets
/// `\color{red}`.
#[must_use]
pub fn latex_colored(tableau: &Tableau, ns: &Interner, rules: &[u32]) -> String {
    let mut out = String::from("\\Tree ");
    render_branch(tableau, 0, ns, rules, &mut out);
    out
}

fn render_branch(tableau: &Tableau, branch: BranchId, ns: &Interner, rules: &[u32], out: &mut String) {
    let b = tableau.branch(branch);
    out.push_str("[.{");
    for (i, &line) in b.lines.iter().enumerate() {
        if i > 0 {
            out.push_str(" \\\\ ");
        }
        let rule = &tableau.rules[&line];
        let text = match rule.sign {
            Some(sign) => format!("{line}. {sign:?} {}", rule.formula.render_latex(ns)),
            None => format!("{line}. {}", rule.formula.render_latex(ns)),
        };
        if rules.contains(&line) {
            let color = if rule.kind == crate::rule::RuleKind::Closed {
                "blue"
            } else {
                "red"
            };
            let _ = write!(out, "\\color{{{color}}}{{{text}}}");
        } else {
            out.push_str(&text);
        }
    }
    out.push('}');
    for &child in &b.children {
        out.push(' ');
        render_branch(tableau, child, ns, rules, out);
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::verdict;
    use crate::tableau::build;

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
    fn valid_report_has_no_errors_block() {
        let mut ns = Interner::new();
        let (tableau, diags) = build(VALID_PROOF.as_bytes(), &mut ns).unwrap();
        let v = verdict(&tableau, &ns, diags.is_empty());
        let premise1 = crate::fparser::parse_formula(
            &crate::lexer::tokenize(b"A->B", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        let premise2 = crate::fparser::parse_formula(
            &crate::lexer::tokenize(b"A", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        let conclusion = crate::fparser::parse_formula(
            &crate::lexer::tokenize(b"B", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        let text = render(
            &tableau,
            &v,
            &diags,
            &[premise1, premise2],
            &conclusion,
            &ns,
            Locale::En,
            true,
        );
        assert!(!text.contains("errors were found"));
        assert!(text.contains("valid"));
    }

    #[test]
    fn latex_wraps_whole_tree_in_qtree() {
        let mut ns = Interner::new();
        let (tableau, _) = build(VALID_PROOF.as_bytes(), &mut ns).unwrap();
        let t = latex(&tableau, &ns);
        assert!(t.starts_with("\\Tree "));
        assert!(t.contains("\\bot") || t.contains("closed") || t.contains("."));
    }

    #[test]
    fn colored_latex_highlights_named_lines() {
        let mut ns = Interner::new();
        let (tableau, _) = build(VALID_PROOF.as_bytes(), &mut ns).unwrap();
        let t = latex_colored(&tableau, &ns, &[5]);
        assert!(t.contains("\\color{blue}"));
    }
}
