//! Arena-indexed branch tree. Branches reference their parent and children
//! by index rather than by pointer, the same trade the teacher crate makes
//! for its statement/segment graph, and for the same reason: a tableau
//! branch's parent outlives all its children, so a pointer-cycle-free index
//! is both simpler and cheaper than `Rc`/`RefCell`.

use crate::diag::Diagnostic;
use crate::formula::Formula;
use crate::intern::{Atom, Interner};
use crate::lexer::{tokenize, Token};
use crate::rule::{parse_step, Rule, RuleKind, Step};
use crate::util::{new_map, new_set, HashMap, HashSet};

pub type BranchId = usize;

#[derive(Clone, Debug)]
pub struct Branch {
    pub id: BranchId,
    pub parent: Option<BranchId>,
    pub children: Vec<BranchId>,
    /// Lines belonging to this branch, in the order they were appended.
    pub lines: Vec<u32>,
    pub start_line: u32,
    pub end_line: Option<u32>,
    /// Variables freshly discharged by an `AllF`/`ExT` rule in this branch;
    /// tracked separately from "occurs free in a visible formula" because a
    /// vacuous quantifier discharges a variable that never appears anywhere.
    pub fresh_vars: HashSet<Atom>,
}

impl Branch {
    fn new(id: BranchId, parent: Option<BranchId>, start_line: u32) -> Self {
        Branch {
            id,
            parent,
            children: Vec::new(),
            lines: Vec::new(),
            start_line,
            end_line: None,
            fresh_vars: new_set(),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The full parsed script: branch arena, rule table and a flat line index.
pub struct Tableau {
    pub branches: Vec<Branch>,
    pub rules: HashMap<u32, Rule>,
    /// `line -> branch` for every rule line (not populated for bare `}`).
    pub line_branch: HashMap<u32, BranchId>,
    pub last_line: u32,
}

impl Tableau {
    #[must_use]
    pub fn root(&self) -> &Branch {
        &self.branches[0]
    }

    #[must_use]
    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id]
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<BranchId> {
        self.branches.iter().filter(|b| b.is_leaf()).map(|b| b.id).collect()
    }

    /// Rules visible from `branch_id`: this branch's own lines up to (and
    /// including) `up_to_line`, then every ancestor's lines in full.
    #[must_use]
    pub fn visible_rules(&self, branch_id: BranchId, up_to_line: u32) -> Vec<&Rule> {
        let mut out = Vec::new();
        let mut cur = Some(branch_id);
        let mut first = true;
        while let Some(id) = cur {
            let b = &self.branches[id];
            for &line in &b.lines {
                if first && line > up_to_line {
                    continue;
                }
                out.push(&self.rules[&line]);
            }
            first = false;
            cur = b.parent;
        }
        out
    }
}

struct Builder {
    branches: Vec<Branch>,
    rules: HashMap<u32, Rule>,
    line_branch: HashMap<u32, BranchId>,
    cursor: BranchId,
    diags: Vec<Diagnostic>,
    expected_line: u32,
}

impl Builder {
    fn new() -> Self {
        Builder {
            branches: vec![Branch::new(0, None, 1)],
            rules: new_map(),
            line_branch: new_map(),
            cursor: 0,
            diags: Vec::new(),
            expected_line: 1,
        }
    }

    fn open_child(&mut self, start_line: u32) -> BranchId {
        let id = self.branches.len();
        self.branches.push(Branch::new(id, Some(self.cursor), start_line));
        self.branches[self.cursor].children.push(id);
        id
    }

    fn insert(&mut self, rule: Rule) {
        if rule.line != self.expected_line {
            self.diags.push(Diagnostic::NonSequentialLineNumbering {
                line: rule.line_pos.0,
                col: rule.line_pos.1,
                expected: self.expected_line,
                found: rule.line,
            });
        }
        self.expected_line = rule.line.max(self.expected_line) + 1;

        if rule.opens_branch {
            let child = self.open_child(rule.line);
            self.cursor = child;
        }

        if rule.kind.is_quantifier_fresh() {
            if let Some(r1) = rule.ref1 {
                if let Some(referenced) = self.rules.get(&r1) {
                    if let Formula::Quantifier(_, var, body) = &referenced.formula {
                        let new_vars: Vec<Atom> =
                            body.substituted_vars(*var, &rule.formula).into_iter().collect();
                        self.branches[self.cursor].fresh_vars.extend(new_vars);
                    }
                }
            }
        }

        let line = rule.line;
        self.branches[self.cursor].lines.push(line);
        self.line_branch.insert(line, self.cursor);
        self.rules.insert(line, rule);
    }

    fn close(&mut self, line: u32, col: u32) {
        if self.cursor == 0 {
            self.diags.push(Diagnostic::CloseBracketWithoutBox { line, col });
            return;
        }
        let last = self.branches[self.cursor].lines.last().copied();
        match last {
            Some(l) => self.branches[self.cursor].end_line = Some(l),
            None => {
                // an empty branch closed immediately; use its own start line
                self.branches[self.cursor].end_line = Some(self.branches[self.cursor].start_line);
            }
        }
        self.cursor = self.branches[self.cursor].parent.unwrap();
    }

    fn finish(mut self) -> (Tableau, Vec<Diagnostic>) {
        for b in &self.branches {
            if !b.is_root() && b.end_line.is_none() {
                self.diags.push(Diagnostic::BoxMustBeDisposed { line: b.start_line });
            }
        }
        self.check_initial_tableau();
        let last_line = self.expected_line.saturating_sub(1);
        (
            Tableau {
                branches: self.branches,
                rules: self.rules,
                line_branch: self.line_branch,
                last_line,
            },
            self.diags,
        )
    }

    fn check_initial_tableau(&mut self) {
        let root = &self.branches[0];
        let mut seen_conclusion = false;
        for &line in &root.lines {
            let rule = &self.rules[&line];
            match rule.kind {
                RuleKind::Premise => {
                    if seen_conclusion {
                        self.diags.push(Diagnostic::InvalidInitialTableau { line });
                        return;
                    }
                }
                RuleKind::Conclusion => seen_conclusion = true,
                // Inference rules are free to decompose a non-branching
                // proof directly in the root branch; only a premise after
                // the conclusion, or a premise/conclusion outside the root,
                // is malformed.
                _ => {}
            }
        }
        if !seen_conclusion {
            let line = root.lines.last().copied().unwrap_or(0);
            self.diags.push(Diagnostic::InvalidInitialTableau { line });
        }
        for b in &self.branches[1..] {
            for &line in &b.lines {
                if matches!(self.rules[&line].kind, RuleKind::Premise | RuleKind::Conclusion) {
                    self.diags.push(Diagnostic::InvalidInitialTableau { line });
                }
            }
        }
    }
}

/// Tokenises and parses `script` end-to-end, producing a built [`Tableau`]
/// plus every structural diagnostic found. A non-empty `Vec` does not
/// necessarily mean the tree is unusable: callers still get the partial
/// tree back so downstream stages can report as much as possible.
pub fn build(script: &[u8], ns: &mut Interner) -> Result<(Tableau, Vec<Diagnostic>), Diagnostic> {
    let tokens: Vec<Token> =
        tokenize(script, ns).map_err(|e| Diagnostic::SyntaxError {
            line: e.line,
            col: e.col,
            detail: format!("unexpected character '{}'", e.found),
        })?;

    let mut builder = Builder::new();
    let mut pos = 0;
    while !tokens[pos].is_eof() {
        let (step, next) = parse_step(&tokens, pos, ns, &builder.rules).map_err(|e| {
            Diagnostic::SyntaxError {
                line: e.line,
                col: e.col,
                detail: e.message,
            }
        })?;
        match step {
            Step::Rule(rule) => builder.insert(rule),
            Step::CloseBrace { line, col } => builder.close(line, col),
        }
        pos = next;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ok(src: &str) -> (Tableau, Vec<Diagnostic>) {
        let mut ns = Interner::new();
        build(src.as_bytes(), &mut ns).unwrap()
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
    fn builds_the_expected_branch_shape() {
        let (t, diags) = build_ok(VALID_PROOF);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(t.branches.len(), 3);
        assert_eq!(t.root().lines, vec![1, 2, 3]);
        assert_eq!(t.branches[1].lines, vec![4, 5]);
        assert_eq!(t.branches[1].end_line, Some(5));
        assert_eq!(t.branches[1].start_line, 4);
        assert_eq!(t.branches[2].lines, vec![6, 7]);
        assert_eq!(t.branches[2].end_line, Some(7));
        assert_eq!(t.branches[2].start_line, 6);
    }

    #[test]
    fn beta_rule_opens_two_children() {
        let src = "1. T A|B pre\n\
                   2. F A&B conclusion\n\
                   3. { T A |T 1\n\
                   }\n\
                   4. { T B |T 1\n\
                   }";
        let (t, diags) = build_ok(src);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(t.root().children.len(), 2);
        assert_eq!(t.branches[1].lines, vec![3]);
        assert_eq!(t.branches[2].lines, vec![4]);
    }

    #[test]
    fn non_sequential_numbering_is_reported() {
        let mut ns = Interner::new();
        let src = "1. T A pre\n3. F B conclusion";
        let (_, diags) = build(src.as_bytes(), &mut ns).unwrap();
        assert!(diags
            .iter()
            .any(|d| matches!(d, Diagnostic::NonSequentialLineNumbering { found: 3, .. })));
    }

    #[test]
    fn unclosed_branch_is_reported() {
        let src = "1. T A|B pre\n\
                   2. F A&B conclusion\n\
                   3. { T A |T 1";
        let (_, diags) = build_ok(src);
        assert!(diags
            .iter()
            .any(|d| matches!(d, Diagnostic::BoxMustBeDisposed { line: 3 })));
    }

    #[test]
    fn alpha_only_proof_with_no_branching_is_a_valid_initial_tableau() {
        let src = "1. T A&B pre\n2. F A conclusion\n3. T A &T 1\n4. @ closed 2,3";
        let (_, diags) = build_ok(src);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn stray_close_brace_is_reported() {
        let mut ns = Interner::new();
        let src = "1. T A pre\n2. F A conclusion\n}";
        let (_, diags) = build(src.as_bytes(), &mut ns).unwrap();
        assert!(diags.iter().any(|d| matches!(d, Diagnostic::CloseBracketWithoutBox { .. })));
    }
}
