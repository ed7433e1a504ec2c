//! Line-level grammar: one proof step is a numbered, signed formula plus a
//! justification. Justifications that omit the rule name are classified
//! here by looking up the *already parsed* referenced line — proof scripts
//! only ever reference earlier lines, so by the time a step is read every
//! line it could name is already in `resolved`.

use crate::formula::{BinOp, Formula, QuantKind};
use crate::fparser::parse_formula_at;
use crate::intern::Interner;
use crate::lexer::{Sign, Token, TokenKind};
use crate::util::HashMap;
use std::fmt;

/// The twelve named tableau rules; `Premise`, `Conclusion` and `Closed` are
/// not spelled with a rule-name token and live only on [`RuleKind`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RuleName {
    NegT,
    NegF,
    AndT,
    AndF,
    OrT,
    OrF,
    ImpT,
    ImpF,
    AllT,
    AllF,
    ExT,
    ExF,
}

impl RuleName {
    #[must_use]
    pub const fn kind(self) -> RuleKind {
        match self {
            RuleName::NegT => RuleKind::NegT,
            RuleName::NegF => RuleKind::NegF,
            RuleName::AndT => RuleKind::AndT,
            RuleName::AndF => RuleKind::AndF,
            RuleName::OrT => RuleKind::OrT,
            RuleName::OrF => RuleKind::OrF,
            RuleName::ImpT => RuleKind::ImpT,
            RuleName::ImpF => RuleKind::ImpF,
            RuleName::AllT => RuleKind::AllT,
            RuleName::AllF => RuleKind::AllF,
            RuleName::ExT => RuleKind::ExT,
            RuleName::ExF => RuleKind::ExF,
        }
    }

    #[must_use]
    pub const fn token_text(self) -> &'static str {
        match self {
            RuleName::NegT => "~T",
            RuleName::NegF => "~F",
            RuleName::AndT => "&T",
            RuleName::AndF => "&F",
            RuleName::OrT => "|T",
            RuleName::OrF => "|F",
            RuleName::ImpT => "->T",
            RuleName::ImpF => "->F",
            RuleName::AllT => "AT",
            RuleName::AllF => "AF",
            RuleName::ExT => "ET",
            RuleName::ExF => "EF",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RuleKind {
    Premise,
    Conclusion,
    Closed,
    NegT,
    NegF,
    AndT,
    AndF,
    OrT,
    OrF,
    ImpT,
    ImpF,
    AllT,
    AllF,
    ExT,
    ExF,
}

impl RuleKind {
    #[must_use]
    pub const fn is_alpha(self) -> bool {
        matches!(
            self,
            RuleKind::NegT
                | RuleKind::NegF
                | RuleKind::AndT
                | RuleKind::OrF
                | RuleKind::ImpF
                | RuleKind::AllT
                | RuleKind::ExF
        )
    }

    #[must_use]
    pub const fn is_beta(self) -> bool {
        matches!(self, RuleKind::AndF | RuleKind::OrT | RuleKind::ImpT)
    }

    /// Kinds whose discharged variable must be fresh: `AllF`, `ExT`.
    #[must_use]
    pub const fn is_quantifier_fresh(self) -> bool {
        matches!(self, RuleKind::AllF | RuleKind::ExT)
    }

    #[must_use]
    pub const fn is_quantifier(self) -> bool {
        matches!(
            self,
            RuleKind::AllT | RuleKind::AllF | RuleKind::ExT | RuleKind::ExF
        )
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub line: u32,
    pub sign: Option<Sign>,
    pub formula: Formula,
    pub kind: RuleKind,
    pub ref1: Option<u32>,
    pub ref2: Option<u32>,
    pub opens_branch: bool,
    /// Source position of the leading line number, for diagnostics.
    pub line_pos: (u32, u32),
}

#[derive(Clone, Debug)]
pub enum Step {
    Rule(Rule),
    /// A bare `}` closing the current branch.
    CloseBrace { line: u32, col: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineError {
    pub line: u32,
    pub col: u32,
    pub message: String,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for LineError {}

impl From<crate::fparser::ParseError> for LineError {
    fn from(e: crate::fparser::ParseError) -> Self {
        LineError {
            line: e.line,
            col: e.col,
            message: e.message,
        }
    }
}

struct Cursor<'t> {
    toks: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> &Token {
        &self.toks[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.toks[self.pos];
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> LineError {
        let t = self.peek();
        LineError {
            line: t.line,
            col: t.col,
            message: message.into(),
        }
    }

    fn expect_num(&mut self, what: &str) -> Result<u32, LineError> {
        match self.peek().kind {
            TokenKind::Num(n) => {
                self.bump();
                Ok(n)
            }
            _ => Err(self.err(format!("expected {what}"))),
        }
    }
}

/// Infers a rule kind from the shape of an already-parsed referenced rule,
/// per the §4.3 "rule-name-omitted" table. Returns `None` when no rule
/// applies to that (sign, formula) combination (e.g. the reference is a
/// propositional atom or an `<->` formula, which has no primitive rule).
#[must_use]
pub fn infer_kind(referenced: &Rule) -> Option<RuleKind> {
    let sign = referenced.sign?;
    match (&referenced.formula, sign) {
        (Formula::Binary(BinOp::And, ..), Sign::T) => Some(RuleKind::AndT),
        (Formula::Binary(BinOp::And, ..), Sign::F) => Some(RuleKind::AndF),
        (Formula::Binary(BinOp::Or, ..), Sign::F) => Some(RuleKind::OrF),
        (Formula::Binary(BinOp::Or, ..), Sign::T) => Some(RuleKind::OrT),
        (Formula::Binary(BinOp::Imp, ..), Sign::F) => Some(RuleKind::ImpF),
        (Formula::Binary(BinOp::Imp, ..), Sign::T) => Some(RuleKind::ImpT),
        (Formula::Not(_), Sign::T) => Some(RuleKind::NegT),
        (Formula::Not(_), Sign::F) => Some(RuleKind::NegF),
        (Formula::Quantifier(QuantKind::ForAll, ..), Sign::T) => Some(RuleKind::AllT),
        (Formula::Quantifier(QuantKind::ForAll, ..), Sign::F) => Some(RuleKind::AllF),
        (Formula::Quantifier(QuantKind::Exists, ..), Sign::T) => Some(RuleKind::ExT),
        (Formula::Quantifier(QuantKind::Exists, ..), Sign::F) => Some(RuleKind::ExF),
        _ => None,
    }
}

/// Parses one step starting at `tokens[pos]`. `resolved` must contain every
/// rule on a line strictly less than the one being parsed.
pub fn parse_step(
    tokens: &[Token],
    pos: usize,
    ns: &mut Interner,
    resolved: &HashMap<u32, Rule>,
) -> Result<(Step, usize), LineError> {
    let mut c = Cursor { toks: tokens, pos };

    if c.peek().kind == TokenKind::RBrace {
        let t = c.bump();
        return Ok((
            Step::CloseBrace {
                line: t.line,
                col: t.col,
            },
            c.pos,
        ));
    }

    let line_tok = c.peek().clone();
    let line = c.expect_num("a line number")?;
    if c.peek().kind != TokenKind::Dot {
        return Err(c.err("expected '.'"));
    }
    c.bump();

    let opens_branch = if c.peek().kind == TokenKind::LBrace {
        c.bump();
        true
    } else {
        false
    };

    let sign = match c.peek().kind {
        TokenKind::Sign(s) => {
            c.bump();
            Some(s)
        }
        _ => None,
    };

    let (formula, next) = parse_formula_at(c.toks, c.pos, ns)?;
    c.pos = next;

    let (kind, ref1, ref2) = match c.peek().kind.clone() {
        TokenKind::KwPre => {
            c.bump();
            (RuleKind::Premise, None, None)
        }
        TokenKind::KwConclusion => {
            c.bump();
            (RuleKind::Conclusion, None, None)
        }
        TokenKind::KwClosed => {
            c.bump();
            let r1 = c.expect_num("a referenced line number")?;
            if c.peek().kind != TokenKind::Comma {
                return Err(c.err("expected ','"));
            }
            c.bump();
            let r2 = c.expect_num("a second referenced line number")?;
            (RuleKind::Closed, Some(r1), Some(r2))
        }
        TokenKind::RuleName(name) => {
            c.bump();
            let r = c.expect_num("a referenced line number")?;
            (name.kind(), Some(r), None)
        }
        TokenKind::Num(r1) => {
            c.bump();
            if c.peek().kind == TokenKind::Comma {
                c.bump();
                let r2 = c.expect_num("a second referenced line number")?;
                (RuleKind::Closed, Some(r1), Some(r2))
            } else {
                let Some(referenced) = resolved.get(&r1) else {
                    return Err(LineError {
                        line: line_tok.line,
                        col: line_tok.col,
                        message: format!("line {r1} is not defined"),
                    });
                };
                let Some(kind) = infer_kind(referenced) else {
                    return Err(LineError {
                        line: line_tok.line,
                        col: line_tok.col,
                        message: format!(
                            "no tableau rule applies to the shape of line {r1}"
                        ),
                    });
                };
                (kind, Some(r1), None)
            }
        }
        _ => return Err(c.err("expected a justification")),
    };

    Ok((
        Step::Rule(Rule {
            line,
            sign,
            formula,
            kind,
            ref1,
            ref2,
            opens_branch,
            line_pos: (line_tok.line, line_tok.col),
        }),
        c.pos,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::util::new_map;

    fn steps(src: &str) -> Vec<Step> {
        let mut ns = Interner::new();
        let toks = tokenize(src.as_bytes(), &mut ns).unwrap();
        let mut resolved = new_map();
        let mut pos = 0;
        let mut out = Vec::new();
        while !toks[pos].is_eof() {
            let (step, next) = parse_step(&toks, pos, &mut ns, &resolved).unwrap();
            if let Step::Rule(r) = &step {
                resolved.insert(r.line, r.clone());
            }
            out.push(step);
            pos = next;
        }
        out
    }

    #[test]
    fn premise_and_conclusion() {
        let s = steps("1. T A pre\n2. F B conclusion");
        let Step::Rule(r1) = &s[0] else { panic!() };
        assert_eq!(r1.kind, RuleKind::Premise);
        let Step::Rule(r2) = &s[1] else { panic!() };
        assert_eq!(r2.kind, RuleKind::Conclusion);
    }

    #[test]
    fn named_rule_reference() {
        let s = steps("1. T A&B pre\n2. T A &T 1");
        let Step::Rule(r) = &s[1] else { panic!() };
        assert_eq!(r.kind, RuleKind::AndT);
        assert_eq!(r.ref1, Some(1));
    }

    #[test]
    fn inferred_rule_name() {
        let s = steps("1. T A&B pre\n2. T A 1");
        let Step::Rule(r) = &s[1] else { panic!() };
        assert_eq!(r.kind, RuleKind::AndT);
    }

    #[test]
    fn closed_line_has_no_sign_and_two_refs() {
        let s = steps("1. T A pre\n2. F A conclusion\n3. @ closed 1,2");
        let Step::Rule(r) = &s[2] else { panic!() };
        assert_eq!(r.kind, RuleKind::Closed);
        assert_eq!(r.sign, None);
        assert_eq!((r.ref1, r.ref2), (Some(1), Some(2)));
    }

    #[test]
    fn closed_line_keyword_may_be_omitted() {
        let s = steps("1. T A pre\n2. F A conclusion\n3. @ 1,2");
        let Step::Rule(r) = &s[2] else { panic!() };
        assert_eq!(r.kind, RuleKind::Closed);
    }

    #[test]
    fn opening_brace_is_recorded() {
        let s = steps("1. T A|B pre\n2. { T A |T 1");
        let Step::Rule(r) = &s[1] else { panic!() };
        assert!(r.opens_branch);
    }

    #[test]
    fn close_brace_alone_is_its_own_step() {
        let s = steps("1. T A|B pre\n2. { T A |T 1\n}");
        assert!(matches!(s[2], Step::CloseBrace { .. }));
    }
}
