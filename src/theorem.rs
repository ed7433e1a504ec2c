//! Standalone theorem entry: the grammar the `-t` flag parses, and the
//! premise-set/conclusion comparison `spec.md` §6 requires of it.
//!
//! Grounded on `anita`'s `ParserTheorem`: `formula (',' formula)* '|-' formula`,
//! or just `'|-' formula` with no premises. Reuses the proof-script formula
//! grammar (`fparser::parse_formula_at`) rather than a separate parser.

use crate::formula::Formula;
use crate::fparser::{parse_formula_at, ParseError};
use crate::intern::Interner;
use crate::lexer::{tokenize, LexError, Token, TokenKind};
use crate::util::HashSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theorem {
    pub premises: Vec<Formula>,
    pub conclusion: Formula,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TheoremError {
    Lex(LexError),
    Parse(ParseError),
    MissingTurnstile,
}

impl fmt::Display for TheoremError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoremError::Lex(e) => write!(f, "{e}"),
            TheoremError::Parse(e) => write!(f, "{e}"),
            TheoremError::MissingTurnstile => write!(f, "expected '|-' before the conclusion"),
        }
    }
}

impl std::error::Error for TheoremError {}

/// Parses `premise, premise, ... |- conclusion`, with zero or more premises.
pub fn parse_theorem(text: &str, ns: &mut Interner) -> Result<Theorem, TheoremError> {
    let tokens = tokenize(text.as_bytes(), ns).map_err(TheoremError::Lex)?;
    let mut premises = Vec::new();
    let mut pos = 0;

    if tokens[pos].kind != TokenKind::Turnstile {
        loop {
            let (f, next) = parse_formula_at(&tokens, pos, ns).map_err(TheoremError::Parse)?;
            premises.push(f);
            pos = next;
            match tokens[pos].kind {
                TokenKind::Comma => {
                    pos += 1;
                }
                _ => break,
            }
        }
    }

    if tokens[pos].kind != TokenKind::Turnstile {
        return Err(TheoremError::MissingTurnstile);
    }
    pos += 1;

    let (conclusion, end) = parse_formula_at(&tokens, pos, ns).map_err(TheoremError::Parse)?;
    if !tokens[end].is_eof() {
        let t: &Token = &tokens[end];
        return Err(TheoremError::Parse(ParseError {
            line: t.line,
            col: t.col,
            message: "unexpected trailing input after theorem".to_string(),
        }));
    }

    Ok(Theorem { premises, conclusion })
}

/// True iff `premises` (as a set) and `conclusion` match `expected` exactly,
/// per `spec.md` §6's "-t" contract.
#[must_use]
pub fn matches(premises: &[Formula], conclusion: &Formula, expected: &Theorem) -> bool {
    let actual: HashSet<&Formula> = premises.iter().collect();
    let want: HashSet<&Formula> = expected.premises.iter().collect();
    actual == want && *conclusion == expected.conclusion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::BinOp;

    #[test]
    fn parses_premises_and_conclusion() {
        let mut ns = Interner::new();
        let t = parse_theorem("A->B, A |- B", &mut ns).unwrap();
        assert_eq!(t.premises.len(), 2);
        assert!(matches!(t.conclusion, Formula::Atom(_)));
    }

    #[test]
    fn parses_with_no_premises() {
        let mut ns = Interner::new();
        let t = parse_theorem("|- A|~A", &mut ns).unwrap();
        assert!(t.premises.is_empty());
        assert!(matches!(t.conclusion, Formula::Binary(BinOp::Or, ..)));
    }

    #[test]
    fn missing_turnstile_is_an_error() {
        let mut ns = Interner::new();
        assert!(parse_theorem("A, B", &mut ns).is_err());
    }

    #[test]
    fn premise_order_does_not_matter_for_matches() {
        let mut ns = Interner::new();
        let t = parse_theorem("A, B |- A&B", &mut ns).unwrap();
        let a = crate::fparser::parse_formula(
            &tokenize(b"A", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        let b = crate::fparser::parse_formula(
            &tokenize(b"B", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        let conclusion = crate::fparser::parse_formula(
            &tokenize(b"A&B", &mut ns).unwrap(),
            &mut ns,
        )
        .unwrap();
        assert!(matches(&[b, a], &conclusion, &t));
    }
}
