//! Precedence-climbing parser turning a token stream into a [`Formula`].
//!
//! Binary connective precedence, weakest to strongest, is `<-> , -> , | , &`;
//! all four are right-associative. Quantifiers bind tighter than every
//! binary connective but looser than negation, so `Ax P(x) & Q(x)` reads as
//! `(Ax P(x)) & Q(x)` and `~Ax P(x)` reads as `~(Ax P(x))`.

use crate::formula::{BinOp, Formula, QuantKind};
use crate::intern::{Atom, Interner};
use crate::lexer::{QuantLetter, Token, TokenKind};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub col: u32,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

struct Parser<'t> {
    toks: &'t [Token],
    pos: usize,
    bottom: Atom,
}

impl<'t> Parser<'t> {
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

    fn err(&self, message: impl Into<String>) -> ParseError {
        let t = self.peek();
        ParseError {
            line: t.line,
            col: t.col,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), ParseError> {
        if self.peek().kind == *kind {
            self.bump();
            Ok(())
        } else {
            Err(self.err(format!("expected {what}")))
        }
    }

    fn parse_iff(&mut self) -> Result<Formula, ParseError> {
        let left = self.parse_imp()?;
        if self.peek().kind == TokenKind::Iff {
            self.bump();
            let right = self.parse_iff()?;
            return Ok(Formula::binary(BinOp::Iff, left, right));
        }
        Ok(left)
    }

    fn parse_imp(&mut self) -> Result<Formula, ParseError> {
        let left = self.parse_or()?;
        if self.peek().kind == TokenKind::Imp {
            self.bump();
            let right = self.parse_imp()?;
            return Ok(Formula::binary(BinOp::Imp, left, right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Formula, ParseError> {
        let left = self.parse_and()?;
        if self.peek().kind == TokenKind::Or {
            self.bump();
            let right = self.parse_or()?;
            return Ok(Formula::binary(BinOp::Or, left, right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Formula, ParseError> {
        let left = self.parse_quantifier()?;
        if self.peek().kind == TokenKind::And {
            self.bump();
            let right = self.parse_and()?;
            return Ok(Formula::binary(BinOp::And, left, right));
        }
        Ok(left)
    }

    fn parse_quantifier(&mut self) -> Result<Formula, ParseError> {
        if let TokenKind::QuantVar(letter, var) = self.peek().kind {
            self.bump();
            let body = self.parse_quantifier()?;
            let kind = match letter {
                QuantLetter::All => QuantKind::ForAll,
                QuantLetter::Ex => QuantKind::Exists,
            };
            return Ok(Formula::quantifier(kind, var, body));
        }
        self.parse_not()
    }

    fn parse_not(&mut self) -> Result<Formula, ParseError> {
        if self.peek().kind == TokenKind::Not {
            self.bump();
            let body = self.parse_not()?;
            return Ok(Formula::not(body));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Formula, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_iff()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Bottom => {
                self.bump();
                Ok(Formula::Atom(self.bottom))
            }
            TokenKind::Atom(name) => {
                self.bump();
                if self.peek().kind == TokenKind::LParen {
                    self.bump();
                    let mut args = tinyvec::TinyVec::new();
                    loop {
                        match self.peek().kind {
                            TokenKind::Var(v) => {
                                args.push(v);
                                self.bump();
                            }
                            _ => return Err(self.err("expected a variable in argument list")),
                        }
                        if self.peek().kind == TokenKind::Comma {
                            self.bump();
                            continue;
                        }
                        break;
                    }
                    self.expect(&TokenKind::RParen, "')'")?;
                    Ok(Formula::Predicate(name, args))
                } else {
                    Ok(Formula::Atom(name))
                }
            }
            _ => Err(self.err("expected a formula")),
        }
    }
}

/// Parses one formula starting at `tokens[start]`, stopping as soon as a
/// complete formula has been read (the justification that follows a proof
/// line's formula is left untouched). Returns the formula and the index of
/// the first unconsumed token.
pub fn parse_formula_at(
    tokens: &[Token],
    start: usize,
    ns: &mut Interner,
) -> Result<(Formula, usize), ParseError> {
    let bottom = ns.intern(crate::formula::BOTTOM);
    let mut p = Parser {
        toks: tokens,
        pos: start,
        bottom,
    };
    let formula = p.parse_iff()?;
    Ok((formula, p.pos))
}

/// Parses a complete formula from `tokens`, requiring the whole stream
/// (other than a trailing EOF marker) to be consumed.
pub fn parse_formula(tokens: &[Token], ns: &mut Interner) -> Result<Formula, ParseError> {
    let mut toks = tokens.to_vec();
    if toks.last().map(Token::is_eof) != Some(true) {
        let (line, col) = toks.last().map_or((1, 1), |t| (t.line, t.col));
        toks.push(Token {
            kind: TokenKind::Eof,
            line,
            col,
        });
    }
    let (formula, end) = parse_formula_at(&toks, 0, ns)?;
    if !toks[end].is_eof() {
        let t = &toks[end];
        return Err(ParseError {
            line: t.line,
            col: t.col,
            message: "unexpected trailing input after formula".to_string(),
        });
    }
    Ok(formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(ns: &mut Interner, s: &str) -> Formula {
        let toks = tokenize(s.as_bytes(), ns).unwrap();
        parse_formula(&toks, ns).unwrap()
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "A|B&C");
        let Formula::Binary(BinOp::Or, _, r) = &f else {
            panic!("expected top-level |")
        };
        assert!(matches!(**r, Formula::Binary(BinOp::And, ..)));
    }

    #[test]
    fn quantifier_scope_stops_before_binary_operators() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "Ax P(x)&Q(x)");
        let Formula::Binary(BinOp::And, l, _) = &f else {
            panic!("expected top-level &")
        };
        assert!(matches!(**l, Formula::Quantifier(QuantKind::ForAll, ..)));
    }

    #[test]
    fn negation_binds_tighter_than_quantifier() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "~Ax P(x)");
        let Formula::Not(inner) = &f else {
            panic!("expected top-level ~")
        };
        assert!(matches!(**inner, Formula::Quantifier(QuantKind::ForAll, ..)));
    }

    #[test]
    fn nested_quantifiers_parse_right_to_left() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "Ax Ey P(x,y)");
        let Formula::Quantifier(QuantKind::ForAll, _, body) = &f else {
            panic!("expected outer A")
        };
        assert!(matches!(**body, Formula::Quantifier(QuantKind::Exists, ..)));
    }

    #[test]
    fn bottom_parses_as_the_distinguished_atom() {
        let mut ns = Interner::new();
        let f = parse(&mut ns, "@");
        assert!(f.is_bottom(&ns));
    }

    #[test]
    fn unbalanced_parens_report_a_location() {
        let mut ns = Interner::new();
        let toks = tokenize(b"(A&B", &mut ns).unwrap();
        let err = parse_formula(&toks, &mut ns).unwrap_err();
        assert_eq!(err.message, "expected ')'");
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut ns = Interner::new();
        let toks = tokenize(b"A B", &mut ns).unwrap();
        assert!(parse_formula(&toks, &mut ns).is_err());
    }
}
