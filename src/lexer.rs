//! Tokeniser for proof scripts and standalone formulas.
//!
//! Comments are stripped with [`regex`] before scanning so the rest of the
//! lexer can stay a plain byte scanner; stripping blanks matched ranges
//! rather than deleting them, which keeps every remaining byte at its
//! original offset and makes line/column bookkeeping trivial.

use crate::intern::{Atom, Interner};
use crate::rule::RuleName;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sign {
    T,
    F,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sign::T => "T",
            Sign::F => "F",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuantLetter {
    All,
    Ex,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Num(u32),
    Dot,
    Comma,
    Turnstile,
    LParen,
    RParen,
    LBrace,
    RBrace,
    KwPre,
    KwConclusion,
    KwClosed,
    Sign(Sign),
    Bottom,
    Not,
    And,
    Or,
    Imp,
    Iff,
    RuleName(RuleName),
    /// `A<var>` / `E<var>`, e.g. `Ax`, `Ey1`.
    QuantVar(QuantLetter, Atom),
    Atom(Atom),
    Var(Atom),
    /// Anchors a syntax error: any byte that matches no token rule.
    Out(char),
    Eof,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub col: u32,
}

impl Token {
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: u32,
    pub col: u32,
    pub found: char,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: unexpected character '{}'",
            self.line, self.col, self.found
        )
    }
}

fn comment_regexes() -> &'static (Regex, Regex) {
    static RE: OnceLock<(Regex, Regex)> = OnceLock::new();
    RE.get_or_init(|| {
        (
            Regex::new(r"(?s)##.*?##").expect("block comment regex"),
            Regex::new(r"#[^\n]*").expect("line comment regex"),
        )
    })
}

/// Blanks out `# ... \n` and `## ... ##` comments, replacing every matched
/// byte except newlines with a space so byte offsets (and therefore line and
/// column numbers) do not move.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let (block, line) = comment_regexes();
    let mut bytes = text.as_bytes().to_vec();
    for m in block.find_iter(text) {
        blank(&mut bytes, m.start(), m.end());
    }
    // Re-scan line comments on the already-blanked buffer so a `#` that was
    // part of a block comment is not treated as the start of a new one.
    let partially_blanked = String::from_utf8(bytes.clone()).unwrap();
    for m in line.find_iter(&partially_blanked) {
        blank(&mut bytes, m.start(), m.end());
    }
    String::from_utf8(bytes).unwrap()
}

fn blank(bytes: &mut [u8], start: usize, end: usize) {
    for b in &mut bytes[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

struct Scanner<'a> {
    text: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a [u8]) -> Self {
        Scanner {
            text,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.get(self.pos + offset).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.text[self.pos..].starts_with(s.as_bytes())
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }
}

fn is_upper(b: u8) -> bool {
    b.is_ascii_uppercase()
}
fn is_lower(b: u8) -> bool {
    b.is_ascii_lowercase()
}
fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}
fn is_alnum_tail(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_alphabetic()
}

/// Tokenises `text`, interning atom/predicate/variable names into `ns`.
pub fn tokenize(text: &[u8], ns: &mut Interner) -> Result<Vec<Token>, LexError> {
    let stripped = strip_comments(std::str::from_utf8(text).expect("UTF-8 input"));
    let mut sc = Scanner::new(stripped.as_bytes());
    let mut out = Vec::new();

    loop {
        while matches!(sc.peek(), Some(b) if b.is_ascii_whitespace()) {
            sc.bump();
        }
        let (line, col) = (sc.line, sc.col);
        let Some(b) = sc.peek() else {
            out.push(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
            break;
        };

        let kind = match b {
            b'.' => {
                sc.bump();
                TokenKind::Dot
            }
            b',' => {
                sc.bump();
                TokenKind::Comma
            }
            b'(' => {
                sc.bump();
                TokenKind::LParen
            }
            b')' => {
                sc.bump();
                TokenKind::RParen
            }
            b'{' => {
                sc.bump();
                TokenKind::LBrace
            }
            b'}' => {
                sc.bump();
                TokenKind::RBrace
            }
            b'@' => {
                sc.bump();
                TokenKind::Bottom
            }
            b'|' => match sc.peek_at(1) {
                Some(b'T') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::OrT)
                }
                Some(b'F') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::OrF)
                }
                Some(b'-') | Some(b'=') => {
                    sc.bump_n(2);
                    TokenKind::Turnstile
                }
                _ => {
                    sc.bump();
                    TokenKind::Or
                }
            },
            b'&' => match sc.peek_at(1) {
                Some(b'T') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::AndT)
                }
                Some(b'F') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::AndF)
                }
                _ => {
                    sc.bump();
                    TokenKind::And
                }
            },
            b'~' => match sc.peek_at(1) {
                Some(b'T') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::NegT)
                }
                Some(b'F') => {
                    sc.bump_n(2);
                    TokenKind::RuleName(RuleName::NegF)
                }
                _ => {
                    sc.bump();
                    TokenKind::Not
                }
            },
            b'<' if sc.starts_with("<->") => {
                sc.bump_n(3);
                TokenKind::Iff
            }
            b'-' if sc.starts_with("->T") => {
                sc.bump_n(3);
                TokenKind::RuleName(RuleName::ImpT)
            }
            b'-' if sc.starts_with("->F") => {
                sc.bump_n(3);
                TokenKind::RuleName(RuleName::ImpF)
            }
            b'-' if sc.starts_with("->") => {
                sc.bump_n(2);
                TokenKind::Imp
            }
            b'0'..=b'9' => {
                let start = sc.pos;
                while matches!(sc.peek(), Some(c) if is_digit(c)) {
                    sc.bump();
                }
                let text = std::str::from_utf8(&sc.text[start..sc.pos]).unwrap();
                TokenKind::Num(text.parse().expect("digit run parses as u32"))
            }
            b'A' | b'E' if matches!(sc.peek_at(1), Some(c) if c == b'T' || c == b'F') => {
                let letter = b;
                let tf = sc.peek_at(1).unwrap();
                sc.bump_n(2);
                TokenKind::RuleName(match (letter, tf) {
                    (b'A', b'T') => RuleName::AllT,
                    (b'A', b'F') => RuleName::AllF,
                    (b'E', b'T') => RuleName::ExT,
                    (b'E', b'F') => RuleName::ExF,
                    _ => unreachable!(),
                })
            }
            b'A' | b'E' if matches!(sc.peek_at(1), Some(c) if is_lower(c)) => {
                let letter = b;
                sc.bump();
                let var_start = sc.pos;
                while matches!(sc.peek(), Some(c) if is_lower(c) || is_digit(c)) {
                    sc.bump();
                }
                let name = std::str::from_utf8(&sc.text[var_start..sc.pos]).unwrap();
                let atom = ns.intern(name);
                TokenKind::QuantVar(
                    if letter == b'A' {
                        QuantLetter::All
                    } else {
                        QuantLetter::Ex
                    },
                    atom,
                )
            }
            c if is_upper(c) => {
                let start = sc.pos;
                while matches!(sc.peek(), Some(c) if is_alnum_tail(c) && !is_lower(c)) {
                    sc.bump();
                }
                let name = std::str::from_utf8(&sc.text[start..sc.pos]).unwrap();
                if name == "T" {
                    TokenKind::Sign(Sign::T)
                } else if name == "F" {
                    TokenKind::Sign(Sign::F)
                } else {
                    TokenKind::Atom(ns.intern(name))
                }
            }
            c if is_lower(c) => {
                let start = sc.pos;
                while matches!(sc.peek(), Some(c) if is_lower(c) || is_digit(c)) {
                    sc.bump();
                }
                let name = std::str::from_utf8(&sc.text[start..sc.pos]).unwrap();
                match name {
                    "pre" => TokenKind::KwPre,
                    "conclusion" => TokenKind::KwConclusion,
                    "closed" => TokenKind::KwClosed,
                    _ => TokenKind::Var(ns.intern(name)),
                }
            }
            other => {
                sc.bump();
                return Err(LexError {
                    line,
                    col,
                    found: other as char,
                });
            }
        };

        out.push(Token { kind, line, col });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut ns = Interner::new();
        tokenize(src.as_bytes(), &mut ns)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn compound_rule_names_precede_constituents() {
        assert_eq!(
            kinds("&T &F |T |F ->T ->F ~T ~F AT AF ET EF"),
            vec![
                TokenKind::RuleName(RuleName::AndT),
                TokenKind::RuleName(RuleName::AndF),
                TokenKind::RuleName(RuleName::OrT),
                TokenKind::RuleName(RuleName::OrF),
                TokenKind::RuleName(RuleName::ImpT),
                TokenKind::RuleName(RuleName::ImpF),
                TokenKind::RuleName(RuleName::NegT),
                TokenKind::RuleName(RuleName::NegF),
                TokenKind::RuleName(RuleName::AllT),
                TokenKind::RuleName(RuleName::AllF),
                TokenKind::RuleName(RuleName::ExT),
                TokenKind::RuleName(RuleName::ExF),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quantifier_variable_tokens() {
        let mut ns = Interner::new();
        let toks = tokenize(b"Ax Ey1", &mut ns).unwrap();
        let x = ns.intern("x");
        let y1 = ns.intern("y1");
        assert_eq!(toks[0].kind, TokenKind::QuantVar(QuantLetter::All, x));
        assert_eq!(toks[1].kind, TokenKind::QuantVar(QuantLetter::Ex, y1));
    }

    #[test]
    fn line_comments_and_block_comments_are_ignored() {
        let kinds = kinds("A # trailing comment\n## block\ncomment ##B");
        assert_eq!(kinds.len(), 3); // Atom(A), Atom(B), Eof
    }

    #[test]
    fn bare_t_and_f_are_signs_not_atoms() {
        assert_eq!(kinds("T F"), vec![
            TokenKind::Sign(Sign::T),
            TokenKind::Sign(Sign::F),
            TokenKind::Eof
        ]);
    }

    #[test]
    fn out_token_anchors_unexpected_character() {
        let mut ns = Interner::new();
        let err = tokenize(b"A $ B", &mut ns).unwrap_err();
        assert_eq!(err.found, '$');
        assert_eq!(err.col, 3);
    }

    #[test]
    fn comment_stripping_preserves_offsets() {
        let stripped = strip_comments("A # c\nB");
        assert_eq!(stripped.len(), "A # c\nB".len());
        assert!(stripped.starts_with("A"));
        assert!(stripped.ends_with("B"));
    }
}
