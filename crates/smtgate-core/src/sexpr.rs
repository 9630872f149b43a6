//! SMT-LIB s-expression reader
//!
//! Covers the lexical layer of SMT-LIB 2.6 needed to talk to a solver in text:
//! - `(` and `)`
//! - string literals, where `""` stands for one quote
//! - `|quoted symbols|`
//! - `;` line comments
//! - bare atoms (symbols, keywords, numerals, decimals, `#x..`/`#b..` literals)

use std::fmt;
use thiserror::Error;

/// A parsed s-expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    /// Symbol, keyword or numeral, kept verbatim (quoted symbols keep their bars)
    Atom(String),
    /// String literal content with the SMT-LIB quote doubling removed
    Str(String),
    /// Parenthesized list
    List(Vec<SExpr>),
}

/// Lexical error, positioned by byte offset into the source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SExprError {
    #[error("unexpected ')' at offset {0}")]
    UnexpectedClose(usize),

    #[error("unclosed '(' opened at offset {0}")]
    UnclosedList(usize),

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unterminated quoted symbol starting at offset {0}")]
    UnterminatedSymbol(usize),

    #[error("expected exactly one expression, found {0}")]
    NotSingle(usize),
}

impl SExpr {
    pub fn atom(text: impl Into<String>) -> Self {
        SExpr::Atom(text.into())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// True if this is the atom `name`
    pub fn is_atom(&self, name: &str) -> bool {
        self.as_atom() == Some(name)
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Atom(text) => f.write_str(text),
            SExpr::Str(content) => write!(f, "\"{}\"", content.replace('"', "\"\"")),
            SExpr::List(items) => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parse every top-level expression in `src`
pub fn parse_all(src: &str) -> Result<Vec<SExpr>, SExprError> {
    let mut reader = Reader { src, pos: 0 };
    let mut exprs = Vec::new();
    while !reader.at_end() {
        exprs.push(reader.read()?);
    }
    Ok(exprs)
}

/// Parse `src`, which must hold exactly one expression
pub fn parse_one(src: &str) -> Result<SExpr, SExprError> {
    let mut exprs = parse_all(src)?;
    if exprs.len() != 1 {
        return Err(SExprError::NotSingle(exprs.len()));
    }
    Ok(exprs.remove(0))
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn skip_trivia(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b';' => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b if b.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_trivia();
        self.pos >= self.src.len()
    }

    /// Read one expression; the caller has skipped trivia and checked for input
    fn read(&mut self) -> Result<SExpr, SExprError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        match bytes[start] {
            b'(' => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_trivia();
                    match bytes.get(self.pos) {
                        None => return Err(SExprError::UnclosedList(start)),
                        Some(b')') => {
                            self.pos += 1;
                            return Ok(SExpr::List(items));
                        }
                        Some(_) => items.push(self.read()?),
                    }
                }
            }
            b')' => Err(SExprError::UnexpectedClose(start)),
            b'"' => self.read_string(),
            b'|' => self.read_quoted_symbol(),
            _ => Ok(self.read_atom()),
        }
    }

    fn read_string(&mut self) -> Result<SExpr, SExprError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut content = String::new();
        let mut chunk_start = start + 1;
        let mut idx = start + 1;
        while idx < bytes.len() {
            if bytes[idx] == b'"' {
                content.push_str(&self.src[chunk_start..idx]);
                if bytes.get(idx + 1) == Some(&b'"') {
                    content.push('"');
                    idx += 2;
                    chunk_start = idx;
                    continue;
                }
                self.pos = idx + 1;
                return Ok(SExpr::Str(content));
            }
            idx += 1;
        }
        Err(SExprError::UnterminatedString(start))
    }

    fn read_quoted_symbol(&mut self) -> Result<SExpr, SExprError> {
        let start = self.pos;
        match self.src[start + 1..].find('|') {
            Some(len) => {
                let end = start + len + 2;
                self.pos = end;
                Ok(SExpr::Atom(self.src[start..end].to_string()))
            }
            None => Err(SExprError::UnterminatedSymbol(start)),
        }
    }

    fn read_atom(&mut self) -> SExpr {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && !is_delimiter(bytes[self.pos]) {
            self.pos += 1;
        }
        SExpr::Atom(self.src[start..self.pos].to_string())
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'"' | b';')
}

/// Tracks nesting across streamed chunks of solver output, so a caller
/// reading line by line knows when one complete response has arrived
///
/// Solvers print quotes inside error messages as `\"`, so within a string a
/// backslash escapes the next character.
#[derive(Debug, Default)]
pub struct DepthTracker {
    depth: usize,
    in_string: bool,
    escaped: bool,
    in_symbol: bool,
    seen_datum: bool,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk; comments end at the chunk's newline
    pub fn feed(&mut self, chunk: &str) {
        let mut in_comment = false;
        for c in chunk.chars() {
            if in_comment {
                if c == '\n' {
                    in_comment = false;
                }
                continue;
            }
            if self.in_string {
                // `""` closes and reopens, which leaves the state right
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            if self.in_symbol {
                if c == '|' {
                    self.in_symbol = false;
                }
                continue;
            }
            match c {
                '"' => {
                    self.in_string = true;
                    self.seen_datum = true;
                }
                '|' => {
                    self.in_symbol = true;
                    self.seen_datum = true;
                }
                ';' => in_comment = true,
                '(' => {
                    self.depth += 1;
                    self.seen_datum = true;
                }
                ')' => self.depth = self.depth.saturating_sub(1),
                c if c.is_whitespace() => {}
                _ => self.seen_datum = true,
            }
        }
    }

    /// True once at least one datum was seen and every list is closed
    pub fn is_complete(&self) -> bool {
        self.seen_datum && self.depth == 0 && !self.in_string && !self.in_symbol
    }
}
