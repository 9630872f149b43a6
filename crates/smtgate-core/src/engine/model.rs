//! Engine-native model and values
//!
//! A model is read from the solver's `get-model` answer, a list of
//! `(define-fun name (params) Sort term)` entries. Each value keeps its sort
//! and term as printed, and exposes type probes and decoders over them.

use crate::error::{EngineError, Result};
use crate::sexpr::{self, SExpr};
use std::fmt;
use tracing::debug;

/// A declared symbol and its interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Symbol as the engine prints it (quoted symbols keep their bars)
    pub name: String,
    pub value: EngineValue,
}

/// Satisfying assignment in engine enumeration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineModel {
    declarations: Vec<Declaration>,
}

impl EngineModel {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Parse a `get-model` answer
    ///
    /// Accepts both `((define-fun ...) ...)` and the older
    /// `(model (define-fun ...) ...)` layout. Sort universe entries
    /// (`declare-fun` for uninterpreted sort elements) are not user
    /// declarations and are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let root = sexpr::parse_one(text)
            .map_err(|e| EngineError::Protocol(format!("malformed model: {}", e)))?;
        Self::from_sexpr(&root)
    }

    pub fn from_sexpr(root: &SExpr) -> Result<Self> {
        let items = root
            .as_list()
            .ok_or_else(|| EngineError::Protocol(format!("expected a model list, got {}", root)))?;
        let items = match items.split_first() {
            Some((head, rest)) if head.is_atom("model") => rest,
            _ => items,
        };

        let mut declarations = Vec::with_capacity(items.len());
        for item in items {
            let parts = item.as_list().ok_or_else(|| {
                EngineError::Protocol(format!("unexpected model entry: {}", item))
            })?;
            match parts {
                [keyword, name, params, sort, term] if keyword.is_atom("define-fun") => {
                    let name = name.as_atom().ok_or_else(|| {
                        EngineError::Protocol(format!("bad symbol in model entry: {}", item))
                    })?;
                    let params = params.as_list().ok_or_else(|| {
                        EngineError::Protocol(format!("bad parameter list in model entry: {}", item))
                    })?;
                    declarations.push(Declaration {
                        name: name.to_string(),
                        value: EngineValue::function(params.to_vec(), sort.clone(), term.clone()),
                    });
                }
                [keyword, ..] if keyword.is_atom("define-fun") => {
                    return Err(EngineError::Protocol(format!(
                        "malformed define-fun in model: {}",
                        item
                    )));
                }
                _ => debug!(entry = %item, "skipping non-definition model entry"),
            }
        }

        Ok(Self { declarations })
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl<'a> IntoIterator for &'a EngineModel {
    type Item = &'a Declaration;
    type IntoIter = std::slice::Iter<'a, Declaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Engine value decoded into one portable shape
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Integer(i64),
    Boolean(bool),
    Rational(Rational),
    String(String),
    /// Anything without a portable decoding; render it as text
    Other,
}

/// An interpretation from the model: a sort plus a term, with parameters
/// when the declaration is a function
#[derive(Debug, Clone, PartialEq)]
pub struct EngineValue {
    params: Vec<SExpr>,
    sort: SExpr,
    term: SExpr,
}

impl EngineValue {
    /// Interpretation of a constant
    pub fn new(sort: SExpr, term: SExpr) -> Self {
        Self::function(Vec::new(), sort, term)
    }

    /// Interpretation of a function of `params`
    pub fn function(params: Vec<SExpr>, sort: SExpr, term: SExpr) -> Self {
        Self { params, sort, term }
    }

    pub fn sort(&self) -> &SExpr {
        &self.sort
    }

    pub fn term(&self) -> &SExpr {
        &self.term
    }

    pub fn is_constant(&self) -> bool {
        self.params.is_empty()
    }

    fn constant_sort(&self) -> Option<&str> {
        if self.is_constant() {
            self.sort.as_atom()
        } else {
            None
        }
    }

    pub fn is_integer(&self) -> bool {
        self.constant_sort() == Some("Int")
    }

    pub fn is_boolean(&self) -> bool {
        self.constant_sort() == Some("Bool")
    }

    /// Real-sorted and a ratio of integers (algebraic numbers are not)
    pub fn is_rational(&self) -> bool {
        self.as_rational().is_some()
    }

    pub fn is_string(&self) -> bool {
        self.constant_sort() == Some("String")
    }

    /// Integer value, if it fits in 64 bits
    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        integer_from_term(&self.term).and_then(|n| i64::try_from(n).ok())
    }

    pub fn as_bool(&self) -> Option<bool> {
        if !self.is_boolean() {
            return None;
        }
        match self.term.as_atom() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<Rational> {
        if self.constant_sort() != Some("Real") {
            return None;
        }
        Rational::from_term(&self.term)
    }

    /// String content with SMT-LIB unicode escapes resolved
    pub fn as_string(&self) -> Option<String> {
        if !self.is_string() {
            return None;
        }
        match &self.term {
            SExpr::Str(raw) => Some(decode_string_escapes(raw)),
            _ => None,
        }
    }

    /// Decode by sort; a value whose term does not fit its sort's shape
    /// falls through to `Other`
    pub fn decode(&self) -> Decoded {
        let decoded = match self.constant_sort() {
            Some("Int") => self.as_i64().map(Decoded::Integer),
            Some("Bool") => self.as_bool().map(Decoded::Boolean),
            Some("Real") => self.as_rational().map(Decoded::Rational),
            Some("String") => self.as_string().map(Decoded::String),
            _ => None,
        };
        decoded.unwrap_or(Decoded::Other)
    }
}

impl fmt::Display for EngineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write!(f, "{}", self.term);
        }
        write!(f, "(lambda {} {})", SExpr::List(self.params.clone()), self.term)
    }
}

fn integer_from_term(term: &SExpr) -> Option<i128> {
    match term {
        SExpr::Atom(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().ok()
        }
        SExpr::List(items) => match items.as_slice() {
            [op, inner] if op.is_atom("-") => integer_from_term(inner)?.checked_neg(),
            _ => None,
        },
        _ => None,
    }
}

/// Exact ratio of two integers, denominator always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    numer: i128,
    denom: i128,
}

impl Rational {
    /// Reduced ratio `numer / denom`; `None` for a zero denominator or on overflow
    pub fn new(numer: i128, denom: i128) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let (numer, denom) = if denom < 0 {
            (numer.checked_neg()?, denom.checked_neg()?)
        } else {
            (numer, denom)
        };
        // gcd divides denom, which is positive and at most i128::MAX
        let divisor = gcd(numer.unsigned_abs(), denom.unsigned_abs()) as i128;
        Some(Self {
            numer: numer / divisor,
            denom: denom / divisor,
        })
    }

    pub fn numer(&self) -> i128 {
        self.numer
    }

    pub fn denom(&self) -> i128 {
        self.denom
    }

    /// Read a real term: numeral, decimal, `(- r)` or `(/ a b)`
    pub fn from_term(term: &SExpr) -> Option<Self> {
        match term {
            SExpr::Atom(text) => Self::parse_numeral(text),
            SExpr::List(items) => match items.as_slice() {
                [op, inner] if op.is_atom("-") => Self::from_term(inner)?.checked_neg(),
                [op, lhs, rhs] if op.is_atom("/") => {
                    Self::from_term(lhs)?.checked_div(Self::from_term(rhs)?)
                }
                _ => None,
            },
            SExpr::Str(_) => None,
        }
    }

    fn parse_numeral(text: &str) -> Option<Self> {
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !digits_only(int_part) || !digits_only(frac_part) {
            return None;
        }
        let numer: i128 = format!("{}{}", int_part, frac_part).parse().ok()?;
        let denom = 10i128.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
        Self::new(numer, denom)
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            numer: self.numer.checked_neg()?,
            denom: self.denom,
        })
    }

    fn checked_div(self, rhs: Self) -> Option<Self> {
        Self::new(
            self.numer.checked_mul(rhs.denom)?,
            self.denom.checked_mul(rhs.numer)?,
        )
    }

    /// Decimal approximation rounded half away from zero at `digits`
    /// fractional digits
    pub fn to_decimal(&self, digits: u32) -> f64 {
        let denom = self.denom.unsigned_abs();
        let scaled = 10u128
            .checked_pow(digits)
            .and_then(|scale| Some((scale, self.numer.unsigned_abs().checked_mul(scale)?)));
        let Some((scale, scaled)) = scaled else {
            return self.approximate(digits);
        };

        let mut quotient = scaled / denom;
        let remainder = scaled % denom;
        if remainder >= denom - remainder {
            quotient += 1;
        }

        let sign = if self.numer < 0 && quotient != 0 { "-" } else { "" };
        let text = if digits == 0 {
            format!("{}{}", sign, quotient)
        } else {
            format!(
                "{}{}.{:0width$}",
                sign,
                quotient / scale,
                quotient % scale,
                width = digits as usize
            )
        };
        text.parse().unwrap_or_else(|_| self.approximate(digits))
    }

    fn approximate(&self, digits: u32) -> f64 {
        let value = self.numer as f64 / self.denom as f64;
        let factor = 10f64.powi(digits.min(300) as i32);
        let rounded = (value * factor).round() / factor;
        if rounded.is_finite() {
            rounded
        } else {
            value
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Resolve `\u{h..h}` (1 to 5 hex digits) and `\uhhhh` escapes; anything
/// else is kept as written
fn decode_string_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find("\\u") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        match parse_unicode_escape(after) {
            Some((ch, used)) => {
                out.push(ch);
                rest = &after[used..];
            }
            None => {
                out.push_str("\\u");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_unicode_escape(s: &str) -> Option<(char, usize)> {
    let (hex, used) = match s.strip_prefix('{') {
        Some(body) => {
            let end = body.find('}')?;
            let hex = &body[..end];
            if hex.is_empty() || hex.len() > 5 {
                return None;
            }
            (hex, end + 2)
        }
        None => (s.get(..4)?, 4),
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    Some((char::from_u32(code)?, used))
}
