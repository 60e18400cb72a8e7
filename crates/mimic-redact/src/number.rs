//! Literal-preserving number redaction
//!
//! The literal is split into sign, integer run, fraction run and exponent
//! structurally, each run is re-rolled digit by digit and the pieces are
//! glued back together. Nothing goes through floating point, so arbitrarily
//! long literals keep every digit position.

use std::fmt;

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref NUMBER_LITERAL: Regex =
        Regex::new(r"^(-?)(0|[1-9][0-9]*)(?:\.([0-9]+))?(?:([eE])([+-]?)([0-9]+))?$").unwrap();
}

/// Largest integer a double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// No fraction or exponent, and within the exactly-representable range.
    Integer,
    /// Has a fraction or exponent and is finite as a double.
    Float,
    /// Only the literal text is exact; parsing it would lose digits.
    Exact,
}

/// A randomized numeric literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNumber {
    literal: String,
    kind: NumberKind,
}

impl FakeNumber {
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            NumberKind::Integer => self.literal.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            NumberKind::Exact => None,
            _ => self.literal.parse().ok(),
        }
    }
}

impl fmt::Display for FakeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberComponents<'a> {
    pub sign: &'a str,
    pub integer: &'a str,
    pub fraction: &'a str,
    pub exponent_marker: &'a str,
    pub exponent_sign: &'a str,
    pub exponent: &'a str,
}

impl<'a> NumberComponents<'a> {
    pub fn parse(literal: &'a str) -> Option<Self> {
        let caps = NUMBER_LITERAL.captures(literal.trim())?;
        let part = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Some(Self {
            sign: part(1),
            integer: part(2),
            fraction: part(3),
            exponent_marker: part(4),
            exponent_sign: part(5),
            exponent: part(6),
        })
    }

    pub fn is_float_like(&self) -> bool {
        !self.fraction.is_empty() || !self.exponent_marker.is_empty()
    }
}

pub fn is_number_literal(value: &str) -> bool {
    NUMBER_LITERAL.is_match(value.trim())
}

/// Randomize every digit of `literal`, keeping run lengths and notation.
pub fn redact_number(literal: &str) -> Option<FakeNumber> {
    let parts = NumberComponents::parse(literal)?;
    let mut rng = rand::thread_rng();

    let mut out = String::with_capacity(literal.len());
    out.push_str(parts.sign);
    out.push_str(&random_digits(&mut rng, parts.integer.len(), parts.integer.len() > 1));
    if !parts.fraction.is_empty() {
        out.push('.');
        out.push_str(&random_digits(&mut rng, parts.fraction.len(), false));
    }
    if !parts.exponent_marker.is_empty() {
        out.push_str(parts.exponent_marker);
        out.push_str(parts.exponent_sign);
        out.push_str(&random_digits(&mut rng, parts.exponent.len(), false));
    }

    let kind = classify(&out, parts.is_float_like());
    Some(FakeNumber { literal: out, kind })
}

fn classify(literal: &str, float_like: bool) -> NumberKind {
    if float_like {
        return match literal.parse::<f64>() {
            Ok(value) if value.is_finite() => NumberKind::Float,
            _ => NumberKind::Exact,
        };
    }
    match literal.parse::<i64>() {
        Ok(value) if value.unsigned_abs() <= MAX_SAFE_INTEGER => NumberKind::Integer,
        _ => NumberKind::Exact,
    }
}

fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize, no_leading_zero: bool) -> String {
    (0..len)
        .map(|i| {
            let low = if i == 0 && no_leading_zero { 1 } else { 0 };
            char::from(b'0' + rng.gen_range(low..10u8))
        })
        .collect()
}
