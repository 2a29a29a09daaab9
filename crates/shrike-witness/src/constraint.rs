use std::fmt;
use std::ops::Range;

use shrike_expr::{BvConst, Expr};

use crate::errors::{Diagnostics, WitnessError};

/// Comparator of a `\result OP literal` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Eq => write!(f, "=="),
            Comparator::Ne => write!(f, "!="),
            Comparator::Lt => write!(f, "<"),
            Comparator::Le => write!(f, "<="),
            Comparator::Gt => write!(f, ">"),
            Comparator::Ge => write!(f, ">="),
        }
    }
}

/// Lexical skim of a `\result` assumption: comparator, raw right-hand
/// literal, and the byte range the fragment occupies in the source text.
///
/// The skim does not interpret the literal; replay edges hand it to the
/// non-deterministic value table, return constraints parse it as an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSkim {
    pub op: Comparator,
    pub literal: String,
    pub span: Range<usize>,
}

impl ResultSkim {
    /// True when the assumption text contains nothing but the skimmed
    /// fragment, whitespace and semicolons. Anything else is free-form C the
    /// core cannot reproduce, which disables refutation mode.
    pub fn covers_whole(&self, text: &str) -> bool {
        let before = &text[..self.span.start];
        let after = &text[self.span.end..];
        before
            .chars()
            .chain(after.chars())
            .all(|c| c.is_whitespace() || c == ';')
    }
}

/// Locate and skim the first `\result OP literal` fragment of `text`.
pub fn skim_result(text: &str) -> Result<ResultSkim, WitnessError> {
    let missing = || WitnessError::MissingResult {
        constraint: text.to_string(),
    };
    let invalid_op = || WitnessError::InvalidComparator {
        constraint: text.to_string(),
    };

    let start = text.find("\\result").ok_or_else(missing)?;
    let bytes = text.as_bytes();
    let mut pos = start + "\\result".len();

    while pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    if pos >= bytes.len() {
        return Err(invalid_op());
    }

    let op = if pos + 1 < bytes.len() && bytes[pos + 1] == b'=' {
        let op = match &text[pos..pos + 2] {
            "==" => Comparator::Eq,
            "!=" => Comparator::Ne,
            "<=" => Comparator::Le,
            ">=" => Comparator::Ge,
            _ => return Err(invalid_op()),
        };
        pos += 2;
        op
    } else {
        let op = match bytes[pos] {
            b'<' => Comparator::Lt,
            b'>' => Comparator::Gt,
            _ => return Err(invalid_op()),
        };
        pos += 1;
        op
    };

    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'(') {
        pos += 1;
    }
    let mut len = 0;
    while pos + len < bytes.len()
        && bytes[pos + len] != b';'
        && bytes[pos + len] != b' '
        && bytes[pos + len] != b')'
    {
        len += 1;
    }

    Ok(ResultSkim {
        op,
        literal: text[pos..pos + len].to_string(),
        span: start..pos + len,
    })
}

/// Typed right-hand side of a return constraint. Signedness follows the
/// literal's `u`/`U` suffix, not the left-hand expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintLiteral {
    Signed(i64),
    Unsigned(u64),
}

/// A parsed `\result OP literal` return constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnConstraint {
    pub op: Comparator,
    pub literal: ConstraintLiteral,
}

impl ReturnConstraint {
    /// Parse the first `\result OP literal` fragment of `constraint`.
    ///
    /// The literal uses base autodetection (`0x` hex, leading `0` octal). A
    /// partially consumed literal is an advisory, matching the original
    /// behavior of keeping the longest valid prefix.
    pub fn parse(constraint: &str, diags: &mut Diagnostics) -> Result<Self, WitnessError> {
        let skim = skim_result(constraint)?;
        Self::from_skim(&skim, diags)
    }

    /// Interpret an already-skimmed fragment.
    pub fn from_skim(skim: &ResultSkim, diags: &mut Diagnostics) -> Result<Self, WitnessError> {
        let raw = skim.literal.as_str();
        let invalid = || WitnessError::InvalidConstraintLiteral {
            literal: raw.to_string(),
        };

        let first = raw.chars().next().ok_or_else(invalid)?;
        if !(first.is_ascii_digit() || first == '-') {
            return Err(invalid());
        }

        let literal = if raw.ends_with('u') || raw.ends_with('U') {
            let digits = &raw[..raw.len() - 1];
            let (value, consumed) = parse_u64_auto(digits).ok_or_else(invalid)?;
            if consumed != digits.len() {
                diags.warn(
                    "shrike::witness::partial_literal",
                    format!("cannot fully parse return constraint literal '{raw}'"),
                );
            }
            ConstraintLiteral::Unsigned(value)
        } else {
            let (value, consumed) = parse_i64_auto(raw).ok_or_else(invalid)?;
            if consumed != raw.len() {
                diags.warn(
                    "shrike::witness::partial_literal",
                    format!("cannot fully parse return constraint literal '{raw}'"),
                );
            }
            ConstraintLiteral::Signed(value)
        };

        Ok(ReturnConstraint {
            op: skim.op,
            literal,
        })
    }

    /// Build the predicate `left OP literal` over a caller-provided
    /// left-hand expression.
    ///
    /// The constant takes `left`'s bit width; orderings pick the signed or
    /// unsigned comparison according to the literal's parsed signedness.
    pub fn to_predicate(&self, left: &Expr) -> Expr {
        let width = left.width();
        let (right, signed) = match self.literal {
            ConstraintLiteral::Signed(v) => (BvConst::from_i64(width, v), true),
            ConstraintLiteral::Unsigned(v) => (BvConst::from_u64(width, v), false),
        };
        let l = left.clone();
        let r = Expr::constant(right);
        match (self.op, signed) {
            (Comparator::Eq, _) => l.eq(r),
            (Comparator::Ne, _) => l.eq(r).not(),
            (Comparator::Lt, true) => l.slt(r),
            (Comparator::Lt, false) => l.ult(r),
            (Comparator::Le, true) => l.sle(r),
            (Comparator::Le, false) => l.ule(r),
            (Comparator::Gt, true) => r.slt(l),
            (Comparator::Gt, false) => r.ult(l),
            (Comparator::Ge, true) => r.sle(l),
            (Comparator::Ge, false) => r.ule(l),
        }
    }
}

/// Parse an unsigned integer prefix with base autodetection.
///
/// Returns the value and the number of bytes consumed, or `None` when no
/// digit could be read at all.
pub(crate) fn parse_u64_auto(s: &str) -> Option<(u64, usize)> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    if s.len() > 2 && (s.starts_with("0x") || s.starts_with("0X")) {
        let mut value: u64 = 0;
        let mut consumed = 2;
        while consumed < bytes.len() && bytes[consumed].is_ascii_hexdigit() {
            let digit = (bytes[consumed] as char).to_digit(16).unwrap() as u64;
            value = value.wrapping_mul(16).wrapping_add(digit);
            consumed += 1;
        }
        if consumed == 2 {
            return None;
        }
        return Some((value, consumed));
    }
    let (base, start) = if bytes[0] == b'0' && bytes.len() > 1 {
        (8u64, 1)
    } else {
        (10u64, 0)
    };
    let mut value: u64 = 0;
    let mut consumed = start;
    while consumed < bytes.len() {
        let c = bytes[consumed];
        if !c.is_ascii_digit() {
            break;
        }
        let digit = (c - b'0') as u64;
        if digit >= base {
            break;
        }
        value = value.wrapping_mul(base).wrapping_add(digit);
        consumed += 1;
    }
    if consumed == start && start == 0 {
        return None;
    }
    // "0" followed by a non-octal byte parses as plain zero of length one.
    Some((value, consumed.max(1)))
}

/// Parse a signed integer prefix with base autodetection and optional
/// leading minus.
pub(crate) fn parse_i64_auto(s: &str) -> Option<(i64, usize)> {
    let (negative, rest, offset) = match s.strip_prefix('-') {
        Some(rest) => (true, rest, 1),
        None => (false, s, 0),
    };
    let (magnitude, consumed) = parse_u64_auto(rest)?;
    let value = if negative {
        (magnitude as i64).wrapping_neg()
    } else {
        magnitude as i64
    };
    Some((value, consumed + offset))
}
