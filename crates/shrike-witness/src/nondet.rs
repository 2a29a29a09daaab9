use std::fmt;

use shrike_expr::{BvConst, Width};

use crate::constraint::{parse_i64_auto, parse_u64_auto};

/// Prefix identifying non-deterministic input functions in witness
/// assumptions. Edges whose `assumption.resultfunction` starts with this are
/// replay edges.
pub const NONDET_PREFIX: &str = "__VERIFIER_nondet";

/// A concrete machine value injected during replay.
///
/// Floating-point values are stored as the bit-cast IEEE-754 payload at the
/// corresponding width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcreteValue {
    pub width: Width,
    pub bits: u64,
    pub signed: bool,
}

impl ConcreteValue {
    pub fn new(width: Width, bits: u64, signed: bool) -> Self {
        ConcreteValue {
            width,
            bits: BvConst::new(width, bits).bits(),
            signed,
        }
    }

    pub fn from_i64(width: Width, value: i64) -> Self {
        Self::new(width, value as u64, true)
    }

    pub fn from_u64(width: Width, value: u64) -> Self {
        Self::new(width, value, false)
    }

    pub fn as_bv(&self) -> BvConst {
        BvConst::new(self.width, self.bits)
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed {
            write!(f, "{}:i{}", self.as_bv().as_i64(), self.width)
        } else {
            write!(f, "{}:u{}", self.bits, self.width)
        }
    }
}

/// Result of interpreting a replay literal for a given input function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NondetValue {
    Known(ConcreteValue),
    /// Unrecognized function symbol or literal; replay degrades to symbolic.
    Unknown,
}

impl NondetValue {
    pub fn known(self) -> Option<ConcreteValue> {
        match self {
            NondetValue::Known(v) => Some(v),
            NondetValue::Unknown => None,
        }
    }
}

/// Interpret `literal` as the return value of `function`.
///
/// The function name selects width and signedness; unknown suffixes and
/// literals that do not fully parse yield [`NondetValue::Unknown`], which is
/// advisory only (the load continues, determinism is dropped).
pub fn nondet_value(function: &str, literal: &str) -> NondetValue {
    let Some(suffix) = function.strip_prefix("__VERIFIER_nondet_") else {
        return NondetValue::Unknown;
    };
    match suffix {
        "int" => signed_int(32, literal),
        "short" => signed_int(16, literal),
        "long" => signed_int(64, literal),
        "char" => char_value(literal),

        "uint" | "u32" | "unsigned" => unsigned_int(32, literal),
        "ushort" => unsigned_int(16, literal),
        "ulong" | "size_t" | "loff_t" | "sector_t" | "pointer" | "pchar" | "pthread_t" => {
            unsigned_int(64, literal)
        }
        "uchar" => unsigned_int(8, literal),

        "bool" | "_Bool" => bool_value(literal),

        "float" => float_value(literal),
        "double" => double_value(literal),

        _ => NondetValue::Unknown,
    }
}

fn signed_int(width: Width, literal: &str) -> NondetValue {
    match parse_i64_auto(literal) {
        Some((value, consumed)) if consumed == literal.len() => {
            NondetValue::Known(ConcreteValue::from_i64(width, value))
        }
        _ => NondetValue::Unknown,
    }
}

fn unsigned_int(width: Width, literal: &str) -> NondetValue {
    match parse_u64_auto(literal) {
        Some((value, consumed)) if consumed == literal.len() => {
            NondetValue::Known(ConcreteValue::from_u64(width, value))
        }
        _ => NondetValue::Unknown,
    }
}

fn bool_value(literal: &str) -> NondetValue {
    match literal {
        "true" | "True" => NondetValue::Known(ConcreteValue::from_u64(1, 1)),
        "false" | "False" => NondetValue::Known(ConcreteValue::from_u64(1, 0)),
        other => match parse_i64_auto(other) {
            Some((value, consumed)) if consumed == other.len() => {
                NondetValue::Known(ConcreteValue::from_u64(1, (value != 0) as u64))
            }
            _ => NondetValue::Unknown,
        },
    }
}

fn char_value(literal: &str) -> NondetValue {
    let bytes = literal.as_bytes();
    if bytes.len() == 3 && bytes[0] == b'"' && bytes[2] == b'"' {
        return NondetValue::Known(ConcreteValue::from_u64(8, bytes[1] as u64));
    }
    signed_int(8, literal)
}

fn float_value(literal: &str) -> NondetValue {
    match literal.parse::<f32>() {
        Ok(v) => NondetValue::Known(ConcreteValue::from_u64(32, v.to_bits() as u64)),
        Err(_) => NondetValue::Unknown,
    }
}

fn double_value(literal: &str) -> NondetValue {
    match literal.parse::<f64>() {
        Ok(v) => NondetValue::Known(ConcreteValue::from_u64(64, v.to_bits())),
        Err(_) => NondetValue::Unknown,
    }
}
