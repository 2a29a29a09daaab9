use crate::value::{BvConst, Width};

/// Abstract bit-vector predicate/expression, executor-agnostic.
///
/// Comparison nodes are boolean (width 1); `Sym` and `Const` carry the width
/// of the underlying machine value. Signed and unsigned orderings are
/// distinct nodes so the host does not need to re-derive signedness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Opaque symbolic value owned by the executor (e.g. a call's result).
    Sym { name: String, width: Width },
    /// Bit-vector literal.
    Const(BvConst),

    Eq(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),

    // Signed orderings
    Slt(Box<Expr>, Box<Expr>),
    Sle(Box<Expr>, Box<Expr>),

    // Unsigned orderings
    Ult(Box<Expr>, Box<Expr>),
    Ule(Box<Expr>, Box<Expr>),
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    pub fn sym(name: impl Into<String>, width: Width) -> Self {
        Expr::Sym {
            name: name.into(),
            width,
        }
    }

    pub fn constant(c: BvConst) -> Self {
        Expr::Const(c)
    }

    pub fn eq(self, other: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn slt(self, other: Expr) -> Self {
        Expr::Slt(Box::new(self), Box::new(other))
    }

    pub fn sle(self, other: Expr) -> Self {
        Expr::Sle(Box::new(self), Box::new(other))
    }

    pub fn ult(self, other: Expr) -> Self {
        Expr::Ult(Box::new(self), Box::new(other))
    }

    pub fn ule(self, other: Expr) -> Self {
        Expr::Ule(Box::new(self), Box::new(other))
    }

    /// Width of the value this expression denotes.
    ///
    /// Predicates are width 1.
    pub fn width(&self) -> Width {
        match self {
            Expr::Sym { width, .. } => *width,
            Expr::Const(c) => c.width(),
            Expr::Eq(..)
            | Expr::Not(..)
            | Expr::Slt(..)
            | Expr::Sle(..)
            | Expr::Ult(..)
            | Expr::Ule(..) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_create_expected_nodes() {
        let l = Expr::sym("r", 32);
        let r = Expr::constant(BvConst::from_i64(32, 42));
        assert!(matches!(l.clone().eq(r.clone()), Expr::Eq(_, _)));
        assert!(matches!(l.clone().eq(r.clone()).not(), Expr::Not(_)));
        assert!(matches!(l.clone().slt(r.clone()), Expr::Slt(_, _)));
        assert!(matches!(l.clone().ule(r), Expr::Ule(_, _)));
    }

    #[test]
    fn comparisons_are_boolean_width() {
        let l = Expr::sym("r", 64);
        let r = Expr::constant(BvConst::from_u64(64, 7));
        assert_eq!(l.width(), 64);
        assert_eq!(l.eq(r).width(), 1);
    }

    #[test]
    fn operand_order_is_preserved() {
        let a = Expr::sym("a", 8);
        let b = Expr::sym("b", 8);
        match a.clone().slt(b.clone()) {
            Expr::Slt(lhs, rhs) => {
                assert_eq!(*lhs, a);
                assert_eq!(*rhs, b);
            }
            other => panic!("expected Slt, got {other:?}"),
        }
    }

    #[test]
    fn signed_and_unsigned_orderings_are_distinct() {
        let a = Expr::sym("a", 32);
        let b = Expr::sym("b", 32);
        assert_ne!(a.clone().slt(b.clone()), a.ult(b));
    }
}
