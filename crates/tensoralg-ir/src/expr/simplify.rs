//! Zero propagation.

use std::collections::HashSet;

use crate::types::{Datatype, DatatypeKind};

use super::{Access, Complex, ExprNode, IndexExpr, LiteralValue};

fn zero_of(datatype: Datatype) -> LiteralValue {
    match datatype.kind() {
        DatatypeKind::Bool | DatatypeKind::Int => LiteralValue::Int(0),
        DatatypeKind::UInt => LiteralValue::UInt(0),
        DatatypeKind::Float => LiteralValue::Float(0.0),
        DatatypeKind::Complex => LiteralValue::Complex(Complex::new(0.0, 0.0)),
    }
}

/// Simplify `expr` under the assumption that every access in `zeroed` reads
/// zero.
///
/// Returns `None` when the whole expression is zero. Subtrees that do not
/// touch a zeroed access are returned as the same handles.
pub fn simplify(expr: &IndexExpr, zeroed: &HashSet<Access>) -> Option<IndexExpr> {
    match expr.node() {
        ExprNode::Access(access) => {
            if zeroed.contains(access) {
                None
            } else {
                Some(expr.clone())
            }
        }
        ExprNode::Literal(_) => Some(expr.clone()),
        ExprNode::Neg(neg) => {
            let operand = simplify(neg.operand(), zeroed)?;
            if operand.ptr_eq(neg.operand()) {
                Some(expr.clone())
            } else {
                Some(IndexExpr::neg(operand))
            }
        }
        ExprNode::Binary(binary) => {
            let lhs = simplify(binary.lhs(), zeroed);
            let rhs = simplify(binary.rhs(), zeroed);
            let rebuild = |lhs: IndexExpr, rhs: IndexExpr| {
                if lhs.ptr_eq(binary.lhs()) && rhs.ptr_eq(binary.rhs()) {
                    expr.clone()
                } else {
                    IndexExpr::binary(binary.op(), lhs, rhs)
                }
            };
            use super::BinaryOp::*;
            match (binary.op(), lhs, rhs) {
                (Add, None, rhs) => rhs,
                (Add, lhs, None) => lhs,
                (Sub, None, Some(rhs)) => Some(IndexExpr::neg(rhs)),
                (Sub, lhs, None) => lhs,
                (Mul, None, _) | (Mul, _, None) => None,
                (Div, None, _) => None,
                (Div, Some(lhs), None) => Some(IndexExpr::div(
                    lhs,
                    IndexExpr::literal(zero_of(binary.rhs().datatype())),
                )),
                (_, Some(lhs), Some(rhs)) => Some(rebuild(lhs, rhs)),
            }
        }
        ExprNode::Reduction(reduction) => {
            let body = simplify(reduction.expr(), zeroed)?;
            if body.ptr_eq(reduction.expr()) {
                Some(expr.clone())
            } else {
                Some(IndexExpr::reduction(
                    reduction.op(),
                    reduction.var().clone(),
                    body,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use crate::var::{IndexVar, TensorVar};

    fn setup() -> (IndexVar, TensorVar, TensorVar) {
        let i = IndexVar::new("i");
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[4]));
        let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));
        (i, b, c)
    }

    #[test]
    fn test_simplify_additive_zeroes() {
        let (i, b, c) = setup();
        let zeroed = HashSet::from([b.access([&i])]);

        let sum = IndexExpr::add(b.access([&i]), c.access([&i]));
        assert_eq!(simplify(&sum, &zeroed), Some(IndexExpr::from(c.access([&i]))));

        let difference = IndexExpr::sub(b.access([&i]), c.access([&i]));
        assert_eq!(
            simplify(&difference, &zeroed),
            Some(IndexExpr::neg(c.access([&i])))
        );

        let reversed = IndexExpr::sub(c.access([&i]), b.access([&i]));
        assert_eq!(
            simplify(&reversed, &zeroed),
            Some(IndexExpr::from(c.access([&i])))
        );
    }

    #[test]
    fn test_simplify_multiplicative_zeroes() {
        let (i, b, c) = setup();
        let zeroed = HashSet::from([b.access([&i])]);

        let product = IndexExpr::mul(c.access([&i]), b.access([&i]));
        assert_eq!(simplify(&product, &zeroed), None);

        let summed = IndexExpr::sum(i.clone(), product);
        assert_eq!(simplify(&summed, &zeroed), None);

        let quotient = IndexExpr::div(c.access([&i]), b.access([&i]));
        assert_eq!(
            simplify(&quotient, &zeroed),
            Some(IndexExpr::div(c.access([&i]), 0.0))
        );
    }

    #[test]
    fn test_simplify_keeps_untouched_tree() {
        let (i, b, c) = setup();
        let expr = IndexExpr::neg(IndexExpr::mul(b.access([&i]), c.access([&i])));
        let simplified = simplify(&expr, &HashSet::new());
        assert!(simplified.is_some_and(|s| s.ptr_eq(&expr)));
    }
}
