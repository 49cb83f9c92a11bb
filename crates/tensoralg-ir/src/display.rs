//! Display trait implementations for IR types.
//!
//! Expressions print in index notation (`A(i,j) = B(i,k) * C(k,j)`) with
//! parentheses only where operator precedence requires them.

use std::fmt;

use crate::expr::{Access, BinaryOp, ExprKind, ExprNode, IndexExpr, Literal, LiteralValue};
use crate::format::{Format, ModeFormat};
use crate::notation::{Dialect, NotationViolation};
use crate::schedule::OperatorSplit;
use crate::stmt::{Assignment, IndexStmt, StmtKind, StmtNode};
use crate::types::{Datatype, Dimension, Type};
use crate::var::{IndexVar, TensorVar};

const NEG_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl fmt::Display for IndexVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for TensorVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Datatype::Bool => "bool",
            Datatype::UInt8 => "uint8",
            Datatype::UInt16 => "uint16",
            Datatype::UInt32 => "uint32",
            Datatype::UInt64 => "uint64",
            Datatype::Int8 => "int8",
            Datatype::Int16 => "int16",
            Datatype::Int32 => "int32",
            Datatype::Int64 => "int64",
            Datatype::Float32 => "float32",
            Datatype::Float64 => "float64",
            Datatype::Complex64 => "complex64",
            Datatype::Complex128 => "complex128",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Variable => write!(f, "?"),
            Dimension::Fixed(size) => write!(f, "{}", size),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datatype)?;
        if !self.shape.is_empty() {
            let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
            write!(f, "[{}]", dims.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for ModeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeFormat::Dense => write!(f, "dense"),
            ModeFormat::Compressed => write!(f, "compressed"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modes: Vec<String> = self.mode_formats.iter().map(|m| m.to_string()).collect();
        write!(f, "({})", modes.join(","))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExprKind::Access => "access",
            ExprKind::Literal => "literal",
            ExprKind::Neg => "negation",
            ExprKind::Binary => "binary",
            ExprKind::Reduction => "reduction",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StmtKind::Assignment => "assignment",
            StmtKind::Forall => "forall",
            StmtKind::Where => "where",
            StmtKind::Multi => "multi",
            StmtKind::Sequence => "sequence",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::UInt(v) => write!(f, "{}", v),
            LiteralValue::Float(v) => write!(f, "{:?}", v),
            LiteralValue::Complex(c) => write!(f, "complex({:?}, {:?})", c.re, c.im),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tensor_var())?;
        if !self.index_vars().is_empty() {
            let indices: Vec<&str> = self.index_vars().iter().map(|v| v.name()).collect();
            write!(f, "({})", indices.join(","))?;
        }
        Ok(())
    }
}

fn precedence(expr: &IndexExpr) -> u8 {
    match expr.node() {
        ExprNode::Binary(binary) => binary.op().precedence(),
        ExprNode::Neg(_) => NEG_PRECEDENCE,
        _ => ATOM_PRECEDENCE,
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, expr: &IndexExpr, min_precedence: u8) -> fmt::Result {
    if precedence(expr) < min_precedence {
        write!(f, "(")?;
        fmt_expr(f, expr)?;
        write!(f, ")")
    } else {
        fmt_expr(f, expr)
    }
}

fn fmt_expr(f: &mut fmt::Formatter<'_>, expr: &IndexExpr) -> fmt::Result {
    match expr.node() {
        ExprNode::Access(access) => write!(f, "{}", access),
        ExprNode::Literal(literal) => write!(f, "{}", literal),
        ExprNode::Neg(neg) => {
            write!(f, "-")?;
            fmt_operand(f, neg.operand(), NEG_PRECEDENCE)
        }
        ExprNode::Binary(binary) => {
            let op = binary.op();
            fmt_operand(f, binary.lhs(), op.precedence())?;
            write!(f, " {} ", op)?;
            // Right operands of equal precedence keep their parentheses.
            fmt_operand(f, binary.rhs(), op.precedence() + 1)
        }
        ExprNode::Reduction(reduction) => {
            match reduction.op() {
                BinaryOp::Add => write!(f, "sum({}, ", reduction.var())?,
                BinaryOp::Mul => write!(f, "product({}, ", reduction.var())?,
                op => write!(f, "reduce({}, {}, ", op, reduction.var())?,
            }
            fmt_expr(f, reduction.expr())?;
            write!(f, ")")
        }
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expr(f, self)
    }
}

impl fmt::Debug for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexExpr({})", self)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op() {
            Some(op) => write!(f, "{} {}= {}", self.lhs(), op, self.rhs()),
            None => write!(f, "{} = {}", self.lhs(), self.rhs()),
        }
    }
}

impl fmt::Display for IndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            StmtNode::Assignment(assignment) => write!(f, "{}", assignment),
            StmtNode::Forall(forall) => {
                write!(f, "forall({}, {})", forall.index_var(), forall.stmt())
            }
            StmtNode::Where(where_) => {
                write!(f, "where({}, {})", where_.consumer(), where_.producer())
            }
            StmtNode::Multi(multi) => write!(f, "multi({}, {})", multi.stmt1(), multi.stmt2()),
            StmtNode::Sequence(sequence) => write!(
                f,
                "sequence({}, {})",
                sequence.definition(),
                sequence.mutation()
            ),
        }
    }
}

impl fmt::Debug for IndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexStmt({})", self)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Einsum => write!(f, "einsum"),
            Dialect::Reduction => write!(f, "reduction"),
            Dialect::Concrete => write!(f, "concrete"),
        }
    }
}

impl fmt::Display for NotationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationViolation::NotAnAssignment(kind) => {
                write!(f, "expected a single assignment, found a {} statement", kind)
            }
            NotationViolation::ContainsReduction => write!(f, "contains a reduction"),
            NotationViolation::SumInsideProduct => {
                write!(f, "addition or subtraction inside a product")
            }
            NotationViolation::UnboundReductionVar(var) => {
                write!(f, "index variable {} is used outside a reduction over it", var)
            }
            NotationViolation::DuplicateBinding(var) => {
                write!(f, "index variable {} is bound more than once", var)
            }
            NotationViolation::UnboundIndexVar(var) => {
                write!(f, "index variable {} is not bound by a forall", var)
            }
            NotationViolation::ReductionWithoutCompound(var) => write!(
                f,
                "reduction variable {} requires a compound assignment",
                var
            ),
        }
    }
}

impl fmt::Display for OperatorSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "split({}, {} -> {}, {})",
            self.expr(),
            self.old(),
            self.left(),
            self.right()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Complex;

    fn tensor(name: &str, order: usize) -> TensorVar {
        TensorVar::new(name, Type::fixed(Datatype::Float64, &vec![3; order]))
    }

    #[test]
    fn test_display_assignment() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("A", 2);
        let b = tensor("B", 2);
        let c = tensor("C", 2);

        let stmt = a
            .access([&i, &j])
            .assign(IndexExpr::add(b.access([&i, &j]), c.access([&i, &j])));
        assert_eq!(stmt.to_string(), "A(i,j) = B(i,j) + C(i,j)");
    }

    #[test]
    fn test_display_precedence() {
        let i = IndexVar::new("i");
        let a = tensor("a", 1);
        let b = tensor("b", 1);
        let c = tensor("c", 1);

        let sum = IndexExpr::add(a.access([&i]), b.access([&i]));
        let sum_then_mul = IndexExpr::mul(sum, c.access([&i]));
        assert_eq!(sum_then_mul.to_string(), "(a(i) + b(i)) * c(i)");

        let product = IndexExpr::mul(a.access([&i]), b.access([&i]));
        let mul_then_sum = IndexExpr::add(product, c.access([&i]));
        assert_eq!(mul_then_sum.to_string(), "a(i) * b(i) + c(i)");

        let difference = IndexExpr::sub(b.access([&i]), c.access([&i]));
        let right_nested = IndexExpr::sub(a.access([&i]), difference);
        assert_eq!(right_nested.to_string(), "a(i) - (b(i) - c(i))");

        let negated = IndexExpr::neg(IndexExpr::add(a.access([&i]), b.access([&i])));
        assert_eq!(negated.to_string(), "-(a(i) + b(i))");
    }

    #[test]
    fn test_display_statements() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);
        let c = tensor("c", 1);

        let body = a
            .access([&i])
            .accumulate(IndexExpr::mul(b.access([&i, &j]), c.access([&j])));
        let stmt = IndexStmt::forall(i.clone(), IndexStmt::forall(j.clone(), body));
        assert_eq!(stmt.to_string(), "forall(i, forall(j, a(i) += B(i,j) * c(j)))");

        let reduced = IndexExpr::sum(j.clone(), IndexExpr::mul(b.access([&i, &j]), c.access([&j])));
        assert_eq!(reduced.to_string(), "sum(j, B(i,j) * c(j))");

        let t = TensorVar::scalar("t", Datatype::Float64);
        let product = IndexExpr::reduction(BinaryOp::Mul, j.clone(), c.access([&j]));
        let stmt = IndexStmt::where_(
            a.access([&i]).assign(&t),
            Access::scalar(&t).assign(product),
        );
        assert_eq!(stmt.to_string(), "where(a(i) = t, t = product(j, c(j)))");
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(IndexExpr::literal(2.0).to_string(), "2.0");
        assert_eq!(IndexExpr::literal(-3i64).to_string(), "-3");
        assert_eq!(IndexExpr::literal(7u64).to_string(), "7");
        assert_eq!(
            IndexExpr::literal(Complex::new(1.0, -0.5)).to_string(),
            "complex(1.0, -0.5)"
        );
    }

    #[test]
    fn test_display_types() {
        let ty = Type::new(Datatype::Float32, vec![Dimension::Fixed(3), Dimension::Variable]);
        assert_eq!(ty.to_string(), "float32[3,?]");
        assert_eq!(Format::csr().to_string(), "(dense,compressed)");
    }
}
