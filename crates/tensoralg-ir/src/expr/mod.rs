//! Index expressions.
//!
//! An [`IndexExpr`] is a shared, immutable handle to an [`ExprNode`]. Cloning
//! a handle is cheap and never copies the tree. Equality is structural, with
//! index and tensor variables compared by identity.

mod analysis;
mod simplify;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::stmt::Assignment;
use crate::types::Datatype;
use crate::var::{IndexVar, TensorVar};

pub(crate) use analysis::push_unique;
pub use simplify::simplify;

/// Binary arithmetic operators, also used as reduction and compound
/// assignment combinators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Binding strength used when printing.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub)
    }

    pub fn is_multiplicative(&self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div)
    }
}

/// Tag of an expression node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Access,
    Literal,
    Neg,
    Binary,
    Reduction,
}

/// A read of a tensor at a list of index variables, such as `B(i,j)`.
///
/// Accesses also appear on the left-hand side of assignments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Access {
    tensor: TensorVar,
    indices: Vec<IndexVar>,
}

impl Access {
    pub fn new(tensor: TensorVar, indices: Vec<IndexVar>) -> Self {
        Access { tensor, indices }
    }

    /// Access to an order-0 tensor.
    pub fn scalar(tensor: &TensorVar) -> Self {
        Access {
            tensor: tensor.clone(),
            indices: Vec::new(),
        }
    }

    pub fn tensor_var(&self) -> &TensorVar {
        &self.tensor
    }

    pub fn index_vars(&self) -> &[IndexVar] {
        &self.indices
    }

    /// Plain assignment `self = rhs`.
    pub fn assign(&self, rhs: impl Into<IndexExpr>) -> Assignment {
        Assignment::new(self.clone(), rhs, None)
    }

    /// Compound assignment `self += rhs`.
    pub fn accumulate(&self, rhs: impl Into<IndexExpr>) -> Assignment {
        Assignment::new(self.clone(), rhs, Some(BinaryOp::Add))
    }

    /// Compound assignment `self op= rhs`.
    pub fn compound(&self, rhs: impl Into<IndexExpr>, op: BinaryOp) -> Assignment {
        Assignment::new(self.clone(), rhs, Some(op))
    }
}

/// A complex literal value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }
}

/// Scalar value of a literal, tagged by storage kind.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex),
}

impl LiteralValue {
    pub fn datatype(&self) -> Datatype {
        match self {
            LiteralValue::Int(_) => Datatype::Int64,
            LiteralValue::UInt(_) => Datatype::UInt64,
            LiteralValue::Float(_) => Datatype::Float64,
            LiteralValue::Complex(_) => Datatype::Complex128,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            LiteralValue::Int(v) => *v == 0,
            LiteralValue::UInt(v) => *v == 0,
            LiteralValue::Float(v) => *v == 0.0,
            LiteralValue::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }
}

// Floats compare by bit pattern so that structural equality is reflexive.
impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LiteralValue::Int(a), LiteralValue::Int(b)) => a == b,
            (LiteralValue::UInt(a), LiteralValue::UInt(b)) => a == b,
            (LiteralValue::Float(a), LiteralValue::Float(b)) => a.to_bits() == b.to_bits(),
            (LiteralValue::Complex(a), LiteralValue::Complex(b)) => {
                a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
            }
            _ => false,
        }
    }
}

impl Eq for LiteralValue {}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LiteralValue::Int(v) => v.hash(state),
            LiteralValue::UInt(v) => v.hash(state),
            LiteralValue::Float(v) => v.to_bits().hash(state),
            LiteralValue::Complex(c) => {
                c.re.to_bits().hash(state);
                c.im.to_bits().hash(state);
            }
        }
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<u64> for LiteralValue {
    fn from(value: u64) -> Self {
        LiteralValue::UInt(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<Complex> for LiteralValue {
    fn from(value: Complex) -> Self {
        LiteralValue::Complex(value)
    }
}

/// Rust types a literal value can be extracted as.
pub trait FromLiteral: Sized {
    fn from_literal(value: &LiteralValue) -> Option<Self>;
}

impl FromLiteral for i64 {
    fn from_literal(value: &LiteralValue) -> Option<Self> {
        match value {
            LiteralValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromLiteral for u64 {
    fn from_literal(value: &LiteralValue) -> Option<Self> {
        match value {
            LiteralValue::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromLiteral for f64 {
    fn from_literal(value: &LiteralValue) -> Option<Self> {
        match value {
            LiteralValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromLiteral for Complex {
    fn from_literal(value: &LiteralValue) -> Option<Self> {
        match value {
            LiteralValue::Complex(v) => Some(*v),
            _ => None,
        }
    }
}

/// A scalar constant embedded in an expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    value: LiteralValue,
}

impl Literal {
    pub fn new(value: impl Into<LiteralValue>) -> Self {
        Literal {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// The value as `T`, if the literal stores that kind of value.
    pub fn get<T: FromLiteral>(&self) -> Option<T> {
        T::from_literal(&self.value)
    }

    pub fn datatype(&self) -> Datatype {
        self.value.datatype()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

/// Arithmetic negation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neg {
    operand: IndexExpr,
}

impl Neg {
    pub fn operand(&self) -> &IndexExpr {
        &self.operand
    }
}

/// Binary arithmetic expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryExpr {
    op: BinaryOp,
    lhs: IndexExpr,
    rhs: IndexExpr,
}

impl BinaryExpr {
    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn lhs(&self) -> &IndexExpr {
        &self.lhs
    }

    pub fn rhs(&self) -> &IndexExpr {
        &self.rhs
    }
}

/// Reduction of `expr` over every value of `var`, combined with `op`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reduction {
    op: BinaryOp,
    var: IndexVar,
    expr: IndexExpr,
}

impl Reduction {
    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn var(&self) -> &IndexVar {
        &self.var
    }

    pub fn expr(&self) -> &IndexExpr {
        &self.expr
    }
}

/// Expression node payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprNode {
    Access(Access),
    Literal(Literal),
    Neg(Neg),
    Binary(BinaryExpr),
    Reduction(Reduction),
}

/// Node types an [`IndexExpr`] can be cast to.
pub trait ExprVariant: Sized {
    const KIND: ExprKind;

    fn from_node(node: &ExprNode) -> Option<&Self>;
}

macro_rules! expr_variant {
    ($ty:ident) => {
        impl ExprVariant for $ty {
            const KIND: ExprKind = ExprKind::$ty;

            fn from_node(node: &ExprNode) -> Option<&Self> {
                match node {
                    ExprNode::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

expr_variant!(Access);
expr_variant!(Literal);
expr_variant!(Neg);
expr_variant!(Reduction);

impl ExprVariant for BinaryExpr {
    const KIND: ExprKind = ExprKind::Binary;

    fn from_node(node: &ExprNode) -> Option<&Self> {
        match node {
            ExprNode::Binary(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Shared handle to an immutable expression tree.
#[derive(Clone)]
pub struct IndexExpr(Arc<ExprNode>);

impl IndexExpr {
    pub fn new(node: ExprNode) -> Self {
        IndexExpr(Arc::new(node))
    }

    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    pub fn kind(&self) -> ExprKind {
        match self.node() {
            ExprNode::Access(_) => ExprKind::Access,
            ExprNode::Literal(_) => ExprKind::Literal,
            ExprNode::Neg(_) => ExprKind::Neg,
            ExprNode::Binary(_) => ExprKind::Binary,
            ExprNode::Reduction(_) => ExprKind::Reduction,
        }
    }

    /// True if both handles point at the same node.
    pub fn ptr_eq(&self, other: &IndexExpr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn isa<T: ExprVariant>(&self) -> bool {
        T::from_node(self.node()).is_some()
    }

    pub fn try_to<T: ExprVariant>(&self) -> Option<&T> {
        T::from_node(self.node())
    }

    /// Cast to the node type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the expression is not a `T`; check with [`IndexExpr::isa`].
    #[track_caller]
    pub fn to<T: ExprVariant>(&self) -> &T {
        match T::from_node(self.node()) {
            Some(node) => node,
            None => panic!(
                "cannot cast {} expression `{}` to {}",
                self.kind(),
                self,
                T::KIND
            ),
        }
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        IndexExpr::new(ExprNode::Literal(Literal::new(value)))
    }

    pub fn neg(operand: impl Into<IndexExpr>) -> Self {
        IndexExpr::new(ExprNode::Neg(Neg {
            operand: operand.into(),
        }))
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<IndexExpr>, rhs: impl Into<IndexExpr>) -> Self {
        IndexExpr::new(ExprNode::Binary(BinaryExpr {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }))
    }

    pub fn add(lhs: impl Into<IndexExpr>, rhs: impl Into<IndexExpr>) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: impl Into<IndexExpr>, rhs: impl Into<IndexExpr>) -> Self {
        Self::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: impl Into<IndexExpr>, rhs: impl Into<IndexExpr>) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: impl Into<IndexExpr>, rhs: impl Into<IndexExpr>) -> Self {
        Self::binary(BinaryOp::Div, lhs, rhs)
    }

    pub fn reduction(op: BinaryOp, var: IndexVar, expr: impl Into<IndexExpr>) -> Self {
        IndexExpr::new(ExprNode::Reduction(Reduction {
            op,
            var,
            expr: expr.into(),
        }))
    }

    /// Summation of `expr` over `var`.
    pub fn sum(var: IndexVar, expr: impl Into<IndexExpr>) -> Self {
        Self::reduction(BinaryOp::Add, var, expr)
    }

    /// Datatype of the value computed by this expression.
    pub fn datatype(&self) -> Datatype {
        match self.node() {
            ExprNode::Access(access) => access.tensor_var().datatype(),
            ExprNode::Literal(literal) => literal.datatype(),
            ExprNode::Neg(neg) => neg.operand().datatype(),
            ExprNode::Binary(binary) => {
                Datatype::max(binary.lhs().datatype(), binary.rhs().datatype())
            }
            ExprNode::Reduction(reduction) => reduction.expr().datatype(),
        }
    }
}

impl PartialEq for IndexExpr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.node() == other.node()
    }
}

impl Eq for IndexExpr {}

impl From<Access> for IndexExpr {
    fn from(access: Access) -> Self {
        IndexExpr::new(ExprNode::Access(access))
    }
}

impl From<&Access> for IndexExpr {
    fn from(access: &Access) -> Self {
        IndexExpr::from(access.clone())
    }
}

impl From<Literal> for IndexExpr {
    fn from(literal: Literal) -> Self {
        IndexExpr::new(ExprNode::Literal(literal))
    }
}

/// A tensor variable used as an expression reads it as a scalar.
impl From<&TensorVar> for IndexExpr {
    fn from(tensor: &TensorVar) -> Self {
        IndexExpr::from(Access::scalar(tensor))
    }
}

impl From<i64> for IndexExpr {
    fn from(value: i64) -> Self {
        IndexExpr::literal(value)
    }
}

impl From<u64> for IndexExpr {
    fn from(value: u64) -> Self {
        IndexExpr::literal(value)
    }
}

impl From<f64> for IndexExpr {
    fn from(value: f64) -> Self {
        IndexExpr::literal(value)
    }
}

impl From<Complex> for IndexExpr {
    fn from(value: Complex) -> Self {
        IndexExpr::literal(value)
    }
}
