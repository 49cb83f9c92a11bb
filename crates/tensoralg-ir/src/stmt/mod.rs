//! Index statements.
//!
//! Statements bind index variables ([`Forall`]), assign expressions to
//! tensors ([`Assignment`]) and compose sub-statements ([`Where`], [`Multi`],
//! [`Sequence`]). Like expressions they are immutable shared trees.

mod analysis;
mod validation;

use std::sync::Arc;

use crate::expr::{Access, BinaryOp, IndexExpr};
use crate::var::IndexVar;

/// Tag of a statement node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Assignment,
    Forall,
    Where,
    Multi,
    Sequence,
}

/// `lhs = rhs`, or `lhs op= rhs` when `op` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    lhs: Access,
    rhs: IndexExpr,
    op: Option<BinaryOp>,
}

impl Assignment {
    pub fn new(lhs: Access, rhs: impl Into<IndexExpr>, op: Option<BinaryOp>) -> Self {
        Assignment {
            lhs,
            rhs: rhs.into(),
            op,
        }
    }

    pub fn lhs(&self) -> &Access {
        &self.lhs
    }

    pub fn rhs(&self) -> &IndexExpr {
        &self.rhs
    }

    /// Combinator of a compound assignment.
    pub fn op(&self) -> Option<BinaryOp> {
        self.op
    }

    pub fn is_compound(&self) -> bool {
        self.op.is_some()
    }

    /// Same target and operator with a different right-hand side.
    pub fn with_rhs(&self, rhs: impl Into<IndexExpr>) -> Self {
        Assignment::new(self.lhs.clone(), rhs, self.op)
    }

    /// Index variables of the left-hand side, without duplicates.
    pub fn free_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        for var in self.lhs.index_vars() {
            crate::expr::push_unique(&mut vars, var);
        }
        vars
    }

    /// Index variables of the right-hand side that are not free, in order of
    /// first appearance.
    pub fn reduction_vars(&self) -> Vec<IndexVar> {
        let free = self.lhs.index_vars();
        self.rhs
            .index_vars()
            .into_iter()
            .filter(|var| !free.contains(var))
            .collect()
    }
}

/// Evaluate `stmt` once for every value of `index_var`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Forall {
    index_var: IndexVar,
    stmt: IndexStmt,
}

impl Forall {
    pub fn index_var(&self) -> &IndexVar {
        &self.index_var
    }

    pub fn stmt(&self) -> &IndexStmt {
        &self.stmt
    }
}

/// `producer` fills a temporary that `consumer` then reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Where {
    consumer: IndexStmt,
    producer: IndexStmt,
}

impl Where {
    pub fn consumer(&self) -> &IndexStmt {
        &self.consumer
    }

    pub fn producer(&self) -> &IndexStmt {
        &self.producer
    }
}

/// Two independent statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multi {
    stmt1: IndexStmt,
    stmt2: IndexStmt,
}

impl Multi {
    pub fn stmt1(&self) -> &IndexStmt {
        &self.stmt1
    }

    pub fn stmt2(&self) -> &IndexStmt {
        &self.stmt2
    }
}

/// `definition` initializes a result that `mutation` then updates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    definition: IndexStmt,
    mutation: IndexStmt,
}

impl Sequence {
    pub fn definition(&self) -> &IndexStmt {
        &self.definition
    }

    pub fn mutation(&self) -> &IndexStmt {
        &self.mutation
    }
}

/// Statement node payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtNode {
    Assignment(Assignment),
    Forall(Forall),
    Where(Where),
    Multi(Multi),
    Sequence(Sequence),
}

/// Node types an [`IndexStmt`] can be cast to.
pub trait StmtVariant: Sized {
    const KIND: StmtKind;

    fn from_node(node: &StmtNode) -> Option<&Self>;
}

macro_rules! stmt_variant {
    ($($ty:ident),*) => {
        $(
            impl StmtVariant for $ty {
                const KIND: StmtKind = StmtKind::$ty;

                fn from_node(node: &StmtNode) -> Option<&Self> {
                    match node {
                        StmtNode::$ty(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for IndexStmt {
                fn from(node: $ty) -> Self {
                    IndexStmt::new(StmtNode::$ty(node))
                }
            }
        )*
    };
}

stmt_variant!(Assignment, Forall, Where, Multi, Sequence);

/// Shared handle to an immutable statement tree.
#[derive(Clone)]
pub struct IndexStmt(Arc<StmtNode>);

impl IndexStmt {
    pub fn new(node: StmtNode) -> Self {
        IndexStmt(Arc::new(node))
    }

    pub fn node(&self) -> &StmtNode {
        &self.0
    }

    pub fn kind(&self) -> StmtKind {
        match self.node() {
            StmtNode::Assignment(_) => StmtKind::Assignment,
            StmtNode::Forall(_) => StmtKind::Forall,
            StmtNode::Where(_) => StmtKind::Where,
            StmtNode::Multi(_) => StmtKind::Multi,
            StmtNode::Sequence(_) => StmtKind::Sequence,
        }
    }

    /// True if both handles point at the same node.
    pub fn ptr_eq(&self, other: &IndexStmt) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn isa<T: StmtVariant>(&self) -> bool {
        T::from_node(self.node()).is_some()
    }

    pub fn try_to<T: StmtVariant>(&self) -> Option<&T> {
        T::from_node(self.node())
    }

    /// Cast to the node type `T`.
    ///
    /// # Panics
    ///
    /// Panics if the statement is not a `T`; check with [`IndexStmt::isa`].
    #[track_caller]
    pub fn to<T: StmtVariant>(&self) -> &T {
        match T::from_node(self.node()) {
            Some(node) => node,
            None => panic!(
                "cannot cast {} statement `{}` to {}",
                self.kind(),
                self,
                T::KIND
            ),
        }
    }

    pub fn assignment(lhs: Access, rhs: impl Into<IndexExpr>, op: Option<BinaryOp>) -> Self {
        Assignment::new(lhs, rhs, op).into()
    }

    pub fn forall(index_var: IndexVar, stmt: impl Into<IndexStmt>) -> Self {
        Forall {
            index_var,
            stmt: stmt.into(),
        }
        .into()
    }

    pub fn where_(consumer: impl Into<IndexStmt>, producer: impl Into<IndexStmt>) -> Self {
        Where {
            consumer: consumer.into(),
            producer: producer.into(),
        }
        .into()
    }

    pub fn multi(stmt1: impl Into<IndexStmt>, stmt2: impl Into<IndexStmt>) -> Self {
        Multi {
            stmt1: stmt1.into(),
            stmt2: stmt2.into(),
        }
        .into()
    }

    pub fn sequence(definition: impl Into<IndexStmt>, mutation: impl Into<IndexStmt>) -> Self {
        Sequence {
            definition: definition.into(),
            mutation: mutation.into(),
        }
        .into()
    }

    /// Wrap `stmt` in one forall per variable, the first variable outermost.
    pub fn forall_nest<'a, I>(vars: I, stmt: impl Into<IndexStmt>) -> Self
    where
        I: IntoIterator<Item = &'a IndexVar>,
        I::IntoIter: DoubleEndedIterator,
    {
        vars.into_iter()
            .rev()
            .fold(stmt.into(), |body, var| IndexStmt::forall(var.clone(), body))
    }
}

impl PartialEq for IndexStmt {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.node() == other.node()
    }
}

impl Eq for IndexStmt {}

impl From<&Assignment> for IndexStmt {
    fn from(assignment: &Assignment) -> Self {
        IndexStmt::from(assignment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Datatype, Type};
    use crate::var::TensorVar;

    #[test]
    fn test_assignment_accessors() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 3]));
        let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[3]));

        let assignment = a.assign([&i], IndexExpr::mul(b.access([&i, &j]), c.access([&j])));
        assert_eq!(assignment.lhs(), &a.access([&i]));
        assert_eq!(assignment.op(), None);
        assert_eq!(assignment.free_vars(), vec![i.clone()]);
        assert_eq!(assignment.reduction_vars(), vec![j.clone()]);

        let compound = assignment.lhs().accumulate(assignment.rhs().clone());
        assert!(compound.is_compound());
        assert_eq!(compound.op(), Some(BinaryOp::Add));
        assert_ne!(compound, assignment);
    }

    #[test]
    fn test_statement_casts() {
        let i = IndexVar::new("i");
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[3]));
        let body = a.access([&i]).assign(b.access([&i]));

        let stmt = IndexStmt::forall(i.clone(), body.clone());
        assert_eq!(stmt.kind(), StmtKind::Forall);
        assert!(stmt.isa::<Forall>());
        assert!(!stmt.isa::<Assignment>());
        assert_eq!(stmt.to::<Forall>().index_var(), &i);
        assert_eq!(stmt.to::<Forall>().stmt().to::<Assignment>(), &body);
        assert!(stmt.try_to::<Where>().is_none());
    }

    #[test]
    fn test_forall_nest_order() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = TensorVar::new("A", Type::fixed(Datatype::Float64, &[2, 2]));
        let body = a.access([&i, &j]).assign(0.0);

        let nest = IndexStmt::forall_nest([&i, &j], body.clone());
        let expected = IndexStmt::forall(i.clone(), IndexStmt::forall(j.clone(), body.clone()));
        assert_eq!(nest, expected);

        let empty: [&IndexVar; 0] = [];
        assert_eq!(IndexStmt::forall_nest(empty, body.clone()), IndexStmt::from(body));
    }
}
