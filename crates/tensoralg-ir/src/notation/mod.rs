//! Notation dialects and the passes that lower statements between them.
//!
//! A statement starts in **einsum** notation (`a(i) = B(i,j) * c(j)`, with
//! implicit summation over `j`), is lowered to **reduction** notation
//! (`a(i) = sum(j, B(i,j) * c(j))`) and finally to **concrete** notation
//! (`forall(i, forall(j, a(i) += B(i,j) * c(j)))`), where every loop is
//! explicit and temporaries are introduced with `where`.
//!
//! The `check_*` classifiers report why a statement is not in a dialect;
//! the `is_*` predicates only answer yes or no.

mod concrete;
mod reduction;
mod split;
mod workspace;

use serde::{Deserialize, Serialize};

use crate::error::IrError;
use crate::expr::{ExprNode, IndexExpr};
use crate::stmt::{Assignment, IndexStmt, StmtKind, StmtNode};
use crate::var::IndexVar;

pub use concrete::{
    make_concrete_notation, try_make_concrete_notation, try_make_concrete_notation_with,
    ConcretizeOptions,
};
pub use reduction::{make_reduction_notation, reduce_assignment, try_make_reduction_notation};
pub use split::split_operator;

/// The three notation dialects, from least to most explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Einsum,
    Reduction,
    Concrete,
}

/// Reason a statement is not in a given dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotationViolation {
    /// The dialect requires a single assignment.
    NotAnAssignment(StmtKind),
    ContainsReduction,
    /// An addition or subtraction below a multiplication, division or
    /// negation.
    SumInsideProduct,
    /// A non-free variable used outside every reduction that binds it.
    UnboundReductionVar(IndexVar),
    /// A variable bound by two nested foralls or reductions, or a reduction
    /// over a free variable.
    DuplicateBinding(IndexVar),
    /// A variable used by an access without an enclosing forall.
    UnboundIndexVar(IndexVar),
    /// A reduction variable assigned with `=` instead of a compound operator.
    ReductionWithoutCompound(IndexVar),
}

fn violation(dialect: Dialect, reason: NotationViolation) -> Result<(), IrError> {
    Err(IrError::notation(dialect, reason))
}

fn single_assignment(stmt: &IndexStmt, dialect: Dialect) -> Result<&Assignment, IrError> {
    stmt.try_to::<Assignment>()
        .ok_or_else(|| IrError::notation(dialect, NotationViolation::NotAnAssignment(stmt.kind())))
}

fn einsum_violation(expr: &IndexExpr, in_product: bool) -> Option<NotationViolation> {
    match expr.node() {
        ExprNode::Access(_) | ExprNode::Literal(_) => None,
        ExprNode::Neg(neg) => einsum_violation(neg.operand(), true),
        ExprNode::Binary(binary) if binary.op().is_additive() => {
            if in_product {
                return Some(NotationViolation::SumInsideProduct);
            }
            einsum_violation(binary.lhs(), false).or_else(|| einsum_violation(binary.rhs(), false))
        }
        ExprNode::Binary(binary) => {
            einsum_violation(binary.lhs(), true).or_else(|| einsum_violation(binary.rhs(), true))
        }
        ExprNode::Reduction(_) => Some(NotationViolation::ContainsReduction),
    }
}

/// Check that `stmt` is a single well-formed assignment whose right-hand side
/// is a sum of products without reductions.
pub fn check_einsum_notation(stmt: &IndexStmt) -> Result<(), IrError> {
    let assignment = single_assignment(stmt, Dialect::Einsum)?;
    stmt.validate()?;
    match einsum_violation(assignment.rhs(), false) {
        Some(reason) => violation(Dialect::Einsum, reason),
        None => Ok(()),
    }
}

fn reduction_violation(expr: &IndexExpr, bound: &mut Vec<IndexVar>) -> Option<NotationViolation> {
    match expr.node() {
        ExprNode::Access(access) => access
            .index_vars()
            .iter()
            .find(|var| !bound.contains(var))
            .map(|var| NotationViolation::UnboundReductionVar(var.clone())),
        ExprNode::Literal(_) => None,
        ExprNode::Neg(neg) => reduction_violation(neg.operand(), bound),
        ExprNode::Binary(binary) => reduction_violation(binary.lhs(), bound)
            .or_else(|| reduction_violation(binary.rhs(), bound)),
        ExprNode::Reduction(reduction) => {
            if bound.contains(reduction.var()) {
                return Some(NotationViolation::DuplicateBinding(reduction.var().clone()));
            }
            bound.push(reduction.var().clone());
            let result = reduction_violation(reduction.expr(), bound);
            bound.pop();
            result
        }
    }
}

/// Check that `stmt` is a single assignment in which every variable absent
/// from the left-hand side is used only inside a reduction binding it.
pub fn check_reduction_notation(stmt: &IndexStmt) -> Result<(), IrError> {
    let assignment = single_assignment(stmt, Dialect::Reduction)?;
    let mut bound = assignment.free_vars();
    match reduction_violation(assignment.rhs(), &mut bound) {
        Some(reason) => violation(Dialect::Reduction, reason),
        None => Ok(()),
    }
}

/// Forall-bound variables along the current path. Variables at positions
/// before `scope_start` were bound outside the innermost `where` producer.
struct ForallScope {
    bound: Vec<IndexVar>,
    scope_start: usize,
}

impl ForallScope {
    fn check(&mut self, stmt: &IndexStmt) -> Option<NotationViolation> {
        match stmt.node() {
            StmtNode::Assignment(assignment) => self.check_assignment(assignment),
            StmtNode::Forall(forall) => {
                let var = forall.index_var();
                if self.bound.contains(var) {
                    return Some(NotationViolation::DuplicateBinding(var.clone()));
                }
                self.bound.push(var.clone());
                let result = self.check(forall.stmt());
                self.bound.pop();
                result
            }
            StmtNode::Where(where_) => {
                if let Some(reason) = self.check(where_.consumer()) {
                    return Some(reason);
                }
                let outer_start = self.scope_start;
                self.scope_start = self.bound.len();
                let result = self.check(where_.producer());
                self.scope_start = outer_start;
                result
            }
            StmtNode::Multi(multi) => self
                .check(multi.stmt1())
                .or_else(|| self.check(multi.stmt2())),
            StmtNode::Sequence(sequence) => self
                .check(sequence.definition())
                .or_else(|| self.check(sequence.mutation())),
        }
    }

    fn check_assignment(&self, assignment: &Assignment) -> Option<NotationViolation> {
        if assignment.rhs().contains_reduction() {
            return Some(NotationViolation::ContainsReduction);
        }
        let used = assignment
            .lhs()
            .index_vars()
            .iter()
            .cloned()
            .chain(assignment.rhs().index_vars());
        for var in used {
            if !self.bound.contains(&var) {
                return Some(NotationViolation::UnboundIndexVar(var));
            }
        }
        if assignment.is_compound() {
            return None;
        }
        let in_scope = &self.bound[self.scope_start..];
        assignment
            .reduction_vars()
            .into_iter()
            .find(|var| in_scope.contains(var))
            .map(NotationViolation::ReductionWithoutCompound)
    }
}

/// Check that every variable in `stmt` is bound by exactly one enclosing
/// forall, that no reductions remain, and that reduction variables are only
/// assigned through compound assignments.
pub fn check_concrete_notation(stmt: &IndexStmt) -> Result<(), IrError> {
    let mut scope = ForallScope {
        bound: Vec::new(),
        scope_start: 0,
    };
    match scope.check(stmt) {
        Some(reason) => violation(Dialect::Concrete, reason),
        None => Ok(()),
    }
}

pub fn is_einsum_notation(stmt: &IndexStmt) -> bool {
    check_einsum_notation(stmt).is_ok()
}

pub fn is_reduction_notation(stmt: &IndexStmt) -> bool {
    check_reduction_notation(stmt).is_ok()
}

pub fn is_concrete_notation(stmt: &IndexStmt) -> bool {
    check_concrete_notation(stmt).is_ok()
}

/// The most explicit dialect `stmt` is in, if any.
pub fn classify(stmt: &IndexStmt) -> Option<Dialect> {
    if is_concrete_notation(stmt) {
        Some(Dialect::Concrete)
    } else if is_reduction_notation(stmt) {
        Some(Dialect::Reduction)
    } else if is_einsum_notation(stmt) {
        Some(Dialect::Einsum)
    } else {
        None
    }
}
