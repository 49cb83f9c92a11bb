//! Reduction to concrete notation.

use serde::{Deserialize, Serialize};

use crate::error::IrError;
use crate::expr::{IndexExpr, Reduction};
use crate::stmt::{Assignment, IndexStmt};
use crate::visit::{walk_expr, IndexNotationRewriter};

use super::reduction::try_make_reduction_notation;
use super::workspace::Workspace;
use super::{check_reduction_notation, is_concrete_notation, is_einsum_notation};

/// Options for [`try_make_concrete_notation_with`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcretizeOptions {
    /// Scalar workspaces for nested reductions are named `<prefix><var>`.
    pub workspace_prefix: String,
}

impl Default for ConcretizeOptions {
    fn default() -> Self {
        Self {
            workspace_prefix: "t".to_string(),
        }
    }
}

impl ConcretizeOptions {
    pub fn with_workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.workspace_prefix = prefix.into();
        self
    }
}

/// Replaces every reduction with a read of a scalar workspace and collects
/// the statements that fill those workspaces.
struct ReductionLowering<'a> {
    options: &'a ConcretizeOptions,
    producers: Vec<(Workspace, IndexStmt)>,
}

impl IndexNotationRewriter for ReductionLowering<'_> {
    fn rewrite_expr(&mut self, expr: &IndexExpr) -> IndexExpr {
        let Some(reduction) = expr.try_to::<Reduction>() else {
            return walk_expr(self, expr);
        };
        let workspace = Workspace::scalar(
            format!("{}{}", self.options.workspace_prefix, reduction.var().name()),
            reduction.expr().datatype(),
        );
        let accumulate = workspace
            .scalar_access()
            .compound(reduction.expr().clone(), reduction.op());
        let producer = IndexStmt::forall(
            reduction.var().clone(),
            lower_reductions(accumulate, self.options),
        );
        let read = IndexExpr::from(workspace.scalar_access());
        self.producers.push((workspace, producer));
        read
    }
}

fn lower_reductions(assignment: Assignment, options: &ConcretizeOptions) -> IndexStmt {
    let mut lowering = ReductionLowering {
        options,
        producers: Vec::new(),
    };
    let rhs = lowering.rewrite_expr(assignment.rhs());
    let mut stmt: IndexStmt = if rhs.ptr_eq(assignment.rhs()) {
        assignment.into()
    } else {
        assignment.with_rhs(rhs).into()
    };
    for (workspace, producer) in lowering.producers {
        stmt = workspace.bind(stmt, producer);
    }
    stmt
}

/// Lower to concrete notation with the given options.
///
/// Concrete input is returned unchanged and einsum input is first lowered to
/// reduction notation. The reductions at the root of the right-hand side
/// that share one operator (and agree with the assignment's own operator)
/// become loops around a compound assignment; loops over the free variables
/// come first, in left-hand-side order. Any other reduction is computed into
/// a scalar workspace by a `where` producer.
pub fn try_make_concrete_notation_with(
    stmt: &IndexStmt,
    options: &ConcretizeOptions,
) -> Result<IndexStmt, IrError> {
    if is_concrete_notation(stmt) {
        return Ok(stmt.clone());
    }
    let reduced = match check_reduction_notation(stmt) {
        Ok(()) => stmt.clone(),
        Err(_) if is_einsum_notation(stmt) => try_make_reduction_notation(stmt)?,
        Err(err) => return Err(err),
    };
    let assignment = reduced.to::<Assignment>();

    let mut rhs = assignment.rhs().clone();
    let mut op = assignment.op();
    let mut loop_vars = assignment.free_vars();
    while let Some(reduction) = rhs.try_to::<Reduction>() {
        if op.is_some_and(|current| current != reduction.op()) {
            break;
        }
        op = Some(reduction.op());
        loop_vars.push(reduction.var().clone());
        let body = reduction.expr().clone();
        rhs = body;
    }
    tracing::debug!(
        stmt = %reduced,
        loops = ?loop_vars.iter().map(|v| v.name()).collect::<Vec<_>>(),
        "concretizing assignment"
    );

    let core = Assignment::new(assignment.lhs().clone(), rhs, op);
    let body = lower_reductions(core, options);
    Ok(IndexStmt::forall_nest(&loop_vars, body))
}

/// Lower to concrete notation with default options.
pub fn try_make_concrete_notation(stmt: &IndexStmt) -> Result<IndexStmt, IrError> {
    try_make_concrete_notation_with(stmt, &ConcretizeOptions::default())
}

/// Lower to concrete notation.
///
/// # Panics
///
/// Panics if `stmt` is in none of the three dialects; check with
/// [`crate::classify`] first.
#[track_caller]
pub fn make_concrete_notation(stmt: &IndexStmt) -> IndexStmt {
    match try_make_concrete_notation(stmt) {
        Ok(concrete) => concrete,
        Err(err) => panic!("cannot lower `{}` to concrete notation: {}", stmt, err),
    }
}
