//! Operator splitting.

use std::collections::BTreeMap;

use crate::expr::{BinaryExpr, IndexExpr};
use crate::schedule::OperatorSplit;
use crate::stmt::{Forall, IndexStmt, StmtNode};
use crate::types::Dimension;
use crate::var::IndexVar;

use super::workspace::Workspace;

struct Splitter<'a> {
    split: &'a OperatorSplit,
    binary: &'a BinaryExpr,
    domains: BTreeMap<IndexVar, Dimension>,
    /// Forall variables enclosing the statement being searched.
    outer: Vec<IndexVar>,
}

impl Splitter<'_> {
    fn target(&self) -> &IndexExpr {
        self.split.expr()
    }

    /// Forall variables between `stmt` and the first assignment that
    /// computes the target, or `None` if there is no such assignment.
    fn path_to_target(&self, stmt: &IndexStmt) -> Option<Vec<IndexVar>> {
        match stmt.node() {
            StmtNode::Assignment(assignment) => {
                assignment.rhs().contains_expr(self.target()).then(Vec::new)
            }
            StmtNode::Forall(forall) => self.path_to_target(forall.stmt()).map(|mut path| {
                path.insert(0, forall.index_var().clone());
                path
            }),
            StmtNode::Where(where_) => self
                .path_to_target(where_.consumer())
                .or_else(|| self.path_to_target(where_.producer())),
            StmtNode::Multi(multi) => self
                .path_to_target(multi.stmt1())
                .or_else(|| self.path_to_target(multi.stmt2())),
            StmtNode::Sequence(sequence) => self
                .path_to_target(sequence.definition())
                .or_else(|| self.path_to_target(sequence.mutation())),
        }
    }

    /// Split the first occurrence of the target in `stmt`.
    fn split_in(&mut self, stmt: &IndexStmt) -> Option<IndexStmt> {
        match stmt.node() {
            StmtNode::Assignment(assignment) => {
                if assignment.rhs().contains_expr(self.target()) {
                    Some(self.split_at(stmt, &[]))
                } else {
                    None
                }
            }
            StmtNode::Forall(forall) if forall.index_var() == self.split.old() => {
                let inner = self.path_to_target(forall.stmt())?;
                Some(self.split_at(stmt, &inner))
            }
            StmtNode::Forall(forall) => {
                self.outer.push(forall.index_var().clone());
                let body = self.split_in(forall.stmt());
                self.outer.pop();
                body.map(|body| IndexStmt::forall(forall.index_var().clone(), body))
            }
            StmtNode::Where(where_) => match self.split_in(where_.consumer()) {
                Some(consumer) => Some(IndexStmt::where_(consumer, where_.producer().clone())),
                None => self
                    .split_in(where_.producer())
                    .map(|producer| IndexStmt::where_(where_.consumer().clone(), producer)),
            },
            StmtNode::Multi(multi) => match self.split_in(multi.stmt1()) {
                Some(stmt1) => Some(IndexStmt::multi(stmt1, multi.stmt2().clone())),
                None => self
                    .split_in(multi.stmt2())
                    .map(|stmt2| IndexStmt::multi(multi.stmt1().clone(), stmt2)),
            },
            StmtNode::Sequence(sequence) => match self.split_in(sequence.definition()) {
                Some(definition) => {
                    Some(IndexStmt::sequence(definition, sequence.mutation().clone()))
                }
                None => self
                    .split_in(sequence.mutation())
                    .map(|mutation| IndexStmt::sequence(sequence.definition().clone(), mutation)),
            },
        }
    }

    /// Split at `point`, either the forall over `old` or the assignment
    /// computing the target. `inner` lists the forall variables between
    /// `point` and that assignment.
    fn split_at(&self, point: &IndexStmt, inner: &[IndexVar]) -> IndexStmt {
        let (old, left, right) = (self.split.old(), self.split.left(), self.split.right());
        let left_operand = self.binary.lhs();

        let indices: Vec<IndexVar> = left_operand
            .index_vars()
            .into_iter()
            .filter(|var| !self.outer.contains(var))
            .collect();
        let workspace = Workspace::new(
            self.split.workspace_name(),
            left_operand.datatype(),
            &indices,
            &self.domains,
        );
        let replacement = IndexExpr::binary(
            self.binary.op(),
            workspace.access(&indices),
            self.binary.rhs().clone(),
        );
        let fill = workspace.access(&indices).assign(left_operand.clone());

        tracing::debug!(
            expr = %self.target(),
            old = %old,
            left = %left,
            right = %right,
            "splitting operator"
        );

        let (consumer, producer) = match point.try_to::<Forall>() {
            Some(forall) => {
                let body = forall
                    .stmt()
                    .replace_expr(self.target(), &replacement)
                    .replace_index_var(old, right);
                let loops: Vec<&IndexVar> = inner
                    .iter()
                    .filter(|var| *var != old && indices.contains(var))
                    .collect();
                let producer = IndexStmt::forall(old.clone(), IndexStmt::forall_nest(loops, fill));
                (
                    IndexStmt::forall(right.clone(), body),
                    producer.replace_index_var(old, left),
                )
            }
            None => (
                point
                    .replace_expr(self.target(), &replacement)
                    .replace_index_var(old, right),
                IndexStmt::from(fill).replace_index_var(old, left),
            ),
        };
        workspace.bind(consumer, producer)
    }
}

/// Split the binary expression `split.expr()` of `stmt` at `split.old()`.
///
/// The left operand is computed into a dense workspace by a producer loop
/// over `split.left()`; the consumer loops over `split.right()` and reads the
/// workspace in place of the left operand. The workspace has one mode per
/// variable of the left operand that is not fixed by a loop enclosing the
/// split point, which is the forall over `old` (or the assignment itself when
/// there is no such loop).
///
/// If the expression is not binary or does not occur in `stmt`, `stmt` is
/// returned unchanged.
pub fn split_operator(stmt: &IndexStmt, split: &OperatorSplit) -> IndexStmt {
    let Some(binary) = split.expr().try_to::<BinaryExpr>() else {
        tracing::debug!(expr = %split.expr(), "skipping split of non-binary expression");
        return stmt.clone();
    };
    let mut splitter = Splitter {
        split,
        binary,
        domains: stmt.index_var_domains(),
        outer: Vec::new(),
    };
    match splitter.split_in(stmt) {
        Some(result) => result,
        None => {
            tracing::debug!(expr = %split.expr(), "skipping split of expression not in statement");
            stmt.clone()
        }
    }
}
