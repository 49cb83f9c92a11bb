//! Visiting and rewriting index notation.
//!
//! [`IndexNotationVisitor`] receives every node with its concrete type;
//! override the methods of interest and keep the defaults for the rest.
//! [`IndexNotationRewriter`] rebuilds trees bottom-up and returns the
//! original handle for every subtree it leaves unchanged.

use std::collections::HashMap;

use crate::expr::{Access, BinaryExpr, ExprNode, IndexExpr, Literal, Neg, Reduction};
use crate::stmt::{Assignment, Forall, IndexStmt, Multi, Sequence, StmtNode, Where};
use crate::var::IndexVar;

/// Read-only traversal over expressions and statements.
pub trait IndexNotationVisitor {
    fn visit_access(&mut self, _access: &Access) {}

    fn visit_literal(&mut self, _literal: &Literal) {}

    fn visit_neg(&mut self, neg: &Neg) {
        neg.operand().accept(self);
    }

    fn visit_binary(&mut self, binary: &BinaryExpr) {
        binary.lhs().accept(self);
        binary.rhs().accept(self);
    }

    fn visit_reduction(&mut self, reduction: &Reduction) {
        reduction.expr().accept(self);
    }

    fn visit_assignment(&mut self, assignment: &Assignment) {
        self.visit_access(assignment.lhs());
        assignment.rhs().accept(self);
    }

    fn visit_forall(&mut self, forall: &Forall) {
        forall.stmt().accept(self);
    }

    fn visit_where(&mut self, where_: &Where) {
        where_.consumer().accept(self);
        where_.producer().accept(self);
    }

    fn visit_multi(&mut self, multi: &Multi) {
        multi.stmt1().accept(self);
        multi.stmt2().accept(self);
    }

    fn visit_sequence(&mut self, sequence: &Sequence) {
        sequence.definition().accept(self);
        sequence.mutation().accept(self);
    }
}

impl IndexExpr {
    pub fn accept<V: IndexNotationVisitor + ?Sized>(&self, visitor: &mut V) {
        match self.node() {
            ExprNode::Access(access) => visitor.visit_access(access),
            ExprNode::Literal(literal) => visitor.visit_literal(literal),
            ExprNode::Neg(neg) => visitor.visit_neg(neg),
            ExprNode::Binary(binary) => visitor.visit_binary(binary),
            ExprNode::Reduction(reduction) => visitor.visit_reduction(reduction),
        }
    }
}

impl IndexStmt {
    pub fn accept<V: IndexNotationVisitor + ?Sized>(&self, visitor: &mut V) {
        match self.node() {
            StmtNode::Assignment(assignment) => visitor.visit_assignment(assignment),
            StmtNode::Forall(forall) => visitor.visit_forall(forall),
            StmtNode::Where(where_) => visitor.visit_where(where_),
            StmtNode::Multi(multi) => visitor.visit_multi(multi),
            StmtNode::Sequence(sequence) => visitor.visit_sequence(sequence),
        }
    }
}

/// Structural rewriting of expressions and statements.
///
/// The default methods rebuild a node only when one of its children
/// changed, so untouched subtrees keep their identity (`ptr_eq`).
pub trait IndexNotationRewriter {
    fn rewrite_expr(&mut self, expr: &IndexExpr) -> IndexExpr {
        walk_expr(self, expr)
    }

    fn rewrite_stmt(&mut self, stmt: &IndexStmt) -> IndexStmt {
        walk_stmt(self, stmt)
    }

    fn rewrite_access(&mut self, access: &Access) -> Access {
        let indices: Vec<IndexVar> = access
            .index_vars()
            .iter()
            .map(|var| self.rewrite_index_var(var))
            .collect();
        Access::new(access.tensor_var().clone(), indices)
    }

    /// Applied to every index variable, bound or used.
    fn rewrite_index_var(&mut self, var: &IndexVar) -> IndexVar {
        var.clone()
    }
}

/// Rewrite the children of `expr` and rebuild it if any of them changed.
pub fn walk_expr<R: IndexNotationRewriter + ?Sized>(
    rewriter: &mut R,
    expr: &IndexExpr,
) -> IndexExpr {
    match expr.node() {
        ExprNode::Access(access) => {
            let rewritten = rewriter.rewrite_access(access);
            if rewritten == *access {
                expr.clone()
            } else {
                rewritten.into()
            }
        }
        ExprNode::Literal(_) => expr.clone(),
        ExprNode::Neg(neg) => {
            let operand = rewriter.rewrite_expr(neg.operand());
            if operand.ptr_eq(neg.operand()) {
                expr.clone()
            } else {
                IndexExpr::neg(operand)
            }
        }
        ExprNode::Binary(binary) => {
            let lhs = rewriter.rewrite_expr(binary.lhs());
            let rhs = rewriter.rewrite_expr(binary.rhs());
            if lhs.ptr_eq(binary.lhs()) && rhs.ptr_eq(binary.rhs()) {
                expr.clone()
            } else {
                IndexExpr::binary(binary.op(), lhs, rhs)
            }
        }
        ExprNode::Reduction(reduction) => {
            let var = rewriter.rewrite_index_var(reduction.var());
            let body = rewriter.rewrite_expr(reduction.expr());
            if var == *reduction.var() && body.ptr_eq(reduction.expr()) {
                expr.clone()
            } else {
                IndexExpr::reduction(reduction.op(), var, body)
            }
        }
    }
}

/// Rewrite the children of `stmt` and rebuild it if any of them changed.
pub fn walk_stmt<R: IndexNotationRewriter + ?Sized>(
    rewriter: &mut R,
    stmt: &IndexStmt,
) -> IndexStmt {
    match stmt.node() {
        StmtNode::Assignment(assignment) => {
            let lhs = rewriter.rewrite_access(assignment.lhs());
            let rhs = rewriter.rewrite_expr(assignment.rhs());
            if lhs == *assignment.lhs() && rhs.ptr_eq(assignment.rhs()) {
                stmt.clone()
            } else {
                IndexStmt::assignment(lhs, rhs, assignment.op())
            }
        }
        StmtNode::Forall(forall) => {
            let var = rewriter.rewrite_index_var(forall.index_var());
            let body = rewriter.rewrite_stmt(forall.stmt());
            if var == *forall.index_var() && body.ptr_eq(forall.stmt()) {
                stmt.clone()
            } else {
                IndexStmt::forall(var, body)
            }
        }
        StmtNode::Where(where_) => {
            let consumer = rewriter.rewrite_stmt(where_.consumer());
            let producer = rewriter.rewrite_stmt(where_.producer());
            if consumer.ptr_eq(where_.consumer()) && producer.ptr_eq(where_.producer()) {
                stmt.clone()
            } else {
                IndexStmt::where_(consumer, producer)
            }
        }
        StmtNode::Multi(multi) => {
            let stmt1 = rewriter.rewrite_stmt(multi.stmt1());
            let stmt2 = rewriter.rewrite_stmt(multi.stmt2());
            if stmt1.ptr_eq(multi.stmt1()) && stmt2.ptr_eq(multi.stmt2()) {
                stmt.clone()
            } else {
                IndexStmt::multi(stmt1, stmt2)
            }
        }
        StmtNode::Sequence(sequence) => {
            let definition = rewriter.rewrite_stmt(sequence.definition());
            let mutation = rewriter.rewrite_stmt(sequence.mutation());
            if definition.ptr_eq(sequence.definition()) && mutation.ptr_eq(sequence.mutation()) {
                stmt.clone()
            } else {
                IndexStmt::sequence(definition, mutation)
            }
        }
    }
}

struct IndexVarSubstitution<'a> {
    substitutions: &'a HashMap<IndexVar, IndexVar>,
}

impl IndexNotationRewriter for IndexVarSubstitution<'_> {
    fn rewrite_index_var(&mut self, var: &IndexVar) -> IndexVar {
        self.substitutions
            .get(var)
            .cloned()
            .unwrap_or_else(|| var.clone())
    }
}

struct ExprReplacement<'a> {
    target: &'a IndexExpr,
    replacement: &'a IndexExpr,
}

impl IndexNotationRewriter for ExprReplacement<'_> {
    fn rewrite_expr(&mut self, expr: &IndexExpr) -> IndexExpr {
        if expr == self.target {
            self.replacement.clone()
        } else {
            walk_expr(self, expr)
        }
    }
}

impl IndexExpr {
    /// Rename index variables, including reduction variables.
    pub fn replace_index_vars(&self, substitutions: &HashMap<IndexVar, IndexVar>) -> IndexExpr {
        IndexVarSubstitution { substitutions }.rewrite_expr(self)
    }

    pub fn replace_index_var(&self, old: &IndexVar, new: &IndexVar) -> IndexExpr {
        self.replace_index_vars(&HashMap::from([(old.clone(), new.clone())]))
    }

    /// Replace every subexpression equal to `target`.
    pub fn replace_expr(&self, target: &IndexExpr, replacement: &IndexExpr) -> IndexExpr {
        ExprReplacement {
            target,
            replacement,
        }
        .rewrite_expr(self)
    }
}

impl IndexStmt {
    /// Rename index variables everywhere, including forall bindings.
    pub fn replace_index_vars(&self, substitutions: &HashMap<IndexVar, IndexVar>) -> IndexStmt {
        IndexVarSubstitution { substitutions }.rewrite_stmt(self)
    }

    pub fn replace_index_var(&self, old: &IndexVar, new: &IndexVar) -> IndexStmt {
        self.replace_index_vars(&HashMap::from([(old.clone(), new.clone())]))
    }

    /// Replace every subexpression equal to `target`.
    pub fn replace_expr(&self, target: &IndexExpr, replacement: &IndexExpr) -> IndexStmt {
        ExprReplacement {
            target,
            replacement,
        }
        .rewrite_stmt(self)
    }
}
