//! Utility functions for the IR.
//!
//! This module provides helper functions for:
//! - Pretty printing statements as indented loop nests
//! - Computing statement statistics

use std::fmt;

use crate::expr::{Access, Literal, Reduction};
use crate::stmt::{Assignment, Forall, IndexStmt, Multi, Sequence, StmtNode, Where};
use crate::visit::IndexNotationVisitor;

/// Pretty-print a statement as an indented loop nest.
pub fn pretty_print_stmt(stmt: &IndexStmt) -> String {
    PrettyStmt(stmt).to_string()
}

struct PrettyStmt<'a>(&'a IndexStmt);

impl PrettyStmt<'_> {
    fn write(f: &mut fmt::Formatter<'_>, stmt: &IndexStmt, indent: usize) -> fmt::Result {
        let spaces = "  ".repeat(indent);
        match stmt.node() {
            StmtNode::Assignment(assignment) => writeln!(f, "{}{}", spaces, assignment),
            StmtNode::Forall(forall) => {
                writeln!(f, "{}forall {}", spaces, forall.index_var())?;
                Self::write(f, forall.stmt(), indent + 1)
            }
            StmtNode::Where(where_) => {
                writeln!(f, "{}where", spaces)?;
                writeln!(f, "{}  consumer:", spaces)?;
                Self::write(f, where_.consumer(), indent + 2)?;
                writeln!(f, "{}  producer:", spaces)?;
                Self::write(f, where_.producer(), indent + 2)
            }
            StmtNode::Multi(multi) => {
                writeln!(f, "{}multi", spaces)?;
                Self::write(f, multi.stmt1(), indent + 1)?;
                Self::write(f, multi.stmt2(), indent + 1)
            }
            StmtNode::Sequence(sequence) => {
                writeln!(f, "{}sequence", spaces)?;
                writeln!(f, "{}  definition:", spaces)?;
                Self::write(f, sequence.definition(), indent + 2)?;
                writeln!(f, "{}  mutation:", spaces)?;
                Self::write(f, sequence.mutation(), indent + 2)
            }
        }
    }
}

impl fmt::Display for PrettyStmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write(f, self.0, 0)
    }
}

/// Statistics about an IndexStmt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StmtStats {
    /// Number of assignments
    pub assignment_count: usize,
    /// Number of compound (`op=`) assignments
    pub compound_count: usize,
    /// Number of forall loops
    pub forall_count: usize,
    /// Number of where statements, one per workspace
    pub where_count: usize,
    /// Number of multi and sequence statements
    pub composition_count: usize,
    /// Number of reduction expressions
    pub reduction_count: usize,
    /// Number of tensor accesses, left-hand sides included
    pub access_count: usize,
    /// Number of literals
    pub literal_count: usize,
    /// Deepest forall nesting
    pub max_loop_depth: usize,
    /// Number of distinct index variables
    pub index_var_count: usize,
}

impl StmtStats {
    /// Compute statistics for a statement.
    pub fn compute(stmt: &IndexStmt) -> Self {
        let mut counter = StatsCounter {
            stats: StmtStats {
                index_var_count: stmt.index_vars().len(),
                ..StmtStats::default()
            },
            loop_depth: 0,
        };
        stmt.accept(&mut counter);
        counter.stats
    }
}

struct StatsCounter {
    stats: StmtStats,
    loop_depth: usize,
}

impl IndexNotationVisitor for StatsCounter {
    fn visit_access(&mut self, _access: &Access) {
        self.stats.access_count += 1;
    }

    fn visit_literal(&mut self, _literal: &Literal) {
        self.stats.literal_count += 1;
    }

    fn visit_reduction(&mut self, reduction: &Reduction) {
        self.stats.reduction_count += 1;
        reduction.expr().accept(self);
    }

    fn visit_assignment(&mut self, assignment: &Assignment) {
        self.stats.assignment_count += 1;
        if assignment.is_compound() {
            self.stats.compound_count += 1;
        }
        self.visit_access(assignment.lhs());
        assignment.rhs().accept(self);
    }

    fn visit_forall(&mut self, forall: &Forall) {
        self.stats.forall_count += 1;
        self.loop_depth += 1;
        self.stats.max_loop_depth = self.stats.max_loop_depth.max(self.loop_depth);
        forall.stmt().accept(self);
        self.loop_depth -= 1;
    }

    fn visit_where(&mut self, where_: &Where) {
        self.stats.where_count += 1;
        where_.consumer().accept(self);
        where_.producer().accept(self);
    }

    fn visit_multi(&mut self, multi: &Multi) {
        self.stats.composition_count += 1;
        multi.stmt1().accept(self);
        multi.stmt2().accept(self);
    }

    fn visit_sequence(&mut self, sequence: &Sequence) {
        self.stats.composition_count += 1;
        sequence.definition().accept(self);
        sequence.mutation().accept(self);
    }
}
