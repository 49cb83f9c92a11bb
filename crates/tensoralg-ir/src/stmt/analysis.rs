//! Statement analysis: index variables, domains and assignments.

use std::collections::BTreeMap;

use crate::expr::{push_unique, Access};
use crate::types::Dimension;
use crate::var::{IndexVar, TensorVar};
use crate::visit::IndexNotationVisitor;

use super::{Assignment, IndexStmt, StmtNode};

#[derive(Default)]
struct AccessCollector {
    accesses: Vec<Access>,
}

impl IndexNotationVisitor for AccessCollector {
    fn visit_access(&mut self, access: &Access) {
        self.accesses.push(access.clone());
    }
}

#[derive(Default)]
struct AssignmentCollector {
    assignments: Vec<Assignment>,
}

impl IndexNotationVisitor for AssignmentCollector {
    fn visit_assignment(&mut self, assignment: &Assignment) {
        self.assignments.push(assignment.clone());
    }
}

impl IndexStmt {
    /// Every index variable of the statement in order of first appearance,
    /// without duplicates: left-hand sides, right-hand sides, reduction
    /// variables and forall variables.
    pub fn index_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        self.collect_index_vars(&mut vars);
        vars
    }

    fn collect_index_vars(&self, vars: &mut Vec<IndexVar>) {
        match self.node() {
            StmtNode::Assignment(assignment) => {
                for var in assignment.lhs().index_vars() {
                    push_unique(vars, var);
                }
                assignment.rhs().collect_index_vars(vars);
            }
            StmtNode::Forall(forall) => {
                push_unique(vars, forall.index_var());
                forall.stmt().collect_index_vars(vars);
            }
            StmtNode::Where(where_) => {
                where_.consumer().collect_index_vars(vars);
                where_.producer().collect_index_vars(vars);
            }
            StmtNode::Multi(multi) => {
                multi.stmt1().collect_index_vars(vars);
                multi.stmt2().collect_index_vars(vars);
            }
            StmtNode::Sequence(sequence) => {
                sequence.definition().collect_index_vars(vars);
                sequence.mutation().collect_index_vars(vars);
            }
        }
    }

    /// Every access in the statement, left-hand sides included.
    pub fn accesses(&self) -> Vec<Access> {
        let mut collector = AccessCollector::default();
        self.accept(&mut collector);
        collector.accesses
    }

    /// Every assignment in the statement, consumers before producers.
    pub fn assignments(&self) -> Vec<Assignment> {
        let mut collector = AssignmentCollector::default();
        self.accept(&mut collector);
        collector.assignments
    }

    /// Tensors written by the statement, in order of first assignment.
    pub fn result_tensors(&self) -> Vec<TensorVar> {
        let mut tensors: Vec<TensorVar> = Vec::new();
        for assignment in self.assignments() {
            let tensor = assignment.lhs().tensor_var();
            if !tensors.contains(tensor) {
                tensors.push(tensor.clone());
            }
        }
        tensors
    }

    /// Dimension of every index variable, inferred from the tensor modes it
    /// indexes.
    ///
    /// A fixed dimension takes precedence over a variable one; otherwise the
    /// first access wins. Variables that index no tensor mode (for example a
    /// forall variable the body never uses) are absent from the map.
    pub fn index_var_domains(&self) -> BTreeMap<IndexVar, Dimension> {
        let mut domains = BTreeMap::new();
        for access in self.accesses() {
            let ty = access.tensor_var().ty();
            for (mode, var) in access.index_vars().iter().enumerate() {
                let Some(dimension) = ty.dimension(mode) else {
                    continue;
                };
                domains
                    .entry(var.clone())
                    .and_modify(|known: &mut Dimension| {
                        if !known.is_fixed() {
                            *known = dimension;
                        }
                    })
                    .or_insert(dimension);
            }
        }
        domains
    }

    pub fn contains_reduction(&self) -> bool {
        self.assignments()
            .iter()
            .any(|assignment| assignment.rhs().contains_reduction())
    }

    /// Number of statement and expression nodes.
    pub fn node_count(&self) -> usize {
        match self.node() {
            StmtNode::Assignment(assignment) => 2 + assignment.rhs().node_count(),
            StmtNode::Forall(forall) => 1 + forall.stmt().node_count(),
            StmtNode::Where(where_) => {
                1 + where_.consumer().node_count() + where_.producer().node_count()
            }
            StmtNode::Multi(multi) => 1 + multi.stmt1().node_count() + multi.stmt2().node_count(),
            StmtNode::Sequence(sequence) => {
                1 + sequence.definition().node_count() + sequence.mutation().node_count()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::IndexExpr;
    use crate::types::{Datatype, Type};

    #[test]
    fn test_statement_index_vars() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
        let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));

        let body = a
            .access([&i])
            .accumulate(IndexExpr::mul(b.access([&i, &j]), c.access([&j])));
        let stmt = IndexStmt::forall(j.clone(), IndexStmt::forall(i.clone(), body));
        assert_eq!(stmt.index_vars(), vec![j, i]);
    }

    #[test]
    fn test_index_var_domains() {
        let (i, j, k) = (IndexVar::new("i"), IndexVar::new("j"), IndexVar::new("k"));
        let a = TensorVar::new("a", Type::new(Datatype::Float64, vec![Dimension::Variable]));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
        let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));

        let assignment = a.assign([&i], IndexExpr::mul(b.access([&i, &j]), c.access([&j])));
        let stmt = IndexStmt::forall(k.clone(), assignment);

        let domains = stmt.index_var_domains();
        assert_eq!(domains.get(&i), Some(&Dimension::Fixed(3)));
        assert_eq!(domains.get(&j), Some(&Dimension::Fixed(4)));
        assert_eq!(domains.get(&k), None);
    }

    #[test]
    fn test_result_tensors() {
        let i = IndexVar::new("i");
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[3]));

        let first = a.access([&i]).assign(b.access([&i]));
        let second = b.access([&i]).assign(a.access([&i]));
        let third = a.access([&i]).accumulate(1.0);
        let stmt = IndexStmt::multi(first, IndexStmt::sequence(second, third));

        assert_eq!(stmt.result_tensors(), vec![a, b]);
        assert_eq!(stmt.assignments().len(), 3);
        assert_eq!(stmt.accesses().len(), 5);
    }
}
