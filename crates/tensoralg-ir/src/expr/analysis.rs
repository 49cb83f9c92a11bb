//! Expression analysis (index variables, accesses, node counts).

use crate::var::IndexVar;

use super::{Access, ExprNode, IndexExpr};

pub(crate) fn push_unique(vars: &mut Vec<IndexVar>, var: &IndexVar) {
    if !vars.contains(var) {
        vars.push(var.clone());
    }
}

impl IndexExpr {
    /// Index variables in order of first appearance, without duplicates.
    ///
    /// A reduction variable appears at its binding reduction.
    pub fn index_vars(&self) -> Vec<IndexVar> {
        let mut vars = Vec::new();
        self.collect_index_vars(&mut vars);
        vars
    }

    pub(crate) fn collect_index_vars(&self, vars: &mut Vec<IndexVar>) {
        match self.node() {
            ExprNode::Access(access) => {
                for var in access.index_vars() {
                    push_unique(vars, var);
                }
            }
            ExprNode::Literal(_) => {}
            ExprNode::Neg(neg) => neg.operand().collect_index_vars(vars),
            ExprNode::Binary(binary) => {
                binary.lhs().collect_index_vars(vars);
                binary.rhs().collect_index_vars(vars);
            }
            ExprNode::Reduction(reduction) => {
                push_unique(vars, reduction.var());
                reduction.expr().collect_index_vars(vars);
            }
        }
    }

    /// Every access in the expression, left to right.
    pub fn accesses(&self) -> Vec<Access> {
        let mut accesses = Vec::new();
        self.collect_accesses(&mut accesses);
        accesses
    }

    fn collect_accesses(&self, accesses: &mut Vec<Access>) {
        match self.node() {
            ExprNode::Access(access) => accesses.push(access.clone()),
            ExprNode::Literal(_) => {}
            ExprNode::Neg(neg) => neg.operand().collect_accesses(accesses),
            ExprNode::Binary(binary) => {
                binary.lhs().collect_accesses(accesses);
                binary.rhs().collect_accesses(accesses);
            }
            ExprNode::Reduction(reduction) => reduction.expr().collect_accesses(accesses),
        }
    }

    pub fn contains_reduction(&self) -> bool {
        match self.node() {
            ExprNode::Access(_) | ExprNode::Literal(_) => false,
            ExprNode::Neg(neg) => neg.operand().contains_reduction(),
            ExprNode::Binary(binary) => {
                binary.lhs().contains_reduction() || binary.rhs().contains_reduction()
            }
            ExprNode::Reduction(_) => true,
        }
    }

    /// True if `var` is used by an access in this expression.
    pub fn uses_index_var(&self, var: &IndexVar) -> bool {
        match self.node() {
            ExprNode::Access(access) => access.index_vars().contains(var),
            ExprNode::Literal(_) => false,
            ExprNode::Neg(neg) => neg.operand().uses_index_var(var),
            ExprNode::Binary(binary) => {
                binary.lhs().uses_index_var(var) || binary.rhs().uses_index_var(var)
            }
            ExprNode::Reduction(reduction) => reduction.expr().uses_index_var(var),
        }
    }

    /// True if `target` is a subexpression of this expression (or equal to it).
    pub fn contains_expr(&self, target: &IndexExpr) -> bool {
        if self == target {
            return true;
        }
        match self.node() {
            ExprNode::Access(_) | ExprNode::Literal(_) => false,
            ExprNode::Neg(neg) => neg.operand().contains_expr(target),
            ExprNode::Binary(binary) => {
                binary.lhs().contains_expr(target) || binary.rhs().contains_expr(target)
            }
            ExprNode::Reduction(reduction) => reduction.expr().contains_expr(target),
        }
    }

    /// Number of nodes in the tree, counting shared subtrees once per use.
    pub fn node_count(&self) -> usize {
        match self.node() {
            ExprNode::Access(_) | ExprNode::Literal(_) => 1,
            ExprNode::Neg(neg) => 1 + neg.operand().node_count(),
            ExprNode::Binary(binary) => 1 + binary.lhs().node_count() + binary.rhs().node_count(),
            ExprNode::Reduction(reduction) => 1 + reduction.expr().node_count(),
        }
    }

    /// Depth of the deepest node; leaves have depth 1.
    pub fn depth(&self) -> usize {
        match self.node() {
            ExprNode::Access(_) | ExprNode::Literal(_) => 1,
            ExprNode::Neg(neg) => 1 + neg.operand().depth(),
            ExprNode::Binary(binary) => 1 + binary.lhs().depth().max(binary.rhs().depth()),
            ExprNode::Reduction(reduction) => 1 + reduction.expr().depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Datatype, Type};
    use crate::var::TensorVar;

    #[test]
    fn test_index_vars_first_appearance() {
        let (i, j, k) = (IndexVar::new("i"), IndexVar::new("j"), IndexVar::new("k"));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[2, 2]));
        let c = TensorVar::new("C", Type::fixed(Datatype::Float64, &[2, 2]));

        let expr = IndexExpr::mul(b.access([&k, &i]), c.access([&i, &j]));
        assert_eq!(expr.index_vars(), vec![k.clone(), i.clone(), j.clone()]);

        let summed = IndexExpr::sum(j.clone(), expr);
        assert_eq!(summed.index_vars(), vec![j, k, i]);
        assert!(summed.contains_reduction());
        assert_eq!(summed.node_count(), 4);
        assert_eq!(summed.depth(), 3);
    }

    #[test]
    fn test_accesses_left_to_right() {
        let i = IndexVar::new("i");
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[2]));
        let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[2]));

        let expr = IndexExpr::sub(b.access([&i]), IndexExpr::neg(c.access([&i])));
        let accesses = expr.accesses();
        assert_eq!(accesses.len(), 2);
        assert_eq!(accesses[0].tensor_var(), &b);
        assert_eq!(accesses[1].tensor_var(), &c);
        assert!(expr.uses_index_var(&i));
        assert!(!expr.uses_index_var(&IndexVar::new("i")));
    }
}
