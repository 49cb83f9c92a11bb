//! Einsum to reduction notation.

use crate::error::IrError;
use crate::expr::{ExprNode, IndexExpr};
use crate::stmt::{Assignment, IndexStmt};
use crate::var::IndexVar;
use crate::visit::{walk_stmt, IndexNotationRewriter};

use super::check_einsum_notation;

/// Sum every additive term over the variables it uses that are not free.
///
/// Each term gets its own reductions, nested in order of first appearance
/// with the first variable outermost. Terms without such variables are
/// returned as the same handles.
fn sum_terms(expr: &IndexExpr, free: &[IndexVar]) -> IndexExpr {
    if let ExprNode::Binary(binary) = expr.node() {
        if binary.op().is_additive() {
            let lhs = sum_terms(binary.lhs(), free);
            let rhs = sum_terms(binary.rhs(), free);
            if lhs.ptr_eq(binary.lhs()) && rhs.ptr_eq(binary.rhs()) {
                return expr.clone();
            }
            return IndexExpr::binary(binary.op(), lhs, rhs);
        }
    }

    let summed: Vec<IndexVar> = expr
        .index_vars()
        .into_iter()
        .filter(|var| !free.contains(var))
        .collect();
    if summed.is_empty() {
        return expr.clone();
    }
    tracing::debug!(
        term = %expr,
        vars = ?summed.iter().map(|v| v.name()).collect::<Vec<_>>(),
        "inserting implicit sums"
    );
    summed
        .iter()
        .rev()
        .fold(expr.clone(), |body, var| IndexExpr::sum(var.clone(), body))
}

/// Make the implicit sums of an einsum assignment explicit.
///
/// The assignment is assumed to be in einsum notation.
pub fn reduce_assignment(assignment: &Assignment) -> Assignment {
    let free = assignment.free_vars();
    let rhs = sum_terms(assignment.rhs(), &free);
    if rhs.ptr_eq(assignment.rhs()) {
        assignment.clone()
    } else {
        assignment.with_rhs(rhs)
    }
}

struct ReduceAssignments;

impl IndexNotationRewriter for ReduceAssignments {
    fn rewrite_stmt(&mut self, stmt: &IndexStmt) -> IndexStmt {
        match stmt.try_to::<Assignment>() {
            Some(assignment) => {
                let reduced = reduce_assignment(assignment);
                if reduced.rhs().ptr_eq(assignment.rhs()) {
                    stmt.clone()
                } else {
                    reduced.into()
                }
            }
            None => walk_stmt(self, stmt),
        }
    }
}

/// Lower einsum notation to reduction notation.
///
/// A single assignment must be in einsum notation. In a composed statement
/// every assignment must be; each is lowered in place.
pub fn try_make_reduction_notation(stmt: &IndexStmt) -> Result<IndexStmt, IrError> {
    if stmt.isa::<Assignment>() {
        check_einsum_notation(stmt)?;
    } else {
        for assignment in stmt.assignments() {
            check_einsum_notation(&IndexStmt::from(assignment))?;
        }
    }
    Ok(ReduceAssignments.rewrite_stmt(stmt))
}

/// Lower einsum notation to reduction notation.
///
/// # Panics
///
/// Panics if an assignment of `stmt` is not in einsum notation; check with
/// [`crate::is_einsum_notation`] first.
#[track_caller]
pub fn make_reduction_notation(stmt: &IndexStmt) -> IndexStmt {
    match try_make_reduction_notation(stmt) {
        Ok(reduced) => reduced,
        Err(err) => panic!("cannot lower `{}` to reduction notation: {}", stmt, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::is_reduction_notation;
    use crate::types::{Datatype, Type};
    use crate::var::TensorVar;

    fn tensor(name: &str, order: usize) -> TensorVar {
        TensorVar::new(name, Type::fixed(Datatype::Float64, &vec![4; order]))
    }

    #[test]
    fn test_sums_each_term_separately() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);
        let c = tensor("c", 1);
        let d = tensor("d", 1);

        let product = IndexExpr::mul(b.access([&i, &j]), c.access([&j]));
        let stmt: IndexStmt = a
            .access([&i])
            .assign(IndexExpr::sub(product.clone(), d.access([&i])))
            .into();

        let reduced = make_reduction_notation(&stmt);
        let expected: IndexStmt = a
            .access([&i])
            .assign(IndexExpr::sub(
                IndexExpr::sum(j.clone(), product),
                d.access([&i]),
            ))
            .into();
        assert_eq!(reduced, expected);
        assert!(is_reduction_notation(&reduced));
    }

    #[test]
    fn test_term_with_shared_variable_is_summed_per_term() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);
        let c = tensor("C", 2);

        let stmt: IndexStmt = a
            .access([&i])
            .assign(IndexExpr::add(b.access([&i, &j]), c.access([&i, &j])))
            .into();
        let reduced = make_reduction_notation(&stmt);
        assert_eq!(
            reduced.to_string(),
            "a(i) = sum(j, B(i,j)) + sum(j, C(i,j))"
        );
    }

    #[test]
    fn test_reductions_nest_in_first_appearance_order() {
        let (i, j, k) = (IndexVar::new("i"), IndexVar::new("j"), IndexVar::new("k"));
        let a = tensor("a", 1);
        let b = tensor("B", 3);

        let stmt: IndexStmt = a.access([&i]).assign(b.access([&k, &i, &j])).into();
        let reduced = make_reduction_notation(&stmt);
        assert_eq!(reduced.to_string(), "a(i) = sum(k, sum(j, B(k,i,j)))");
    }

    #[test]
    fn test_composed_statement_lowers_each_assignment() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);
        let c = tensor("c", 1);

        let first = a.access([&i]).assign(b.access([&i, &j]));
        let second = c.access([&j]).assign(b.access([&i, &j]));
        let stmt = IndexStmt::multi(first, second);
        let reduced = make_reduction_notation(&stmt);
        assert_eq!(
            reduced.to_string(),
            "multi(a(i) = sum(j, B(i,j)), c(j) = sum(i, B(i,j)))"
        );
    }

    #[test]
    fn test_non_einsum_input_is_an_error() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);

        let stmt: IndexStmt = a
            .access([&i])
            .assign(IndexExpr::sum(j.clone(), b.access([&i, &j])))
            .into();
        assert!(try_make_reduction_notation(&stmt).is_err());
    }

    #[test]
    #[should_panic(expected = "cannot lower")]
    fn test_make_reduction_notation_panics_on_bad_input() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = tensor("a", 1);
        let b = tensor("B", 2);
        let inner = a
            .access([&i])
            .assign(IndexExpr::sum(j.clone(), b.access([&i, &j])));
        make_reduction_notation(&IndexStmt::forall(i.clone(), inner));
    }
}
