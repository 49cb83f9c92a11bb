//! Well-formedness checks on statements.

use std::collections::HashMap;

use crate::error::IrError;
use crate::expr::Access;
use crate::types::Dimension;
use crate::var::IndexVar;

use super::IndexStmt;

pub(crate) fn validate_accesses(accesses: &[Access]) -> Result<(), IrError> {
    let mut fixed: HashMap<IndexVar, Dimension> = HashMap::new();
    for access in accesses {
        let tensor = access.tensor_var();
        let indices = access.index_vars();
        if indices.len() != tensor.order() {
            return Err(IrError::AccessOrderMismatch {
                tensor: tensor.name(),
                expected: tensor.order(),
                actual: indices.len(),
            });
        }
        for (var, dimension) in indices.iter().zip(&tensor.ty().shape) {
            if !dimension.is_fixed() {
                continue;
            }
            match fixed.get(var) {
                Some(first) if !first.is_compatible_with(dimension) => {
                    return Err(IrError::IncompatibleDimensions {
                        var: var.name().to_string(),
                        first: *first,
                        second: *dimension,
                    });
                }
                Some(_) => {}
                None => {
                    fixed.insert(var.clone(), *dimension);
                }
            }
        }
    }
    Ok(())
}

impl IndexStmt {
    /// Check that every access uses one index variable per tensor mode and
    /// that no index variable indexes two different fixed dimensions.
    pub fn validate(&self) -> Result<(), IrError> {
        validate_accesses(&self.accesses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::IndexExpr;
    use crate::types::{Datatype, Type};
    use crate::var::TensorVar;

    #[test]
    fn test_validate_accepts_consistent_statement() {
        let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
        let c = TensorVar::new("c", Type::new(Datatype::Float64, vec![Dimension::Variable]));

        let stmt: IndexStmt = a
            .assign([&i], IndexExpr::mul(b.access([&i, &j]), c.access([&j])))
            .into();
        assert!(stmt.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_arity() {
        let i = IndexVar::new("i");
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));

        let stmt: IndexStmt = a.assign([&i], b.access([&i])).into();
        assert_eq!(
            stmt.validate(),
            Err(IrError::AccessOrderMismatch {
                tensor: "B".to_string(),
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_validate_rejects_incompatible_dimensions() {
        let i = IndexVar::new("i");
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[5]));

        let stmt: IndexStmt = a.assign([&i], b.access([&i])).into();
        let err = stmt.validate().unwrap_err();
        assert!(matches!(
            err,
            IrError::IncompatibleDimensions {
                first: Dimension::Fixed(3),
                second: Dimension::Fixed(5),
                ..
            }
        ));
    }
}
