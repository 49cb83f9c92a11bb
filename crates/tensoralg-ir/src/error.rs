//! Error types for the IR.

use thiserror::Error;

use crate::notation::{Dialect, NotationViolation};
use crate::types::Dimension;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Access to {tensor} uses {actual} index variables but the tensor has order {expected}")]
    AccessOrderMismatch {
        tensor: String,
        expected: usize,
        actual: usize,
    },
    #[error("Index variable {var} indexes incompatible dimensions {first} and {second}")]
    IncompatibleDimensions {
        var: String,
        first: Dimension,
        second: Dimension,
    },
    #[error("Statement is not in {dialect} notation: {reason}")]
    NotationViolation {
        dialect: Dialect,
        reason: NotationViolation,
    },
}

impl IrError {
    pub(crate) fn notation(dialect: Dialect, reason: NotationViolation) -> Self {
        IrError::NotationViolation { dialect, reason }
    }
}
