//! Scheduling transformations recorded on tensor variables.

use crate::expr::IndexExpr;
use crate::var::IndexVar;

/// Request to split the binary expression `expr` at index variable `old`.
///
/// The left operand is precomputed into a workspace over `left`, and the
/// full expression is then evaluated over `right` reading the workspace.
/// See [`crate::split_operator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorSplit {
    expr: IndexExpr,
    old: IndexVar,
    left: IndexVar,
    right: IndexVar,
    workspace_name: Option<String>,
}

impl OperatorSplit {
    pub fn new(expr: IndexExpr, old: IndexVar, left: IndexVar, right: IndexVar) -> Self {
        OperatorSplit {
            expr,
            old,
            left,
            right,
            workspace_name: None,
        }
    }

    /// Name the workspace instead of deriving it from `old`.
    pub fn with_workspace_name(mut self, name: impl Into<String>) -> Self {
        self.workspace_name = Some(name.into());
        self
    }

    pub fn expr(&self) -> &IndexExpr {
        &self.expr
    }

    pub fn old(&self) -> &IndexVar {
        &self.old
    }

    pub fn left(&self) -> &IndexVar {
        &self.left
    }

    pub fn right(&self) -> &IndexVar {
        &self.right
    }

    /// Workspace name, `w<old>` unless one was given.
    pub fn workspace_name(&self) -> String {
        self.workspace_name
            .clone()
            .unwrap_or_else(|| format!("w{}", self.old.name()))
    }
}

/// Ordered list of transformations to apply when lowering a tensor's
/// defining statement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    operator_splits: Vec<OperatorSplit>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operator_split(&mut self, split: OperatorSplit) {
        self.operator_splits.push(split);
    }

    pub fn operator_splits(&self) -> &[OperatorSplit] {
        &self.operator_splits
    }

    pub fn is_empty(&self) -> bool {
        self.operator_splits.is_empty()
    }
}
