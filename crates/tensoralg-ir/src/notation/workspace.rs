use std::collections::BTreeMap;

use crate::expr::Access;
use crate::stmt::IndexStmt;
use crate::types::{Datatype, Dimension, Type};
use crate::var::{IndexVar, TensorVar};

/// A dense temporary filled by a `where` producer and read by its consumer.
pub(crate) struct Workspace {
    tensor: TensorVar,
}

impl Workspace {
    /// Workspace with one mode per index variable, sized from `domains`.
    pub(crate) fn new(
        name: impl Into<String>,
        datatype: Datatype,
        indices: &[IndexVar],
        domains: &BTreeMap<IndexVar, Dimension>,
    ) -> Self {
        let shape = indices
            .iter()
            .map(|var| domains.get(var).copied().unwrap_or_default())
            .collect();
        Workspace {
            tensor: TensorVar::new(name, Type::new(datatype, shape)),
        }
    }

    pub(crate) fn scalar(name: impl Into<String>, datatype: Datatype) -> Self {
        Workspace {
            tensor: TensorVar::scalar(name, datatype),
        }
    }

    pub(crate) fn access<'a, I>(&self, indices: I) -> Access
    where
        I: IntoIterator<Item = &'a IndexVar>,
    {
        self.tensor.access(indices)
    }

    pub(crate) fn scalar_access(&self) -> Access {
        Access::scalar(&self.tensor)
    }

    /// `where(consumer, producer)`.
    pub(crate) fn bind(self, consumer: IndexStmt, producer: IndexStmt) -> IndexStmt {
        tracing::debug!(
            workspace = %self.tensor.name(),
            ty = %self.tensor.ty(),
            "introducing workspace"
        );
        IndexStmt::where_(consumer, producer)
    }
}
