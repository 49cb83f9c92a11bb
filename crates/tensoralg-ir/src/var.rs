//! Identity entities: index variables and tensor variables.
//!
//! Both are cheap handles compared, hashed and ordered by a process-unique
//! id. Two variables created with the same name are distinct.

use std::borrow::Borrow;
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::expr::{Access, IndexExpr};
use crate::format::Format;
use crate::schedule::{OperatorSplit, Schedule};
use crate::stmt::Assignment;
use crate::types::{Datatype, Type};

static NEXT_INDEX_VAR_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_TENSOR_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// An index variable iterates over the modes of the tensors it indexes.
#[derive(Clone)]
pub struct IndexVar {
    id: u64,
    name: Arc<str>,
}

impl IndexVar {
    pub fn new(name: impl Into<String>) -> Self {
        IndexVar {
            id: NEXT_INDEX_VAR_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name.into()),
        }
    }

    /// Create an index variable with a generated name.
    pub fn fresh() -> Self {
        let id = NEXT_INDEX_VAR_ID.fetch_add(1, Ordering::Relaxed);
        IndexVar {
            id,
            name: Arc::from(format!("i{}", id)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for IndexVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IndexVar {}

impl Hash for IndexVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for IndexVar {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexVar {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for IndexVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

struct TensorVarContent {
    id: u64,
    ty: Type,
    format: Format,
    name: RwLock<String>,
    schedule: RwLock<Schedule>,
    assignment: RwLock<Option<Assignment>>,
}

/// A tensor operand or result of an index expression.
///
/// The type and format are fixed at creation. The name, schedule and last
/// assignment can be updated through any handle; writes are expected to
/// come from a single owner at a time.
///
/// Recording an assignment stores a handle to a statement that itself
/// references this tensor, so the two keep each other alive until
/// [`TensorVar::take_assignment`] is called.
#[derive(Clone)]
pub struct TensorVar {
    content: Arc<TensorVarContent>,
}

impl TensorVar {
    /// Create a dense tensor variable.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        let format = Format::dense(ty.order());
        Self::with_format(name, ty, format)
    }

    pub fn with_format(name: impl Into<String>, ty: Type, format: Format) -> Self {
        TensorVar {
            content: Arc::new(TensorVarContent {
                id: NEXT_TENSOR_VAR_ID.fetch_add(1, Ordering::Relaxed),
                ty,
                format,
                name: RwLock::new(name.into()),
                schedule: RwLock::new(Schedule::default()),
                assignment: RwLock::new(None),
            }),
        }
    }

    /// Create an order-0 tensor variable.
    pub fn scalar(name: impl Into<String>, datatype: Datatype) -> Self {
        Self::new(name, Type::scalar(datatype))
    }

    /// Create a dense tensor variable with a generated name.
    pub fn fresh(ty: Type) -> Self {
        let var = Self::new(String::new(), ty);
        var.set_name(format!("A{}", var.id()));
        var
    }

    pub fn id(&self) -> u64 {
        self.content.id
    }

    pub fn name(&self) -> String {
        self.content.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.content.name.write() = name.into();
    }

    pub fn ty(&self) -> &Type {
        &self.content.ty
    }

    pub fn datatype(&self) -> Datatype {
        self.content.ty.datatype
    }

    /// Number of modes.
    pub fn order(&self) -> usize {
        self.content.ty.order()
    }

    pub fn format(&self) -> &Format {
        &self.content.format
    }

    /// Snapshot of the transformations scheduled for this tensor.
    pub fn schedule(&self) -> Schedule {
        self.content.schedule.read().clone()
    }

    pub fn set_schedule(&self, schedule: Schedule) {
        *self.content.schedule.write() = schedule;
    }

    pub fn add_operator_split(&self, split: OperatorSplit) {
        self.content.schedule.write().add_operator_split(split);
    }

    /// The last assignment recorded for this tensor, if any.
    pub fn assignment(&self) -> Option<Assignment> {
        self.content.assignment.read().clone()
    }

    pub fn set_assignment(&self, assignment: Assignment) {
        *self.content.assignment.write() = Some(assignment);
    }

    /// Remove and return the recorded assignment.
    pub fn take_assignment(&self) -> Option<Assignment> {
        self.content.assignment.write().take()
    }

    /// Access this tensor at the given index variables.
    pub fn access<I>(&self, indices: I) -> Access
    where
        I: IntoIterator,
        I::Item: Borrow<IndexVar>,
    {
        Access::new(
            self.clone(),
            indices.into_iter().map(|i| i.borrow().clone()).collect(),
        )
    }

    /// Assign `rhs` to this tensor at the given indices and record the
    /// assignment as the tensor's definition.
    pub fn assign<I>(&self, indices: I, rhs: impl Into<IndexExpr>) -> Assignment
    where
        I: IntoIterator,
        I::Item: Borrow<IndexVar>,
    {
        let assignment = self.access(indices).assign(rhs);
        self.set_assignment(assignment.clone());
        assignment
    }

    /// Accumulate (`+=`) `rhs` into this tensor and record the assignment.
    pub fn accumulate<I>(&self, indices: I, rhs: impl Into<IndexExpr>) -> Assignment
    where
        I: IntoIterator,
        I::Item: Borrow<IndexVar>,
    {
        let assignment = self.access(indices).accumulate(rhs);
        self.set_assignment(assignment.clone());
        assignment
    }
}

impl PartialEq for TensorVar {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TensorVar {}

impl Hash for TensorVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for TensorVar {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for TensorVar {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.id().cmp(&other.id())
    }
}

impl fmt::Debug for TensorVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_index_var_identity() {
        let i = IndexVar::new("i");
        let other_i = IndexVar::new("i");
        assert_ne!(i, other_i);
        assert_eq!(i, i.clone());
        assert_eq!(i.name(), other_i.name());

        let set: BTreeSet<IndexVar> = [i.clone(), other_i.clone(), i.clone()].into();
        assert_eq!(set.len(), 2);
        assert!(i < other_i);
    }

    #[test]
    fn test_fresh_index_var_names() {
        let v = IndexVar::fresh();
        assert_eq!(v.name(), format!("i{}", v.id()));
    }

    #[test]
    fn test_tensor_var_mutable_name() {
        let a = TensorVar::new("A", Type::fixed(Datatype::Float64, &[2, 2]));
        let alias = a.clone();
        alias.set_name("B");
        assert_eq!(a.name(), "B");
        assert_eq!(a, alias);
        assert_eq!(a.order(), 2);
        assert!(a.format().is_dense());

        let same_name = TensorVar::new("B", a.ty().clone());
        assert_ne!(a, same_name);
    }

    #[test]
    fn test_tensor_var_records_assignment() {
        let i = IndexVar::new("i");
        let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[4]));
        let b = TensorVar::new("b", Type::fixed(Datatype::Float64, &[4]));
        assert!(a.assignment().is_none());

        let assignment = a.assign([&i], b.access([&i]));
        assert_eq!(a.assignment(), Some(assignment.clone()));
        assert_eq!(a.take_assignment(), Some(assignment));
        assert!(a.assignment().is_none());
    }

    #[test]
    fn test_fresh_tensor_var_name() {
        let t = TensorVar::fresh(Type::scalar(Datatype::Int32));
        assert_eq!(t.name(), format!("A{}", t.id()));
        assert_eq!(t.order(), 0);
    }
}
