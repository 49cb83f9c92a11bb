//! # TensorAlg IR
//!
//! **Tensor index notation: expressions, statements and the dialects they
//! are lowered through**
//!
//! This crate provides the core data structures of a tensor-algebra
//! compiler. Computations are written in index notation, such as
//! `A(i,j) = B(i,k) * C(k,j)`, and progressively lowered into an explicit
//! loop nest that a code generator can consume.
//!
//! ## Core Components
//!
//! ### Identity entities ([`IndexVar`], [`TensorVar`])
//! Named handles compared by identity. Two index variables named `i` are
//! different variables. A tensor variable carries a [`Type`], a [`Format`],
//! a [`Schedule`] and the last [`Assignment`] that defined it.
//!
//! ### Index expressions ([`IndexExpr`])
//! Immutable, shared expression trees:
//! - **Accesses**: `B(i,j)`, or a bare name for order-0 tensors
//! - **Literals**: integer, unsigned, floating point and complex constants
//! - **Arithmetic**: negation, addition, subtraction, multiplication, division
//! - **Reductions**: `sum(j, B(i,j))`, or any binary operator over a variable
//!
//! ### Index statements ([`IndexStmt`])
//! - **Assignment**: `a(i) = ...`, or compound `a(i) += ...`
//! - **Forall**: `forall(i, S)` evaluates `S` for every value of `i`
//! - **Where**: `where(C, P)` evaluates producer `P` into a temporary read by `C`
//! - **Multi** and **Sequence**: independent and ordered composition
//!
//! ## Dialects
//!
//! | Dialect | Example |
//! |---------|---------|
//! | Einsum | `a(i) = B(i,j) * c(j)` |
//! | Reduction | `a(i) = sum(j, B(i,j) * c(j))` |
//! | Concrete | `forall(i, forall(j, a(i) += B(i,j) * c(j)))` |
//!
//! [`check_einsum_notation`], [`check_reduction_notation`] and
//! [`check_concrete_notation`] classify a statement and explain failures.
//! [`make_reduction_notation`] and [`make_concrete_notation`] lower between
//! dialects, and [`split_operator`] factors a binary expression through a
//! workspace.
//!
//! ## Quick Start
//!
//! ```rust
//! use tensoralg_ir::{
//!     is_concrete_notation, make_concrete_notation, Datatype, IndexExpr, IndexStmt, IndexVar,
//!     TensorVar, Type,
//! };
//!
//! let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
//! let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
//! let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
//! let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));
//!
//! let einsum: IndexStmt = a
//!     .access([&i])
//!     .assign(IndexExpr::mul(b.access([&i, &j]), c.access([&j])))
//!     .into();
//! let concrete = make_concrete_notation(&einsum);
//!
//! assert!(is_concrete_notation(&concrete));
//! assert_eq!(
//!     concrete.to_string(),
//!     "forall(i, forall(j, a(i) += B(i,j) * c(j)))"
//! );
//! ```
//!
//! ## Concurrency
//!
//! Expression and statement trees are immutable and can be shared between
//! threads. The mutable fields of a [`TensorVar`] (name, schedule, last
//! assignment) are individually locked; callers coordinating several
//! updates to one tensor must synchronize them.

mod display;
mod error;
mod expr;
mod format;
mod notation;
mod schedule;
mod stmt;
mod types;
pub mod util;
mod var;
pub mod visit;


pub use error::IrError;
pub use expr::{
    simplify, Access, BinaryExpr, BinaryOp, Complex, ExprKind, ExprNode, ExprVariant, FromLiteral,
    IndexExpr, Literal, LiteralValue, Neg, Reduction,
};
pub use format::{Format, ModeFormat};
pub use notation::{
    check_concrete_notation, check_einsum_notation, check_reduction_notation, classify,
    is_concrete_notation, is_einsum_notation, is_reduction_notation, make_concrete_notation,
    make_reduction_notation, reduce_assignment, split_operator, try_make_concrete_notation,
    try_make_concrete_notation_with, try_make_reduction_notation, ConcretizeOptions, Dialect,
    NotationViolation,
};
pub use schedule::{OperatorSplit, Schedule};
pub use stmt::{
    Assignment, Forall, IndexStmt, Multi, Sequence, StmtKind, StmtNode, StmtVariant, Where,
};
pub use types::{Datatype, DatatypeKind, Dimension, Type};
pub use util::{pretty_print_stmt, StmtStats};
pub use var::{IndexVar, TensorVar};
pub use visit::{walk_expr, walk_stmt, IndexNotationRewriter, IndexNotationVisitor};
