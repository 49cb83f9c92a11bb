//! Index notation lowering pipeline.
//!
//! This crate drives statements built with `tensoralg-ir` from einsum
//! notation to the explicit loop nests a code generator consumes. It adds
//! what the IR passes leave to their caller: a configuration that can be
//! read from TOML or JSON, stage-by-stage verification, application of the
//! operator splits scheduled on the result tensors, and a report of what
//! each stage did.
//!
//! # Quick Start
//!
//! ```rust
//! use tensoralg_compiler::{LoweringConfig, LoweringPipeline};
//! use tensoralg_ir::{Datatype, Dialect, IndexExpr, IndexStmt, IndexVar, TensorVar, Type};
//!
//! let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
//! let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
//! let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
//! let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));
//!
//! let stmt: IndexStmt = a
//!     .access([&i])
//!     .assign(IndexExpr::mul(b.access([&i, &j]), c.access([&j])))
//!     .into();
//!
//! let pipeline = LoweringPipeline::with_config(LoweringConfig::default());
//! let (lowered, report) = pipeline.lower(&stmt).unwrap();
//!
//! assert_eq!(report.output_dialect, Dialect::Concrete);
//! assert_eq!(lowered.to_string(), "forall(i, forall(j, a(i) += B(i,j) * c(j)))");
//! ```
//!
//! # Modules
//!
//! - [`config`]: Lowering configuration and its TOML/JSON loading
//! - [`logging`]: Log levels and formats; `TracingLogger` with the
//!   `structured-logging` feature
//! - [`pipeline`]: The staged lowering pipeline and its report

pub mod config;
pub mod logging;
pub mod pipeline;


use anyhow::Result;
use tensoralg_ir::IndexStmt;

pub use config::{LoggingConfig, LoweringConfig};
pub use logging::{LogFormat, LogLevel};
#[cfg(feature = "structured-logging")]
pub use logging::{TracingLogger, TracingLoggerBuilder};
pub use pipeline::{LoweringPipeline, LoweringReport, LoweringStage, StageReport};

/// Lower `stmt` to concrete notation with the default configuration.
pub fn lower(stmt: &IndexStmt) -> Result<IndexStmt> {
    LoweringPipeline::new().lower(stmt).map(|(lowered, _)| lowered)
}

/// Lower `stmt` with `config`.
pub fn lower_with_config(
    stmt: &IndexStmt,
    config: &LoweringConfig,
) -> Result<(IndexStmt, LoweringReport)> {
    LoweringPipeline::with_config(config.clone()).lower(stmt)
}
