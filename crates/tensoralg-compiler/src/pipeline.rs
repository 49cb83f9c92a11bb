//! Lowering pipeline.
//!
//! The pipeline drives a statement from the dialect it is written in to the
//! configured target:
//!
//! 1. **Validation**: access arities and dimensions
//! 2. **Reduction**: implicit sums of einsum assignments become explicit
//! 3. **Concrete**: reductions become loops and workspaces
//! 4. **Schedules**: operator splits recorded on the result tensors
//!
//! Each stage runs in its own `info` span and, when stage verification is
//! enabled, is checked to produce the dialect it promises.

use std::fmt;

use anyhow::{bail, Context, Result};
use tensoralg_ir::{
    check_concrete_notation, check_reduction_notation, classify, is_einsum_notation,
    split_operator, try_make_concrete_notation_with, try_make_reduction_notation, Dialect,
    IndexStmt, StmtStats,
};

use crate::config::LoweringConfig;

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringStage {
    Reduction,
    Concrete,
    Schedule,
}

impl fmt::Display for LoweringStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoweringStage::Reduction => write!(f, "reduction"),
            LoweringStage::Concrete => write!(f, "concrete"),
            LoweringStage::Schedule => write!(f, "schedule"),
        }
    }
}

/// Statistics for one executed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: LoweringStage,
    /// Statement nodes before the stage
    pub nodes_before: usize,
    /// Statement nodes after the stage
    pub nodes_after: usize,
    /// Whether the stage rebuilt the statement
    pub changed: bool,
}

/// Statistics for one run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringReport {
    /// Dialect of the input; composed statements of einsum assignments
    /// report `Einsum`
    pub input_dialect: Dialect,
    /// Dialect of the output
    pub output_dialect: Dialect,
    /// Executed stages, in order
    pub stages: Vec<StageReport>,
    /// Operator splits that rewrote the statement
    pub splits_applied: usize,
    /// Operator splits that did not apply and left the statement unchanged
    pub splits_skipped: usize,
    /// Statistics of the output statement
    pub output_stats: StmtStats,
}

impl LoweringReport {
    pub fn stage(&self, stage: LoweringStage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    /// True if any stage rebuilt the statement.
    pub fn changed(&self) -> bool {
        self.stages.iter().any(|report| report.changed)
    }
}

impl fmt::Display for LoweringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lowering Report:")?;
        writeln!(
            f,
            "  Dialect: {} -> {}",
            self.input_dialect, self.output_dialect
        )?;
        for report in &self.stages {
            writeln!(
                f,
                "  Stage {}: {} -> {} nodes{}",
                report.stage,
                report.nodes_before,
                report.nodes_after,
                if report.changed { "" } else { " (unchanged)" }
            )?;
        }
        writeln!(
            f,
            "  Splits: {} applied, {} skipped",
            self.splits_applied, self.splits_skipped
        )?;
        writeln!(
            f,
            "  Output: {} loops, {} workspaces, depth {}",
            self.output_stats.forall_count,
            self.output_stats.where_count,
            self.output_stats.max_loop_depth
        )
    }
}

/// Dialect of `stmt`, treating a composition of einsum assignments as
/// einsum notation.
fn input_dialect(stmt: &IndexStmt) -> Result<Dialect> {
    if let Some(dialect) = classify(stmt) {
        return Ok(dialect);
    }
    let assignments = stmt.assignments();
    if !assignments.is_empty()
        && assignments
            .iter()
            .all(|assignment| is_einsum_notation(&IndexStmt::from(assignment)))
    {
        return Ok(Dialect::Einsum);
    }
    // Report the concrete diagnostic: it is the only check defined on
    // every statement kind.
    match check_concrete_notation(stmt) {
        Err(err) => Err(err).with_context(|| format!("`{}` is in no notation dialect", stmt)),
        Ok(()) => Ok(Dialect::Concrete),
    }
}

/// Every assignment of `stmt` is in reduction notation.
fn verify_reduction(stmt: &IndexStmt) -> Result<()> {
    for assignment in stmt.assignments() {
        check_reduction_notation(&IndexStmt::from(&assignment))?;
    }
    Ok(())
}

/// Configurable lowering pipeline.
#[derive(Debug, Clone, Default)]
pub struct LoweringPipeline {
    config: LoweringConfig,
}

impl LoweringPipeline {
    /// Pipeline with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoweringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    /// Lower `stmt` to the configured target dialect.
    ///
    /// Fails if the statement is in no dialect, is already more explicit
    /// than the target, fails validation, or a stage produces a statement
    /// outside its dialect.
    pub fn lower(&self, stmt: &IndexStmt) -> Result<(IndexStmt, LoweringReport)> {
        let _span = tracing::info_span!("lower", target = %self.config.target).entered();

        if self.config.validate {
            stmt.validate().context("Input statement failed validation")?;
        }
        let input = input_dialect(stmt)?;
        let target = self.config.target;
        if input > target {
            bail!(
                "cannot lower `{}` from {} notation to the less explicit {} notation",
                stmt,
                input,
                target
            );
        }
        tracing::info!(stmt = %stmt, input = %input, "lowering statement");

        let mut current = stmt.clone();
        let mut stages = Vec::new();

        if input == Dialect::Einsum && target >= Dialect::Reduction {
            let next = self.run_stage(LoweringStage::Reduction, &current, &mut stages, |s| {
                try_make_reduction_notation(s).context("Failed to lower to reduction notation")
            })?;
            if self.config.verify_stages {
                verify_reduction(&next).context("Reduction stage left implicit sums")?;
            }
            current = next;
        }

        if input < Dialect::Concrete && target == Dialect::Concrete {
            let options = self.config.concretize_options();
            let next = self.run_stage(LoweringStage::Concrete, &current, &mut stages, |s| {
                try_make_concrete_notation_with(s, &options)
                    .context("Failed to lower to concrete notation")
            })?;
            if self.config.verify_stages {
                check_concrete_notation(&next)
                    .context("Concrete stage produced a non-concrete statement")?;
            }
            current = next;
        }

        let (mut splits_applied, mut splits_skipped) = (0, 0);
        if self.config.apply_schedules && target == Dialect::Concrete {
            let splits: Vec<_> = stmt
                .result_tensors()
                .iter()
                .flat_map(|tensor| tensor.schedule().operator_splits().to_vec())
                .collect();
            if !splits.is_empty() {
                let next = self.run_stage(LoweringStage::Schedule, &current, &mut stages, |s| {
                    let mut scheduled = s.clone();
                    for split in &splits {
                        let result = split_operator(&scheduled, split);
                        if result.ptr_eq(&scheduled) {
                            tracing::warn!(split = %split, "operator split did not apply");
                            splits_skipped += 1;
                        } else {
                            splits_applied += 1;
                        }
                        scheduled = result;
                    }
                    Ok(scheduled)
                })?;
                if self.config.verify_stages {
                    check_concrete_notation(&next)
                        .context("Schedule stage produced a non-concrete statement")?;
                }
                current = next;
            }
        }

        let output = classify(&current).unwrap_or(target);
        let report = LoweringReport {
            input_dialect: input,
            output_dialect: output,
            stages,
            splits_applied,
            splits_skipped,
            output_stats: StmtStats::compute(&current),
        };
        tracing::info!(stmt = %current, output = %output, "lowered statement");
        Ok((current, report))
    }

    fn run_stage<F>(
        &self,
        stage: LoweringStage,
        stmt: &IndexStmt,
        stages: &mut Vec<StageReport>,
        run: F,
    ) -> Result<IndexStmt>
    where
        F: FnOnce(&IndexStmt) -> Result<IndexStmt>,
    {
        let _span = tracing::info_span!("stage", stage = %stage).entered();
        let next = run(stmt)?;
        let report = StageReport {
            stage,
            nodes_before: stmt.node_count(),
            nodes_after: next.node_count(),
            changed: !next.ptr_eq(stmt),
        };
        tracing::debug!(
            nodes_before = report.nodes_before,
            nodes_after = report.nodes_after,
            changed = report.changed,
            "stage finished"
        );
        stages.push(report);
        Ok(next)
    }
}
