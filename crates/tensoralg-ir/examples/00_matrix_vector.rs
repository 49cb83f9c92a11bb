//! Matrix-Vector Lowering
//!
//! This example builds `a(i) = B(i,j) * c(j)` in einsum notation and lowers
//! it through reduction notation to an explicit loop nest.

use tensoralg_ir::{
    check_concrete_notation, classify, make_reduction_notation, pretty_print_stmt,
    try_make_concrete_notation, Datatype, IndexExpr, IndexStmt, IndexVar, IrError, StmtStats,
    TensorVar, Type,
};

fn main() -> Result<(), IrError> {
    println!("=== TensorAlg IR: Matrix-Vector Lowering ===\n");

    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let a = TensorVar::new("a", Type::fixed(Datatype::Float64, &[3]));
    let b = TensorVar::new("B", Type::fixed(Datatype::Float64, &[3, 4]));
    let c = TensorVar::new("c", Type::fixed(Datatype::Float64, &[4]));

    // 1. Einsum notation
    let einsum: IndexStmt = a
        .assign([&i], IndexExpr::mul(b.access([&i, &j]), c.access([&j])))
        .into();
    println!("1. Einsum:    {}  ({:?})", einsum, classify(&einsum));

    // 2. Reduction notation
    let reduction = make_reduction_notation(&einsum);
    println!("2. Reduction: {}  ({:?})", reduction, classify(&reduction));

    // 3. Concrete notation
    let concrete = try_make_concrete_notation(&reduction)?;
    check_concrete_notation(&concrete)?;
    println!("3. Concrete:  {}\n", concrete);
    print!("{}", pretty_print_stmt(&concrete));

    let stats = StmtStats::compute(&concrete);
    println!("\nLoops: {}, depth: {}", stats.forall_count, stats.max_loop_depth);

    // The tensor keeps its definition alive until it is taken back.
    a.take_assignment();
    Ok(())
}
