//! Performance benchmarks for TensorAlg IR construction, classification and lowering
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tensoralg_ir::{
    classify, make_concrete_notation, make_reduction_notation, split_operator, Datatype,
    IndexExpr, IndexStmt, IndexVar, OperatorSplit, TensorVar, Type,
};

fn tensor(name: &str, sizes: &[usize]) -> TensorVar {
    TensorVar::new(name, Type::fixed(Datatype::Float64, sizes))
}

fn matvec() -> IndexStmt {
    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let a = tensor("a", &[64]);
    let b = tensor("B", &[64, 32]);
    let c = tensor("c", &[32]);
    a.access([&i])
        .assign(IndexExpr::mul(b.access([&i, &j]), c.access([&j])))
        .into()
}

fn mttkrp() -> IndexStmt {
    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let (k, l) = (IndexVar::new("k"), IndexVar::new("l"));
    let a = tensor("A", &[16, 8]);
    let b = tensor("B", &[16, 12, 10]);
    let c = tensor("C", &[12, 8]);
    let d = tensor("D", &[10, 8]);
    let rhs = IndexExpr::mul(
        IndexExpr::mul(b.access([&i, &k, &l]), c.access([&k, &j])),
        d.access([&l, &j]),
    );
    a.access([&i, &j]).assign(rhs).into()
}

/// `a(i) = B0(i,j0)*c0(j0) + B1(i,j1)*c1(j1) + ...` with `terms` terms.
fn sum_of_products(terms: usize) -> IndexStmt {
    let i = IndexVar::new("i");
    let a = tensor("a", &[8]);
    let rhs = (0..terms)
        .map(|n| {
            let j = IndexVar::new(format!("j{}", n));
            let b = tensor(&format!("B{}", n), &[8, 4]);
            let c = tensor(&format!("c{}", n), &[4]);
            IndexExpr::mul(b.access([&i, &j]), c.access([&j]))
        })
        .reduce(|acc, term| IndexExpr::add(acc, term))
        .unwrap_or_else(|| IndexExpr::literal(0.0));
    a.access([&i]).assign(rhs).into()
}

// ===== Construction Benchmarks =====

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("matvec", |b| b.iter(|| black_box(matvec())));
    group.bench_function("mttkrp", |b| b.iter(|| black_box(mttkrp())));

    group.finish();
}

// ===== Classification Benchmarks =====

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    let einsum = mttkrp();
    let concrete = make_concrete_notation(&einsum);

    group.bench_function("classify_einsum", |b| {
        b.iter(|| classify(black_box(&einsum)))
    });
    group.bench_function("classify_concrete", |b| {
        b.iter(|| classify(black_box(&concrete)))
    });

    group.finish();
}

// ===== Lowering Benchmarks =====

fn bench_lowering(c: &mut Criterion) {
    let mut group = c.benchmark_group("lowering");

    for terms in [1, 4, 16, 64] {
        let stmt = sum_of_products(terms);
        group.throughput(Throughput::Elements(terms as u64));

        group.bench_with_input(BenchmarkId::new("reduction", terms), &stmt, |b, stmt| {
            b.iter(|| make_reduction_notation(black_box(stmt)))
        });
        group.bench_with_input(BenchmarkId::new("concrete", terms), &stmt, |b, stmt| {
            b.iter(|| make_concrete_notation(black_box(stmt)))
        });
    }

    group.finish();
}

// ===== Operator Split Benchmarks =====

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_operator");

    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let a = tensor("A", &[64, 64]);
    let b = tensor("B", &[64, 64]);
    let cc = tensor("C", &[64, 64]);
    let sum = IndexExpr::add(b.access([&i, &j]), cc.access([&i, &j]));
    let stmt = make_concrete_notation(&a.access([&i, &j]).assign(sum.clone()).into());
    let split = OperatorSplit::new(sum, j, IndexVar::new("j1"), IndexVar::new("j2"));

    group.bench_function("elementwise_add", |bench| {
        bench.iter(|| split_operator(black_box(&stmt), black_box(&split)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_classification,
    bench_lowering,
    bench_split
);
criterion_main!(benches);
