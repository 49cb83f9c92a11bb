//! End-to-end integration tests for tensoralg-compiler.
//!
//! These tests load configurations from disk and run complete lowerings
//! from einsum notation to scheduled concrete notation.

use std::fs;

use tensoralg_compiler::{lower_with_config, LogFormat, LogLevel, LoweringConfig, LoweringStage};
use tensoralg_ir::{
    is_concrete_notation, Datatype, Dialect, IndexExpr, IndexStmt, IndexVar, OperatorSplit,
    TensorVar, Type,
};

fn tensor(name: &str, sizes: &[usize]) -> TensorVar {
    TensorVar::new(name, Type::fixed(Datatype::Float64, sizes))
}

#[test]
fn test_load_toml_config_and_lower() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tensoralg.toml");
    fs::write(
        &path,
        r#"
        target = "reduction"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = LoweringConfig::load(&path).unwrap();
    assert_eq!(config.target, Dialect::Reduction);
    assert_eq!(config.logging.level, LogLevel::Debug);

    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let a = tensor("a", &[3]);
    let b = tensor("B", &[3, 4]);
    let stmt: IndexStmt = a.access([&i]).assign(b.access([&i, &j])).into();

    let (lowered, report) = lower_with_config(&stmt, &config).unwrap();
    assert_eq!(lowered.to_string(), "a(i) = sum(j, B(i,j))");
    assert_eq!(report.output_dialect, Dialect::Reduction);
}

#[test]
fn test_load_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lowering.json");
    fs::write(
        &path,
        r#"{"workspace_prefix": "acc_", "logging": {"format": "json", "filter": "tensoralg_ir=trace"}}"#,
    )
    .unwrap();

    let config = LoweringConfig::load(&path).unwrap();
    assert_eq!(config.workspace_prefix, "acc_");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.filter.as_deref(), Some("tensoralg_ir=trace"));
    assert_eq!(config.target, Dialect::Concrete);
}

#[test]
fn test_save_and_reload_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoweringConfig::unchecked()
        .with_target(Dialect::Reduction)
        .with_workspace_prefix("w_");

    for name in ["saved.toml", "saved.json"] {
        let path = dir.path().join(name);
        config.save(&path).unwrap();
        assert_eq!(LoweringConfig::load(&path).unwrap(), config);
    }
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LoweringConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "target = ").unwrap();

    let err = LoweringConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to load config file"));
}

#[test]
fn test_mttkrp_with_scheduled_split() {
    let (i, j) = (IndexVar::new("i"), IndexVar::new("j"));
    let (k, l) = (IndexVar::new("k"), IndexVar::new("l"));
    let a = tensor("A", &[2, 3]);
    let b = tensor("B", &[2, 4, 5]);
    let c = tensor("C", &[4, 3]);
    let d = tensor("D", &[5, 3]);

    let bc = IndexExpr::mul(b.access([&i, &k, &l]), c.access([&k, &j]));
    let rhs = IndexExpr::mul(bc.clone(), d.access([&l, &j]));
    let stmt: IndexStmt = a.access([&i, &j]).assign(rhs).into();

    let (l1, l2) = (IndexVar::new("l1"), IndexVar::new("l2"));
    let product = IndexExpr::mul(bc, d.access([&l, &j]));
    a.add_operator_split(OperatorSplit::new(product, l.clone(), l1, l2).with_workspace_name("W"));

    let (lowered, report) = lower_with_config(&stmt, &LoweringConfig::default()).unwrap();

    assert!(is_concrete_notation(&lowered));
    assert_eq!(report.input_dialect, Dialect::Einsum);
    assert_eq!(report.splits_applied, 1);
    assert_eq!(
        report
            .stages
            .iter()
            .map(|stage| stage.stage)
            .collect::<Vec<_>>(),
        vec![
            LoweringStage::Reduction,
            LoweringStage::Concrete,
            LoweringStage::Schedule
        ]
    );
    assert!(!lowered.index_vars().contains(&l));
    assert_eq!(report.output_stats.where_count, 1);
}
