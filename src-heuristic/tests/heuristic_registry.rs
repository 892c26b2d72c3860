use ndarray::Array1;
use serde_json::{json, Value};
use swarmkit_heuristic::{HeuristicError, Registry, Result, SaConfig, Solver};
use swarmkit_testfunctions::{get_function_metadata, sphere};

fn hot_sa(_params: &Value) -> Result<Box<dyn Solver>> {
    Ok(Box::new(SaConfig {
        temperature: 50.0,
        ..SaConfig::default()
    }))
}

#[test]
fn test_create_from_json_and_solve() {
    let registry = Registry::with_builtins();
    let params = json!({ "group_size": 25, "max_iter": 120, "seed": 42 });
    let solver = registry.create("pso", &params).unwrap();
    assert_eq!(solver.name(), "pso");

    let bounds = get_function_metadata()["sphere"].bounds_for(2);
    let objective = |x: &Array1<f64>| -sphere(x);
    let report = solver.solve(&objective, &bounds).unwrap();
    assert_eq!(report.nit, 120);
    assert_eq!(report.nfev, 25 * 120);
    assert_eq!(report.trajectory.len(), 120);
}

#[test]
fn test_report_serializes_to_json() {
    let registry = Registry::with_builtins();
    let solver = registry
        .create("es", &json!({ "max_iter": 15, "seed": 3 }))
        .unwrap();
    let bounds = vec![(-1.0, 1.0); 3];
    let objective = |x: &Array1<f64>| -sphere(x);
    let report = solver.solve(&objective, &bounds).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    for key in ["solver", "x", "fitness", "nit", "nfev", "trajectory"] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(value["solver"], "es");
    assert_eq!(value["nit"], 15);
}

#[test]
fn test_missing_fields_use_defaults() {
    let registry = Registry::with_builtins();
    for name in ["pso", "es", "gaussian_es", "afs", "sa"] {
        assert!(registry.create(name, &Value::Null).is_ok(), "{}", name);
        assert!(registry.create(name, &json!({})).is_ok(), "{}", name);
    }
}

#[test]
fn test_bad_parameters_are_rejected() {
    let registry = Registry::with_builtins();
    assert!(matches!(
        registry.create("gaussian_es", &json!({ "mu": 10, "la": 10 })),
        Err(HeuristicError::InvalidConfig(_))
    ));
    assert!(matches!(
        registry.create("sa", &json!({ "temperature": "hot" })),
        Err(HeuristicError::Json(_))
    ));
    assert!(matches!(
        registry.create("tabu", &json!({})),
        Err(HeuristicError::UnknownSolver(name)) if name == "tabu"
    ));
}

#[test]
fn test_register_custom_solver() {
    let mut registry = Registry::with_builtins();
    registry.register("hot_sa", hot_sa).unwrap();
    assert!(registry.contains("hot_sa"));
    assert!(matches!(
        registry.register("hot_sa", hot_sa),
        Err(HeuristicError::DuplicateRegistration(_))
    ));
    assert!(matches!(
        registry.register("pso", hot_sa),
        Err(HeuristicError::DuplicateRegistration(_))
    ));
    assert_eq!(
        registry.names(),
        vec!["afs", "es", "gaussian_es", "hot_sa", "pso", "sa"]
    );
    // the factory decides the reported name
    let solver = registry.create("hot_sa", &Value::Null).unwrap();
    assert_eq!(solver.name(), "sa");
}
