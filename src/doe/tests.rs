use super::*;
use crate::composite::CompositeField;
use crate::design::Design;
use crate::error::CellError;
use crate::quantity::Quantity;

const BASE: &str = include_str!("../../designs/pouch_nmc_graphite.toml");
const CYLINDER: &str = include_str!("../../designs/cylindrical_21700.toml");
const SWEEP: &str = include_str!("../../designs/sweep_loading.toml");

fn base() -> Design {
    Design::from_toml_str(BASE).unwrap()
}

fn sweep() -> DoeConfig {
    toml::from_str(SWEEP).unwrap()
}

#[test]
fn parameter_paths_round_trip() {
    for path in [
        "positive.areal_capacity",
        "negative.thickness",
        "negative.active_fraction",
        "positive.current_collector.thickness",
        "separator.thickness",
        "electrolyte.concentration",
        "formation.electrolyte_ratio",
        "formation.loss_factor",
        "format.layers",
        "format.diameter",
    ] {
        let p: DesignParameter = path.parse().unwrap();
        assert_eq!(p.to_string(), path);
    }
    assert_eq!(
        "negative.porosity".parse::<DesignParameter>().unwrap(),
        DesignParameter::Composite {
            side: ElectrodeSide::Negative,
            field: CompositeField::Porosity
        }
    );
}

#[test]
fn unknown_parameter_rejected() {
    for bad in ["positive.colour", "separator", "format.depth", ""] {
        assert!(matches!(bad.parse::<DesignParameter>(), Err(CellError::Config(_))), "{}", bad);
    }
}

#[test]
fn full_factorial_cases() {
    let cases = sweep().generate_cases();
    assert_eq!(cases.len(), 9);
    assert_eq!(cases[0].case_id, "CASE001");
    assert_eq!(cases[8].case_id, "CASE009");
    // last parameter varies fastest
    assert_eq!(cases[0].assignments[1].1.nominal(), 16.0);
    assert_eq!(cases[1].assignments[1].1.nominal(), 20.0);
    assert_eq!(cases[3].assignments[0].1.nominal(), 3.5);
    assert!(cases[0].label().contains("format.layers=16"));
}

#[test]
fn no_parameters_gives_baseline() {
    let config = DoeConfig {
        study_name: "baseline".to_string(),
        base_design: "x.toml".to_string(),
        parameters: Vec::new(),
    };
    let cases = config.generate_cases();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].label(), "baseline");
}

#[test]
fn case_design_applies_assignments() {
    let config = sweep();
    let case = &config.generate_cases()[8];
    let design = config.design_for(&base(), case).unwrap();
    let positive = design.positive.as_ref().unwrap();
    assert_eq!(positive.composite.areal_capacity.as_ref().unwrap().nominal(), 4.0);
    match &design.format {
        crate::design::FormatSpec::Pouch(g) => assert_eq!(g.layers, 24),
        other => panic!("unexpected format {:?}", other),
    }
    assert!(design.name.ends_with("[CASE009]"));
}

#[test]
fn replaced_field_keeps_composite_determined() {
    let mut config = sweep();
    config.parameters = vec![SweepParameter {
        parameter: "positive.thickness".parse().unwrap(),
        values: vec![Quantity::parse(70.0, "um").unwrap()],
        replaces: None,
    }];
    let case = &config.generate_cases()[0];
    let overdetermined = config.design_for(&base(), case).unwrap();
    assert!(overdetermined.build().is_err());

    config.parameters[0].replaces = Some(CompositeField::ArealCapacity);
    let design = config.design_for(&base(), case).unwrap();
    let cell = design.build().unwrap();
    let t = cell.stack.positive.composite.thickness();
    assert_eq!(t.nominal(), 70.0);
}

#[test]
fn pouch_parameter_on_cylinder_is_a_config_error() {
    let cylinder = Design::from_toml_str(CYLINDER).unwrap();
    let mut design = cylinder.clone();
    let err = DesignParameter::Layers
        .apply(&mut design, &Quantity::dimensionless(10.0), None)
        .unwrap_err();
    assert!(matches!(err, CellError::Config(_)));
}

#[test]
fn fractional_layer_count_rejected() {
    let mut design = base();
    let err = DesignParameter::Layers
        .apply(&mut design, &Quantity::dimensionless(10.5), None)
        .unwrap_err();
    assert!(matches!(err, CellError::InvalidValue { field: "layers", .. }));
}

#[test]
fn run_all_keeps_failed_cases() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sweep();
    config.parameters[1].values.push(Quantity::dimensionless(0.0));

    let runner = DoeRunner::with_base(config, base(), dir.path());
    let results = runner.run_all().unwrap();
    assert_eq!(results.len(), 12);
    assert_eq!(results.iter().filter(|r| !r.is_ok()).count(), 3);

    // results come back in case order
    let ids: Vec<_> = results.iter().map(|r| r.case.case_id.clone()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    let summary = std::fs::read_to_string(dir.path().join("pouch_loading_sweep_summary.csv")).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines[0].starts_with("case_id,positive.areal_capacity,format.layers,energy_Wh"));
    assert!(lines.iter().any(|l| l.contains("is not a positive whole number")));
}

#[test]
fn more_layers_more_energy() {
    let runner = DoeRunner::with_base(sweep(), base(), std::env::temp_dir());
    let cases = runner.cases();
    let energy = |id: &str| {
        let case = cases.iter().find(|c| c.case_id == id).unwrap();
        let design = sweep().design_for(&base(), case).unwrap();
        design.build().unwrap().energy.nominal()
    };
    assert!(energy("CASE002") > energy("CASE001"));
    assert!(energy("CASE004") > energy("CASE001"));
}

#[test]
fn config_survives_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("study.toml");
    let path = path.to_str().unwrap();
    sweep().to_file(path).unwrap();
    let again = DoeConfig::from_file(path).unwrap();
    assert_eq!(again.generate_cases(), sweep().generate_cases());
}
