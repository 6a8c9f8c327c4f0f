// electrode/tests.rs

use super::*;
use crate::config::CompletionSettings;
use crate::error::CellError;
use crate::fixtures::{self, assert_close};
use crate::units;

fn um(q: &crate::quantity::Quantity) -> f64 {
    q.value_in(&units::micrometers()).unwrap()
}

#[test]
fn double_coated_repeat_thickness() {
    let stack = fixtures::stack();
    let tp = um(stack.positive.composite.thickness());
    let tn = um(stack.negative.composite.thickness());
    let expected = 2.0 * tp + 15.0 + 2.0 * tn + 10.0 + 2.0 * 12.0;
    let actual = stack.repeat_thickness(CoatingSides::Double).unwrap();
    assert_eq!(actual.unit(), &units::micrometers());
    assert_close(actual.nominal(), expected, 1e-12);
}

#[test]
fn single_coated_repeat_thickness() {
    let stack = fixtures::stack();
    let tp = um(stack.positive.composite.thickness());
    let tn = um(stack.negative.composite.thickness());
    let actual = stack.repeat_thickness(CoatingSides::Single).unwrap();
    assert_close(actual.nominal(), tp + 15.0 + tn + 10.0 + 12.0, 1e-12);
}

#[test]
fn layers_add_up_to_repeat_thickness() {
    let stack = fixtures::stack();
    for sides in [CoatingSides::Single, CoatingSides::Double] {
        let sum: f64 = stack
            .layer_thicknesses(sides)
            .unwrap()
            .iter()
            .map(|(_, t)| t.nominal())
            .sum();
        assert_close(sum, stack.repeat_thickness(sides).unwrap().nominal(), 1e-12);
    }
}

#[test]
fn np_ratio_is_negative_over_positive() {
    let stack = fixtures::stack();
    assert_close(stack.np_ratio().unwrap(), 1.1, 1e-12);
}

#[test]
fn average_voltage_is_the_difference() {
    let stack = fixtures::stack();
    let v = stack.average_voltage().unwrap();
    assert_close(v.nominal(), MaterialType::NMC.average_voltage() - MaterialType::Graphite.average_voltage(), 1e-12);
}

#[test]
fn missing_separator_is_reported() {
    let mut spec = fixtures::stack_spec();
    spec.separator = None;
    let err = spec.build(&CompletionSettings::default()).unwrap_err();
    assert!(matches!(err, CellError::MissingField { record: "cell stack", field: "separator" }));
}

#[test]
fn composite_errors_surface_through_the_stack() {
    let mut spec = fixtures::stack_spec();
    if let Some(negative) = spec.negative.as_mut() {
        negative.composite.areal_capacity = None;
    }
    let err = spec.build(&CompletionSettings::default()).unwrap_err();
    assert!(matches!(err, CellError::Underspecified { .. }));
}

#[test]
fn swapped_electrodes_still_assemble() {
    let settings = CompletionSettings::default();
    let positive = fixtures::nmc_positive().build(&settings).unwrap();
    let negative = fixtures::graphite_negative().build(&settings).unwrap();
    let separator = fixtures::separator().build().unwrap();
    let electrolyte = fixtures::electrolyte().build().unwrap();
    let stack = make_cell_stack(negative, positive, separator, electrolyte);
    assert!(stack.np_ratio().unwrap() < 1.0);
}
