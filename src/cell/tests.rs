// cell/tests.rs

use std::f64::consts::PI;

use super::*;
use crate::electrode::MaterialType;
use crate::fixtures::{self, assert_close, q};

fn formation() -> FormationFactors {
    FormationFactors::new(q(1.8, "mL/Ah"))
}

fn pouch_geometry() -> PouchGeometry {
    PouchGeometry {
        width: q(10.0, "cm"),
        height: q(20.0, "cm"),
        layers: 10,
        pouch_thickness: q(150.0, "um"),
        pouch_density: q(1.5, "g/cm^3"),
        clearance: q(1.0, "mm"),
        tab_height: q(1.0, "cm"),
        tab_width: q(2.0, "cm"),
        tab_thickness: q(100.0, "um"),
        tab_location: TabLocation::Top,
        positive_tab_density: q(2.7, "g/cm^3"),
        negative_tab_density: q(8.9, "g/cm^3"),
        extra_mass: q(1.0, "g"),
    }
}

fn cylinder_18650() -> CylindricalGeometry {
    CylindricalGeometry {
        diameter: q(18.0, "mm"),
        height: q(65.0, "mm"),
        can_thickness: q(250.0, "um"),
        can_density: q(7.9, "g/cm^3"),
        mandrel_diameter: q(2.0, "mm"),
        headspace: q(5.0, "mm"),
        extra_mass: q(2.0, "g"),
    }
}

fn grams(q: &Quantity) -> f64 {
    q.value_in(&units::grams()).unwrap()
}

#[test]
fn pouch_capacity_and_energy() {
    let cell = compute_pouch_cell(&fixtures::stack(), &pouch_geometry(), &formation()).unwrap();
    assert_eq!(cell.format, CellFormat::PouchStacked);
    assert_close(cell.area.nominal(), 2000.0, 1e-12);
    // limited by the positive: 3.0 mAh/cm² × 0.95 × 2 sides × 2000 cm²
    assert_close(cell.capacity.value_in(&units::ampere_hours()).unwrap(), 11.4, 1e-9);
    let volts = MaterialType::NMC.average_voltage() - MaterialType::Graphite.average_voltage();
    assert_close(cell.energy.value_in(&units::watt_hours()).unwrap(), 11.4 * volts, 1e-9);
    assert_close(cell.np_ratio, 1.1, 1e-12);
}

#[test]
fn pouch_component_masses() {
    let cell = compute_pouch_cell(&fixtures::stack(), &pouch_geometry(), &formation()).unwrap();
    let m = &cell.mass;
    assert_close(grams(&m.positive), 4000.0 * 3.0 / 200.0, 1e-9);
    assert_close(grams(&m.negative), 4000.0 * 3.3 / 350.0, 1e-9);
    assert_close(grams(&m.positive_cc), 2000.0 * 15e-4 * 2.7, 1e-9);
    assert_close(grams(&m.negative_cc), 2000.0 * 10e-4 * 8.96, 1e-9);
    assert_close(grams(&m.separator), 2000.0 * 2.0 * 12e-4 * 0.95, 1e-9);
    assert_close(grams(&m.electrolyte), 1.8 * 11.4 * 1.191, 1e-9);

    let pouch = 1.5 * 0.015 * 10.1 * 20.1 * 2.0;
    let tabs = 1.1 * 2.0 * 0.01 * (2.7 + 8.9);
    assert_close(grams(&m.case), pouch + tabs + 1.0, 1e-9);

    let parts: f64 = m.components().iter().map(|(_, v)| grams(v)).sum();
    assert_close(grams(&m.total), parts, 1e-12);
    assert_close(grams(&m.total), grams(&m.case) + grams(&m.jellyroll), 1e-12);
}

#[test]
fn pouch_depth_and_volume() {
    let stack = fixtures::stack();
    let cell = compute_pouch_cell(&stack, &pouch_geometry(), &formation()).unwrap();
    let repeat_cm = cell.stack_thickness.value_in(&units::centimeters()).unwrap();
    let depth = 10.0 * repeat_cm + 2.0 * 0.015;
    assert_close(cell.depth.as_ref().unwrap().value_in(&units::centimeters()).unwrap(), depth, 1e-9);
    let volume = 10.1 * 20.1 * depth + 1.1 * 2.0 * 0.01 * 2.0;
    assert_close(cell.volume.value_in(&units::cubic_centimeters()).unwrap(), volume, 1e-9);
}

#[test]
fn single_layer_pouch_halves_coating() {
    let stack = fixtures::stack();
    let double = compute_pouch_cell(&stack, &pouch_geometry(), &formation()).unwrap();
    let single = compute_single_layer_pouch_cell(&stack, &pouch_geometry(), &formation()).unwrap();
    assert_eq!(single.format, CellFormat::PouchSingleLayer);
    assert_close(single.capacity.nominal(), double.capacity.nominal() / 2.0, 1e-12);
    assert_close(grams(&single.mass.positive), grams(&double.mass.positive) / 2.0, 1e-12);
    assert_close(grams(&single.mass.separator), grams(&double.mass.separator) / 2.0, 1e-12);
    assert_eq!(single.mass.positive_cc, double.mass.positive_cc);
    assert!(single.stack_thickness.nominal() < double.stack_thickness.nominal());
}

#[test]
fn tab_location_changes_outline_only() {
    let top = pouch_geometry();
    let sides = PouchGeometry {
        tab_location: TabLocation::Sides,
        ..pouch_geometry()
    };
    let (w_top, h_top) = top.outline().unwrap();
    let (w_sides, h_sides) = sides.outline().unwrap();
    assert_close(w_top.nominal(), 10.1, 1e-12);
    assert_close(h_top.nominal(), 21.1, 1e-12);
    assert_close(w_sides.nominal(), 12.1, 1e-12);
    assert_close(h_sides.nominal(), 20.1, 1e-12);

    let stack = fixtures::stack();
    let a = compute_pouch_cell(&stack, &top, &formation()).unwrap();
    let b = compute_pouch_cell(&stack, &sides, &formation()).unwrap();
    assert_eq!(a.volume, b.volume);
    assert_eq!(a.mass.total, b.mass.total);
}

#[test]
fn zero_layers_rejected() {
    let geometry = PouchGeometry {
        layers: 0,
        ..pouch_geometry()
    };
    let err = compute_pouch_cell(&fixtures::stack(), &geometry, &formation()).unwrap_err();
    assert!(matches!(err, CellError::InvalidValue { field: "layers", .. }));
}

#[test]
fn cylindrical_winding_matches_annulus_estimate() {
    let stack = fixtures::stack();
    let geometry = cylinder_18650();
    let repeat = stack.repeat_thickness(CoatingSides::Double).unwrap();
    let s = repeat.value_in(&units::centimeters()).unwrap();
    let length = geometry.winding_length(&repeat).unwrap();

    // Spiral length ≈ π(R² − r²)/pitch when many turns are wound.
    let r_outer = (1.8 - 2.0 * 0.025) / 2.0;
    let r_inner = 0.1;
    let estimate = PI * (r_outer * r_outer - r_inner * r_inner) / s;
    assert_close(length.value_in(&units::centimeters()).unwrap(), estimate, 1e-2);
}

#[test]
fn cylindrical_cell_roll_up() {
    let stack = fixtures::stack();
    let geometry = cylinder_18650();
    let cell = compute_cylindrical_cell(&stack, &geometry, &formation()).unwrap();
    assert_eq!(cell.format, CellFormat::Cylindrical);
    assert!(cell.depth.is_none());

    let winding_height = 6.5 - 0.5 - 0.05;
    let repeat = stack.repeat_thickness(CoatingSides::Double).unwrap();
    let length = geometry.winding_length(&repeat).unwrap().value_in(&units::centimeters()).unwrap();
    assert_close(cell.area.nominal(), winding_height * length, 1e-9);
    assert_close(cell.capacity.nominal(), 3.0e-3 * 0.95 * 2.0 * cell.area.nominal(), 1e-9);

    let can = 7.9 * 0.025 * (PI * 1.8 * 6.5 + 2.0 * PI * 0.81) + 2.0;
    assert_close(grams(&cell.mass.case), can, 1e-9);
    assert_close(cell.volume.value_in(&units::cubic_centimeters()).unwrap(), PI * 0.81 * 6.5, 1e-9);
}

#[test]
fn mandrel_wider_than_can_rejected() {
    let geometry = CylindricalGeometry {
        mandrel_diameter: q(20.0, "mm"),
        ..cylinder_18650()
    };
    let err = compute_cylindrical_cell(&fixtures::stack(), &geometry, &formation()).unwrap_err();
    assert!(matches!(err, CellError::InvalidValue { field: "mandrel_diameter", .. }));
}

#[test]
fn formation_factor_validated() {
    let bad = FormationFactors {
        loss_factor: 1.2,
        ..formation()
    };
    let err = compute_pouch_cell(&fixtures::stack(), &pouch_geometry(), &bad).unwrap_err();
    assert!(matches!(err, CellError::InvalidValue { field: "loss_factor", .. }));

    let wrong_units = FormationFactors::new(q(1.8, "mL/g"));
    let err = compute_pouch_cell(&fixtures::stack(), &pouch_geometry(), &wrong_units).unwrap_err();
    assert!(matches!(err, CellError::IncompatibleUnits { .. }));
}

#[test]
fn mass_fractions_sum_to_one_hundred() {
    let cell = compute_pouch_cell(&fixtures::stack(), &pouch_geometry(), &formation()).unwrap();
    let total: f64 = cell.mass.fractions().iter().map(|(_, p)| p).sum();
    assert_close(total, 100.0, 1e-9);
    let map = cell.mass.as_map();
    assert_eq!(map.len(), 9);
    assert!(map.contains_key("jellyroll"));
}

#[test]
fn uncertainty_flows_into_capacity() {
    let mut spec = fixtures::stack_spec();
    if let Some(positive) = spec.positive.as_mut() {
        positive.composite.areal_capacity = Some(Quantity::with_uncertainty(3.0, 0.1, units::milliamp_hours_per_square_centimeter()));
    }
    let stack = spec.build(&crate::config::CompletionSettings::default()).unwrap();
    let cell = compute_pouch_cell(&stack, &pouch_geometry(), &formation()).unwrap();
    assert_close(cell.capacity.relative_uncertainty(), 0.1 / 3.0, 1e-9);
}
