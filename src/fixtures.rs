// fixtures.rs
// Shared test fixtures: a graphite | NMC stack with typical foil and separator

use crate::composite::CompositeSpec;
use crate::config::CompletionSettings;
use crate::electrode::{
    ActiveMaterialSpec, CellStack, CellStackSpec, CurrentCollectorSpec, ElectrodeSpec, ElectrolyteSpec,
    MaterialType, SeparatorSpec,
};
use crate::quantity::Quantity;

pub fn q(value: f64, unit: &str) -> Quantity {
    Quantity::parse(value, unit).unwrap()
}

pub fn nmc_positive() -> ElectrodeSpec {
    ElectrodeSpec {
        composite: CompositeSpec {
            active: ActiveMaterialSpec {
                preset: Some(MaterialType::NMC),
                ..Default::default()
            },
            active_fraction: Some(0.95),
            porosity: Some(Quantity::dimensionless(0.3)),
            areal_capacity: Some(q(3.0, "mAh/cm^2")),
            ..Default::default()
        },
        current_collector: CurrentCollectorSpec {
            name: Some("Al".to_string()),
            thickness: Some(q(15.0, "um")),
            density: None,
        },
    }
}

pub fn graphite_negative() -> ElectrodeSpec {
    ElectrodeSpec {
        composite: CompositeSpec {
            active: ActiveMaterialSpec {
                preset: Some(MaterialType::Graphite),
                ..Default::default()
            },
            active_fraction: Some(0.95),
            porosity: Some(Quantity::dimensionless(0.3)),
            areal_capacity: Some(q(3.3, "mAh/cm^2")),
            ..Default::default()
        },
        current_collector: CurrentCollectorSpec {
            name: Some("Cu".to_string()),
            thickness: Some(q(10.0, "um")),
            density: None,
        },
    }
}

pub fn separator() -> SeparatorSpec {
    SeparatorSpec {
        name: Some("PE".to_string()),
        thickness: Some(q(12.0, "um")),
        porosity: Some(Quantity::dimensionless(0.4)),
        density: Some(q(0.95, "g/cm^3")),
    }
}

pub fn electrolyte() -> ElectrolyteSpec {
    ElectrolyteSpec {
        name: Some("1 M LiPF6 in EC:DMC".to_string()),
        concentration: Some(q(1.0, "M")),
    }
}

pub fn stack_spec() -> CellStackSpec {
    CellStackSpec {
        positive: Some(nmc_positive()),
        negative: Some(graphite_negative()),
        separator: Some(separator()),
        electrolyte: Some(electrolyte()),
    }
}

pub fn stack() -> CellStack {
    stack_spec().build(&CompletionSettings::default()).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, rel: f64) {
    let scale = expected.abs().max(f64::MIN_POSITIVE);
    assert!(
        ((actual - expected) / scale).abs() <= rel,
        "expected {} got {} (rel tol {})",
        expected,
        actual,
        rel
    );
}
