// lib.rs
// Battery cell design: composite completion, cell roll-up and reporting

pub mod cell;
pub mod composite;
pub mod config;
pub mod design;
pub mod doe;
pub mod electrode;
pub mod error;
pub mod profiler;
pub mod quantity;
pub mod report;
pub mod units;

#[cfg(test)]
mod fixtures;

pub use cell::{compute_cylindrical_cell, compute_pouch_cell, compute_single_layer_pouch_cell, Cell, CellFormat};
pub use composite::{complete_composite, complete_composite_with, Composite, CompositeField, CompositeFields};
pub use config::CompletionSettings;
pub use design::Design;
pub use electrode::{make_cell_stack, make_electrode, CellStack, Electrode};
pub use error::{CellError, CellResult};
pub use quantity::Quantity;
pub use units::Unit;

#[cfg(feature = "profiling")]
use once_cell::sync::Lazy;
#[cfg(feature = "profiling")]
use parking_lot::Mutex;

#[cfg(feature = "profiling")]
pub static PROFILER: Lazy<Mutex<profiler::Profiler>> =
    Lazy::new(|| Mutex::new(profiler::Profiler::new()));
