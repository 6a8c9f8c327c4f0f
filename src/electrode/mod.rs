// electrode/mod.rs
// Material records and the electrode/cell-stack assemblies built from them
//
// This module handles:
// - Active material records and chemistry presets
// - Current collectors, separators and electrolytes
// - Electrodes (composite + current collector) and the cell stack

pub mod components;
pub mod material;
pub mod stack;

#[cfg(test)]
mod tests;

pub use components::*;
pub use material::*;
pub use stack::*;
