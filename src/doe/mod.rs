/// Design of Experiments (DOE) module for parametric cell-design studies
///
/// This module provides functionality to:
/// - Define swept design parameters on top of a base design file
/// - Generate the full factorial set of cases
/// - Evaluate cases in parallel, keeping failures per case
/// - Export a summary table for analysis

pub mod config;
pub mod export;
pub mod runner;

#[cfg(test)]
mod tests;

pub use config::{DesignParameter, DoeCase, DoeConfig, ElectrodeSide, SweepParameter};
pub use export::export_summary;
pub use runner::{CaseResult, DoeRunner};
