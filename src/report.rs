// report.rs
// Energy densities, text summary and tabular export of a computed cell

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::CellResult;
use crate::quantity::Quantity;
use crate::units;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    CSV,
    JSON,
    TSV,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::CSV => "csv",
            ExportFormat::JSON => "json",
            ExportFormat::TSV => "tsv",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::CSV),
            "json" => Some(ExportFormat::JSON),
            "tsv" => Some(ExportFormat::TSV),
            _ => None,
        }
    }
}

/// Energy per cell mass, Wh/kg.
pub fn gravimetric_energy(cell: &Cell) -> CellResult<Quantity> {
    (&cell.energy / &cell.mass.total).to(&units::watt_hours_per_kilogram())
}

/// Energy per cell volume, Wh/L.
pub fn volumetric_energy(cell: &Cell) -> CellResult<Quantity> {
    (&cell.energy / &cell.volume).to(&units::watt_hours_per_liter())
}

/// One labelled value of a breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub label: &'static str,
    pub value: f64,
}

/// Layers of one stack repeat in µm, in stacking order.
pub fn thickness_breakdown(cell: &Cell) -> CellResult<Vec<BreakdownEntry>> {
    Ok(cell
        .stack
        .layer_thicknesses(cell.format.coating())?
        .into_iter()
        .map(|(label, t)| BreakdownEntry {
            label,
            value: t.nominal(),
        })
        .collect())
}

/// Percent of the total mass per component.
pub fn mass_fractions(cell: &Cell) -> Vec<BreakdownEntry> {
    cell.mass
        .fractions()
        .into_iter()
        .map(|(label, value)| BreakdownEntry { label, value })
        .collect()
}

/// Everything worth printing or exporting about a cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellReport {
    pub name: String,
    pub format: String,
    /// Positive collector, positive active, separator, electrolyte,
    /// negative active, negative collector.
    pub layers: Vec<String>,
    pub gravimetric_energy: Quantity,
    pub volumetric_energy: Quantity,
    pub energy: Quantity,
    pub capacity: Quantity,
    pub mass: Quantity,
    pub volume: Quantity,
    pub average_voltage: Quantity,
    pub np_ratio: f64,
    pub stack_thickness: Quantity,
    pub thickness_breakdown: Vec<BreakdownEntry>,
    pub mass_fractions: Vec<BreakdownEntry>,
}

impl CellReport {
    pub fn from_cell(cell: &Cell) -> CellResult<Self> {
        let stack = &cell.stack;
        Ok(Self {
            name: cell.name.clone(),
            format: cell.format.to_string(),
            layers: vec![
                stack.positive.current_collector.name.clone(),
                stack.positive.composite.active().name().to_string(),
                stack.separator.name.clone(),
                stack.electrolyte.name.clone(),
                stack.negative.composite.active().name().to_string(),
                stack.negative.current_collector.name.clone(),
            ],
            gravimetric_energy: gravimetric_energy(cell)?,
            volumetric_energy: volumetric_energy(cell)?,
            energy: cell.energy.clone(),
            capacity: cell.capacity.clone(),
            mass: cell.mass.total.clone(),
            volume: cell.volume.clone(),
            average_voltage: cell.average_voltage.clone(),
            np_ratio: cell.np_ratio,
            stack_thickness: cell.stack_thickness.clone(),
            thickness_breakdown: thickness_breakdown(cell)?,
            mass_fractions: mass_fractions(cell),
        })
    }

    /// Headline metrics in display order.
    pub fn metrics(&self) -> Vec<(&'static str, &Quantity)> {
        vec![
            ("gravimetric_energy", &self.gravimetric_energy),
            ("volumetric_energy", &self.volumetric_energy),
            ("energy", &self.energy),
            ("capacity", &self.capacity),
            ("mass", &self.mass),
            ("volume", &self.volume),
            ("average_voltage", &self.average_voltage),
            ("stack_thickness", &self.stack_thickness),
        ]
    }
}

const RULE_HEAVY: &str = "============================================================";
const RULE_LIGHT: &str = "------------------------------------------------------------";

impl fmt::Display for CellReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}   ({})", self.name, self.format)?;
        writeln!(f, "{}", self.layers.join(" | "))?;
        writeln!(f, "{}", RULE_HEAVY)?;
        writeln!(f, "grav. energy dens.: {:.1}", self.gravimetric_energy)?;
        writeln!(f, "vol. energy dens.:  {:.1}", self.volumetric_energy)?;
        writeln!(f, "{}", RULE_LIGHT)?;
        writeln!(f, "cell energy:   {:.2}", self.energy)?;
        writeln!(f, "cell capacity: {:.3}", self.capacity)?;
        writeln!(f, "cell mass:     {:.2}", self.mass)?;
        write!(f, "np ratio:      {:.3}", self.np_ratio)
    }
}

fn export_delimited(report: &CellReport, sep: char) -> String {
    let mut content = String::new();

    content.push_str("# Cell Report Export\n");
    content.push_str(&format!("# Name: {}\n", report.name));
    content.push_str(&format!("# Format: {}\n", report.format));
    content.push_str(&format!("# Stack: {}\n", report.layers.join(" | ")));
    content.push('\n');

    content.push_str(&["Section", "Metric", "Value", "Uncertainty", "Unit"].join(&sep.to_string()));
    content.push('\n');
    let mut row = |section: &str, metric: &str, value: f64, sigma: f64, unit: &str| {
        content.push_str(&format!(
            "{section}{sep}{metric}{sep}{value}{sep}{sigma}{sep}{unit}\n"
        ));
    };

    for (metric, q) in report.metrics() {
        row("summary", metric, q.nominal(), q.uncertainty(), q.unit().symbol());
    }
    row("summary", "np_ratio", report.np_ratio, 0.0, "");
    for entry in &report.thickness_breakdown {
        row("thickness", entry.label, entry.value, 0.0, "um");
    }
    for entry in &report.mass_fractions {
        row("mass_fraction", entry.label, entry.value, 0.0, "%");
    }

    content
}

fn export_json(report: &CellReport) -> CellResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the report into `dir` and returns the file path.
pub fn export_report(report: &CellReport, format: ExportFormat, dir: &Path) -> CellResult<PathBuf> {
    let stem = if report.name.is_empty() { "cell" } else { report.name.as_str() };
    let filename = format!("report_{}.{}", stem.replace(' ', "_"), format.extension());

    let content = match format {
        ExportFormat::CSV => export_delimited(report, ','),
        ExportFormat::JSON => export_json(report)?,
        ExportFormat::TSV => export_delimited(report, '\t'),
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    info!("wrote {}", path.display());

    Ok(path)
}
