/// Export DOE results to CSV format for spreadsheet analysis
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::config::DoeConfig;
use super::runner::CaseResult;
use crate::error::CellResult;

const METRIC_COLUMNS: [&str; 8] = [
    "energy_Wh",
    "capacity_Ah",
    "mass_g",
    "volume_cm3",
    "gravimetric_Wh_per_kg",
    "volumetric_Wh_per_L",
    "np_ratio",
    "stack_thickness_um",
];

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write one row per case: swept values, headline metrics, and the error
/// message for failed cases.
pub fn export_summary(config: &DoeConfig, results: &[CaseResult], output_dir: &Path) -> CellResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let filename = format!("{}_summary.csv", config.study_name.replace(' ', "_"));
    let path = output_dir.join(filename);
    let mut file = File::create(&path)?;

    // Header
    write!(file, "case_id")?;
    for sweep in &config.parameters {
        write!(file, ",{}", csv_field(&sweep.parameter.to_string()))?;
    }
    for column in METRIC_COLUMNS {
        write!(file, ",{}", column)?;
    }
    writeln!(file, ",error")?;

    // Rows
    for result in results {
        write!(file, "{}", result.case.case_id)?;
        for (_, value) in &result.case.assignments {
            write!(file, ",{}", csv_field(&value.to_string()))?;
        }
        match &result.outcome {
            Ok(report) => {
                let metrics = [
                    report.energy.nominal(),
                    report.capacity.nominal(),
                    report.mass.nominal(),
                    report.volume.nominal(),
                    report.gravimetric_energy.nominal(),
                    report.volumetric_energy.nominal(),
                    report.np_ratio,
                    report.stack_thickness.nominal(),
                ];
                for m in metrics {
                    write!(file, ",{:.6}", m)?;
                }
                writeln!(file, ",")?;
            }
            Err(e) => {
                for _ in METRIC_COLUMNS {
                    write!(file, ",")?;
                }
                writeln!(file, ",{}", csv_field(&e.to_string()))?;
            }
        }
    }

    Ok(path)
}
