/// DOE runner for evaluating every case of a study against a base design
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use super::config::{DoeCase, DoeConfig};
use super::export::export_summary;
use crate::design::Design;
use crate::error::{CellError, CellResult};
use crate::report::{export_report, CellReport, ExportFormat};

/// Outcome of one case. Failures are kept so the rest of the study still runs.
#[derive(Debug)]
pub struct CaseResult {
    pub case: DoeCase,
    pub outcome: CellResult<CellReport>,
}

impl CaseResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct DoeRunner {
    config: DoeConfig,
    base: Design,
    output_dir: PathBuf,
}

impl DoeRunner {
    /// Loads the base design named in `config`, resolved relative to
    /// `config_dir` when it is not absolute.
    pub fn new(config: DoeConfig, config_dir: &Path, output_dir: impl Into<PathBuf>) -> CellResult<Self> {
        let base_path = config_dir.join(&config.base_design);
        let base = Design::load_from_file(&base_path)?;
        Ok(Self::with_base(config, base, output_dir))
    }

    pub fn with_base(config: DoeConfig, base: Design, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base,
            output_dir: output_dir.into(),
        }
    }

    pub fn cases(&self) -> Vec<DoeCase> {
        self.config.generate_cases()
    }

    fn evaluate(&self, case: &DoeCase) -> CaseResult {
        let outcome = self
            .config
            .design_for(&self.base, case)
            .and_then(|design| design.build())
            .and_then(|cell| CellReport::from_cell(&cell));
        match &outcome {
            Ok(report) => info!(
                "{} ({}): {:.1} Wh/kg",
                case.case_id,
                case.label(),
                report.gravimetric_energy.nominal()
            ),
            Err(e) => warn!("{} ({}) failed: {}", case.case_id, case.label(), e),
        }
        CaseResult {
            case: case.clone(),
            outcome,
        }
    }

    /// Run a specific test case by ID and write its full report
    pub fn run_case(&self, case_id: &str) -> CellResult<CaseResult> {
        let case = self
            .cases()
            .into_iter()
            .find(|c| c.case_id == case_id)
            .ok_or_else(|| CellError::Config(format!("Case ID '{}' not found", case_id)))?;

        let result = self.evaluate(&case);
        if let Ok(report) = &result.outcome {
            export_report(report, ExportFormat::JSON, &self.output_dir)?;
        }
        Ok(result)
    }

    /// Evaluate every case in parallel and export the summary table
    pub fn run_all(&self) -> CellResult<Vec<CaseResult>> {
        let cases = self.cases();
        info!("running {} case(s) of '{}'", cases.len(), self.config.study_name);

        let results: Vec<CaseResult> = cases.par_iter().map(|case| self.evaluate(case)).collect();

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        let path = export_summary(&self.config, &results, &self.output_dir)?;
        info!(
            "study '{}' finished: {} ok, {} failed, summary in {}",
            self.config.study_name,
            results.len() - failed,
            failed,
            path.display()
        );
        Ok(results)
    }

    /// List all generated test cases
    pub fn list_cases(&self) {
        let cases = self.cases();
        println!("\nDOE Study: {}", self.config.study_name);
        println!("Base design: {}", self.config.base_design);
        println!("Total cases: {}\n", cases.len());

        for case in &cases {
            println!("  {}  {}", case.case_id, case.label());
        }
        println!();
    }
}
