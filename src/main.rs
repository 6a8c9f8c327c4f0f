/// Evaluate a single cell design file and print its summary
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use cell_design::report::{export_report, CellReport, ExportFormat};
use cell_design::{CellResult, Design};

struct Options {
    design: PathBuf,
    export: Option<ExportFormat>,
    output_dir: PathBuf,
    breakdown: bool,
}

fn print_usage() {
    println!("Usage: cell_design <design.toml> [options]\n");
    println!("Options:");
    println!("  --export <csv|json|tsv>   Write the report to a file");
    println!("  --out <dir>               Output directory for exports (default: reports)");
    println!("  --breakdown               Print thickness and mass breakdowns\n");
    println!("Logging is controlled with RUST_LOG (default: info).");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut design = None;
    let mut export = None;
    let mut output_dir = PathBuf::from("reports");
    let mut breakdown = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--export" => {
                let value = iter.next().ok_or("--export needs a format")?;
                export = Some(
                    ExportFormat::from_extension(value)
                        .ok_or_else(|| format!("unknown export format '{}'", value))?,
                );
            }
            "--out" => {
                output_dir = PathBuf::from(iter.next().ok_or("--out needs a directory")?);
            }
            "--breakdown" => breakdown = true,
            other if other.starts_with("--") => return Err(format!("unknown option '{}'", other)),
            other => design = Some(PathBuf::from(other)),
        }
    }

    Ok(Options {
        design: design.ok_or("no design file given")?,
        export,
        output_dir,
        breakdown,
    })
}

fn run(options: &Options) -> CellResult<()> {
    let design = Design::load_from_file(&options.design)?;
    let cell = design.build()?;
    let report = CellReport::from_cell(&cell)?;

    println!("\n{}\n", report);

    if options.breakdown {
        println!("Stack repeat ({:.1}):", report.stack_thickness);
        for entry in &report.thickness_breakdown {
            println!("  {:<28} {:>8.2} um", entry.label, entry.value);
        }
        println!("\nMass fractions:");
        for entry in &report.mass_fractions {
            println!("  {:<28} {:>8.2} %", entry.label, entry.value);
        }
        println!();
    }

    if let Some(format) = options.export {
        let path = export_report(&report, format, &options.output_dir)?;
        println!("Report written to {}", path.display());
    }

    #[cfg(feature = "profiling")]
    cell_design::PROFILER.lock().log_and_clear();

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            println!("Error: {}\n", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
