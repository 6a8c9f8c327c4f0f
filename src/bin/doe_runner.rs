/// CLI tool for running Design of Experiments (DOE) studies on cell designs
use cell_design::doe::{DoeConfig, DoeRunner, SweepParameter};
use cell_design::{CellResult, Quantity};
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "generate" => generate_doe_config(&args[2..]),
        "list" => list_cases(&args[2..]),
        "run" => run_case(&args[2..]),
        "run-all" => run_all_cases(&args[2..]),
        _ => {
            println!("Unknown command: {}", command);
            print_usage();
        }
    }
}

fn print_usage() {
    println!("\n╔══════════════════════════════════════════════════════════╗");
    println!("║     Cell Design DOE Runner - Design of Experiments       ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");
    println!("Usage: cargo run --release --features doe --bin doe_runner <command> [options]\n");
    println!("Commands:");
    println!("  generate    Generate a sample DOE configuration file");
    println!("  list        List all cases in a DOE configuration");
    println!("  run         Run a specific case and write its report");
    println!("  run-all     Run every case and write the summary table\n");
    println!("Examples:");
    println!("  # Generate a loading sweep on top of designs/pouch_nmc_graphite.toml");
    println!("  cargo run --features doe --bin doe_runner generate designs/my_study.toml\n");
    println!("  # List all cases");
    println!("  cargo run --features doe --bin doe_runner list designs/sweep_loading.toml\n");
    println!("  # Run specific case");
    println!("  cargo run --features doe --bin doe_runner run designs/sweep_loading.toml CASE004\n");
    println!("  # Run all cases");
    println!("  cargo run --features doe --bin doe_runner run-all designs/sweep_loading.toml\n");
}

fn sample_config() -> CellResult<DoeConfig> {
    let capacities = [3.0, 3.5, 4.0]
        .iter()
        .map(|&c| Quantity::parse(c, "mAh/cm^2"))
        .collect::<CellResult<Vec<_>>>()?;
    let layers = [16.0, 20.0, 24.0].iter().map(|&n| Quantity::dimensionless(n)).collect();

    Ok(DoeConfig {
        study_name: "pouch loading sweep".to_string(),
        base_design: "pouch_nmc_graphite.toml".to_string(),
        parameters: vec![
            SweepParameter {
                parameter: "positive.areal_capacity".parse()?,
                values: capacities,
                replaces: None,
            },
            SweepParameter {
                parameter: "format.layers".parse()?,
                values: layers,
                replaces: None,
            },
        ],
    })
}

fn generate_doe_config(args: &[String]) {
    if args.is_empty() {
        println!("❌ Error: Please specify output file name");
        println!("Usage: cargo run --features doe --bin doe_runner generate <output_file.toml>");
        return;
    }

    let output_file = &args[0];

    println!("\n🔧 Generating DOE configuration...\n");

    let result = sample_config().and_then(|config| {
        config.to_file(output_file)?;
        Ok(config)
    });

    match result {
        Ok(config) => {
            println!("✅ DOE configuration generated: {}", output_file);
            println!("📊 Total cases: {}", config.generate_cases().len());
            println!("   Base design '{}' is resolved next to the study file\n", config.base_design);
        }
        Err(e) => {
            println!("❌ Error generating config: {}", e);
        }
    }
}

fn config_dir(config_file: &str) -> &Path {
    Path::new(config_file).parent().unwrap_or_else(|| Path::new("."))
}

fn output_dir(config: &DoeConfig) -> PathBuf {
    PathBuf::from("doe_results").join(config.study_name.replace(' ', "_"))
}

fn load_runner(config_file: &str) -> CellResult<DoeRunner> {
    let config = DoeConfig::from_file(config_file)?;
    let output = output_dir(&config);
    DoeRunner::new(config, config_dir(config_file), output)
}

fn list_cases(args: &[String]) {
    if args.is_empty() {
        println!("❌ Error: Please specify DOE configuration file");
        println!("Usage: cargo run --features doe --bin doe_runner list <config_file.toml>");
        return;
    }

    match load_runner(&args[0]) {
        Ok(runner) => runner.list_cases(),
        Err(e) => {
            println!("❌ Error loading study: {}", e);
        }
    }
}

fn run_case(args: &[String]) {
    if args.len() < 2 {
        println!("❌ Error: Please specify config file and case ID");
        println!("Usage: cargo run --features doe --bin doe_runner run <config_file.toml> <case_id>");
        return;
    }

    let case_id = &args[1];

    match load_runner(&args[0]) {
        Ok(runner) => match runner.run_case(case_id) {
            Ok(result) => match result.outcome {
                Ok(report) => println!("\n{}\n\n✅ Case '{}' completed successfully!\n", report, case_id),
                Err(e) => println!("❌ Case '{}' failed: {}\n", case_id, e),
            },
            Err(e) => println!("❌ Error running case: {}\n", e),
        },
        Err(e) => {
            println!("❌ Error loading study: {}", e);
        }
    }
}

fn run_all_cases(args: &[String]) {
    if args.is_empty() {
        println!("❌ Error: Please specify DOE configuration file");
        println!("Usage: cargo run --features doe --bin doe_runner run-all <config_file.toml>");
        return;
    }

    match load_runner(&args[0]) {
        Ok(runner) => match runner.run_all() {
            Ok(results) => {
                let failed = results.iter().filter(|r| !r.is_ok()).count();
                println!("\n✅ {} case(s) evaluated, {} failed\n", results.len(), failed);
            }
            Err(e) => println!("❌ Error running DOE: {}\n", e),
        },
        Err(e) => {
            println!("❌ Error loading study: {}", e);
        }
    }
}
