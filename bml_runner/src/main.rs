//! # bml
//!
//! Command-line driver for BulletML patterns. `check` loads files in batch,
//! `run` simulates a pattern against an in-memory host and `dump` prints the
//! compiled tree.

mod log_bridge;
mod sim;

use bml_compiler::batch::{self, BatchConfig};
use bml_compiler::config::RuntimeConfig;
use bml_compiler::logging::{self, codes};
use bml_compiler::{log_error, log_info, pipeline};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "bml", version, about = "BulletML pattern checker and simulator")]
struct Cli {
    /// TOML configuration file; BML_* environment variables fill the gaps
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate pattern files or directories
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Load files one after another
        #[arg(long)]
        sequential: bool,

        /// Maximum worker threads
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Don't search subdirectories
        #[arg(long)]
        no_recursive: bool,

        /// Limit the number of files loaded
        #[arg(long, value_name = "N")]
        max_files: Option<usize>,

        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,
    },

    /// Simulate a pattern from a fixed emitter
    Run {
        file: PathBuf,

        #[arg(long)]
        ticks: Option<u32>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        rank: Option<f32>,

        /// Aim target as X,Y
        #[arg(long, value_name = "X,Y", value_parser = parse_point)]
        target: Option<[f32; 2]>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Print the compiled pattern tree as JSON
    Dump { file: PathBuf },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_point(value: &str) -> Result<[f32; 2], String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid coordinate '{}': {}", part.trim(), e))
    };
    Ok([parse(x)?, parse(y)?])
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, String> {
    match path {
        Some(path) => RuntimeConfig::from_file(path).map_err(|e| e.to_string()),
        None => Ok(RuntimeConfig::default()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };
    if let Err(message) = log_bridge::init(&config.logging) {
        eprintln!("Error: {}", message);
        return ExitCode::FAILURE;
    }
    log_info!("bml starting", "version" => env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Command::Check {
            paths,
            sequential,
            threads,
            no_recursive,
            max_files,
            fail_fast,
        } => {
            let mut batch_config = BatchConfig {
                recursive: !no_recursive,
                max_files,
                fail_fast,
                ..BatchConfig::default()
            };
            if let Some(threads) = threads {
                batch_config.max_threads = threads;
            }
            check(&paths, &batch_config, sequential, &config)
        }
        Command::Run {
            file,
            ticks,
            seed,
            rank,
            target,
            output,
        } => {
            let mut config = config;
            let simulation = &mut config.simulation;
            simulation.ticks = ticks.unwrap_or(simulation.ticks);
            simulation.seed = seed.or(simulation.seed);
            simulation.rank = rank.unwrap_or(simulation.rank);
            simulation.target = target.unwrap_or(simulation.target);
            run(&file, output, &config)
        }
        Command::Dump { file } => dump(&file, &config),
        Command::Config => config
            .to_toml_string()
            .map(|toml| {
                print!("{}", toml);
                true
            })
            .map_err(|e| e.to_string()),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            log_error!(codes::system::INTERNAL_ERROR, &message);
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when any file failed to load
fn check(
    paths: &[PathBuf],
    batch_config: &BatchConfig,
    sequential: bool,
    config: &RuntimeConfig,
) -> Result<bool, String> {
    let results = if sequential {
        batch::check_sequential(paths, batch_config, config)
    } else {
        batch::check_parallel(paths, batch_config, config)
    }
    .map_err(|e| e.to_string())?;

    for (path, pattern) in &results.loaded {
        println!(
            "  ✓ {} ({} nodes, {} entry points)",
            path.display(),
            pattern.tree().len(),
            pattern.entry_points().len()
        );
    }
    for (path, error) in &results.failed {
        println!("  ✗ {}: [{}] {}", path.display(), error.error_code(), error);
    }

    if config.logging.enable_cargo_style_output && !results.is_success() {
        logging::print_cargo_style_summary();
    }
    println!("{}", results.summary());
    Ok(results.is_success())
}

fn run(file: &Path, output: OutputFormat, config: &RuntimeConfig) -> Result<bool, String> {
    let pattern = pipeline::load_file_with_config(file, config).map_err(|e| e.to_string())?;
    let report =
        sim::simulate(Arc::new(pattern), &config.simulation).map_err(|e| e.to_string())?;

    match output {
        OutputFormat::Text => {
            println!("=== Simulation: {} ===", file.display());
            println!("{}", report.to_text());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
    }
    Ok(true)
}

fn dump(file: &Path, config: &RuntimeConfig) -> Result<bool, String> {
    let pattern = pipeline::load_file_with_config(file, config).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&pattern).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10, -20.5"), Ok([10.0, -20.5]));
        assert!(parse_point("10").is_err());
        assert!(parse_point("x,1").is_err());
    }

    #[test]
    fn test_cli_parses_run_options() {
        let cli = Cli::try_parse_from([
            "bml", "run", "ring.xml", "--ticks", "60", "--target", "5,6", "--output", "json",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                ticks,
                target,
                output,
                ..
            } => {
                assert_eq!(ticks, Some(60));
                assert_eq!(target, Some([5.0, 6.0]));
                assert_eq!(output, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_load_config_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[simulation]\nticks = 12\nrank = 0.25").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.simulation.ticks, 12);
        assert_eq!(config.simulation.rank, 0.25);
        assert!(load_config(Some(Path::new("/nonexistent/bml.toml"))).is_err());
    }
}
