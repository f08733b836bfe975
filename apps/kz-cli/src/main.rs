//! Keezer CLI: validate configuration files and run accelerated
//! simulations of the control loop against the thermal model.

use clap::{Parser, Subcommand};
use kz_core::{ConfigFile, ControlConfig, KzError};
use kz_sim::{FreezerParams, SimError, SimRig};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] KzError),

    #[error(transparent)]
    Sim(#[from] SimError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "keezer")]
#[command(about = "Keezer temperature controller tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file (clamping out-of-range values)
    Validate {
        /// Path to the config YAML file
        config_path: PathBuf,
    },
    /// Run the control loop against the thermal simulator on a virtual
    /// clock and emit the control log as CSV
    Simulate {
        /// Path to the config YAML file
        config_path: PathBuf,
        /// Simulated duration in hours
        #[arg(long, default_value_t = 6.0)]
        hours: f64,
        /// Starting enclosure temperature (°F)
        #[arg(long, default_value_t = 72.0)]
        start_temp: f64,
        /// Room temperature outside the enclosure (°F)
        #[arg(long, default_value_t = 72.0)]
        ambient: f64,
        /// Output CSV file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Simulate {
            config_path,
            hours,
            start_temp,
            ambient,
            output,
        } => cmd_simulate(&config_path, hours, start_temp, ambient, output.as_deref()),
    }
}

fn load_config(path: &Path) -> CliResult<ControlConfig> {
    let text = fs::read_to_string(path)?;
    let file: ConfigFile = serde_yaml::from_str(&text)?;
    Ok(file.validate()?)
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    let cfg = load_config(path)?;
    println!("Configuration OK:");
    println!("  target temperature:  {:.1} °F", cfg.target_temp);
    println!("  hysteresis band:     ±{:.1} °F", cfg.hysteresis_band);
    println!("  compressor rest:     {} s", cfg.rest_ms / 1000);
    println!("  minimum run:         {} s", cfg.run_ms / 1000);
    println!("  low-temp floor:      {:.1} °F", cfg.low_temp_floor);
    println!("  control interval:    {} s", cfg.interval_ms / 1000);
    println!("  enclosure probe:     {}", cfg.enclosure_probe);
    match &cfg.fermenter_probe {
        Some(id) => println!("  fermenter probe:     {id}"),
        None => println!("  fermenter probe:     (none)"),
    }
    println!("Note: probe ids are matched against attached probes at startup.");
    Ok(())
}

fn cmd_simulate(
    path: &Path,
    hours: f64,
    start_temp: f64,
    ambient: f64,
    output: Option<&Path>,
) -> CliResult<()> {
    let cfg = load_config(path)?;
    let params = FreezerParams {
        ambient_temp: ambient,
        ..FreezerParams::default()
    };

    let mut rig = SimRig::new(cfg, params, start_temp)?;
    rig.run_until((hours * 3_600_000.0) as u64)?;
    rig.shutdown();

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    writeln!(out, "ts,power,enclosure_temp,fermenter_temp,mode,reason,note")?;
    for record in rig.records() {
        writeln!(out, "{}", record.csv_line())?;
    }
    out.flush()?;
    Ok(())
}
