//! Command-line front end for the moist QG model.
//!
//! ```text
//! mqg run --config run.toml --steps 1000 --output 100
//! mqg info --config run.toml
//! mqg info --defaults
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use mqg_rs::config::ModelConfig;
use mqg_rs::grid::GridSpec;
use mqg_rs::physics::PhysicalParameters;
use mqg_rs::simulation::{NullSink, Simulation, WriterDiagnostics};
use mqg_rs::solver::TendencyKind;
use mqg_rs::time::output_times;

/// Moist two-layer quasi-geostrophic model
#[derive(Parser)]
#[command(name = "mqg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pseudo-spectral moist quasi-geostrophic model", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation, printing one diagnostics line per output step
    Run(RunArgs),
    /// Show derived parameters of a configuration
    Info(InfoArgs),
}

#[derive(Args)]
struct RunArgs {
    /// TOML configuration file; built-in defaults if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of steps
    #[arg(long)]
    steps: Option<usize>,

    /// Override the output interval in steps
    #[arg(long)]
    output: Option<usize>,

    /// Override the initial condition seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct InfoArgs {
    /// TOML configuration file; built-in defaults if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the default configuration as TOML
    #[arg(long)]
    defaults: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Info(args) => show_info(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ModelConfig> {
    match path {
        Some(path) => ModelConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => {
            warn!("no configuration file given; using defaults");
            Ok(ModelConfig::default())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(steps) = args.steps {
        config.time.steps = steps;
    }
    if let Some(output) = args.output {
        config.time.output_interval = output;
    }
    if let Some(seed) = args.seed {
        config.initial.seed = seed;
    }

    info!(
        nx = config.grid.nx,
        ny = config.grid.ny,
        steps = config.time.steps,
        output_interval = config.time.output_interval,
        "starting run"
    );
    let mut sim = Simulation::new(&config).context("failed to set up simulation")?;
    let mut diagnostics = WriterDiagnostics::new(io::stdout().lock());
    let result = sim.run(&mut NullSink, &mut diagnostics)?;

    if !result.stable {
        warn!("non-finite diagnostics: the run blew up");
    }
    info!(
        final_time = result.final_time,
        steps = result.n_steps,
        max_velocity = result.max_velocity,
        moisture_drift = result.moisture_drift.unwrap_or(0.0),
        wall_time = result.wall_time,
        "run complete"
    );
    Ok(())
}

fn show_info(args: InfoArgs) -> Result<()> {
    if args.defaults {
        print!("{}", toml::to_string_pretty(&ModelConfig::default())?);
        return Ok(());
    }

    let config = load_config(args.config.as_ref())?;
    let grid = GridSpec::from_config(&config.grid)?;
    let params = PhysicalParameters::from_config(&config, &grid)?;
    let dry = &params.dry;

    println!("=== Grid ===");
    println!("  physical:  {} x {}", grid.nx, grid.ny);
    println!("  spectral:  {} x {}", grid.nl, grid.nk);
    println!("  padded:    {} x {}", grid.nx2, grid.ny2);
    println!("  length:    {:?}", grid.length);
    println!();
    println!("=== Layers ===");
    println!("  dry layers:   {}", params.layers());
    println!("  moist layers: {:?}", params.layout.moist_indices);
    println!("  PV slots:     {}", params.total_layers());
    println!("  tendency:     {}", TendencyKind::select(&params).name());
    println!();
    println!("=== Dry parameters ===");
    println!("  shear U0-U1:  {:.4}", dry.shear);
    println!("  damping:      {:?}", dry.damping);
    println!("  beta:         {:.4}", dry.beta);
    println!("  lambda:       {:.4}", dry.lambda);
    println!("  nu:           {:.4e}", dry.nu);
    println!("  criticality:  {:.4}", dry.criticality);
    if let Some(moist) = &params.moist {
        println!();
        println!("=== Moist parameters ===");
        println!("  latent heating: {:.4}", moist.latent_heating);
        println!("  condensation:   {:.4}", moist.condensation);
        println!("  gamma:          {:.4}", moist.gamma);
        println!("  evaporation:    {:.4e}", moist.evaporation);
        println!("  tau:            {:.4}", moist.relaxation_time);
        println!("  rain:           {}", params.rain);
    }
    println!();
    println!("=== Time ===");
    println!("  dt:           {}", config.time.dt);
    println!("  steps:        {}", config.time.steps);
    println!("  outputs at:   {:?}", output_times(&config.time));
    Ok(())
}
