use bs_controls::PidVariant;
use bs_sim::{
    Engine, NoiseConfig, RunRecord, Scenario, ScoreWindow, SimResult, SweepGrid, SweepOptions,
    TrialCache, run_sweep,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "boilersim")]
#[command(about = "Boilersim - espresso boiler temperature control simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one scenario
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Write the trajectory as JSON lines
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Override the PID computation variant
        #[arg(long)]
        variant: Option<PidVariant>,
        /// Sensor jitter amplitude in degrees
        #[arg(long)]
        noise: Option<f64>,
        /// Seed for the sensor jitter
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score a grid of gains over a window
    Sweep {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Comma separated proportional gains
        #[arg(long, value_delimiter = ',', required = true)]
        kp: Vec<f64>,
        /// Comma separated integral gains
        #[arg(long, value_delimiter = ',', required = true)]
        ki: Vec<f64>,
        /// Comma separated derivative gains
        #[arg(long, value_delimiter = ',', default_value = "0")]
        kd: Vec<f64>,
        /// Score window start in seconds
        #[arg(long, default_value_t = 0.0)]
        window_start: f64,
        /// Score window end in seconds (defaults to the run duration)
        #[arg(long)]
        window_end: Option<f64>,
        /// Run trials in parallel
        #[arg(long)]
        parallel: bool,
        /// Write the sweep summary as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print a scenario with every default filled in
    ShowConfig {
        /// Scenario to expand; built-in defaults if omitted
        scenario: Option<PathBuf>,
    },
}

fn main() -> SimResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            out,
            variant,
            noise,
            seed,
        } => cmd_run(&scenario, out.as_deref(), variant, noise, seed),
        Commands::Sweep {
            scenario,
            kp,
            ki,
            kd,
            window_start,
            window_end,
            parallel,
            out,
        } => {
            let grid = SweepGrid::new(kp, ki, kd)?;
            cmd_sweep(
                &scenario,
                grid,
                window_start,
                window_end,
                parallel,
                out.as_deref(),
            )
        }
        Commands::ShowConfig { scenario } => cmd_show_config(scenario.as_deref()),
    }
}

fn cmd_run(
    path: &Path,
    out: Option<&Path>,
    variant: Option<PidVariant>,
    noise: Option<f64>,
    seed: Option<u64>,
) -> SimResult<()> {
    let mut scenario = Scenario::from_yaml_file(path)?;
    if let Some(variant) = variant {
        scenario.config.controller.variant = variant;
    }
    if let Some(amplitude_c) = noise {
        scenario.config.noise = Some(NoiseConfig {
            amplitude_c,
            seed: seed.unwrap_or_default(),
        });
    } else if let (Some(existing), Some(seed)) = (scenario.config.noise.as_mut(), seed) {
        existing.seed = seed;
    }

    println!("Running scenario: {}", path.display());
    println!(
        "  variant = {}, target = {:.1} C, duration = {:.1} s, dt = {:.3} s",
        scenario.config.controller.variant,
        scenario.run.target_c,
        scenario.run.duration_s,
        scenario.run.step_s
    );

    let started = Instant::now();
    let mut engine = Engine::new(scenario.config)?;
    let record = engine.run(&scenario.run)?;
    println!(
        "✓ Simulation completed in {:.3} s",
        started.elapsed().as_secs_f64()
    );
    print_run_summary(&record);

    if let Some(out) = out {
        record.write_jsonl(BufWriter::new(File::create(out)?))?;
        println!("  Trajectory written to {}", out.display());
    }
    Ok(())
}

fn print_run_summary(record: &RunRecord) {
    println!("  Samples: {}", record.len());
    if let Some(last) = record.last() {
        println!("  Final temperature: {:.2} C", last.temperature_c);
    }
    println!("  Peak temperature: {:.2} C", record.max_temperature());
}

fn cmd_sweep(
    path: &Path,
    grid: SweepGrid,
    window_start: f64,
    window_end: Option<f64>,
    parallel: bool,
    out: Option<&Path>,
) -> SimResult<()> {
    let scenario = Scenario::from_yaml_file(path)?;
    let window = ScoreWindow::new(
        window_start,
        window_end.unwrap_or(scenario.run.duration_s),
    );
    println!(
        "Sweeping {} gain triples over [{:.1}, {:.1}) s",
        grid.len(),
        window.start_s,
        window.end_s
    );

    let started = Instant::now();
    let cache = TrialCache::new();
    let report = run_sweep(
        &scenario.config,
        &scenario.run,
        &grid,
        &window,
        &cache,
        &SweepOptions {
            parallel,
            cancel: None,
        },
    )?;
    info!(elapsed_s = started.elapsed().as_secs_f64(), "sweep finished");

    for trial in &report.trials {
        println!(
            "  kp={:<8} ki={:<8} kd={:<8} score={:.4}",
            trial.gains.kp, trial.gains.ki, trial.gains.kd, trial.score
        );
    }
    match report.best_trial() {
        Some(best) => println!(
            "✓ Best: kp={} ki={} kd={} (score {:.4})",
            best.gains.kp, best.gains.ki, best.gains.kd, best.score
        ),
        None => println!("No trials completed"),
    }

    if let Some(out) = out {
        serde_json::to_writer_pretty(BufWriter::new(File::create(out)?), &report.summary())?;
        println!("  Summary written to {}", out.display());
    }
    Ok(())
}

fn cmd_show_config(path: Option<&Path>) -> SimResult<()> {
    let scenario = match path {
        Some(path) => Scenario::from_yaml_file(path)?,
        None => Scenario::default(),
    };
    print!("{}", scenario.to_yaml_string()?);
    io::Write::flush(&mut io::stdout())?;
    Ok(())
}
