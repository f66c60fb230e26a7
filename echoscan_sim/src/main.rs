//! EchoScan headless simulator CLI
//!
//! Runs visualizer scenarios under a virtual clock, replays recorded
//! serial logs and exports frames for offline rendering.

use clap::Parser;
use echoscan_core::ScanConfig;
use echoscan_env::reading_channel;
use echoscan_sim::{
    spawn_replay, RerunLogger, ScenarioId, ScenarioResult, ScenarioRunner, SimError, SimExport,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// EchoScan headless simulator
#[derive(Parser, Debug)]
#[command(name = "echoscan-sim")]
#[command(about = "Run reproducible point-cloud scenarios for EchoScan", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (radar, lidar, point_cloud, sonar_pulse, forward, depth_sweep, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Simulation duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Host tick rate in Hz
    #[arg(long, default_value = "30")]
    tick_rate: u32,

    /// JSON engine configuration replacing the scenario preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a recorded serial log instead of the scenario's own source
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Replayed readings consumed per tick
    #[arg(long, default_value = "1")]
    replay_batch: usize,

    /// Export frames to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Stream points to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("EchoScan Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: radar, lidar, point_cloud, sonar_pulse, forward, depth_sweep, all"
            );
            std::process::exit(1);
        })]
    };

    if (args.export.is_some() || args.replay.is_some()) && scenarios.len() > 1 {
        eprintln!("Error: --export and --replay only support a single scenario, not 'all'");
        std::process::exit(1);
    }

    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    let config_override = match &args.config {
        Some(path) => match ScanConfig::from_json_file(path) {
            Ok(config) => {
                info!("Loaded engine configuration from {}", path.display());
                Some(config)
            }
            Err(e) => {
                eprintln!("Error: cannot load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let logger = if args.visualize {
        RerunLogger::new("echoscan")
    } else {
        RerunLogger::disabled()
    };

    let mut runner = ScenarioRunner::new(seed)
        .with_duration(args.duration)
        .with_tick_rate(args.tick_rate)
        .with_replay_batch(args.replay_batch);
    if let Some(config) = config_override.clone() {
        runner = runner.with_config(config);
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let projection = config_override
            .as_ref()
            .map(|c| c.projection.mode)
            .unwrap_or_else(|| scenario.config().projection.mode);
        let mut export = args
            .export
            .as_ref()
            .map(|_| SimExport::new(scenario.name(), seed, &projection.to_string()));

        let outcome = match &args.replay {
            Some(path) => run_replay(&runner, *scenario, path.clone(), export.as_mut(), &logger),
            None => runner.run_recorded(*scenario, export.as_mut(), &logger),
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("✗ {} (seed={}) ERROR: {}", scenario.name(), seed, e);
                std::process::exit(1);
            }
        };

        if let (Some(path), Some(export)) = (&args.export, export.as_mut()) {
            export.finalize(result.passed, result.metrics.stats);
            if let Err(e) = export.write_to_file(path) {
                error!("Failed to write export: {:?}", e);
            } else {
                info!("Exported {} frames to {}", export.frames.len(), path);
            }
        }

        if !args.json {
            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED | scans={} points={} visible={} peak={}",
                    scenario.name(),
                    seed,
                    result.metrics.stats.scans,
                    result.metrics.stats.points_appended,
                    result.final_visible_points,
                    result.metrics.peak_buffer
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        all_results.push(result);
    }

    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "visible_points": r.final_visible_points,
                    "peak_buffer": r.metrics.peak_buffer,
                    "stats": r.metrics.stats,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}

/// Replays a recorded log through `scenario`'s configuration.
fn run_replay(
    runner: &ScenarioRunner,
    scenario: ScenarioId,
    path: PathBuf,
    export: Option<&mut SimExport>,
    logger: &RerunLogger,
) -> Result<ScenarioResult, SimError> {
    info!("Replaying {}", path.display());
    let (tx, rx) = reading_channel(256);
    let reader = spawn_replay(path, tx);

    let result = runner.run_replay(scenario, rx, export, logger)?;

    // The reader stops on its own once the receiver is gone
    match reader.join() {
        Ok(Ok(stats)) => info!(
            "Replay read {} lines: {} readings, {} skipped",
            stats.lines, stats.sent, stats.skipped
        ),
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => warn!("Replay reader thread panicked"),
    }
    Ok(result)
}
