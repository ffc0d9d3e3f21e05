use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use step_tracker::config::AppConfig;
use step_tracker::engine::TrackerHandle;
use step_tracker::sensor::{AccelSample, ReplayBackend, SimulatedWalkBackend, WalkProfile};
use step_tracker::testing::fixtures;

#[derive(Parser, Debug)]
#[command(
    name = "steptrack",
    about = "Deterministic diagnostics harness for the step tracker core"
)]
struct Cli {
    /// Override path to the JSON config file (defaults to assets/tracker_config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the simulated walking backend and stream step events to stdout
    Simulate {
        #[arg(long, default_value_t = 10)]
        duration_secs: u64,
        /// Milliseconds between simulated foot strikes
        #[arg(long, default_value_t = 900)]
        step_interval_ms: u64,
    },
    /// Replay a recorded accelerometer trace and print the session summary
    Replay {
        #[arg(long)]
        file: PathBuf,
        /// Fixed wall-clock delay between samples in milliseconds (0 = as fast as possible)
        #[arg(long, default_value_t = 0)]
        pacing_ms: u64,
    },
    /// Emit a deterministic walking trace as JSON
    GenTrace {
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Milliseconds between strikes in the generated trace
        #[arg(long, default_value_t = 1500)]
        interval_ms: u64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    step_tracker::init_logging();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Simulate {
            duration_secs,
            step_interval_ms,
        } => run_simulate(config, duration_secs, step_interval_ms),
        Commands::Replay { file, pacing_ms } => run_replay(config, &file, pacing_ms),
        Commands::GenTrace {
            steps,
            interval_ms,
            output,
        } => run_gen_trace(steps, interval_ms, output),
    }
}

fn run_simulate(config: AppConfig, duration_secs: u64, step_interval_ms: u64) -> Result<ExitCode> {
    let profile = WalkProfile {
        sample_rate_hz: config.sensor.sample_rate_hz,
        step_interval_ms,
        ..WalkProfile::default()
    };
    // Leaked so the debug HTTP server can hold the handle for the process
    // lifetime; the session itself is still stopped explicitly below.
    let handle: &'static TrackerHandle = Box::leak(Box::new(TrackerHandle::with_backend(
        Arc::new(SimulatedWalkBackend::new(profile)),
        config,
    )));

    #[cfg(feature = "debug_http")]
    step_tracker::http::spawn_if_enabled(handle);

    handle.start_tracking()?;
    let mut steps_rx = handle.subscribe_steps();

    let runtime = build_runtime()?;
    runtime.block_on(async {
        let deadline = tokio::time::sleep(Duration::from_secs(duration_secs));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("interrupted");
                    break;
                }
                maybe_event = steps_rx.recv() => match maybe_event {
                    Some(event) => println!("{}", serde_json::to_string(&event)?),
                    None => break,
                },
            }
        }

        anyhow::Ok(())
    })?;

    handle.stop_tracking()?;
    print_summary(handle)?;
    Ok(ExitCode::from(0))
}

fn run_replay(config: AppConfig, file: &Path, pacing_ms: u64) -> Result<ExitCode> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("reading trace {}", file.display()))?;
    let samples: Vec<AccelSample> = serde_json::from_str(&raw).context("parsing trace JSON")?;
    let sample_count = samples.len();

    let mut backend = ReplayBackend::new(samples);
    if pacing_ms > 0 {
        backend = backend.with_pacing(Duration::from_millis(pacing_ms));
    }
    let handle = TrackerHandle::with_backend(Arc::new(backend), config);

    handle.start_tracking()?;
    let mut steps_rx = handle.subscribe_steps();

    let runtime = build_runtime()?;
    runtime.block_on(async {
        // Drain step events until the stream goes quiet.
        loop {
            match tokio::time::timeout(Duration::from_millis(500), steps_rx.recv()).await {
                Ok(Some(event)) => println!("{}", serde_json::to_string(&event)?),
                Ok(None) => break,
                Err(_) => break,
            }
        }

        anyhow::Ok(())
    })?;

    handle.stop_tracking()?;
    log::info!("[steptrack] replayed {} samples", sample_count);
    print_summary(&handle)?;
    Ok(ExitCode::from(0))
}

fn run_gen_trace(steps: usize, interval_ms: u64, output: Option<PathBuf>) -> Result<ExitCode> {
    let step_times: Vec<u64> = (0..steps).map(|i| (i as u64 + 1) * interval_ms).collect();
    let trace = fixtures::walk_trace(&step_times);
    let json = serde_json::to_string_pretty(&trace).context("serializing trace")?;

    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("wrote {} samples to {}", trace.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(ExitCode::from(0))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("building tokio runtime")
}

fn print_summary(handle: &TrackerHandle) -> Result<()> {
    let snapshot = handle.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
