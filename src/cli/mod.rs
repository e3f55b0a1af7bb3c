//! Command-line interface for the trajectory pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::loaders::{self, Point, Trajectory};
use crate::core::writers;
use crate::processors::{filtering, pipeline, projection, smoothing};
use crate::visualization;

#[derive(Parser)]
#[command(name = "trajectory-pipeline")]
#[command(about = "Vehicle trajectory filtering, smoothing and nearest-segment queries", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, filter and smooth a trajectory
    Smooth {
        /// Input .npz/.csv file, or directory with --batch
        input_path: PathBuf,
        /// Output .csv/.npz file, or directory with --batch
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Moving-average window size
        #[arg(short, long)]
        window_size: Option<usize>,
        /// Save a PNG plot of filtered and smoothed trajectories
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Process every trajectory file in a directory
        #[arg(long)]
        batch: bool,
    },

    /// Remove points with non-finite coordinates
    Filter {
        /// Input .npz/.csv file
        input_path: PathBuf,
        /// Output .csv/.npz file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Find the closest trajectory segment to a query point
    Project {
        /// Input .npz/.csv file
        input_path: PathBuf,
        /// Query point as x,y
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        point: Option<Vec<f64>>,
        /// Filter and smooth the trajectory before querying
        #[arg(long)]
        smooth: bool,
        /// Window size used with --smooth
        #[arg(short, long)]
        window_size: Option<usize>,
        /// Save the result as a one-row CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Save a PNG plot of the query and closest segment
        #[arg(long)]
        plot: Option<PathBuf>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Log an error and terminate with a failure status.
fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    error!("{}: {}", context, e);
    std::process::exit(1);
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Smooth { input_path, output, window_size, plot, batch } => {
            let window_size = window_size.unwrap_or(config.smoothing.window_size);
            if batch {
                cmd_smooth_batch(&input_path, output, window_size, &config);
            } else {
                cmd_smooth(&input_path, output, window_size, plot, &config);
            }
        }
        Commands::Filter { input_path, output } => {
            cmd_filter(&input_path, &output, &config);
        }
        Commands::Project { input_path, point, smooth, window_size, output, plot } => {
            let window_size = window_size.unwrap_or(config.smoothing.window_size);
            cmd_project(&input_path, point, smooth.then_some(window_size), output, plot, &config);
        }
    }
}

/// Write a trajectory in the format implied by the output extension.
fn write_output(path: &Path, trajectory: &Trajectory, config: &PipelineConfig) -> writers::Result<()> {
    let is_npz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("npz"))
        .unwrap_or(false);

    if is_npz {
        writers::write_trajectory_npz(path, trajectory, &config.loader.array_key)
    } else {
        writers::write_trajectory_csv(path, trajectory)
    }
}

fn cmd_smooth(
    input_path: &Path,
    output: Option<PathBuf>,
    window_size: usize,
    plot: Option<PathBuf>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    println!("Smoothing trajectory...");
    println!("Input: {}", input_path.display());
    println!("Window size: {}", window_size);

    let spinner = create_spinner("Loading and smoothing...");

    let result = match pipeline::run_pipeline(input_path, window_size, Some(&config.loader)) {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Smoothing failed", e);
        }
    };

    if let Some(path) = &output {
        spinner.set_message("Writing output...");
        if let Err(e) = write_output(path, &result.smoothed, config) {
            spinner.finish_and_clear();
            fail("Failed to write output", e);
        }
    }

    if let Some(path) = &plot {
        spinner.set_message("Generating plot...");
        if let Err(e) =
            visualization::plot_trajectory(path, &result.filtered, Some(&result.smoothed), &config.plot)
        {
            spinner.finish_and_clear();
            fail("Visualization failed", e);
        }
    }

    spinner.finish_and_clear();

    print_summary(
        "Smoothing Complete",
        &[
            ("Input file", input_path.display().to_string()),
            ("Raw points", result.raw_len.to_string()),
            ("Dropped (non-finite)", result.dropped().to_string()),
            ("Smoothed points", result.smoothed.len().to_string()),
            ("Window size", window_size.to_string()),
            (
                "Output",
                output.map_or("-".to_string(), |p| p.display().to_string()),
            ),
            ("Plot", plot.map_or("-".to_string(), |p| p.display().to_string())),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_smooth_batch(
    input_dir: &Path,
    output: Option<PathBuf>,
    window_size: usize,
    config: &PipelineConfig,
) {
    let start = Instant::now();
    let output_dir = output.unwrap_or_else(|| input_dir.join("smoothed"));

    println!("Smoothing trajectories in batch mode...");
    println!("Input directory: {}", input_dir.display());
    println!("Output directory: {}", output_dir.display());
    println!("Window size: {}", window_size);

    let spinner = create_spinner("Smoothing trajectory files...");

    let outcomes = match pipeline::smooth_batch(input_dir, &output_dir, window_size, Some(&config.loader)) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Batch smoothing failed", e);
        }
    };

    spinner.finish_and_clear();

    let failed: Vec<&pipeline::BatchOutcome> = outcomes.iter().filter(|o| !o.is_ok()).collect();
    for outcome in &failed {
        if let Err(e) = &outcome.result {
            eprintln!("  - {}: {:#}", outcome.source.display(), e);
        }
    }

    print_summary(
        "Batch Smoothing Complete",
        &[
            ("Input directory", input_dir.display().to_string()),
            ("Output directory", output_dir.display().to_string()),
            ("Files processed", outcomes.len().to_string()),
            ("Files failed", failed.len().to_string()),
            ("Window size", window_size.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    if !failed.is_empty() {
        std::process::exit(1);
    }
}

fn cmd_filter(input_path: &Path, output: &Path, config: &PipelineConfig) {
    let start = Instant::now();

    let raw = match loaders::load_trajectory(input_path, Some(&config.loader)) {
        Ok(raw) => raw,
        Err(e) => fail("Failed to load trajectory", e),
    };

    let filtered = filtering::filter_trajectory(&raw);

    if let Err(e) = write_output(output, &filtered, config) {
        fail("Failed to write output", e);
    }

    print_summary(
        "Filter Complete",
        &[
            ("Input file", input_path.display().to_string()),
            ("Output file", output.display().to_string()),
            ("Raw points", raw.len().to_string()),
            ("Kept points", filtered.len().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_project(
    input_path: &Path,
    point: Option<Vec<f64>>,
    smooth_window: Option<usize>,
    output: Option<PathBuf>,
    plot: Option<PathBuf>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let Some(query) = point.or_else(|| config.projection.query_point.clone()) else {
        fail("Missing query point", "pass --point x,y or set projection.query_point");
    };

    let raw = match loaders::load_trajectory(input_path, Some(&config.loader)) {
        Ok(raw) => raw,
        Err(e) => fail("Failed to load trajectory", e),
    };

    let trajectory = match smooth_window {
        Some(window_size) => {
            let filtered = filtering::filter_trajectory(&raw);
            match smoothing::smooth_trajectory(&filtered, window_size) {
                Ok(smoothed) => smoothed,
                Err(e) => fail("Smoothing failed", e),
            }
        }
        None => raw,
    };

    let result = match projection::project_point(&trajectory, &query) {
        Ok(result) => result,
        Err(e) => fail("Projection failed", e),
    };
    // project_point has already checked the query has two coordinates
    let query_point = Point::new(query[0], query[1]);

    if let Some(path) = &output {
        if let Err(e) = writers::write_projection_csv(path, [query_point.x, query_point.y], &result) {
            fail("Failed to write output", e);
        }
    }

    if let Some(path) = &plot {
        if let Err(e) = visualization::plot_projection(path, &trajectory, query_point, &result, &config.plot) {
            fail("Visualization failed", e);
        }
    }

    let segment = &result.segment;
    print_summary(
        "Projection Complete",
        &[
            ("Input file", input_path.display().to_string()),
            ("Smoothed", smooth_window.is_some().to_string()),
            ("Query point", format!("({}, {})", query_point.x, query_point.y)),
            ("Segment index", result.segment_index.to_string()),
            ("Segment start", format!("({}, {})", segment.start.x, segment.start.y)),
            ("Segment end", format!("({}, {})", segment.end.x, segment.end.y)),
            ("Nearest point", format!("({:.6}, {:.6})", result.nearest.x, result.nearest.y)),
            ("Distance", format!("{:.6}", result.distance)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}
