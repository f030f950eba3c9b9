//! Command-line interface for the stereoscopic renderer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::loaders::{self, PointSet};
use crate::core::writers;
use crate::processors::classification::{classify, Group};
use crate::processors::frames::AzimuthRange;
use crate::visualization::{OutputFormat, StereoFigure};
use crate::PlotConfig;

#[derive(Parser)]
#[command(name = "wise-stereo")]
#[command(about = "Stereoscopic 3D scatter plots of WISE color clusters", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Point set archive (.npz with x, y, z arrays) or CSV table
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one stereo pair (cross your eyes to view)
    Render {
        /// Camera azimuth of the left panel in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        azimuth: Option<f64>,
        /// Output format: png (recommended) or svg (slow)
        #[arg(short, long, default_value = "png")]
        format: String,
        /// Output image width in pixels (16:9 aspect)
        #[arg(short, long)]
        width: Option<u32>,
        /// Directory for the output image
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Skip title and axis text
        #[arg(long)]
        no_labels: bool,
    },

    /// Render a sequence of stereo pairs with varying azimuth
    Movie {
        /// Azimuth of the first frame in degrees
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        start: String,
        /// Approximate azimuth of the last frame (exclusive)
        #[arg(long, default_value = "10", allow_hyphen_values = true)]
        stop: String,
        /// Azimuth step in degrees
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        step: String,
        /// Output format: png (recommended) or svg (slow)
        #[arg(short, long, default_value = "png")]
        format: String,
        /// Output image width in pixels (16:9 aspect)
        #[arg(short, long)]
        width: Option<u32>,
        /// Directory for the frame images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Skip title and axis text
        #[arg(long)]
        no_labels: bool,
    },

    /// Classify objects and report group sizes
    Classify {
        /// Write per-object group labels to this CSV file
        #[arg(short, long)]
        labels: Option<PathBuf>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Create a bar counting rendered frames
fn create_frame_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} frame {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
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
            let head: String = value.chars().take(36).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
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

    // Load config
    let mut config = match &cli.config {
        Some(path) => match PlotConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PlotConfig::default()
            }
        },
        None => PlotConfig::default(),
    };

    if let Some(input) = cli.input {
        config.data.input = input;
    }

    let result = match cli.command {
        Commands::Render { azimuth, format, width, output_dir, no_labels } => {
            apply_render_overrides(&mut config, width, output_dir, no_labels);
            cmd_render(azimuth, &format, &config)
        }
        Commands::Movie { start, stop, step, format, width, output_dir, no_labels } => {
            apply_render_overrides(&mut config, width, output_dir, no_labels);
            cmd_movie(&start, &stop, &step, &format, &config)
        }
        Commands::Classify { labels } => cmd_classify(labels.as_deref(), &config),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn apply_render_overrides(
    config: &mut PlotConfig,
    width: Option<u32>,
    output_dir: Option<PathBuf>,
    no_labels: bool,
) {
    if let Some(width) = width {
        config.figure.width_px = width;
    }
    if let Some(dir) = output_dir {
        config.data.output_dir = dir;
    }
    if no_labels {
        config.figure.draw_labels = false;
    }
}

/// Load the configured point set; any failure here is fatal.
fn load_input(config: &PlotConfig) -> Result<PointSet> {
    let input = &config.data.input;
    let spinner = create_spinner("Loading data...");
    let loaded = loaders::load_points(input)
        .with_context(|| format!("Failed to load point set from {}", input.display()));
    spinner.finish_and_clear();

    let points = loaded?;
    info!("Number of objects: {}", points.len());
    Ok(points)
}

fn cmd_render(azimuth: Option<f64>, format: &str, config: &PlotConfig) -> Result<()> {
    // Reject the format before touching the data or the filesystem
    let format: OutputFormat = format.parse()?;
    let azimuth = azimuth.unwrap_or(config.camera.default_azimuth);

    let start = Instant::now();
    let points = load_input(config)?;
    let figure = StereoFigure::new(points, config.render_config());

    let spinner = create_spinner("Rendering stereo pair...");
    let rendered = figure.render_stereo_pair(azimuth, format, &config.data.output_dir);
    spinner.finish_and_clear();
    let path = rendered.context("Rendering failed")?;

    let pair = figure.stereo_pair(azimuth);
    print_summary(
        "Stereo Pair Complete",
        &[
            ("Input file", config.data.input.display().to_string()),
            ("Objects", figure.points().len().to_string()),
            ("Left azimuth", format!("{:.2}", pair.left.azimuth)),
            ("Right azimuth", format!("{:.2}", pair.right.azimuth)),
            ("Output", path.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_movie(
    start_az: &str,
    stop_az: &str,
    step_az: &str,
    format: &str,
    config: &PlotConfig,
) -> Result<()> {
    // Both checks run before any rendering
    let range = AzimuthRange::parse(start_az, stop_az, step_az)?;
    let format: OutputFormat = format.parse()?;

    let start = Instant::now();
    let points = load_input(config)?;
    let figure = StereoFigure::new(points, config.render_config());

    println!(
        "Rendering {} frames from azimuth {} in steps of {}",
        range.len(),
        range.start(),
        range.step()
    );

    let bar = create_frame_bar(range.len());
    let result = figure.make_movie_frames(range, format, &config.data.output_dir, |j, _, path| {
        bar.set_position(j as u64);
        if let Some(name) = path.file_name() {
            bar.set_message(name.to_string_lossy().to_string());
        }
    });
    bar.finish_and_clear();
    let written = result.context("Frame sequence aborted")?;

    print_summary(
        "Movie Frames Complete",
        &[
            ("Input file", config.data.input.display().to_string()),
            ("Frames written", written.len().to_string()),
            ("Output directory", config.data.output_dir.display().to_string()),
            ("Format", format.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_classify(labels: Option<&Path>, config: &PlotConfig) -> Result<()> {
    let start = Instant::now();
    let points = load_input(config)?;
    let masks = classify(&points);

    if let Some(path) = labels {
        writers::write_labels_csv(path, &points, &masks)
            .with_context(|| format!("Failed to write labels to {}", path.display()))?;
    }

    let mut items: Vec<(&str, String)> = vec![
        ("Input file", config.data.input.display().to_string()),
        ("Objects", points.len().to_string()),
    ];
    for group in Group::ALL {
        items.push((group.name(), masks.count(group).to_string()));
    }
    items.push(("In several groups", masks.overlap_count().to_string()));
    if let Some(path) = labels {
        items.push(("Labels CSV", path.display().to_string()));
    }
    items.push(("Duration", format!("{:.2?}", start.elapsed())));

    print_summary("Classification Complete", &items);
    Ok(())
}
