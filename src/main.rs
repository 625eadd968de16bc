use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use gpx_segmenter::gpx_processor::{
    collect_gpx_files, fix_gpx_file, process_gpx_file, save_results_to_csv, ExportOptions,
    ProcessingResult,
};
use gpx_segmenter::{read_trace, time_normalizer, FilterPolicy, Pipeline, Thresholds};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Smooth GPX traces and cut them into moving intervals and climbs", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the smoothing and segmentation pipeline and export every derived track
    Process(ProcessArgs),
    /// Drop repeated timestamps and repeated positions, writing <input>.fixed.gpx
    Fix(FixArgs),
    /// Print the parsed trackpoints of a GPX file as CSV
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// GPX files, or directories to search for GPX files
    #[arg(required = true, value_hint = ValueHint::AnyPath)]
    inputs: Vec<PathBuf>,

    /// TOML file with thresholds; missing keys keep their defaults
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory for outputs (defaults to each input's directory)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Title written into every output track
    #[arg(long)]
    title: Option<String>,

    /// CSV file summarizing every processed input
    #[arg(long, value_hint = ValueHint::FilePath)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    overrides: ThresholdOverrides,
}

#[derive(Args, Debug)]
struct ThresholdOverrides {
    /// Exclusive lower speed bound, m/s
    #[arg(long)]
    min_speed: Option<f64>,

    /// Exclusive upper speed bound, m/s
    #[arg(long)]
    max_speed: Option<f64>,

    /// Time gap that splits moving intervals, seconds
    #[arg(long)]
    leap: Option<f64>,

    /// Minimum moving interval duration, seconds
    #[arg(long)]
    min_duration: Option<f64>,

    /// Rough smoothing window, seconds
    #[arg(long)]
    rough_window: Option<f64>,

    /// Fine smoothing window, seconds
    #[arg(long)]
    fine_window: Option<f64>,

    /// Keep short bursts of movement instead of retracting them
    #[arg(long, action = ArgAction::SetTrue)]
    no_burst_filter: bool,
}

impl ThresholdOverrides {
    fn apply(&self, mut thresholds: Thresholds) -> Thresholds {
        if let Some(v) = self.min_speed {
            thresholds.min_speed = v;
        }
        if let Some(v) = self.max_speed {
            thresholds.max_speed = v;
        }
        if let Some(v) = self.leap {
            thresholds.leap_secs = v;
        }
        if let Some(v) = self.min_duration {
            thresholds.min_duration_secs = v;
        }
        if let Some(v) = self.rough_window {
            thresholds.rough_window_secs = v;
        }
        if let Some(v) = self.fine_window {
            thresholds.fine_window_secs = v;
        }
        if self.no_burst_filter {
            thresholds.filter_policy = FilterPolicy::Bounds;
        }
        thresholds
    }
}

#[derive(Args, Debug)]
struct FixArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Directory for the output (defaults to the input's directory)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Fix(args) => handle_fix(args),
        Command::Dump(args) => handle_dump(args),
    }
}

fn handle_process(args: ProcessArgs) -> Result<()> {
    let thresholds = match &args.config {
        Some(path) => Thresholds::from_toml_file(path)
            .with_context(|| format!("loading thresholds from {}", path.display()))?,
        None => Thresholds::default(),
    };
    let pipeline = Pipeline::new(args.overrides.apply(thresholds)).context("invalid thresholds")?;

    let files = collect_gpx_files(&args.inputs).context("collecting input files")?;
    if files.is_empty() {
        bail!("no GPX files found");
    }
    info!(
        files = files.len(),
        cores = num_cpus::get(),
        "processing GPX files"
    );

    let options = ExportOptions {
        output_dir: args.output_dir.clone(),
        title: args.title.clone(),
    };

    // Each trace is an independent run.
    let results: Vec<ProcessingResult> = files
        .par_iter()
        .map(|path| match process_gpx_file(path, &pipeline, &options) {
            Ok(result) => {
                info!(
                    file = %path.display(),
                    intervals = result.interval_count,
                    climbs = result.climb_count,
                    moving_minutes = result.moving_minutes,
                    "processed"
                );
                result
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "processing failed");
                ProcessingResult::failed(path, &e)
            }
        })
        .collect();

    if let Some(summary_path) = &args.summary {
        save_results_to_csv(&results, summary_path)
            .with_context(|| format!("writing summary {}", summary_path.display()))?;
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(succeeded = results.len() - failed, failed, "done");
    if failed > 0 {
        bail!("{} of {} files failed", failed, results.len());
    }
    Ok(())
}

fn handle_fix(args: FixArgs) -> Result<()> {
    let options = ExportOptions {
        output_dir: args.output_dir,
        title: None,
    };
    let written = fix_gpx_file(&args.input, &options)
        .with_context(|| format!("fixing {}", args.input.display()))?;
    info!(file = %written.display(), "wrote repaired trace");
    Ok(())
}

#[derive(Debug, Serialize)]
struct DumpRow {
    index: usize,
    time: String,
    elapsed_s: f64,
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
}

fn handle_dump(args: DumpArgs) -> Result<()> {
    let points = read_trace(&args.input)?;
    if points.is_empty() {
        warn!(file = %args.input.display(), "no trackpoints with time and elevation");
    }
    dump_samples(&args.input, &points)
}

fn dump_samples(input: &Path, points: &[gpx_segmenter::RawSample]) -> Result<()> {
    let samples = time_normalizer::normalize(points);
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    for (index, sample) in samples.iter().enumerate() {
        wtr.serialize(DumpRow {
            index,
            time: sample.time.to_rfc3339(),
            elapsed_s: sample.elapsed_seconds,
            latitude: sample.latitude,
            longitude: sample.longitude,
            elevation_m: sample.elevation,
        })
        .with_context(|| format!("dumping {}", input.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ProcessArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Process(args) => args,
            other => panic!("expected process, got {:?}", other),
        }
    }

    #[test]
    fn overrides_land_in_thresholds() {
        let args = parse(&[
            "gpx-segmenter",
            "process",
            "ride.gpx",
            "--leap",
            "25",
            "--min-speed",
            "0.5",
            "--no-burst-filter",
        ]);
        let thresholds = args.overrides.apply(Thresholds::default());

        assert_eq!(thresholds.leap_secs, 25.0);
        assert_eq!(thresholds.min_speed, 0.5);
        assert_eq!(thresholds.filter_policy, FilterPolicy::Bounds);
        assert_eq!(thresholds.max_speed, Thresholds::default().max_speed);
    }

    #[test]
    fn no_overrides_keep_loaded_values() {
        let args = parse(&["gpx-segmenter", "process", "ride.gpx"]);
        let loaded = Thresholds {
            rough_window_secs: 8.0,
            ..Thresholds::default()
        };
        assert_eq!(args.overrides.apply(loaded.clone()), loaded);
    }
}
