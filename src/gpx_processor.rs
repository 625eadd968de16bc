/// GPX PROCESSOR
///
/// Runs the segmentation pipeline over GPX files and writes every derived
/// track next to its input as `<input>.<suffix>.gpx`, together with an
/// `<input>.intervals.csv` report. All outputs of one input are rendered in
/// memory first, so a serialization failure leaves no partial set on disk.

use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use geo::point;
use gpx::{write, Gpx, GpxVersion, Metadata, Track, TrackSegment, Waypoint};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, TraceError};
use crate::interval_report::render_interval_csv;
use crate::pipeline::Pipeline;
use crate::sample::Sample;
use crate::time_normalizer::normalize;
use crate::tolerant_gpx_reader::read_trace;
use crate::trace_repair::drop_stale_fixes;

const CREATOR: &str = "gpx-segmenter";

/// Suffixes of files this tool writes; inputs carrying them are skipped.
pub const DERIVED_SUFFIXES: [&str; 9] = [
    "avg1", "avg2", "mov1", "mov2", "moving", "climb", "hybrid", "fixed", "intervals",
];

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Directory for outputs; defaults to the input's own directory.
    pub output_dir: Option<PathBuf>,
    /// Track title; defaults to the input file name.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub original_filename: String,
    pub original_points: usize,
    pub moving_points: usize,
    pub climb_points: usize,
    pub hybrid_points: usize,
    pub interval_count: usize,
    pub climb_count: usize,
    pub moving_minutes: f64,
    pub climbing_minutes: f64,
    pub files_written: usize,
    pub processing_status: String,
}

impl ProcessingResult {
    pub fn failed(path: &Path, error: &TraceError) -> Self {
        ProcessingResult {
            original_filename: file_name(path),
            original_points: 0,
            moving_points: 0,
            climb_points: 0,
            hybrid_points: 0,
            interval_count: 0,
            climb_count: 0,
            moving_minutes: 0.0,
            climbing_minutes: 0.0,
            files_written: 0,
            processing_status: format!("ERROR: {}", error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.processing_status == "SUCCESS"
    }
}

/// Runs the pipeline on one file and writes all derived outputs.
pub fn process_gpx_file(
    input: &Path,
    pipeline: &Pipeline,
    options: &ExportOptions,
) -> Result<ProcessingResult> {
    let points = read_trace(input)?;
    let output = pipeline.run(&points);
    let title = options.title.clone().unwrap_or_else(|| file_name(input));

    let mut rendered = Vec::new();
    for (suffix, samples) in output.named_sequences() {
        let destination = derived_path(input, suffix, "gpx", options.output_dir.as_deref());
        let content = render_gpx(samples, Some(&format!("{} {}", title, suffix)), &destination)?;
        rendered.push((destination, content));
    }
    let report_path = derived_path(input, "intervals", "csv", options.output_dir.as_deref());
    let report = render_interval_csv(&output.intervals, &report_path)?;
    rendered.push((report_path, report));

    let files_written = rendered.len();
    write_outputs(rendered, options.output_dir.as_deref())?;

    let summary = output.summary();
    Ok(ProcessingResult {
        original_filename: file_name(input),
        original_points: summary.raw_points,
        moving_points: summary.moving_points,
        climb_points: output.climbs.len(),
        hybrid_points: output.hybrid.len(),
        interval_count: summary.interval_count,
        climb_count: summary.climb_count,
        moving_minutes: summary.moving_seconds / 60.0,
        climbing_minutes: summary.climbing_seconds / 60.0,
        files_written,
        processing_status: "SUCCESS".to_string(),
    })
}

/// Removes stale fixes from one file and writes `<input>.fixed.gpx`.
pub fn fix_gpx_file(input: &Path, options: &ExportOptions) -> Result<PathBuf> {
    let points = read_trace(input)?;
    let repaired = normalize(&drop_stale_fixes(&points));
    let title = options.title.clone().unwrap_or_else(|| file_name(input));

    let destination = derived_path(input, "fixed", "gpx", options.output_dir.as_deref());
    let content = render_gpx(&repaired, Some(&title), &destination)?;
    write_outputs(vec![(destination.clone(), content)], options.output_dir.as_deref())?;
    Ok(destination)
}

/// Serializes samples as a single-track GPX 1.1 document.
/// `destination` is only used in error messages.
pub fn render_gpx(points: &[Sample], title: Option<&str>, destination: &Path) -> Result<Vec<u8>> {
    let export_failure = |message: String| TraceError::ExportFailure {
        path: destination.to_path_buf(),
        message,
    };

    let mut segment = TrackSegment::new();
    for sample in points {
        let mut waypoint = Waypoint::new(point!(x: sample.longitude, y: sample.latitude));
        waypoint.elevation = Some(sample.elevation);
        let nanos = i128::from(sample.time.timestamp_millis()) * 1_000_000;
        let time = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|e| export_failure(e.to_string()))?;
        waypoint.time = Some(time.into());
        segment.points.push(waypoint);
    }

    let mut track = Track::new();
    track.name = title.map(str::to_string);
    track.segments.push(segment);

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        metadata: Some(Metadata {
            name: title.map(str::to_string),
            ..Default::default()
        }),
        tracks: vec![track],
        ..Default::default()
    };

    let mut buffer = Vec::new();
    write(&gpx, &mut buffer).map_err(|e| export_failure(e.to_string()))?;
    Ok(buffer)
}

/// `<dir>/<input file name>.<suffix>.<extension>`
pub fn derived_path(input: &Path, suffix: &str, extension: &str, output_dir: Option<&Path>) -> PathBuf {
    let name = format!("{}.{}.{}", file_name(input), suffix, extension);
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn write_outputs(outputs: Vec<(PathBuf, Vec<u8>)>, output_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }
    for (path, content) in outputs {
        fs::write(&path, content).map_err(|e| TraceError::ExportFailure {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(file = %path.display(), "wrote output");
    }
    Ok(())
}

/// Expands directories into the GPX files below them, skipping derived outputs.
/// Plain file arguments are taken as given.
pub fn collect_gpx_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut gpx_files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            gpx_files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && is_source_gpx(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        info!(dir = %input.display(), files = found.len(), "found GPX files");
        gpx_files.extend(found);
    }

    Ok(gpx_files)
}

fn is_source_gpx(path: &Path) -> bool {
    let name = file_name(path).to_lowercase();
    if !name.ends_with(".gpx") {
        return false;
    }
    !DERIVED_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(&format!(".{}.gpx", suffix)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn save_results_to_csv(results: &[ProcessingResult], csv_path: &Path) -> Result<()> {
    let export_failure = |message: String| TraceError::ExportFailure {
        path: csv_path.to_path_buf(),
        message,
    };

    let mut wtr = Writer::from_path(csv_path).map_err(|e| export_failure(e.to_string()))?;
    for result in results {
        wtr.serialize(result).map_err(|e| export_failure(e.to_string()))?;
    }
    wtr.flush()?;
    info!(file = %csv_path.display(), "processing results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_path_keeps_input_name() {
        let path = derived_path(Path::new("/rides/morning.gpx"), "avg1", "gpx", None);
        assert_eq!(path, PathBuf::from("/rides/morning.gpx.avg1.gpx"));

        let path = derived_path(
            Path::new("/rides/morning.gpx"),
            "intervals",
            "csv",
            Some(Path::new("/out")),
        );
        assert_eq!(path, PathBuf::from("/out/morning.gpx.intervals.csv"));
    }

    #[test]
    fn derived_outputs_are_not_sources() {
        assert!(is_source_gpx(Path::new("ride.gpx")));
        assert!(is_source_gpx(Path::new("RIDE.GPX")));
        assert!(!is_source_gpx(Path::new("ride.gpx.avg1.gpx")));
        assert!(!is_source_gpx(Path::new("ride.gpx.fixed.gpx")));
        assert!(!is_source_gpx(Path::new("ride.csv")));
    }
}
