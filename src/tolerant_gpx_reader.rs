/// TOLERANT GPX READER
///
/// Reads a GPX file into raw trackpoints. Files that fail strict parsing get
/// one retry after minimal, data-preserving repairs (missing XML declaration,
/// truncated closing tags, stray control characters). Coordinates, elevations
/// and timestamps are never altered by a repair.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, Utc};
use gpx::{read, Gpx};
use tracing::{debug, warn};

use crate::error::{Result, TraceError};
use crate::sample::RawSample;

/// Reads the trackpoints of `path`, in file order.
pub fn read_trace(path: &Path) -> Result<Vec<RawSample>> {
    let bytes = fs::read(path).map_err(|e| parse_failure(path, e))?;
    parse_trace(&bytes, path)
}

/// Parses GPX content. `source` is only used in error messages.
pub fn parse_trace(bytes: &[u8], source: &Path) -> Result<Vec<RawSample>> {
    let gpx = read_gpx_tolerantly(bytes, source)?;
    extract_samples(&gpx, source)
}

fn read_gpx_tolerantly(bytes: &[u8], source: &Path) -> Result<Gpx> {
    // Strategy 1: the file as-is
    let strict_error = match read(Cursor::new(bytes)) {
        Ok(gpx) => return Ok(gpx),
        Err(e) => e,
    };
    warn!(file = %source.display(), error = %strict_error, "standard GPX parsing failed, retrying with repairs");

    // Strategy 2: minimal repairs
    let repaired = apply_minimal_safe_repairs(&String::from_utf8_lossy(bytes));
    match read(Cursor::new(repaired.as_bytes())) {
        Ok(gpx) => {
            debug!(file = %source.display(), "repaired GPX parsed");
            Ok(gpx)
        }
        Err(_) => Err(parse_failure(source, strict_error)),
    }
}

fn extract_samples(gpx: &Gpx, source: &Path) -> Result<Vec<RawSample>> {
    let mut samples = Vec::new();
    let mut without_time = 0usize;
    let mut without_elevation = 0usize;

    for track in &gpx.tracks {
        for segment in &track.segments {
            for point in &segment.points {
                let Some(time) = point.time.as_ref() else {
                    without_time += 1;
                    continue;
                };
                let Some(elevation) = point.elevation else {
                    without_elevation += 1;
                    continue;
                };

                let iso = time.format().map_err(|e| parse_failure(source, e))?;
                let utc = DateTime::parse_from_rfc3339(&iso)
                    .map_err(|e| parse_failure(source, e))?
                    .with_timezone(&Utc);

                samples.push(RawSample {
                    latitude: point.point().y(),
                    longitude: point.point().x(),
                    elevation,
                    time: utc,
                });
            }
        }
    }

    if without_time > 0 || without_elevation > 0 {
        warn!(
            file = %source.display(),
            without_time,
            without_elevation,
            "skipped trackpoints lacking time or elevation"
        );
    }
    debug!(file = %source.display(), points = samples.len(), "read trackpoints");
    Ok(samples)
}

fn parse_failure(source: &Path, error: impl std::fmt::Display) -> TraceError {
    TraceError::ParseFailure {
        path: source.to_path_buf(),
        message: error.to_string(),
    }
}

/// Repairs that cannot change any recorded value.
fn apply_minimal_safe_repairs(content: &str) -> String {
    let mut repaired = remove_invalid_xml_chars(content);

    if !repaired.trim_start().starts_with("<?xml") {
        repaired = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", repaired.trim_start());
    }

    close_unclosed_tags(&repaired)
}

/// Closes the track structure of a file that was cut off mid-write.
fn close_unclosed_tags(content: &str) -> String {
    let mut repaired = content.trim_end().to_string();
    if repaired.ends_with("</gpx>") || !repaired.contains("<gpx") {
        return repaired;
    }

    // A partially written trackpoint cannot be trusted; cut back to the last complete one.
    if let (Some(open), Some(close)) = (repaired.rfind("<trkpt"), repaired.rfind("</trkpt>")) {
        if open > close {
            repaired.truncate(open);
        }
    }

    let unclosed = |open: &str, close: &str| {
        repaired
            .matches(open)
            .count()
            .saturating_sub(repaired.matches(close).count())
    };
    let open_trkseg = unclosed("<trkseg>", "</trkseg>");
    let open_trk = unclosed("<trk>", "</trk>");

    for _ in 0..open_trkseg {
        repaired.push_str("\n</trkseg>");
    }
    for _ in 0..open_trk {
        repaired.push_str("\n</trk>");
    }
    repaired.push_str("\n</gpx>\n");
    repaired
}

fn remove_invalid_xml_chars(content: &str) -> String {
    content
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || !c.is_control())
        .collect()
}
