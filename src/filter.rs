use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::error::FilterError;

/// Marker substrings matched by the default marker predicate.
pub const GEOMETRY_MARKERS: [&str; 2] = ["\"type\":\"LineString\"", "\"type\":\"MultiPolygon\""];

/// A longitude/latitude rectangle given as top-left and bottom-right corners,
/// each `[lon, lat]`. Membership is strict on both axes, so points exactly on
/// the boundary are outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub top_left: [f64; 2],
    pub bottom_right: [f64; 2],
}

impl BoundingBox {
    pub fn new(top_left: [f64; 2], bottom_right: [f64; 2]) -> BoundingBox {
        BoundingBox {
            top_left,
            bottom_right,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.top_left[0] < x
            && x < self.bottom_right[0]
            && self.top_left[1] < y
            && y < self.bottom_right[1]
    }
}

/// Per-line retention test applied by [`run`].
pub enum Predicate {
    /// Retain lines containing any of the literal substrings. This is a
    /// textual test, not a structural one: a marker matches anywhere in the
    /// line, including inside nested substructures or property values.
    Marker { markers: Vec<String> },

    /// Parse the line as JSON and retain it if any position reachable under
    /// `geometry.coordinates` lies strictly inside the box.
    Bbox(BoundingBox),
}

impl Predicate {
    /// The default marker set: line and multipolygon geometry type tags.
    pub fn geometry_markers() -> Predicate {
        Predicate::Marker {
            markers: GEOMETRY_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn bbox(top_left: [f64; 2], bottom_right: [f64; 2]) -> Predicate {
        Predicate::Bbox(BoundingBox::new(top_left, bottom_right))
    }

    // Evaluate one raw line. `line_number` is 1-based and only used for
    // error reporting.
    fn matches(&self, line: &str, line_number: usize) -> Result<bool, FilterError> {
        match self {
            Predicate::Marker { markers } => {
                Ok(markers.iter().any(|marker| line.contains(marker.as_str())))
            }
            Predicate::Bbox(bbox) => {
                let record: Value = serde_json::from_str(line)
                    .map_err(|e| FilterError::parse(line_number, format!("invalid JSON: {}", e)))?;

                let coordinates = record
                    .get("geometry")
                    .and_then(|geometry| geometry.get("coordinates"))
                    .ok_or_else(|| {
                        FilterError::parse(line_number, "missing geometry.coordinates")
                    })?;

                any_position_inside(coordinates, bbox)
                    .map_err(|reason| FilterError::parse(line_number, reason))
            }
        }
    }
}

// Walk a `coordinates` value of any nesting depth (Point, LineString,
// MultiPolygon, ...) and test each [lon, lat] position against the box.
// Stops at the first position inside.
fn any_position_inside(value: &Value, bbox: &BoundingBox) -> Result<bool, String> {
    let items = match value.as_array() {
        Some(items) => items,
        None => return Err("coordinates must be an array".to_string()),
    };

    if items.is_empty() {
        return Ok(false);
    }

    // An array starting with a number is a single position. Positions may
    // carry extra elements (altitude); only the first two are read.
    if items[0].is_number() {
        let x = items[0].as_f64();
        let y = items.get(1).and_then(Value::as_f64);
        return match (x, y) {
            (Some(x), Some(y)) => Ok(bbox.contains(x, y)),
            _ => Err("position holds fewer than two numbers".to_string()),
        };
    }

    for item in items {
        if any_position_inside(item, bbox)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Counts reported after a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub lines_read: usize,
    pub lines_kept: usize,
}

/// Stream `source` line by line and write every line matched by `predicate`
/// to `sink`, truncating any existing sink content. Retained lines are
/// written byte-identical to the input, in input order, each terminated by a
/// newline. Memory use is bounded by the longest line.
///
/// A malformed record under the bounding-box predicate aborts the run unless
/// `skip_malformed` is set, in which case the record is dropped (it still
/// counts as read).
pub fn run(
    source: &Path,
    sink: &Path,
    predicate: &Predicate,
    skip_malformed: bool,
) -> Result<FilterSummary, FilterError> {
    println!("Filtering file: {}", source.display());

    let input = File::open(source).map_err(|e| FilterError::io(source, e))?;
    let reader = BufReader::new(input);

    let output = File::create(sink).map_err(|e| FilterError::io(sink, e))?;
    let mut writer = BufWriter::new(output);

    let mut summary = FilterSummary {
        lines_read: 0,
        lines_kept: 0,
    };

    for line in reader.lines() {
        let line = line.map_err(|e| FilterError::io(source, e))?;
        summary.lines_read += 1;

        if summary.lines_read % 100_000 == 0 {
            println!(
                "Processed {} lines ({} kept)",
                summary.lines_read, summary.lines_kept
            );
        }

        match predicate.matches(&line, summary.lines_read) {
            Ok(true) => {
                writer
                    .write_all(line.as_bytes())
                    .and_then(|_| writer.write_all(b"\n"))
                    .map_err(|e| FilterError::io(sink, e))?;
                summary.lines_kept += 1;
            }
            Ok(false) => {}
            Err(FilterError::Parse { .. }) if skip_malformed => {}
            Err(e) => return Err(e),
        }
    }

    writer.flush().map_err(|e| FilterError::io(sink, e))?;

    Ok(summary)
}
