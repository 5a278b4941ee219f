use std::path::Path;

use geo::Rect;

pub mod error;
pub mod extent;
pub mod filter;

pub use error::FilterError;
pub use filter::{BoundingBox, FilterSummary, Predicate, GEOMETRY_MARKERS};

/// Filter `source` into `sink`, keeping the lines matched by `predicate`.
pub fn filter_file(
    source: &Path,
    sink: &Path,
    predicate: &Predicate,
    skip_malformed: bool,
) -> Result<FilterSummary, FilterError> {
    filter::run(source, sink, predicate, skip_malformed)
}

/// Overall lon/lat extent of a GeoJSONL file, if it holds any supported
/// geometry.
pub fn file_extent(path: &Path) -> Result<Option<Rect<f64>>, FilterError> {
    extent::file_extent(path)
}
