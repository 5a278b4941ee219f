use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Geometry, LineString, MultiPolygon, Point, Polygon, Rect};
use geojson::{GeoJson, Value as GeoJsonValue};

use crate::error::FilterError;

/// Overall longitude/latitude extent of every supported geometry in a
/// GeoJSONL file, streamed one record per line.
///
/// Returns `None` when the file holds no supported geometries (including an
/// empty file). A line that is not valid GeoJSON is a parse error.
pub fn file_extent(path: &Path) -> Result<Option<Rect<f64>>, FilterError> {
    println!("Calculating extent of: {}", path.display());
    let file = File::open(path).map_err(|e| FilterError::io(path, e))?;
    let reader = BufReader::new(file);

    // Fold every record's bounding rectangle into running min/max bounds.
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    let mut seen_geometry = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FilterError::io(path, e))?;
        if line.is_empty() {
            continue;
        }

        let record: GeoJson = line.parse().map_err(|e: geojson::Error| {
            FilterError::parse(index + 1, format!("invalid GeoJSON: {}", e))
        })?;

        let value = match record {
            GeoJson::Feature(feature) => feature.geometry.map(|geometry| geometry.value),
            GeoJson::Geometry(geometry) => Some(geometry.value),
            GeoJson::FeatureCollection(_) => None,
        };

        let geometry = match value.as_ref().and_then(to_geometry) {
            Some(geometry) => geometry,
            None => continue,
        };

        if let Some(rect) = geometry.bounding_rect() {
            min_x = min_x.min(rect.min().x);
            min_y = min_y.min(rect.min().y);
            max_x = max_x.max(rect.max().x);
            max_y = max_y.max(rect.max().y);
            seen_geometry = true;
        }
    }

    if seen_geometry {
        Ok(Some(Rect::new((min_x, min_y), (max_x, max_y))))
    } else {
        Ok(None)
    }
}

// Convert the geometry kinds this tool works with; everything else is
// skipped rather than rejected.
fn to_geometry(value: &GeoJsonValue) -> Option<Geometry<f64>> {
    match value {
        GeoJsonValue::Point(coord) if coord.len() >= 2 => {
            Some(Geometry::Point(Point::new(coord[0], coord[1])))
        }
        GeoJsonValue::LineString(coords) => {
            let points: Vec<_> = coords.iter().map(|coord| (coord[0], coord[1]).into()).collect();
            Some(Geometry::LineString(LineString::new(points)))
        }
        GeoJsonValue::Polygon(rings) => polygon_from_rings(rings).map(Geometry::Polygon),
        GeoJsonValue::MultiPolygon(polygons) => {
            let polygons: Vec<_> = polygons.iter().filter_map(|rings| polygon_from_rings(rings)).collect();
            Some(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        _ => None,
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    let exterior: Vec<_> = exterior.iter().map(|coord| (coord[0], coord[1]).into()).collect();
    let holes: Vec<LineString<f64>> = holes
        .iter()
        .map(|ring| LineString::new(ring.iter().map(|coord| (coord[0], coord[1]).into()).collect()))
        .collect();
    Some(Polygon::new(LineString::new(exterior), holes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn extent_of(lines: &[&str]) -> Result<Option<Rect<f64>>, FilterError> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.geojsonl");
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        file_extent(&path)
    }

    #[test]
    fn folds_records_into_one_extent() {
        let rect = extent_of(&[
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[[18.9,47.4],[19.1,47.5]]},"properties":{}}"#,
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[19.3,47.6]},"properties":{}}"#,
        ])
        .unwrap()
        .unwrap();

        assert_eq!(rect.min().x, 18.9);
        assert_eq!(rect.min().y, 47.4);
        assert_eq!(rect.max().x, 19.3);
        assert_eq!(rect.max().y, 47.6);
    }

    #[test]
    fn handles_bare_geometry_records() {
        let rect = extent_of(&[
            r#"{"type":"MultiPolygon","coordinates":[[[[19.0,47.5],[19.2,47.5],[19.2,47.7],[19.0,47.5]]]]}"#,
        ])
        .unwrap()
        .unwrap();

        assert_eq!(rect.min().x, 19.0);
        assert_eq!(rect.max().y, 47.7);
    }

    #[test]
    fn empty_file_has_no_extent() {
        assert!(extent_of(&[]).unwrap().is_none());
    }

    #[test]
    fn unsupported_geometry_kinds_are_skipped() {
        let result = extent_of(&[
            r#"{"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[[[19.0,47.5],[19.1,47.6]]]},"properties":{}}"#,
        ])
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn invalid_line_is_a_parse_error() {
        let err = extent_of(&["not geojson"]).unwrap_err();
        assert!(matches!(err, FilterError::Parse { line: 1, .. }));
    }

    #[test]
    fn feature_without_geometry_is_skipped() {
        let result = extent_of(&[
            r#"{"type":"Feature","geometry":null,"properties":{"name":"no shape"}}"#,
        ])
        .unwrap();
        assert!(result.is_none());
    }
}
