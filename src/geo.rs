//! Geo feature collections: parsing, conversion into map points, and the bits of
//! planar geometry the renderer needs (rings, bounds, label anchors).
//!
//! Coordinates are used as given (lon/lat or pre-projected x/y); y grows upward.

use crate::error::{MapError, Result};
use crate::models::{MapPoint, number_from_json};
use geojson::{FeatureCollection, GeoJson, Geometry, Value};

/// Parse GeoJSON text that must hold a FeatureCollection.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let gj: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| MapError::Decode(e.to_string()))?;
    match gj {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(MapError::NotFeatureCollection),
    }
}

/// One map point per feature. `name` comes from the `name` (or `NAME`) property and
/// a numeric `value` property becomes the point value.
pub fn to_map_points(collection: FeatureCollection) -> Vec<MapPoint> {
    collection
        .features
        .into_iter()
        .map(|f| {
            let properties = f.properties.unwrap_or_default();
            let name = ["name", "NAME"]
                .iter()
                .find_map(|k| properties.get(*k).and_then(|v| v.as_str()))
                .unwrap_or_default()
                .to_string();
            let value = properties.get("value").and_then(number_from_json);
            MapPoint {
                name,
                properties,
                geometry: f.geometry,
                value,
            }
        })
        .collect()
}

/// Outer rings of all polygons in a geometry, as (x, y) pairs. Holes are skipped.
pub fn outer_rings(geometry: &Geometry) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    collect_rings(&geometry.value, &mut out);
    out
}

fn collect_rings(value: &Value, out: &mut Vec<Vec<(f64, f64)>>) {
    let ring = |r: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        r.iter()
            .filter(|p| p.len() >= 2)
            .map(|p| (p[0], p[1]))
            .collect()
    };
    match value {
        Value::Polygon(rings) => {
            if let Some(outer) = rings.first() {
                out.push(ring(outer));
            }
        }
        Value::MultiPolygon(polys) => {
            for rings in polys {
                if let Some(outer) = rings.first() {
                    out.push(ring(outer));
                }
            }
        }
        Value::GeometryCollection(geoms) => {
            for g in geoms {
                collect_rings(&g.value, out);
            }
        }
        _ => {}
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of every ring of every point, or `None` when nothing has geometry.
    pub fn of_points(points: &[MapPoint]) -> Option<Bounds> {
        let mut b: Option<Bounds> = None;
        for ring in points
            .iter()
            .filter_map(|p| p.geometry.as_ref())
            .flat_map(outer_rings)
        {
            for (x, y) in ring {
                b = Some(match b {
                    None => Bounds {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                    },
                    Some(b) => Bounds {
                        min_x: b.min_x.min(x),
                        min_y: b.min_y.min(y),
                        max_x: b.max_x.max(x),
                        max_y: b.max_y.max(y),
                    },
                });
            }
        }
        b
    }

    /// Widen degenerate extents so the coordinate range is never empty.
    pub fn padded(self) -> Bounds {
        let mut b = self;
        if (b.max_x - b.min_x).abs() < f64::EPSILON {
            b.min_x -= 1.0;
            b.max_x += 1.0;
        }
        if (b.max_y - b.min_y).abs() < f64::EPSILON {
            b.min_y -= 1.0;
            b.max_y += 1.0;
        }
        b
    }
}

/// Signed area and centroid of a closed ring (shoelace formula).
fn ring_centroid(ring: &[(f64, f64)]) -> Option<(f64, (f64, f64))> {
    if ring.len() < 3 {
        return None;
    }
    let (mut a, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..ring.len() {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % ring.len()];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if a.abs() < f64::EPSILON {
        return None;
    }
    let a = a / 2.0;
    Some((a.abs(), (cx / (6.0 * a), cy / (6.0 * a))))
}

/// Label anchor for a point: centroid of its largest outer ring.
pub fn label_anchor(point: &MapPoint) -> Option<(f64, f64)> {
    let rings = outer_rings(point.geometry.as_ref()?);
    rings
        .iter()
        .filter_map(|r| ring_centroid(r))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {"name": "Squareland", "iso-a2": "SQ", "value": "4"},
          "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}
        },
        {
          "type": "Feature",
          "properties": {"NAME": "Twin Isles"},
          "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[10,10],[11,10],[11,11],[10,11],[10,10]]],
            [[[20,20],[24,20],[24,24],[20,24],[20,20]]]
          ]}
        }
      ]
    }"#;

    #[test]
    fn parses_points_and_names() {
        let fc = parse_feature_collection(SAMPLE).unwrap();
        let pts = to_map_points(fc);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].name, "Squareland");
        assert_eq!(pts[0].value, Some(4.0));
        assert_eq!(pts[1].name, "Twin Isles");
        assert_eq!(pts[1].value, None);
    }

    #[test]
    fn rejects_non_collections() {
        let single = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        assert!(matches!(
            parse_feature_collection(single),
            Err(MapError::NotFeatureCollection)
        ));
        assert!(matches!(
            parse_feature_collection("not json"),
            Err(MapError::Decode(_))
        ));
    }

    #[test]
    fn bounds_and_anchor_follow_geometry() {
        let pts = to_map_points(parse_feature_collection(SAMPLE).unwrap());
        let b = Bounds::of_points(&pts).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 24.0, 24.0));

        let (x, y) = label_anchor(&pts[0]).unwrap();
        assert!((x - 1.0).abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
        // largest island wins
        let (x, y) = label_anchor(&pts[1]).unwrap();
        assert!((x - 22.0).abs() < 1e-9 && (y - 22.0).abs() < 1e-9);
    }
}
