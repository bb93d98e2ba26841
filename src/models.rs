use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Property that carries the two-letter country code on world map points.
pub const REGION_CODE_PROPERTY: &str = "iso-a2";
/// Property that region series are joined by.
pub const JOIN_KEY_PROPERTY: &str = "hc-key";

/// Lower-cased ISO two-letter region code, e.g. `de`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionCode(String);

impl RegionCode {
    /// Normalize user or map input. Exactly two ASCII letters are accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_lowercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(Self(code))
        } else {
            Err(MapError::InvalidRegionCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One map area as the chart sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub name: String,
    pub properties: Map<String, Value>,
    #[serde(skip)]
    pub geometry: Option<geojson::Geometry>,
    pub value: Option<f64>,
}

impl MapPoint {
    /// String view of a property; numbers are rendered, other shapes are ignored.
    pub fn property(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Region code from the `iso-a2` property.
    pub fn region_code(&self) -> Result<RegionCode> {
        let raw = self
            .property(REGION_CODE_PROPERTY)
            .ok_or_else(|| MapError::MissingRegionCode {
                name: self.name.clone(),
            })?;
        RegionCode::parse(&raw)
    }
}

/// Parse an `f64` from either a JSON number or a numeric string.
pub fn number_from_json(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A row of a value table, joined onto map points by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedValue {
    pub key: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLabels {
    pub enabled: bool,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    pub header_format: String,
    pub point_format: String,
}

/// Series configuration handed to the chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub map_data: Vec<MapPoint>,
    pub data: Vec<KeyedValue>,
    pub join_by: Option<String>,
    pub data_labels: Option<DataLabels>,
    pub tooltip: Option<Tooltip>,
}

impl SeriesSpec {
    /// Map points with joined values applied.
    ///
    /// Without `join_by` the map points are returned as-is. With it, a point whose
    /// join property matches a row key takes that row's value; unmatched points keep
    /// their own value.
    pub fn resolved_points(&self) -> Vec<MapPoint> {
        let Some(key) = self.join_by.as_deref() else {
            return self.map_data.clone();
        };
        self.map_data
            .iter()
            .map(|p| {
                let mut p = p.clone();
                if let Some(k) = p.property(key)
                    && let Some(row) = self.data.iter().find(|row| row.key == k)
                {
                    p.value = row.value;
                }
                p
            })
            .collect()
    }
}

/// Linear colour axis applied to point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAxis {
    pub min: f64,
    pub min_color: String,
    pub max_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNavigation {
    pub enabled: bool,
    pub button_align: VerticalAlign,
}

/// Label style of areas that can be drilled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrilldownLabelStyle {
    pub color: String,
    pub text_decoration: String,
    pub text_outline: String,
}

/// Full option set for one chart instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub title: String,
    pub color_axis: ColorAxis,
    pub map_navigation: MapNavigation,
    pub hover_color: String,
    pub drilldown_label_style: DrilldownLabelStyle,
    pub series: Vec<SeriesSpec>,
}

/// Interaction events delivered to the view controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillEvent {
    /// A map area was clicked.
    PointClick { point: MapPoint },
    /// The chart engine started a drilldown. Carries options when the engine
    /// supplies the next series itself.
    LibraryDrilldown {
        series_options: Option<SeriesSpec>,
        point: MapPoint,
    },
    /// The chart engine drilled up. Carries the options of the series it returns to.
    DrillUp { series_options: Option<SeriesSpec> },
}

/// Which chart the controller currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Unmounted,
    World,
    Region { code: RegionCode, name: String },
    Transitioning,
}

/// Result of handling one event.
#[derive(Debug)]
pub enum Transition {
    /// The event did not start a transition.
    Ignored,
    /// The region chart is now shown.
    Region(RegionCode),
    /// The world chart is now shown.
    World,
    /// The fetch failed; the previous chart is still mounted.
    Failed(MapError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point_with(props: Value) -> MapPoint {
        MapPoint {
            name: "Somewhere".into(),
            properties: props.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn region_code_is_lowercased() {
        let p = point_with(json!({"iso-a2": "DE"}));
        assert_eq!(p.region_code().unwrap().as_str(), "de");
    }

    #[test]
    fn placeholder_codes_are_rejected() {
        let p = point_with(json!({"iso-a2": "-99"}));
        assert!(matches!(
            p.region_code(),
            Err(MapError::InvalidRegionCode(_))
        ));
        let p = point_with(json!({"name": "Nowhere"}));
        assert!(matches!(
            p.region_code(),
            Err(MapError::MissingRegionCode { .. })
        ));
    }

    #[test]
    fn join_applies_matching_rows_only() {
        let series = SeriesSpec {
            name: "Germany".into(),
            map_data: vec![
                point_with(json!({"hc-key": "de-by"})),
                point_with(json!({"hc-key": "de-be"})),
            ],
            data: vec![KeyedValue {
                key: "de-by".into(),
                value: Some(13.1),
            }],
            join_by: Some(JOIN_KEY_PROPERTY.into()),
            ..Default::default()
        };
        let pts = series.resolved_points();
        assert_eq!(pts[0].value, Some(13.1));
        assert_eq!(pts[1].value, None);
    }

    #[test]
    fn numbers_from_strings_or_numbers() {
        assert_eq!(number_from_json(&json!(3)), Some(3.0));
        assert_eq!(number_from_json(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(number_from_json(&json!(null)), None);
    }
}
