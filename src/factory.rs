//! Option sets for the two kinds of chart: the world view and a single-region view.

use crate::models::{
    ChartOptions, ColorAxis, DataLabels, DrilldownLabelStyle, JOIN_KEY_PROPERTY, KeyedValue,
    MapNavigation, MapPoint, SeriesSpec, Tooltip, VerticalAlign,
};

pub const WORLD_SERIES_NAME: &str = "World";
pub const WORLD_TITLE: &str = "World Map";

fn base_options(title: String, series: Vec<SeriesSpec>) -> ChartOptions {
    ChartOptions {
        title,
        color_axis: ColorAxis {
            min: 0.0,
            min_color: "#E6E7E8".into(),
            max_color: "#005645".into(),
        },
        map_navigation: MapNavigation {
            enabled: true,
            button_align: VerticalAlign::Bottom,
        },
        hover_color: "#EEDD66".into(),
        drilldown_label_style: DrilldownLabelStyle {
            color: "#FFFFFF".into(),
            text_decoration: "none".into(),
            text_outline: "1px #000000".into(),
        },
        series,
    }
}

/// The world series: one area per country, labelled with its name.
pub fn world_series(points: Vec<MapPoint>) -> SeriesSpec {
    SeriesSpec {
        name: WORLD_SERIES_NAME.into(),
        map_data: points,
        data_labels: Some(DataLabels {
            enabled: true,
            format: "{point.name}".into(),
        }),
        ..Default::default()
    }
}

/// Options for the world chart before any geography has arrived.
pub fn world_chart_options() -> ChartOptions {
    base_options(WORLD_TITLE.into(), vec![world_series(Vec::new())])
}

/// Options for the chart of one drilled-into region.
///
/// The series is named after the clicked point and joined by `hc-key` against
/// `values`, with a `name: value` tooltip.
pub fn region_chart_options(
    point: &MapPoint,
    points: Vec<MapPoint>,
    values: Vec<KeyedValue>,
) -> ChartOptions {
    let series = SeriesSpec {
        name: point.name.clone(),
        map_data: points,
        data: values,
        join_by: Some(JOIN_KEY_PROPERTY.into()),
        data_labels: None,
        tooltip: Some(Tooltip {
            header_format: String::new(),
            point_format: "{point.name}: {point.value}".into(),
        }),
    };
    base_options(format!("Map of {}", point.name), vec![series])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_chart_starts_with_one_empty_series() {
        let o = world_chart_options();
        assert_eq!(o.title, "World Map");
        assert_eq!(o.series.len(), 1);
        assert_eq!(o.series[0].name, "World");
        assert!(o.series[0].map_data.is_empty());
        assert_eq!(
            o.series[0].data_labels.as_ref().map(|d| d.format.as_str()),
            Some("{point.name}")
        );
    }

    #[test]
    fn region_chart_is_scoped_to_point() {
        let france = MapPoint {
            name: "France".into(),
            ..Default::default()
        };
        let o = region_chart_options(&france, Vec::new(), Vec::new());
        assert_eq!(o.title, "Map of France");
        assert_eq!(o.series[0].name, "France");
        assert_eq!(o.series[0].join_by.as_deref(), Some("hc-key"));
        let tip = o.series[0].tooltip.as_ref().unwrap();
        assert_eq!(tip.header_format, "");
        assert_eq!(tip.point_format, "{point.name}: {point.value}");
    }
}
