//! The charting collaborator: a [`ChartBackend`] creates [`Chart`] handles from
//! [`ChartOptions`]. The controller only talks to these traits.
//!
//! [`SvgBackend`] is the bundled implementation. Its drawing surface is one SVG file
//! that is rewritten on every mutation, the way a mounted container is redrawn.
//!
//! - Areas are filled on the colour axis (`min_color` .. `max_color`), areas without
//!   a value use [`NULL_COLOR`]
//! - Data labels are placed at the centroid of each area's largest outer ring
//! - Labels of areas that can be drilled into use the drilldown label style
//! - The aspect ratio of the geography is preserved
//! - Text is emitted as SVG `<text>`, so no font has to be registered

use crate::error::{MapError, Result};
use crate::format::render_template;
use crate::geo::{Bounds, label_anchor, outer_rings};
use crate::models::{ChartOptions, ColorAxis, DrilldownLabelStyle, MapPoint, SeriesSpec};
use log::debug;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};

/// Fill for areas that carry no value.
pub const NULL_COLOR: RGBColor = RGBColor(0xF7, 0xF7, 0xF7);
const LABEL_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);
const OUTLINE_COLOR: RGBColor = RGBColor(0xA0, 0xA0, 0xA0);

/// A live chart. Dropping the handle without [`Chart::destroy`] leaves the surface as is.
pub trait Chart {
    fn options(&self) -> &ChartOptions;

    fn series(&self) -> &[SeriesSpec] {
        &self.options().series
    }

    /// Attach `series` as the single series of the chart.
    fn set_series(&mut self, series: SeriesSpec) -> Result<()>;

    fn show_loading(&mut self, text: &str) -> Result<()>;

    fn hide_loading(&mut self) -> Result<()>;

    /// Loading text while the indicator is shown.
    fn loading(&self) -> Option<&str>;

    fn set_current_drilldown(&mut self, point: MapPoint);

    fn current_drilldown(&self) -> Option<&MapPoint>;

    /// Tear the chart down. The handle is consumed.
    fn destroy(self) -> Result<()>
    where
        Self: Sized;
}

pub trait ChartBackend {
    type Chart: Chart;

    fn create(&mut self, options: ChartOptions) -> Result<Self::Chart>;
}

/// Size and number formatting of rendered charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub locale: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            locale: "en".into(),
        }
    }
}

/// Tooltip text of `point` in the first series of `options`.
pub fn tooltip_text(options: &ChartOptions, point: &MapPoint, locale: &str) -> Option<String> {
    let tip = options.series.first()?.tooltip.as_ref()?;
    Some(format!(
        "{}{}",
        render_template(&tip.header_format, point, locale),
        render_template(&tip.point_format, point, locale)
    ))
}

/// Parse `#RRGGBB`.
pub fn parse_hex_color(s: &str) -> Result<RGBColor> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || MapError::Render(format!("invalid colour {s:?}"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Fill and outline colour of a drilldown label style (`#FFFFFF`, `1px #000000`).
pub fn drilldown_label_colors(
    style: &DrilldownLabelStyle,
) -> Result<(RGBColor, Option<RGBColor>)> {
    let fill = parse_hex_color(&style.color)?;
    let outline = match style.text_outline.split_whitespace().last() {
        None | Some("none") => None,
        Some(c) => Some(parse_hex_color(c)?),
    };
    Ok((fill, outline))
}

/// Linear colour for `value` on the axis spanning `axis.min ..= max`.
pub fn axis_color(axis: &ColorAxis, max: f64, value: Option<f64>) -> Result<RGBColor> {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return Ok(NULL_COLOR);
    };
    let lo = parse_hex_color(&axis.min_color)?;
    let hi = parse_hex_color(&axis.max_color)?;
    let span = max - axis.min;
    let t = if span.abs() < f64::EPSILON {
        1.0
    } else {
        ((v - axis.min) / span).clamp(0.0, 1.0)
    };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Ok(RGBColor(mix(lo.0, hi.0), mix(lo.1, hi.1), mix(lo.2, hi.2)))
}

/// Creates [`SvgChart`]s that all draw onto the same surface file.
#[derive(Debug, Clone)]
pub struct SvgBackend {
    surface: PathBuf,
    render: RenderOptions,
}

impl SvgBackend {
    pub fn new<P: AsRef<Path>>(surface: P, render: RenderOptions) -> Self {
        Self {
            surface: surface.as_ref().to_path_buf(),
            render,
        }
    }

    pub fn surface(&self) -> &Path {
        &self.surface
    }
}

impl ChartBackend for SvgBackend {
    type Chart = SvgChart;

    fn create(&mut self, options: ChartOptions) -> Result<SvgChart> {
        let chart = SvgChart {
            surface: self.surface.clone(),
            render: self.render.clone(),
            options,
            loading: None,
            current_drilldown: None,
        };
        chart.redraw()?;
        Ok(chart)
    }
}

#[derive(Debug)]
pub struct SvgChart {
    surface: PathBuf,
    render: RenderOptions,
    options: ChartOptions,
    loading: Option<String>,
    current_drilldown: Option<MapPoint>,
}

impl SvgChart {
    pub fn surface(&self) -> &Path {
        &self.surface
    }

    fn redraw(&self) -> Result<()> {
        let size = (self.render.width, self.render.height);
        let root = SVGBackend::new(&self.surface, size).into_drawing_area();
        draw_map(
            root,
            &self.options,
            self.loading.as_deref(),
            &self.render.locale,
        )
    }
}

impl Chart for SvgChart {
    fn options(&self) -> &ChartOptions {
        &self.options
    }

    fn set_series(&mut self, series: SeriesSpec) -> Result<()> {
        self.options.series = vec![series];
        self.redraw()
    }

    fn show_loading(&mut self, text: &str) -> Result<()> {
        self.loading = Some(text.to_string());
        self.redraw()
    }

    fn hide_loading(&mut self) -> Result<()> {
        if self.loading.take().is_some() {
            self.redraw()?;
        }
        Ok(())
    }

    fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    fn set_current_drilldown(&mut self, point: MapPoint) {
        self.current_drilldown = Some(point);
    }

    fn current_drilldown(&self) -> Option<&MapPoint> {
        self.current_drilldown.as_ref()
    }

    fn destroy(self) -> Result<()> {
        debug!("destroy chart '{}'", self.options.title);
        let size = (self.render.width, self.render.height);
        let root = SVGBackend::new(&self.surface, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| MapError::Render(format!("{e:?}")))?;
        root.present()
            .map_err(|e| MapError::Render(format!("{e:?}")))?;
        Ok(())
    }
}

/// Helper that draws a map chart to any Plotters backend.
fn draw_map<DB>(
    root: DrawingArea<DB, Shift>,
    options: &ChartOptions,
    loading: Option<&str>,
    locale: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    const TITLE_PX: i32 = 44;
    const MARGIN: i32 = 12;
    let err = |e: DrawingAreaErrorKind<DB::ErrorType>| MapError::Render(format!("{e:?}"));

    root.fill(&WHITE).map_err(err)?;
    let (w, h) = root.dim_in_pixel();

    let title_style = TextStyle::from(("sans-serif", 22).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw_text(&options.title, &title_style, (w as i32 / 2, 10))
        .map_err(err)?;

    let (_, plot_area) = root.split_vertically(TITLE_PX);
    let plot_area = plot_area.margin(MARGIN, MARGIN, MARGIN, MARGIN);

    let series_points: Vec<(&SeriesSpec, Vec<MapPoint>)> = options
        .series
        .iter()
        .map(|s| (s, s.resolved_points()))
        .collect();
    let all_points: Vec<MapPoint> = series_points
        .iter()
        .flat_map(|(_, pts)| pts.iter().cloned())
        .collect();

    if let Some(bounds) = Bounds::of_points(&all_points) {
        let (pw, ph) = plot_area.dim_in_pixel();
        let b = fit_aspect(bounds.padded(), pw.max(1) as f64, ph.max(1) as f64);
        let mut chart = ChartBuilder::on(&plot_area)
            .build_cartesian_2d(b.min_x..b.max_x, b.min_y..b.max_y)
            .map_err(err)?;

        let max_value = all_points
            .iter()
            .filter_map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(options.color_axis.min, f64::max);
        let outline = OUTLINE_COLOR.stroke_width(1);
        let label_style = TextStyle::from(("sans-serif", 10).into_font())
            .color(&LABEL_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let (active_fill, active_outline) =
            drilldown_label_colors(&options.drilldown_label_style)?;
        let active_style = TextStyle::from(("sans-serif", 10).into_font())
            .color(&active_fill)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let outline_style = active_outline.as_ref().map(|c| {
            TextStyle::from(("sans-serif", 10).into_font())
                .color(c)
                .pos(Pos::new(HPos::Center, VPos::Center))
        });

        for (series, points) in &series_points {
            for p in points {
                let Some(geometry) = p.geometry.as_ref() else {
                    continue;
                };
                let fill = axis_color(&options.color_axis, max_value, p.value)?;
                for ring in outer_rings(geometry) {
                    chart
                        .draw_series(std::iter::once(Polygon::new(ring.clone(), fill.filled())))
                        .map_err(err)?;
                    chart
                        .draw_series(std::iter::once(PathElement::new(ring, outline)))
                        .map_err(err)?;
                }
            }

            if let Some(labels) = series.data_labels.as_ref().filter(|d| d.enabled) {
                for p in points {
                    let Some(anchor) = label_anchor(p) else {
                        continue;
                    };
                    let text = render_template(&labels.format, p, locale);
                    if text.is_empty() {
                        continue;
                    }
                    let (x, y) = chart.backend_coord(&anchor);
                    if p.region_code().is_err() {
                        root.draw_text(&text, &label_style, (x, y)).map_err(err)?;
                        continue;
                    }
                    if let Some(outline) = outline_style.as_ref() {
                        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                            root.draw_text(&text, outline, (x + dx, y + dy))
                                .map_err(err)?;
                        }
                    }
                    root.draw_text(&text, &active_style, (x, y)).map_err(err)?;
                }
            }
        }
    }

    if let Some(text) = loading {
        root.fill(&WHITE.mix(0.5)).map_err(err)?;
        let style = TextStyle::from(("sans-serif", 18).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw_text(text, &style, (w as i32 / 2, h as i32 / 2))
            .map_err(err)?;
    }

    root.present().map_err(err)?;
    Ok(())
}

/// Grow `b` so that its aspect ratio matches a `width` x `height` pixel area.
fn fit_aspect(b: Bounds, width: f64, height: f64) -> Bounds {
    let dw = b.max_x - b.min_x;
    let dh = b.max_y - b.min_y;
    let target = width / height;
    if dw / dh > target {
        let grow = (dw / target - dh) / 2.0;
        Bounds {
            min_y: b.min_y - grow,
            max_y: b.max_y + grow,
            ..b
        }
    } else {
        let grow = (dh * target - dw) / 2.0;
        Bounds {
            min_x: b.min_x - grow,
            max_x: b.max_x + grow,
            ..b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::world_chart_options;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#005645").unwrap(), RGBColor(0, 0x56, 0x45));
        assert!(parse_hex_color("#05645").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
    }

    #[test]
    fn axis_interpolates_between_ends() {
        let axis = world_chart_options().color_axis;
        assert_eq!(axis_color(&axis, 10.0, None).unwrap(), NULL_COLOR);
        assert_eq!(
            axis_color(&axis, 10.0, Some(0.0)).unwrap(),
            RGBColor(0xE6, 0xE7, 0xE8)
        );
        assert_eq!(
            axis_color(&axis, 10.0, Some(10.0)).unwrap(),
            RGBColor(0x00, 0x56, 0x45)
        );
        // values above the data max clamp to the max colour
        assert_eq!(
            axis_color(&axis, 10.0, Some(50.0)).unwrap(),
            RGBColor(0x00, 0x56, 0x45)
        );
    }

    #[test]
    fn drilldown_label_style_colors() {
        let style = world_chart_options().drilldown_label_style;
        assert_eq!(
            drilldown_label_colors(&style).unwrap(),
            (WHITE, Some(RGBColor(0, 0, 0)))
        );
        let plain = DrilldownLabelStyle {
            text_outline: "none".into(),
            ..style
        };
        assert_eq!(drilldown_label_colors(&plain).unwrap().1, None);
    }

    #[test]
    fn aspect_fit_only_grows() {
        let b = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 10.0,
        };
        let f = fit_aspect(b, 200.0, 100.0);
        assert_eq!((f.min_y, f.max_y), (0.0, 10.0));
        assert_eq!((f.min_x, f.max_x), (-5.0, 15.0));
    }
}
