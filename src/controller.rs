//! View controller: owns the current chart and moves it between the world view and
//! a region view in response to [`DrillEvent`]s.
//!
//! ### States
//! `Unmounted` -> (`initialize`) -> `World`
//! `World` -> (point click / drilldown without series options) -> `Transitioning`
//! -> (region fetched) -> `Region`
//! `Region` -> (point click) -> `Region`, nothing happens: region areas are not clickable
//! `Region` -> (drill-up with series options) -> `Transitioning` -> (world fetched) -> `World`
//!
//! At most one chart is live at any time: the old chart is destroyed before the new
//! one is created, and [`Chart::destroy`] consumes the handle.
//!
//! Every transition runs to completion inside one `&mut self` call, so a second
//! event cannot interleave with a pending fetch. An event that still finds the
//! controller `Transitioning` (a previous transition aborted on a chart error) is
//! ignored.

use crate::api::GeoSource;
use crate::chart::{Chart, ChartBackend, tooltip_text};
use crate::error::{MapError, Result};
use crate::factory::{region_chart_options, world_chart_options, world_series};
use crate::geo::to_map_points;
use crate::models::{
    DrillEvent, KeyedValue, MapPoint, RegionCode, SeriesSpec, Transition, ViewState,
};
use log::{debug, error, info, warn};

pub struct ViewController<S, B>
where
    S: GeoSource,
    B: ChartBackend,
{
    source: S,
    backend: B,
    chart: Option<B::Chart>,
    state: ViewState,
    /// Values joined onto region maps by `hc-key`.
    values: Vec<KeyedValue>,
    locale: String,
}

impl<S, B> ViewController<S, B>
where
    S: GeoSource,
    B: ChartBackend,
{
    pub fn new(source: S, backend: B) -> Self {
        Self {
            source,
            backend,
            chart: None,
            state: ViewState::Unmounted,
            values: Vec::new(),
            locale: "en".into(),
        }
    }

    /// Values used to colour region maps.
    pub fn with_values(mut self, values: Vec<KeyedValue>) -> Self {
        self.values = values;
        self
    }

    /// Locale tag for tooltips.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn chart(&self) -> Option<&B::Chart> {
        self.chart.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mount the world chart with an empty series and load the world geography.
    pub fn initialize(&mut self) -> Result<()> {
        if let Some(old) = self.chart.take() {
            old.destroy()?;
        }
        self.chart = Some(self.backend.create(world_chart_options())?);
        self.state = ViewState::World;
        self.load_world_map()
    }

    /// Fetch the world geography and attach it as the chart's single series.
    ///
    /// A failed fetch clears the loading indicator, is logged, and is returned; the
    /// chart stays mounted with whatever series it had.
    pub fn load_world_map(&mut self) -> Result<()> {
        let chart = self.chart.as_mut().ok_or(MapError::NotMounted)?;
        chart.show_loading("Loading world map...")?;
        match self.source.world() {
            Ok(collection) => {
                let points = to_map_points(collection);
                info!("loaded world map with {} areas", points.len());
                chart.hide_loading()?;
                chart.set_series(world_series(points))?;
                self.state = ViewState::World;
                Ok(())
            }
            Err(e) => {
                chart.hide_loading()?;
                error!("Failed to fetch world map: {e}");
                self.state = ViewState::World;
                Err(e)
            }
        }
    }

    /// Dispatch one interaction event.
    pub fn handle(&mut self, event: DrillEvent) -> Result<Transition> {
        if self.state == ViewState::Transitioning {
            warn!("ignoring {event:?}: a transition is in progress");
            return Ok(Transition::Ignored);
        }
        match event {
            DrillEvent::PointClick { point } if matches!(self.state, ViewState::Region { .. }) => {
                debug!("ignoring click on '{}': region areas are not clickable", point.name);
                Ok(Transition::Ignored)
            }
            DrillEvent::PointClick { point } => self.point_click(point),
            DrillEvent::LibraryDrilldown {
                series_options: Some(_),
                ..
            } => {
                debug!("drilldown carries its own series; nothing to fetch");
                Ok(Transition::Ignored)
            }
            DrillEvent::LibraryDrilldown {
                series_options: None,
                point,
            } => self.drilldown(point),
            DrillEvent::DrillUp { series_options } => self.after_drill_up(series_options),
        }
    }

    /// A click on a map area behaves as a drilldown on that area.
    pub fn point_click(&mut self, point: MapPoint) -> Result<Transition> {
        self.drilldown(point)
    }

    /// Replace the current chart by the chart of the region `point` stands for.
    ///
    /// A failed fetch is logged, clears the loading indicator and leaves the current
    /// chart in place.
    pub fn drilldown(&mut self, point: MapPoint) -> Result<Transition> {
        if self.chart.is_none() {
            return Err(MapError::NotMounted);
        }
        let code = point.region_code()?;
        if let Some(chart) = self.chart.as_mut() {
            chart.show_loading(&format!("Loading map for {}...", point.name))?;
        }
        let previous = std::mem::replace(&mut self.state, ViewState::Transitioning);

        let collection = match self.source.region(&code) {
            Ok(c) => c,
            Err(e) => {
                self.state = previous;
                if let Some(chart) = self.chart.as_mut() {
                    chart.hide_loading()?;
                }
                error!("Failed to fetch map data for {}: {e}", point.name);
                return Ok(Transition::Failed(e));
            }
        };

        if let Some(old) = self.chart.take() {
            old.destroy()?;
        }
        let options =
            region_chart_options(&point, to_map_points(collection), self.values.clone());
        let mut chart = self.backend.create(options)?;
        info!("drilled down into {} ({code})", point.name);
        let name = point.name.clone();
        chart.set_current_drilldown(point);
        self.chart = Some(chart);
        self.state = ViewState::Region {
            code: code.clone(),
            name,
        };
        Ok(Transition::Region(code))
    }

    /// Return to a freshly fetched world chart. Only a drill-up that carries series
    /// options does anything.
    pub fn after_drill_up(&mut self, series_options: Option<SeriesSpec>) -> Result<Transition> {
        if series_options.is_none() {
            debug!("drill-up without series options; keeping the current chart");
            return Ok(Transition::Ignored);
        }
        self.state = ViewState::Transitioning;
        if let Some(old) = self.chart.take() {
            old.destroy()?;
        }
        self.chart = Some(self.backend.create(world_chart_options())?);
        match self.load_world_map() {
            Ok(()) => Ok(Transition::World),
            Err(e) => Ok(Transition::Failed(e)),
        }
    }

    /// Point of the current chart for a region code, matched on `iso-a2`.
    pub fn find_point(&self, code: &RegionCode) -> Option<&MapPoint> {
        self.chart
            .as_ref()?
            .series()
            .iter()
            .flat_map(|s| s.map_data.iter())
            .find(|p| p.region_code().is_ok_and(|c| &c == code))
    }

    /// Point of the current chart whose `hc-key` (or `iso-a2`) matches `key`,
    /// with joined values applied.
    pub fn find_area(&self, key: &str) -> Option<MapPoint> {
        let key = key.trim().to_ascii_lowercase();
        self.chart
            .as_ref()?
            .series()
            .iter()
            .flat_map(|s| s.resolved_points())
            .find(|p| {
                ["hc-key", "iso-a2"].iter().any(|prop| {
                    p.property(prop)
                        .is_some_and(|v| v.to_ascii_lowercase() == key)
                })
            })
    }

    /// Tooltip of an area of the current chart, when the chart defines one.
    pub fn tooltip(&self, key: &str) -> Option<String> {
        let chart = self.chart.as_ref()?;
        let point = self.find_area(key)?;
        tooltip_text(chart.options(), &point, &self.locale)
    }

    /// Points of the current chart with joined values applied.
    pub fn current_points(&self) -> Vec<MapPoint> {
        self.chart
            .as_ref()
            .map(|c| c.series().iter().flat_map(|s| s.resolved_points()).collect())
            .unwrap_or_default()
    }

    /// Drill-up event for the chart that is currently shown.
    pub fn drill_up_event(&self) -> DrillEvent {
        DrillEvent::DrillUp {
            series_options: self.chart.as_ref().and_then(|c| c.series().first().cloned()),
        }
    }
}
