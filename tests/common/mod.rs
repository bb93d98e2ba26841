/*!
 * Test doubles for the view controller: a geography source that counts fetches and
 * a chart backend that records every chart it creates and destroys.
 */
#![allow(dead_code)]

use drillmap::api::{DirSource, GeoSource};
use drillmap::chart::{Chart, ChartBackend};
use drillmap::models::{ChartOptions, MapPoint, RegionCode, SeriesSpec};
use drillmap::{MapError, Result};
use geojson::FeatureCollection;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn mapdata() -> PathBuf {
    fixtures().join("mapdata")
}

/// Fixture-backed source that records what was fetched.
#[derive(Clone)]
pub struct CountingSource {
    inner: DirSource,
    pub fail_world: bool,
    /// HTTP status returned for every region fetch instead of the fixture.
    pub region_status: Option<u16>,
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self {
            inner: DirSource::new(mapdata()),
            fail_world: false,
            region_status: None,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn region_calls(&self) -> usize {
        self.calls().iter().filter(|c| *c != "world").count()
    }

    pub fn world_calls(&self) -> usize {
        self.calls().iter().filter(|c| *c == "world").count()
    }
}

impl GeoSource for CountingSource {
    fn world(&self) -> Result<FeatureCollection> {
        self.calls.borrow_mut().push("world".into());
        if self.fail_world {
            return Err(MapError::HttpStatus {
                url: "world".into(),
                status: 503,
            });
        }
        self.inner.world()
    }

    fn region(&self, code: &RegionCode) -> Result<FeatureCollection> {
        self.calls.borrow_mut().push(code.to_string());
        if let Some(status) = self.region_status {
            return Err(MapError::HttpStatus {
                url: format!("countries/{code}/{code}-all.geo.json"),
                status,
            });
        }
        self.inner.region(code)
    }
}

#[derive(Debug, Default)]
pub struct Journal {
    pub created: Vec<String>,
    pub destroyed: Vec<String>,
    pub live: usize,
    pub max_live: usize,
}

/// Backend whose charts only remember their state.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub journal: Rc<RefCell<Journal>>,
    pub fail_next_create: Rc<RefCell<bool>>,
    pub fail_next_loading: Rc<RefCell<bool>>,
}

impl RecordingBackend {
    pub fn created(&self) -> usize {
        self.journal.borrow().created.len()
    }

    pub fn destroyed(&self) -> usize {
        self.journal.borrow().destroyed.len()
    }

    pub fn live(&self) -> usize {
        self.journal.borrow().live
    }

    pub fn max_live(&self) -> usize {
        self.journal.borrow().max_live
    }
}

impl ChartBackend for RecordingBackend {
    type Chart = RecordedChart;

    fn create(&mut self, options: ChartOptions) -> Result<RecordedChart> {
        if self.fail_next_create.replace(false) {
            return Err(MapError::Render("surface unavailable".into()));
        }
        let mut j = self.journal.borrow_mut();
        j.created.push(options.title.clone());
        j.live += 1;
        j.max_live = j.max_live.max(j.live);
        Ok(RecordedChart {
            options,
            loading: None,
            drilldown: None,
            journal: Rc::clone(&self.journal),
            fail_next_loading: Rc::clone(&self.fail_next_loading),
        })
    }
}

#[derive(Debug)]
pub struct RecordedChart {
    options: ChartOptions,
    loading: Option<String>,
    drilldown: Option<MapPoint>,
    journal: Rc<RefCell<Journal>>,
    fail_next_loading: Rc<RefCell<bool>>,
}

impl Chart for RecordedChart {
    fn options(&self) -> &ChartOptions {
        &self.options
    }

    fn set_series(&mut self, series: SeriesSpec) -> Result<()> {
        self.options.series = vec![series];
        Ok(())
    }

    fn show_loading(&mut self, text: &str) -> Result<()> {
        if self.fail_next_loading.replace(false) {
            return Err(MapError::Render("disk full".into()));
        }
        self.loading = Some(text.into());
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<()> {
        self.loading = None;
        Ok(())
    }

    fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    fn set_current_drilldown(&mut self, point: MapPoint) {
        self.drilldown = Some(point);
    }

    fn current_drilldown(&self) -> Option<&MapPoint> {
        self.drilldown.as_ref()
    }

    fn destroy(self) -> Result<()> {
        let mut j = self.journal.borrow_mut();
        j.destroyed.push(self.options.title.clone());
        j.live -= 1;
        Ok(())
    }
}
