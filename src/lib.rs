//! drillmap
//!
//! A small Rust library for rendering a world map that drills down into
//! country maps. Pairs with the `drillmap` CLI.
//!
//! ### Features
//! - Fetch world and per-country geography (GeoJSON) over HTTP or from a local mirror
//! - Render map charts to SVG with a colour axis and data labels
//! - Drive world/country transitions from click, drilldown and drill-up events
//! - Join value tables onto country maps and export what is shown as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use drillmap::{Client, DrillEvent, RegionCode, SvgBackend, ViewController};
//! use drillmap::chart::RenderOptions;
//!
//! let backend = SvgBackend::new("map.svg", RenderOptions::default());
//! let mut view = ViewController::new(Client::default(), backend);
//! view.initialize()?;
//! let germany = view.find_point(&RegionCode::parse("de")?).cloned();
//! if let Some(point) = germany {
//!     view.handle(DrillEvent::PointClick { point })?;
//! }
//! view.handle(view.drill_up_event())?;
//! # Ok::<(), drillmap::MapError>(())
//! ```

pub mod api;
pub mod chart;
pub mod controller;
pub mod error;
pub mod factory;
pub mod format;
pub mod geo;
pub mod models;
pub mod storage;

pub use api::{Client, DirSource, GeoSource};
pub use chart::{Chart, ChartBackend, SvgBackend};
pub use controller::ViewController;
pub use error::{MapError, Result};
pub use models::{DrillEvent, MapPoint, RegionCode, Transition, ViewState};
