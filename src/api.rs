//! Geography sources for the map views.
//!
//! Two endpoints are consumed: a world feature collection and one feature collection
//! per region, addressed by the lower-cased two-letter code embedded in the path.
//! Both the HTTP [`Client`] and the offline [`DirSource`] resolve the same relative
//! paths through [`Endpoints`].
//!
//! ### Notes
//! - There is no retry and no cache. Every drill transition fetches again.
//! - A non-success HTTP status is surfaced as `MapError::HttpStatus`.
//! - The client has no request timeout unless one is set in [`ClientConfig`].
//!
//! Typical usage:
//! ```no_run
//! # use drillmap::api::{Client, GeoSource};
//! # use drillmap::models::RegionCode;
//! let client = Client::default();
//! let world = client.world()?;
//! let germany = client.region(&RegionCode::parse("DE")?)?;
//! # Ok::<(), drillmap::MapError>(())
//! ```
use crate::error::{MapError, Result};
use crate::geo::parse_feature_collection;
use crate::models::RegionCode;
use geojson::FeatureCollection;
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Anything that can hand out world and region geography.
pub trait GeoSource {
    fn world(&self) -> Result<FeatureCollection>;
    fn region(&self, code: &RegionCode) -> Result<FeatureCollection>;
}

impl<T: GeoSource + ?Sized> GeoSource for &T {
    fn world(&self) -> Result<FeatureCollection> {
        (**self).world()
    }
    fn region(&self, code: &RegionCode) -> Result<FeatureCollection> {
        (**self).region(code)
    }
}

impl<T: GeoSource + ?Sized> GeoSource for Box<T> {
    fn world(&self) -> Result<FeatureCollection> {
        (**self).world()
    }
    fn region(&self, code: &RegionCode) -> Result<FeatureCollection> {
        (**self).region(code)
    }
}

// Allow -, _, . unescaped in path segments
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment.trim(), SAFE).to_string()
}

/// Relative paths of the map data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: "https://code.highcharts.com/mapdata".into(),
        }
    }
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn world_path() -> String {
        "custom/world.geo.json".to_string()
    }

    /// `countries/{cc}/{cc}-all.geo.json`
    pub fn region_path(code: &RegionCode) -> String {
        let cc = enc(code.as_str());
        format!("countries/{cc}/{cc}-all.geo.json")
    }

    pub fn world_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), Self::world_path())
    }

    pub fn region_url(&self, code: &RegionCode) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            Self::region_path(code)
        )
    }
}

/// Knobs for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Total request timeout. `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: None,
            user_agent: concat!("drillmap/", env!("CARGO_PKG_VERSION")).to_string(),
            system_proxy: true,
        }
    }
}

/// Synchronous HTTP geography source.
#[derive(Debug, Clone)]
pub struct Client {
    pub endpoints: Endpoints,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default()).expect("reqwest client build")
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(config.user_agent);
        if let Some(t) = config.timeout {
            builder = builder.timeout(t);
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(|source| MapError::Network {
            url: config.endpoints.base_url.clone(),
            source,
        })?;
        Ok(Self {
            endpoints: config.endpoints,
            http,
        })
    }

    fn get_collection(&self, url: &str) -> Result<FeatureCollection> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|source| MapError::Network {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MapError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(|source| MapError::Network {
            url: url.to_string(),
            source,
        })?;
        parse_feature_collection(&body)
    }
}

impl GeoSource for Client {
    fn world(&self) -> Result<FeatureCollection> {
        self.get_collection(&self.endpoints.world_url())
    }

    fn region(&self, code: &RegionCode) -> Result<FeatureCollection> {
        self.get_collection(&self.endpoints.region_url(code))
    }
}

/// Offline mirror of the map data host laid out like the remote paths.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read(&self, rel: &str) -> Result<FeatureCollection> {
        let path = self.root.join(rel);
        debug!("read {}", path.display());
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MapError::NotFound { path });
            }
            Err(e) => return Err(e.into()),
        };
        parse_feature_collection(&text)
    }
}

impl GeoSource for DirSource {
    fn world(&self) -> Result<FeatureCollection> {
        self.read(&Endpoints::world_path())
    }

    fn region(&self, code: &RegionCode) -> Result<FeatureCollection> {
        self.read(&Endpoints::region_path(code))
    }
}
