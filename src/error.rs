use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("geography file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not decode geography: {0}")]
    Decode(String),

    #[error("geography is not a feature collection")]
    NotFeatureCollection,

    #[error("point '{name}' has no iso-a2 property")]
    MissingRegionCode { name: String },

    #[error("invalid region code: {0:?}")]
    InvalidRegionCode(String),

    #[error("no chart is mounted")]
    NotMounted,

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MapError {
    /// HTTP status carried by the error, if it came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            MapError::HttpStatus { status, .. } => Some(*status),
            MapError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}
