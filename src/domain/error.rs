// Error taxonomy for the fetch -> render cycle
use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the time-series store.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot reach time-series store at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("query failed: {0}")]
    Query(String),

    #[error("malformed store response: {0}")]
    Response(String),
}

/// Why a single raw row could not become a data point.
#[derive(Debug, Error, PartialEq)]
pub enum PointError {
    #[error("missing 'time' field")]
    MissingTime,

    #[error("missing 'mean' field")]
    MissingMean,

    #[error("unparsable timestamp {0:?}")]
    InvalidTime(String),

    #[error("non-numeric mean {0}")]
    InvalidMean(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no series has any data points")]
    NoData,

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("image encoder failed: {0}")]
    Encoding(String),

    #[error("intermediate image was not created: {}", .0.display())]
    MissingIntermediate(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid time range {0:?}, expected e.g. 60m or 6h")]
    InvalidTimeRange(String),

    #[error("display size must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("at least one series must be configured")]
    NoSeries,

    #[error("series {0:?} is configured more than once")]
    DuplicateSeries(String),

    #[error("output path {} has no file name", .0.display())]
    InvalidOutputPath(PathBuf),

    #[error("value_scale must be a finite number, got {0}")]
    InvalidValueScale(f64),
}
