// Store traits for time-series data access
use crate::domain::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// One row of an aggregation result before validation. Either cell may be
/// absent or null; the query client decides what to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPoint {
    pub time: Option<Value>,
    pub mean: Option<Value>,
}

impl RawPoint {
    pub fn new(time: Option<Value>, mean: Option<Value>) -> Self {
        Self { time, mean }
    }
}

#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Open a connection and verify the store answers a liveness check.
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, FetchError>;
}

/// A live connection. Dropping it releases the connection.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// Run `query` and return the rows of the result series named `measurement`.
    async fn query_points(&self, query: &str, measurement: &str)
    -> Result<Vec<RawPoint>, FetchError>;
}
