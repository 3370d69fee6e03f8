// InfluxDB repository implementation
use crate::application::series_repository::{RawPoint, SeriesStore, StoreConnection};
use crate::domain::error::FetchError;
use crate::infrastructure::config::InfluxSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    base_url: String,
    database: String,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    #[serde(default)]
    results: Vec<InfluxQLResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Self {
        let host = settings.host.trim_end_matches('/');
        let base_url = if host.contains("://") {
            format!("{}:{}", host, settings.port)
        } else {
            format!("{}://{}:{}", settings.scheme, host, settings.port)
        };

        Self {
            base_url,
            database: settings.database.clone(),
            token: settings.token.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_query_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/query?db={}&q={}",
            self.base_url,
            urlencoding::encode(&self.database),
            urlencoding::encode(query)
        );
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            url.push_str(&format!(
                "&u={}&p={}",
                urlencoding::encode(user),
                urlencoding::encode(pass)
            ));
        }
        url
    }

    fn connection_error(&self, reason: impl ToString) -> FetchError {
        FetchError::Connection {
            endpoint: format!("{}/{}", self.base_url, self.database),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl SeriesStore for InfluxRepository {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.connection_error(e))?;

        let response = client
            .get(format!("{}/ping", self.base_url))
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        if !response.status().is_success() {
            return Err(self.connection_error(format!("ping returned {}", response.status())));
        }

        tracing::debug!("InfluxDB at {} answered ping", self.base_url);
        Ok(Box::new(InfluxConnection {
            client,
            repository: self.clone(),
        }))
    }
}

/// Owns the HTTP client (and with it the connection pool) for one cycle.
pub struct InfluxConnection {
    client: reqwest::Client,
    repository: InfluxRepository,
}

impl InfluxConnection {
    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse, FetchError> {
        let url = self.repository.build_query_url(query);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(token) = &self.repository.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Query(format!("failed to send request to InfluxDB: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Query(format!(
                "InfluxDB query failed with status {}: {}",
                status, body
            )));
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .map_err(|e| FetchError::Response(e.to_string()))?;

        if let Some(error) = &data.error {
            return Err(FetchError::Query(error.clone()));
        }
        if let Some(error) = data.results.iter().find_map(|r| r.error.as_ref()) {
            return Err(FetchError::Query(error.clone()));
        }

        Ok(data)
    }
}

#[async_trait]
impl StoreConnection for InfluxConnection {
    async fn query_points(
        &self,
        query: &str,
        measurement: &str,
    ) -> Result<Vec<RawPoint>, FetchError> {
        let response = self.execute_query(query).await?;
        Ok(points_from_response(&response, measurement))
    }
}

impl Drop for InfluxConnection {
    fn drop(&mut self) {
        tracing::info!("Disconnected from InfluxDB at {}", self.repository.base_url);
    }
}

/// Flatten every row of the series named `measurement` into raw points.
fn points_from_response(response: &InfluxQLResponse, measurement: &str) -> Vec<RawPoint> {
    let mut points = Vec::new();

    let series = response
        .results
        .iter()
        .filter_map(|r| r.series.as_ref())
        .flatten()
        .filter(|s| s.name == measurement);

    for s in series {
        let time_idx = s.columns.iter().position(|c| c == "time");
        let mean_idx = s.columns.iter().position(|c| c == "mean");

        for value_row in &s.values {
            let cell = |idx: Option<usize>| idx.and_then(|i| value_row.get(i)).cloned();
            points.push(RawPoint::new(cell(time_idx), cell(mean_idx)));
        }
    }

    points
}
