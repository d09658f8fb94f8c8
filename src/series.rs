//! One-shot loader for a remote `{ x_data, y_data }` series, drawn as a line
//! chart.

use crate::chart::{ChartHandle, ChartKind, ChartOptions, ChartRenderer, ChartSpec, Dataset};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

/// NASA GISTEMP v4 global mean temperature anomaly, relative to 1951-1980.
pub const DEFAULT_SERIES_URL: &str = "https://data.giss.nasa.gov/gistemp/graphs/graph_data/Global_Mean_Estimates_based_on_Land_and_Ocean_Data/graph.json";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Fetch(StatusCode),
    #[error("series body is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series {
    #[serde(rename = "x_data", deserialize_with = "labels_as_text")]
    pub labels: Vec<String>,
    #[serde(rename = "y_data")]
    pub values: Vec<f64>,
}

// Years usually arrive as numbers; the chart only needs their text.
fn labels_as_text<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Number(serde_json::Number),
    }

    let labels = Vec::<Label>::deserialize(deserializer)?;
    Ok(labels
        .into_iter()
        .map(|label| match label {
            Label::Text(text) => text,
            Label::Number(number) => number.to_string(),
        })
        .collect())
}

pub async fn fetch_series(client: &Client, url: &str) -> Result<Series, LoaderError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoaderError::Fetch(status));
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

pub fn series_chart(series: &Series) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        labels: series.labels.clone(),
        dataset: Dataset {
            label: "Global Temperature Anomaly (°C)".to_string(),
            data: series.values.clone(),
            border_color: "rgba(0, 123, 255, 1)".to_string(),
            background_colors: vec!["rgba(0, 123, 255, 0.1)".to_string()],
            border_width: 2,
            fill: true,
            tension: 0.1,
        },
        options: ChartOptions {
            begin_at_zero: false,
            x_title: Some("Year".to_string()),
            y_title: Some("Temperature Anomaly (°C)".to_string()),
        },
    }
}

/// Fetches the series and draws it. Failures are logged and nothing is
/// drawn; there is no retry.
pub async fn load_and_render_series<R>(
    client: &Client,
    url: &str,
    canvas: &Mutex<R>,
) -> Option<ChartHandle>
where
    R: ChartRenderer,
{
    match fetch_series(client, url).await {
        Ok(series) => {
            info!(points = series.values.len(), "loaded series from {url}");
            let handle = canvas.lock().await.draw(&series_chart(&series));
            Some(handle)
        }
        Err(err) => {
            error!("could not fetch or process series from {url}: {err}");
            None
        }
    }
}
