//! Datadog metrics publishing.
//!
//! Every step with both a start and a finish time becomes one gauge series
//! named `<prefix>.tasks`, with a single point at the finish time whose value
//! is the step duration in seconds.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::{
    config::DatadogConfig,
    error::{CollectorError, HttpResultExt, Result},
    models::BuildMetric,
    sink::MetricSink,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One time series submitted to the backend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub metric: String,

    /// `(epoch seconds, value)` pairs
    pub points: Vec<(i64, f64)>,

    #[serde(rename = "type")]
    pub kind: &'static str,

    pub tags: Vec<String>,
}

#[derive(Serialize)]
struct SeriesPayload<'a> {
    series: &'a [Series],
}

/// Builds the series for one build.
pub fn series_for(metric_name: &str, metric: &BuildMetric) -> Vec<Series> {
    metric
        .steps
        .iter()
        .filter_map(|step| {
            let finish = step.finish_time?;
            let duration = step.duration()?;
            Some(Series {
                metric: metric_name.to_string(),
                points: vec![(finish, duration as f64)],
                kind: "gauge",
                tags: step.tags(),
            })
        })
        .collect()
}

/// Publishes build metrics to the Datadog series API.
pub struct DatadogSink {
    http: Client,
    series_url: Url,
    api_key: String,
    app_key: Option<String>,
    metric_name: String,
}

impl DatadogSink {
    pub fn new(config: &DatadogConfig) -> Result<Self> {
        let series_url = Url::parse(&config.api_url)
            .and_then(|base| base.join("api/v1/series"))
            .map_err(|e| {
                CollectorError::invalid_input("datadog.api-url")
                    .with_reason(format!("{}: {e}", config.api_url))
            })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .http_context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            series_url,
            api_key: config.api_key.clone(),
            app_key: config.app_key.clone(),
            metric_name: format!("{}.tasks", config.metric_prefix),
        })
    }

    /// Name of the submitted metric.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }
}

#[async_trait]
impl MetricSink for DatadogSink {
    async fn emit(&mut self, metric: &BuildMetric) -> Result<()> {
        let series = series_for(&self.metric_name, metric);
        if series.is_empty() {
            debug!("Build {} has no completed steps to publish", metric.id);
            return Ok(());
        }

        let mut request = self
            .http
            .post(self.series_url.clone())
            .header("DD-API-KEY", &self.api_key)
            .json(&SeriesPayload { series: &series });
        if let Some(app_key) = &self.app_key {
            request = request.header("DD-APPLICATION-KEY", app_key);
        }

        let response = request
            .send()
            .await
            .http_context("Failed to submit series")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::Publish {
                message: format!("series API answered {status}: {body}"),
            });
        }

        info!(
            "Published {} series for build {} to {}",
            series.len(),
            metric.id,
            self.metric_name
        );
        Ok(())
    }
}
