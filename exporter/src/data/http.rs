//! HTTP sink for the InfluxDB 1.x write API
//!
//! Posts each batch as line protocol to `{url}/write?db=<database>&precision=<p>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use super::batch::BatchPoints;
use super::error::SinkError;
use super::sink::PointSink;
use crate::core::ExporterConfig;

const LINE_PROTOCOL_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Sink writing batches over HTTP
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    write_url: Url,
}

impl HttpSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let write_url = write_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, write_url })
    }

    pub fn from_config(config: &ExporterConfig) -> Result<Self, SinkError> {
        Self::new(&config.url, config.timeout())
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

fn write_url(base_url: &str) -> Result<Url, SinkError> {
    let mut base = Url::parse(base_url).map_err(|e| SinkError::InvalidUrl(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(SinkError::InvalidUrl(format!(
            "unsupported scheme: {}",
            base.scheme()
        )));
    }
    // Url::join replaces the last path segment unless the path ends with '/'
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("write")
        .map_err(|e| SinkError::InvalidUrl(e.to_string()))
}

#[async_trait]
impl PointSink for HttpSink {
    async fn write(&self, batch: &BatchPoints) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut url = self.write_url.clone();
        url.query_pairs_mut()
            .append_pair("db", batch.database())
            .append_pair("precision", batch.precision().as_str());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, LINE_PROTOCOL_CONTENT_TYPE)
            .body(batch.to_line_protocol())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::status(status.as_u16(), body.trim()));
        }

        tracing::debug!(
            points = batch.len(),
            database = %batch.database(),
            "Wrote batch to InfluxDB"
        );
        Ok(())
    }
}
