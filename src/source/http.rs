//! HTTP reading source.
//!
//! Queries the sensor gateway with `GET <gateway>?n=<count>` and decodes the
//! JSON array it returns.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::record::{decode_records, Record, SensorEpoch};
use super::ReadingSource;
use crate::error::FetchError;

/// Default request timeout. Shorter than the default poll cadence so a hung
/// gateway fails one cycle instead of stalling the next.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// A reading source backed by the gateway's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    gateway: Url,
    epoch: SensorEpoch,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// The gateway URL requests are sent to.
    pub fn gateway(&self) -> &Url {
        &self.gateway
    }

    fn request_url(&self, count: usize) -> Url {
        let mut url = self.gateway.clone();
        url.query_pairs_mut().append_pair("n", &count.to_string());
        url
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    async fn fetch_records(&self, count: usize) -> Result<Vec<Record>, FetchError> {
        if count == 0 {
            return Err(FetchError::InvalidCount);
        }

        let url = self.request_url(count);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let mut records = decode_records(&body, self.epoch)?;

        if records.len() > count {
            warn!(
                "Gateway returned {} records for n={}, dropping the surplus",
                records.len(),
                count
            );
            records.truncate(count);
        }

        Ok(records)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug)]
pub struct HttpSourceBuilder {
    gateway: Option<Url>,
    timeout: Duration,
    epoch: SensorEpoch,
}

impl Default for HttpSourceBuilder {
    fn default() -> Self {
        Self {
            gateway: None,
            timeout: DEFAULT_TIMEOUT,
            epoch: SensorEpoch::default(),
        }
    }
}

impl HttpSourceBuilder {
    /// Set the gateway endpoint (e.g. `http://10.217.55.246/json`).
    pub fn gateway(mut self, url: Url) -> Self {
        self.gateway = Some(url);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the epoch the sensor clock counts from.
    pub fn epoch(mut self, epoch: SensorEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let gateway = self
            .gateway
            .ok_or_else(|| FetchError::Config("no gateway URL configured".to_string()))?;
        let client = Client::builder().timeout(self.timeout).build()?;
        let description = format!("gateway: {}", gateway);

        Ok(HttpSource {
            client,
            gateway,
            epoch: self.epoch,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response on a loopback port.
    ///
    /// Returns the gateway URL and a receiver yielding the raw request line.
    async fn serve_once(status: &str, body: &str) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let url = format!("http://{}/json", addr).parse().unwrap();
        (url, rx)
    }

    fn source(url: Url) -> HttpSource {
        HttpSource::builder()
            .gateway(url)
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_count_and_decodes() {
        let (url, request) = serve_once("200 OK", r#"[{"co2": "612.5"}, {"co2": 598}]"#).await;
        let source = source(url);

        let records = source.fetch_records(5).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].co2, Some(612.5));

        let line = request.await.unwrap();
        assert!(line.starts_with("GET /json?n=5 "), "request line: {}", line);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (url, _request) = serve_once("503 Service Unavailable", "").await;
        let err = source(url).fetch_records(1).await.unwrap_err();
        assert_eq!(err, FetchError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (url, _request) = serve_once("200 OK", "not json").await;
        let err = source(url).fetch_records(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_surplus_records_are_dropped() {
        let (url, _request) = serve_once("200 OK", r#"[{"co2": 1}, {"co2": 2}, {"co2": 3}]"#).await;
        let records = source(url).fetch_records(2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].co2, Some(2.0));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/json", addr).parse().unwrap();
        let err = source(url).fetch_records(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_hung_gateway_times_out() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let source = HttpSource::builder()
            .gateway(format!("http://{}/json", addr).parse().unwrap())
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let err = source.fetch_records(1).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[test]
    fn test_missing_gateway_is_config_error() {
        let err = HttpSource::builder().build().unwrap_err();
        assert!(
            matches!(err, FetchError::Config(ref msg) if msg.contains("gateway")),
            "got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_zero_count_is_rejected() {
        let source = source("http://127.0.0.1:9/json".parse().unwrap());
        assert_eq!(source.fetch_records(0).await.unwrap_err(), FetchError::InvalidCount);
    }

    #[test]
    fn test_description_names_gateway() {
        let source = source("http://10.0.0.2/json".parse().unwrap());
        assert_eq!(source.description(), "gateway: http://10.0.0.2/json");
    }
}
