//! Reading sources.
//!
//! This module provides a trait-based abstraction over fetching the most
//! recent readings from the sensor gateway, plus the HTTP implementation
//! used in production.

mod http;
mod record;

pub use http::{HttpSource, HttpSourceBuilder};
pub use record::{decode_records, Record, SensorEpoch};

use std::fmt::Debug;

use async_trait::async_trait;
use co2watch_types::Reading;

use crate::data::clock;
use crate::error::FetchError;

/// Trait for fetching readings from a sensor gateway.
///
/// Implementations perform one request per call and never retry; retrying is
/// the caller's business.
///
/// # Example
///
/// ```no_run
/// use co2watch::{HttpSource, ReadingSource};
///
/// # tokio_test::block_on(async {
/// let url = "http://10.217.55.246/json".parse().unwrap();
/// let source = HttpSource::builder().gateway(url).build().unwrap();
/// let readings = source.fetch_latest(1).await.unwrap();
/// println!("{} ppm", readings[0].ppm());
/// # });
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync + Debug {
    /// Fetch up to `count` records, newest first.
    ///
    /// Elements without a usable concentration are returned as records with
    /// an empty `co2`. The result never holds more than `count` records; a
    /// shorter result is valid.
    async fn fetch_records(&self, count: usize) -> Result<Vec<Record>, FetchError>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Fetch up to `count` readings, newest first.
    ///
    /// Fails with [`FetchError::Schema`] if any element lacks a usable
    /// concentration.
    async fn fetch_latest(&self, count: usize) -> Result<Vec<Reading>, FetchError> {
        let records = self.fetch_records(count).await?;
        let received_at = clock::now_unix_ms();

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record.to_reading(received_at).ok_or_else(|| {
                    FetchError::Schema(format!("element {} has no usable co2 value", index))
                })
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{records, ScriptedSource};
    use super::*;

    #[tokio::test]
    async fn test_fetch_latest_converts_records() {
        let source = ScriptedSource::new();
        source.push(Ok(records(&[Some(550.0), Some(900.0)])));

        let readings = source.fetch_latest(2).await.unwrap();
        let ppm: Vec<f64> = readings.iter().map(|r| r.ppm()).collect();
        assert_eq!(ppm, vec![550.0, 900.0]);
        assert_eq!(source.requested_counts(), vec![2]);
    }

    #[tokio::test]
    async fn test_fetch_latest_rejects_missing_field() {
        let source = ScriptedSource::new();
        source.push(Ok(records(&[Some(550.0), None])));

        let err = source.fetch_latest(2).await.unwrap_err();
        assert!(matches!(err, FetchError::Schema(ref msg) if msg.contains("element 1")));
    }

    #[tokio::test]
    async fn test_fetch_latest_passes_errors_through() {
        let source = ScriptedSource::new();
        source.push(Err(FetchError::HttpStatus(503)));

        assert_eq!(source.fetch_latest(1).await.unwrap_err(), FetchError::HttpStatus(503));
        assert_eq!(source.calls(), 1);
    }
}
