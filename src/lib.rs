//! # co2watch
//!
//! A terminal dashboard and library for a single networked CO2 sensor.
//!
//! The sensor gateway serves its most recent readings as a JSON array over
//! HTTP. This crate polls it for a live reading classified into a severity
//! band, and loads the last N readings on demand for a history chart.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────────┐    ┌──────┐    ┌─────────┐  │
//! │  │  app    │───▶│ poller       │───▶│  ui  │───▶│Terminal │  │
//! │  │ (views) │    │ history      │    │      │    │         │  │
//! │  └─────────┘    └──────┬───────┘    └──────┘    └─────────┘  │
//! │                        │  LiveState / HistoryView            │
//! │                        ▼                                     │
//! │                 ┌─────────────┐                              │
//! │                 │   source    │◀── HttpSource (gateway)      │
//! │                 └─────────────┘                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`ReadingSource`] trait and the HTTP gateway client
//! - **[`data`]**: Band classification, live state machine, series building
//! - **[`poller`]**: [`LivePoller`], the timer-driven live fetch loop
//! - **[`history`]**: [`HistoryLoader`], on-demand loads where the last request wins
//! - **[`config`](crate::config)**: Layered [`Settings`]
//! - **[`app`]** / **[`ui`]**: Terminal front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the default gateway
//! co2watch
//!
//! # Another gateway, faster polling, log to stderr without the TUI
//! co2watch --gateway http://192.168.1.40/json --interval 2 --headless
//! ```
//!
//! ### Classifying a reading
//!
//! ```
//! use co2watch::{classify, StatusBand};
//!
//! assert_eq!(classify(Some(550.0)), StatusBand::Good);
//! assert_eq!(classify(Some(1501.0)), StatusBand::Hazardous);
//! assert_eq!(classify(None).label(), "Loading...");
//! ```
//!
//! ### Loading history
//!
//! ```no_run
//! use std::sync::Arc;
//! use co2watch::{HistoryDisplay, HistoryLoader, HttpSource, RecordCount, SeriesOptions};
//!
//! # tokio_test::block_on(async {
//! let url = "http://10.217.55.246/json".parse().unwrap();
//! let source = Arc::new(HttpSource::builder().gateway(url).build().unwrap());
//! let loader = HistoryLoader::new(source, SeriesOptions::default(), RecordCount::default());
//!
//! loader.refresh().await;
//! if let HistoryDisplay::Rendered(series) = loader.view().display {
//!     println!("{} points, y in [{}, {}]", series.len(), series.y_min, series.y_max);
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod history;
pub mod poller;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use co2watch_types::{ChartSeries, Reading, SeriesPoint, TimeOrigin};
pub use crate::config::{ConfigError, Overrides, Settings};
pub use data::{
    build_series, classify, HistoryDisplay, HistoryView, LiveDisplay, LiveEvent, LiveState,
    PollPhase, RecordCount, SeriesOptions, StatusBand,
};
pub use error::FetchError;
pub use history::{HistoryLoader, LoadOutcome};
pub use poller::{LivePoller, PollerConfig, PollerHandle};
pub use source::{HttpSource, HttpSourceBuilder, ReadingSource, Record, SensorEpoch};
