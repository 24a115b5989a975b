//! Data models: classification, live state and history series.
//!
//! Everything here is synchronous and free of I/O. The async pieces in
//! [`crate::poller`] and [`crate::history`] feed events and records in and
//! publish the resulting view models.
//!
//! ## Submodules
//!
//! - [`status`]: Band table and [`classify`]
//! - [`live`]: [`LiveState`] and its pure transition function
//! - [`history`]: Record counts, labels and [`build_series`]
//! - [`clock`]: Wall-clock helpers and display formats
//!
//! ## Data Flow
//!
//! ```text
//! ReadingSource::fetch_latest(1)          ReadingSource::fetch_records(n)
//!        │                                        │
//!        ▼                                        ▼
//! LiveState::apply(LiveEvent)             build_series(records, options)
//!        │                                        │
//!        └──▶ classify(ppm) ──▶ StatusBand        └──▶ HistoryView
//! ```

pub mod clock;
pub mod history;
pub mod live;
pub mod status;

pub use history::{
    build_series, HistoryDisplay, HistoryView, LabelStyle, RecordCount, SeriesOptions,
    SeriesOutcome, ALLOWED_RECORD_COUNTS,
};
pub use live::{LiveDisplay, LiveEvent, LiveState, PollPhase};
pub use status::{classify, gauge_ratio, Rgb, StatusBand, GAUGE_FULL_SCALE_PPM};
