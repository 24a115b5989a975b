//! # co2watch-types
//!
//! Value types passed between the co2watch acquisition pipeline and whatever
//! renders it. Nothing here performs I/O.
//!
//! - [`Reading`]: one validated CO2 measurement with its observation time
//! - [`SeriesPoint`] and [`ChartSeries`]: chart-ready history output with
//!   padded Y-axis bounds
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` on all types
//!
//! ## Example
//!
//! ```rust
//! use co2watch_types::{ChartSeries, Reading, SeriesPoint};
//!
//! let reading = Reading::new(612.5, 1_703_160_000_000).expect("valid ppm");
//! assert_eq!(reading.ppm(), 612.5);
//!
//! let points = vec![
//!     SeriesPoint::new("Now", 550.0),
//!     SeriesPoint::new("1 reading ago", 900.0),
//! ];
//! let series = ChartSeries::with_padding(points, 50.0).expect("non-empty");
//! assert_eq!(series.y_min, 500.0);
//! assert_eq!(series.y_max, 950.0);
//! ```

mod reading;
mod series;

pub use reading::*;
pub use series::*;

/// Padding applied above and below the data range of a chart.
pub const DEFAULT_Y_PADDING: f64 = 50.0;
