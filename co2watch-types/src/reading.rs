//! A single CO2 measurement.

/// Where a reading's timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeOrigin {
    /// Capture time reported by the sensor gateway.
    Sensor,
    /// Local time at which the fetch carrying the reading completed.
    #[default]
    Received,
}

/// One CO2 concentration measurement.
///
/// Readings are immutable. The concentration is always finite and
/// non-negative; [`Reading::new`] refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    ppm: f64,
    observed_at_ms: u64,
    origin: TimeOrigin,
}

impl Reading {
    /// Create a reading observed at the given Unix time in milliseconds.
    ///
    /// Returns `None` if `ppm` is negative, NaN or infinite.
    pub fn new(ppm: f64, observed_at_ms: u64) -> Option<Self> {
        Self::with_origin(ppm, observed_at_ms, TimeOrigin::Received)
    }

    /// Create a reading and record where its timestamp came from.
    pub fn with_origin(ppm: f64, observed_at_ms: u64, origin: TimeOrigin) -> Option<Self> {
        if !is_usable_ppm(ppm) {
            return None;
        }
        Some(Self {
            ppm,
            observed_at_ms,
            origin,
        })
    }

    /// Concentration in parts per million.
    pub fn ppm(&self) -> f64 {
        self.ppm
    }

    /// Observation time, Unix milliseconds.
    pub fn observed_at_ms(&self) -> u64 {
        self.observed_at_ms
    }

    pub fn origin(&self) -> TimeOrigin {
        self.origin
    }
}

/// Whether a raw value can be used as a concentration.
pub fn is_usable_ppm(ppm: f64) -> bool {
    ppm.is_finite() && ppm >= 0.0
}
