//! Wire format served by the sensor gateway.
//!
//! The gateway answers with a JSON array, newest first. It keeps its store as
//! CSV, so fields often arrive as strings:
//!
//! ```json
//! [{"timestamp": "757382400", "co2": "612.5"}, {"timestamp": 757382398, "co2": 598}]
//! ```
//!
//! Decoding is lenient per element: a missing, null, non-numeric or
//! out-of-range `co2` leaves [`Record::co2`] empty instead of failing the
//! whole payload. Only a body that is not a JSON array is a
//! [`FetchError::Parse`].

use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use serde_json::Value;

use co2watch_types::{is_usable_ppm, Reading, TimeOrigin};

use crate::error::FetchError;

/// Seconds between 1970-01-01 and 2000-01-01.
const Y2K_UNIX_OFFSET_SECS: f64 = 946_684_800.0;

/// Epoch the sensor clock counts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorEpoch {
    /// Seconds since 1970-01-01.
    #[default]
    Unix,
    /// Seconds since 2000-01-01, as kept by some microcontroller ports.
    Y2k,
}

impl SensorEpoch {
    /// Convert a sensor timestamp in seconds to Unix milliseconds.
    ///
    /// Negative or non-finite inputs yield `None`.
    pub fn to_unix_ms(self, seconds: f64) -> Option<u64> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        let unix_secs = match self {
            SensorEpoch::Unix => seconds,
            SensorEpoch::Y2k => seconds + Y2K_UNIX_OFFSET_SECS,
        };
        Some((unix_secs * 1000.0).round() as u64)
    }
}

/// One decoded gateway element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Record {
    /// Concentration if the element carried a usable one.
    pub co2: Option<f64>,
    /// Sensor capture time, Unix milliseconds.
    pub captured_at_ms: Option<u64>,
}

impl Record {
    /// Convert to a [`Reading`].
    ///
    /// Uses the sensor capture time when present, else `received_at_ms`.
    /// Returns `None` when there is no usable concentration.
    pub fn to_reading(&self, received_at_ms: u64) -> Option<Reading> {
        let ppm = self.co2?;
        match self.captured_at_ms {
            Some(at) => Reading::with_origin(ppm, at, TimeOrigin::Sensor),
            None => Reading::with_origin(ppm, received_at_ms, TimeOrigin::Received),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.co2.is_some()
    }
}

/// Raw element shape; both fields are optional on the wire.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default, deserialize_with = "lenient_number")]
    co2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    timestamp: Option<f64>,
}

/// Accept a JSON number or a string holding one; anything else is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Decode a gateway response body.
pub fn decode_records(body: &[u8], epoch: SensorEpoch) -> Result<Vec<Record>, FetchError> {
    // Elements stay raw and decode independently.
    let elements: Vec<&RawValue> =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    Ok(elements.into_iter().map(|element| decode_element(element, epoch)).collect())
}

fn decode_element(element: &RawValue, epoch: SensorEpoch) -> Record {
    // Non-object or undecodable elements yield an empty record.
    let Ok(wire) = serde_json::from_str::<WireRecord>(element.get()) else {
        return Record::default();
    };

    Record {
        co2: wire.co2.filter(|ppm| is_usable_ppm(*ppm)),
        captured_at_ms: wire.timestamp.and_then(|secs| epoch.to_unix_ms(secs)),
    }
}
