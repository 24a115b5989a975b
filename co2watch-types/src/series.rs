//! Chart-ready history output.

use crate::reading::is_usable_ppm;

/// One labelled value on the history chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesPoint {
    /// Recency label shown on the X axis (e.g. "3 readings ago").
    pub label: String,
    /// Concentration in ppm.
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// An ordered series of points plus padded Y-axis bounds.
///
/// Points keep the order in which the gateway returned them, so index 0 is
/// the most recent reading. The bounds always satisfy
/// `y_min = min(values) - pad` and `y_max = max(values) + pad`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSeries {
    pub points: Vec<SeriesPoint>,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartSeries {
    /// Build a series, computing bounds from the point values.
    ///
    /// Returns `None` when there are no points or any value is not a usable
    /// concentration; an empty chart has no meaningful range.
    pub fn with_padding(points: Vec<SeriesPoint>, pad: f64) -> Option<Self> {
        if points.iter().any(|p| !is_usable_ppm(p.value)) {
            return None;
        }
        let (min, max) = value_range(points.iter().map(|p| p.value))?;
        Some(Self {
            points,
            y_min: min - pad,
            y_max: max + pad,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis labels in point order.
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.points.iter().map(|p| p.label.as_str())
    }

    /// Point values in point order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// Minimum and maximum of a sequence, or `None` if it is empty.
fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(format!("p{}", i), *v))
            .collect()
    }

    #[test]
    fn test_bounds_are_padded_range() {
        let series = ChartSeries::with_padding(points(&[550.0, 900.0, 1300.0]), 50.0).unwrap();
        assert_eq!(series.y_min, 500.0);
        assert_eq!(series.y_max, 1350.0);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_single_point_still_has_range() {
        let series = ChartSeries::with_padding(points(&[700.0]), 50.0).unwrap();
        assert_eq!(series.y_min, 650.0);
        assert_eq!(series.y_max, 750.0);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        assert!(ChartSeries::with_padding(Vec::new(), 50.0).is_none());
    }

    #[test]
    fn test_unusable_value_is_rejected() {
        assert!(ChartSeries::with_padding(points(&[500.0, f64::NAN]), 50.0).is_none());
    }

    #[test]
    fn test_order_is_preserved() {
        let series = ChartSeries::with_padding(points(&[3.0, 1.0, 2.0]), 0.0).unwrap();
        let values: Vec<f64> = series.values().collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
        let labels: Vec<&str> = series.labels().collect();
        assert_eq!(labels, vec!["p0", "p1", "p2"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_series_serializes_as_plain_json() {
        let series = ChartSeries::with_padding(points(&[600.0]), 50.0).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["y_min"], 550.0);
        assert_eq!(json["points"][0]["label"], "p0");
    }
}
