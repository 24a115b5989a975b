//! History chart data: record counts, point labels and series building.

use serde::Deserialize;
use time::UtcOffset;

use co2watch_types::{ChartSeries, SeriesPoint, DEFAULT_Y_PADDING};

use super::clock;
use crate::source::Record;

/// Record counts the history view may request.
pub const ALLOWED_RECORD_COUNTS: [usize; 8] = [2, 5, 10, 20, 30, 50, 75, 100];

/// Number of readings to chart. Always one of [`ALLOWED_RECORD_COUNTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordCount(usize);

impl RecordCount {
    /// Returns `None` unless `n` is an allowed count.
    pub fn new(n: usize) -> Option<Self> {
        ALLOWED_RECORD_COUNTS.contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Next larger allowed count, saturating at the largest.
    pub fn next(self) -> Self {
        ALLOWED_RECORD_COUNTS
            .iter()
            .copied()
            .find(|&n| n > self.0)
            .map_or(self, Self)
    }

    /// Next smaller allowed count, saturating at the smallest.
    pub fn prev(self) -> Self {
        ALLOWED_RECORD_COUNTS
            .iter()
            .rev()
            .copied()
            .find(|&n| n < self.0)
            .map_or(self, Self)
    }
}

impl Default for RecordCount {
    fn default() -> Self {
        Self(10)
    }
}

/// How history points are labelled on the X axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStyle {
    /// "Now", "1 reading ago", "2 readings ago", ...
    #[default]
    Ordinal,
    /// Sensor capture time as `HH:MM:SS`, ordinal when the sensor sent none.
    CaptureTime,
}

/// Label for the record at `index` in the fetched (newest-first) sequence.
pub fn ordinal_label(index: usize) -> String {
    match index {
        0 => "Now".to_string(),
        1 => "1 reading ago".to_string(),
        n => format!("{} readings ago", n),
    }
}

/// Options for turning records into a chart series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesOptions {
    pub padding: f64,
    pub labels: LabelStyle,
    /// Offset used for capture-time labels.
    pub offset: UtcOffset,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_Y_PADDING,
            labels: LabelStyle::default(),
            offset: UtcOffset::UTC,
        }
    }
}

/// Result of turning a fetched batch into chart data.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesOutcome {
    Series(ChartSeries),
    /// The fetch succeeded but no element had a usable concentration.
    NoData,
}

/// Build a chart series from fetched records.
///
/// Records without a usable concentration are skipped. Surviving points keep
/// source order, and each label reflects the record's position in the
/// *fetched* sequence, so a skipped record leaves a gap in recency.
pub fn build_series(records: &[Record], options: &SeriesOptions) -> SeriesOutcome {
    let points: Vec<SeriesPoint> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let value = record.co2?;
            Some(SeriesPoint::new(label_for(index, record, options), value))
        })
        .collect();

    match ChartSeries::with_padding(points, options.padding) {
        Some(series) => SeriesOutcome::Series(series),
        None => SeriesOutcome::NoData,
    }
}

fn label_for(index: usize, record: &Record, options: &SeriesOptions) -> String {
    match (options.labels, record.captured_at_ms) {
        (LabelStyle::CaptureTime, Some(ms)) => {
            clock::format_time_of_day(&clock::from_unix_ms(ms, options.offset))
        }
        _ => ordinal_label(index),
    }
}

/// What the history view should show. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryDisplay {
    Loading,
    Error(String),
    NoData,
    Rendered(ChartSeries),
}

impl HistoryDisplay {
    pub fn is_loading(&self) -> bool {
        matches!(self, HistoryDisplay::Loading)
    }
}

/// View model for the history view.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    /// Record count the display belongs to.
    pub count: RecordCount,
    /// Records the gateway returned, usable or not. `None` until a fetch
    /// succeeds.
    pub fetched: Option<usize>,
    pub display: HistoryDisplay,
}

impl HistoryView {
    pub fn loading(count: RecordCount) -> Self {
        Self {
            count,
            fetched: None,
            display: HistoryDisplay::Loading,
        }
    }

    /// Chart title, e.g. "CO2 Levels - Last 10 Readings".
    ///
    /// Counts every fetched record, including ones without a usable value.
    pub fn title(&self) -> String {
        let n = self.fetched.unwrap_or(self.count.get());
        format!("CO2 Levels - Last {} Readings", n)
    }
}

impl Default for HistoryView {
    fn default() -> Self {
        Self::loading(RecordCount::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Record;

    fn records(values: &[Option<f64>]) -> Vec<Record> {
        values
            .iter()
            .map(|co2| Record {
                co2: *co2,
                captured_at_ms: None,
            })
            .collect()
    }

    fn series(outcome: SeriesOutcome) -> ChartSeries {
        match outcome {
            SeriesOutcome::Series(s) => s,
            SeriesOutcome::NoData => panic!("expected a series"),
        }
    }

    #[test]
    fn test_example_series() {
        let s = series(build_series(
            &records(&[Some(550.0), Some(900.0), Some(1300.0)]),
            &SeriesOptions::default(),
        ));
        assert_eq!(s.y_min, 500.0);
        assert_eq!(s.y_max, 1350.0);
        let values: Vec<f64> = s.values().collect();
        assert_eq!(values, vec![550.0, 900.0, 1300.0]);
        let labels: Vec<&str> = s.labels().collect();
        assert_eq!(labels, vec!["Now", "1 reading ago", "2 readings ago"]);
    }

    #[test]
    fn test_partial_usable_records() {
        let input = records(&[
            None,
            Some(800.0),
            None,
            None,
            Some(620.0),
            None,
            None,
            Some(1010.0),
            None,
            None,
        ]);
        let s = series(build_series(&input, &SeriesOptions::default()));
        assert_eq!(s.len(), 3);
        assert_eq!(s.y_min, 570.0);
        assert_eq!(s.y_max, 1060.0);
        let labels: Vec<&str> = s.labels().collect();
        assert_eq!(labels, vec!["1 reading ago", "4 readings ago", "7 readings ago"]);
    }

    #[test]
    fn test_labels_are_distinct() {
        let input = records(&[Some(500.0); 20]);
        let s = series(build_series(&input, &SeriesOptions::default()));
        let mut labels: Vec<&str> = s.labels().collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 20);
    }

    #[test]
    fn test_no_usable_records() {
        assert_eq!(
            build_series(&records(&[None, None]), &SeriesOptions::default()),
            SeriesOutcome::NoData
        );
        assert_eq!(build_series(&[], &SeriesOptions::default()), SeriesOutcome::NoData);
    }

    #[test]
    fn test_bounds_match_min_max_for_any_set() {
        let sets: [&[f64]; 4] = [&[0.0], &[400.0, 400.0], &[1.5, 3000.25, 77.0], &[1e6, 2.0]];
        for set in sets {
            let input: Vec<Option<f64>> = set.iter().copied().map(Some).collect();
            let s = series(build_series(&records(&input), &SeriesOptions::default()));
            let min = set.iter().copied().fold(f64::INFINITY, f64::min);
            let max = set.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(s.y_min, min - 50.0);
            assert_eq!(s.y_max, max + 50.0);
        }
    }

    #[test]
    fn test_capture_time_labels_fall_back_to_ordinal() {
        let input = vec![
            Record {
                co2: Some(500.0),
                captured_at_ms: Some(1_704_164_645_000),
            },
            Record {
                co2: Some(510.0),
                captured_at_ms: None,
            },
        ];
        let options = SeriesOptions {
            labels: LabelStyle::CaptureTime,
            ..SeriesOptions::default()
        };
        let s = series(build_series(&input, &options));
        let labels: Vec<&str> = s.labels().collect();
        assert_eq!(labels, vec!["03:04:05", "1 reading ago"]);
    }

    #[test]
    fn test_record_count_set() {
        assert!(RecordCount::new(10).is_some());
        assert!(RecordCount::new(11).is_none());
        assert!(RecordCount::new(0).is_none());
        assert_eq!(RecordCount::default().get(), 10);
        assert_eq!(RecordCount::default().next().get(), 20);
        assert_eq!(RecordCount::default().prev().get(), 5);
        let max = RecordCount::new(100).unwrap();
        assert_eq!(max.next(), max);
        let min = RecordCount::new(2).unwrap();
        assert_eq!(min.prev(), min);
    }

    #[test]
    fn test_view_title() {
        let view = HistoryView::default();
        assert_eq!(view.title(), "CO2 Levels - Last 10 Readings");
        assert!(view.display.is_loading());
    }

    #[test]
    fn test_view_title_counts_unusable_records() {
        let fetched = records(&[Some(550.0), None, Some(900.0), None]);
        let display = match build_series(&fetched, &SeriesOptions::default()) {
            SeriesOutcome::Series(s) => HistoryDisplay::Rendered(s),
            SeriesOutcome::NoData => HistoryDisplay::NoData,
        };
        let view = HistoryView {
            count: RecordCount::new(5).unwrap(),
            fetched: Some(fetched.len()),
            display,
        };
        assert_eq!(view.title(), "CO2 Levels - Last 4 Readings");
    }
}
