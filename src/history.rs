//! On-demand history loading with last-request-wins sequencing.
//!
//! Every load takes a token from a monotonic counter and publishes
//! `Loading` under the view lock. When its fetch resolves, the result is
//! published only if no newer load has started since; otherwise it is
//! dropped. A slow, stale response can therefore never overwrite the
//! result of a request the user issued later.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::data::history::{
    build_series, HistoryDisplay, HistoryView, RecordCount, SeriesOptions, SeriesOutcome,
};
use crate::source::ReadingSource;

/// What happened to a load's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was published to the view.
    Applied,
    /// A newer load started first; the result was discarded.
    Superseded,
}

/// Loads history on demand and publishes a [`HistoryView`].
#[derive(Debug)]
pub struct HistoryLoader {
    source: Arc<dyn ReadingSource>,
    options: SeriesOptions,
    selected: AtomicUsize,
    latest_token: AtomicU64,
    view_tx: watch::Sender<HistoryView>,
}

impl HistoryLoader {
    pub fn new(source: Arc<dyn ReadingSource>, options: SeriesOptions, count: RecordCount) -> Self {
        let (view_tx, _) = watch::channel(HistoryView::loading(count));
        Self {
            source,
            options,
            selected: AtomicUsize::new(count.get()),
            latest_token: AtomicU64::new(0),
            view_tx,
        }
    }

    /// A receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<HistoryView> {
        self.view_tx.subscribe()
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> HistoryView {
        self.view_tx.borrow().clone()
    }

    /// The record count the next [`refresh`](Self::refresh) will request.
    pub fn selected(&self) -> RecordCount {
        RecordCount::new(self.selected.load(Ordering::SeqCst)).unwrap_or_default()
    }

    /// Change the selected record count. Does not trigger a load.
    pub fn select(&self, count: RecordCount) {
        self.selected.store(count.get(), Ordering::SeqCst);
    }

    /// Load with the selected record count.
    pub async fn refresh(&self) -> LoadOutcome {
        self.load(self.selected()).await
    }

    /// Fetch `count` records and publish the resulting view.
    pub async fn load(&self, count: RecordCount) -> LoadOutcome {
        let mut token = 0;
        self.view_tx.send_modify(|view| {
            token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
            *view = HistoryView::loading(count);
        });
        debug!("History load #{} for {} records", token, count.get());

        let (fetched, display) = match self.source.fetch_records(count.get()).await {
            Ok(records) => {
                let display = match build_series(&records, &self.options) {
                    SeriesOutcome::Series(series) => {
                        info!(
                            "History: {} of {} records usable",
                            series.len(),
                            records.len()
                        );
                        HistoryDisplay::Rendered(series)
                    }
                    SeriesOutcome::NoData => {
                        warn!("History: no valid CO2 data in {} records", records.len());
                        HistoryDisplay::NoData
                    }
                };
                (Some(records.len()), display)
            }
            Err(e) => {
                warn!("History load failed: {}", e);
                (None, HistoryDisplay::Error(format!("Failed to fetch data: {}", e)))
            }
        };

        let applied = self.view_tx.send_if_modified(|view| {
            if self.latest_token.load(Ordering::SeqCst) != token {
                return false;
            }
            *view = HistoryView {
                count,
                fetched,
                display,
            };
            true
        });

        if applied {
            LoadOutcome::Applied
        } else {
            debug!("History load #{} superseded, discarding result", token);
            LoadOutcome::Superseded
        }
    }

    /// Start a refresh in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_refresh(self: &Arc<Self>) -> tokio::task::JoinHandle<LoadOutcome> {
        let loader = Arc::clone(self);
        tokio::spawn(async move { loader.refresh().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::testing::{records, ScriptedSource};

    fn count(n: usize) -> RecordCount {
        RecordCount::new(n).unwrap()
    }

    fn loader(source: &Arc<ScriptedSource>) -> Arc<HistoryLoader> {
        Arc::new(HistoryLoader::new(
            source.clone(),
            SeriesOptions::default(),
            RecordCount::default(),
        ))
    }

    fn rendered_values(view: &HistoryView) -> Vec<f64> {
        match view.display {
            HistoryDisplay::Rendered(ref series) => series.values().collect(),
            ref other => panic!("expected rendered view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_renders_series() {
        let source = Arc::new(ScriptedSource::new());
        source.push(Ok(records(&[Some(550.0), Some(900.0), Some(1300.0)])));
        let loader = loader(&source);

        assert_eq!(loader.load(count(5)).await, LoadOutcome::Applied);

        let view = loader.view();
        assert_eq!(view.count, count(5));
        assert_eq!(rendered_values(&view), vec![550.0, 900.0, 1300.0]);
        if let HistoryDisplay::Rendered(ref series) = view.display {
            assert_eq!(series.y_min, 500.0);
            assert_eq!(series.y_max, 1350.0);
        }
        assert_eq!(source.requested_counts(), vec![5]);
    }

    #[tokio::test]
    async fn test_partial_batch_uses_only_usable_records() {
        let source = Arc::new(ScriptedSource::new());
        let mut batch = vec![None; 10];
        batch[0] = Some(700.0);
        batch[4] = Some(640.0);
        batch[9] = Some(820.0);
        source.push(Ok(records(&batch)));
        let loader = loader(&source);

        loader.load(count(10)).await;

        let view = loader.view();
        assert_eq!(rendered_values(&view), vec![700.0, 640.0, 820.0]);

        if let HistoryDisplay::Rendered(ref series) = view.display {
            assert_eq!(series.y_min, 590.0);
            assert_eq!(series.y_max, 870.0);
        }
    }

    #[tokio::test]
    async fn test_title_counts_fetched_records() {
        let source = Arc::new(ScriptedSource::new());
        source.push(Ok(records(&[Some(610.0), None, None, Some(640.0)])));
        let loader = loader(&source);

        loader.load(count(10)).await;

        let view = loader.view();
        assert_eq!(view.fetched, Some(4));
        assert_eq!(rendered_values(&view).len(), 2);
        assert_eq!(view.title(), "CO2 Levels - Last 4 Readings");
    }

    #[tokio::test]
    async fn test_no_data_is_distinct_from_error() {
        let source = Arc::new(ScriptedSource::new());
        source.push(Ok(records(&[None, None])));
        source.push(Err(FetchError::HttpStatus(503)));
        let loader = loader(&source);

        loader.load(count(2)).await;
        assert_eq!(loader.view().display, HistoryDisplay::NoData);

        loader.load(count(2)).await;
        assert_eq!(
            loader.view().display,
            HistoryDisplay::Error("Failed to fetch data: HTTP error! Status: 503".to_string())
        );
    }

    #[tokio::test]
    async fn test_view_is_loading_while_fetch_outstanding() {
        let source = Arc::new(ScriptedSource::new());
        let gate = source.push_gated(Ok(records(&[Some(600.0)])));
        let loader = loader(&source);
        let mut rx = loader.subscribe();

        let task = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(count(20)).await })
        };
        rx.wait_for(|v| v.display.is_loading() && v.count == count(20)).await.unwrap();

        gate.send(()).unwrap();
        assert_eq!(task.await.unwrap(), LoadOutcome::Applied);
        assert_eq!(rendered_values(&loader.view()), vec![600.0]);
    }

    #[tokio::test]
    async fn test_last_request_wins_when_first_resolves_late() {
        let source = Arc::new(ScriptedSource::new());
        let first_gate = source.push_gated(Ok(records(&[Some(400.0)])));
        source.push(Ok(records(&[Some(900.0), Some(950.0)])));
        let loader = loader(&source);

        let first = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(count(5)).await })
        };
        while source.calls() < 1 {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.load(count(10)).await, LoadOutcome::Applied);

        first_gate.send(()).unwrap();
        assert_eq!(first.await.unwrap(), LoadOutcome::Superseded);

        let view = loader.view();
        assert_eq!(view.count, count(10));
        assert_eq!(rendered_values(&view), vec![900.0, 950.0]);
    }

    #[tokio::test]
    async fn test_in_order_resolution_keeps_latest() {
        let source = Arc::new(ScriptedSource::new());
        source.push(Ok(records(&[Some(400.0)])));
        source.push(Ok(records(&[Some(500.0)])));
        let loader = loader(&source);

        assert_eq!(loader.load(count(2)).await, LoadOutcome::Applied);
        assert_eq!(loader.load(count(5)).await, LoadOutcome::Applied);
        assert_eq!(rendered_values(&loader.view()), vec![500.0]);
    }

    #[tokio::test]
    async fn test_refresh_uses_selected_count() {
        let source = Arc::new(ScriptedSource::new());
        source.push(Ok(records(&[Some(400.0)])));
        source.push(Ok(records(&[Some(410.0)])));
        let loader = loader(&source);

        assert_eq!(loader.selected(), RecordCount::default());
        loader.refresh().await;

        loader.select(count(75));
        assert_eq!(loader.selected(), count(75));
        // Selecting alone does not fetch.
        assert_eq!(source.calls(), 1);

        loader.spawn_refresh().await.unwrap();
        assert_eq!(source.requested_counts(), vec![10, 75]);
        assert_eq!(loader.view().count, count(75));
    }
}
