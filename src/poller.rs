//! Live poller: drives [`LiveState`] from two recurring timers.
//!
//! One tokio task owns the state. It selects over the fetch timer, the clock
//! timer, the in-flight fetch and a stop signal, turns whichever fires into a
//! [`LiveEvent`], applies it, and publishes the result on a watch channel.
//! Nothing else writes the state.
//!
//! A fetch tick that fires while the previous fetch is still outstanding is
//! skipped, so at most one request is in flight and results can never land
//! out of order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use co2watch_types::Reading;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::clock;
use crate::data::live::{LiveEvent, LiveState};
use crate::error::FetchError;
use crate::source::ReadingSource;

/// Default fetch and clock cadence.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

const MIN_INTERVAL: Duration = Duration::from_millis(10);

type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<Reading>, FetchError>> + Send>>;

/// Timer settings for [`LivePoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between fetches.
    pub fetch_interval: Duration,
    /// Time between wall-clock display refreshes.
    pub clock_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fetch_interval: DEFAULT_INTERVAL,
            clock_interval: DEFAULT_INTERVAL,
        }
    }
}

/// Spawns the live polling task.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use co2watch::{HttpSource, LivePoller, PollerConfig};
///
/// # tokio_test::block_on(async {
/// let url = "http://10.217.55.246/json".parse().unwrap();
/// let source = Arc::new(HttpSource::builder().gateway(url).build().unwrap());
///
/// let poller = LivePoller::spawn(source, PollerConfig::default());
/// let mut updates = poller.subscribe();
/// updates.changed().await.unwrap();
/// println!("{:?}", updates.borrow().status());
///
/// poller.shutdown().await;
/// # });
/// ```
#[derive(Debug)]
pub struct LivePoller;

impl LivePoller {
    /// Start polling. The first fetch is issued immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(source: Arc<dyn ReadingSource>, config: PollerConfig) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(LiveState::default());
        let (stop_tx, stop_rx) = watch::channel(false);

        info!(
            "Starting live poller on {} every {:?}",
            source.description(),
            config.fetch_interval
        );
        let task = tokio::spawn(run(source, config, state_tx, stop_rx));

        PollerHandle {
            state: state_rx,
            stop_tx,
            task: Some(task),
        }
    }
}

/// Handle for observing and stopping a running poller.
///
/// Dropping the handle stops the poller as well.
#[derive(Debug)]
pub struct PollerHandle {
    state: watch::Receiver<LiveState>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<LiveState> {
        self.state.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LiveState {
        self.state.borrow().clone()
    }

    /// Signal both timers to stop. Any in-flight fetch is abandoned.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait until the task has exited.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

async fn run(
    source: Arc<dyn ReadingSource>,
    config: PollerConfig,
    state_tx: watch::Sender<LiveState>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut state = LiveState::default();

    let mut fetch_timer = tokio::time::interval(config.fetch_interval.max(MIN_INTERVAL));
    fetch_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut clock_timer = tokio::time::interval(config.clock_interval.max(MIN_INTERVAL));
    clock_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight: Option<FetchFuture> = None;

    loop {
        let event = tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            result = poll_in_flight(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                fetch_event(result)
            }
            _ = fetch_timer.tick() => {
                if in_flight.is_some() {
                    debug!("Previous fetch still outstanding, skipping this tick");
                    continue;
                }
                let source = source.clone();
                in_flight = Some(Box::pin(async move { source.fetch_latest(1).await }));
                LiveEvent::FetchStarted
            }
            _ = clock_timer.tick() => LiveEvent::ClockTick { now: clock::now() },
        };

        state = state.apply(event);
        state_tx.send_replace(state.clone());
    }

    drop(in_flight);
    state_tx.send_replace(state.apply(LiveEvent::Stopped));
    info!("Live poller stopped");
}

async fn poll_in_flight(in_flight: &mut Option<FetchFuture>) -> Result<Vec<Reading>, FetchError> {
    match in_flight.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

fn fetch_event(result: Result<Vec<Reading>, FetchError>) -> LiveEvent {
    match result.map(|readings| readings.into_iter().next()) {
        Ok(Some(reading)) => {
            debug!("Fetched {} ppm", reading.ppm());
            LiveEvent::FetchSucceeded {
                reading,
                completed_at: clock::now(),
            }
        }
        Ok(None) => {
            warn!("Gateway returned no readings");
            LiveEvent::FetchFailed {
                message: "Failed to fetch CO2 data: gateway returned no readings".to_string(),
            }
        }
        Err(e) => {
            warn!("Fetch failed: {}", e);
            LiveEvent::FetchFailed {
                message: format!("Failed to fetch CO2 data: {}", e),
            }
        }
    }
}
