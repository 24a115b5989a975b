//! Live view state and its transition function.
//!
//! [`LiveState`] is a plain value. Every change goes through
//! [`LiveState::apply`], a pure `(state, event) -> state` function; the
//! scheduler in [`crate::poller`] only produces events.

use co2watch_types::Reading;
use time::OffsetDateTime;

use super::status::{classify, StatusBand};

/// Phase of the live poller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// Not started, or stopped.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Fetching,
    /// The last fetch succeeded.
    Updated,
    /// The last fetch failed.
    Failed,
}

impl PollPhase {
    pub fn label(&self) -> &'static str {
        match self {
            PollPhase::Idle => "idle",
            PollPhase::Fetching => "fetching",
            PollPhase::Updated => "updated",
            PollPhase::Failed => "failed",
        }
    }
}

/// Inputs to the live state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// A fetch was issued.
    FetchStarted,
    /// A fetch completed with a reading.
    FetchSucceeded {
        reading: Reading,
        completed_at: OffsetDateTime,
    },
    /// A fetch failed; `message` is shown to the user.
    FetchFailed { message: String },
    /// The wall-clock display timer fired.
    ClockTick { now: OffsetDateTime },
    /// The poller was torn down.
    Stopped,
}

/// View model for the live view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveState {
    pub phase: PollPhase,
    /// Most recent successfully fetched reading. Survives later failures.
    pub latest: Option<Reading>,
    /// Message from the most recent failure, cleared by the next success.
    pub last_fetch_error: Option<String>,
    /// Completion time of the most recent successful fetch.
    pub last_updated_at: Option<OffsetDateTime>,
    /// Wall-clock display value, refreshed by its own timer.
    pub clock: Option<OffsetDateTime>,
    pub consecutive_failures: u32,
}

/// What the live view should show, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiveDisplay<'a> {
    /// A fetch error is present; it hides everything else.
    Error(&'a str),
    /// No reading has arrived yet.
    Loading,
    /// Show the reading with its band.
    Reading {
        reading: &'a Reading,
        status: StatusBand,
    },
}

impl LiveState {
    /// Apply one event and return the next state.
    pub fn apply(self, event: LiveEvent) -> Self {
        match event {
            LiveEvent::FetchStarted => Self {
                phase: PollPhase::Fetching,
                ..self
            },
            LiveEvent::FetchSucceeded {
                reading,
                completed_at,
            } => Self {
                phase: PollPhase::Updated,
                latest: Some(reading),
                last_fetch_error: None,
                last_updated_at: Some(completed_at),
                consecutive_failures: 0,
                ..self
            },
            LiveEvent::FetchFailed { message } => Self {
                phase: PollPhase::Failed,
                last_fetch_error: Some(message),
                consecutive_failures: self.consecutive_failures.saturating_add(1),
                ..self
            },
            LiveEvent::ClockTick { now } => Self {
                clock: Some(now),
                ..self
            },
            LiveEvent::Stopped => Self {
                phase: PollPhase::Idle,
                ..self
            },
        }
    }

    /// Band of the latest reading, Loading if there is none.
    pub fn status(&self) -> StatusBand {
        classify(self.latest.map(|r| r.ppm()))
    }

    /// Decide what to show.
    pub fn display(&self) -> LiveDisplay<'_> {
        if let Some(ref message) = self.last_fetch_error {
            return LiveDisplay::Error(message);
        }
        match self.latest {
            Some(ref reading) => LiveDisplay::Reading {
                reading,
                status: self.status(),
            },
            None => LiveDisplay::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(ppm: f64) -> Reading {
        Reading::new(ppm, 0).unwrap()
    }

    fn success(ppm: f64) -> LiveEvent {
        LiveEvent::FetchSucceeded {
            reading: reading(ppm),
            completed_at: datetime!(2024-01-01 12:00:00 UTC),
        }
    }

    fn failure(message: &str) -> LiveEvent {
        LiveEvent::FetchFailed {
            message: message.to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = LiveState::default();
        assert_eq!(state.phase, PollPhase::Idle);
        assert_eq!(state.status(), StatusBand::Loading);
        assert_eq!(state.display(), LiveDisplay::Loading);
    }

    #[test]
    fn test_success_updates_reading_and_status() {
        let state = LiveState::default().apply(LiveEvent::FetchStarted);
        assert_eq!(state.phase, PollPhase::Fetching);

        let state = state.apply(success(900.0));
        assert_eq!(state.phase, PollPhase::Updated);
        assert_eq!(state.latest.unwrap().ppm(), 900.0);
        assert_eq!(state.status(), StatusBand::Poor);
        assert_eq!(state.last_updated_at, Some(datetime!(2024-01-01 12:00:00 UTC)));
    }

    #[test]
    fn test_failure_keeps_last_good_reading() {
        let state = LiveState::default().apply(success(550.0)).apply(failure("HTTP error! Status: 503"));

        assert_eq!(state.phase, PollPhase::Failed);
        assert_eq!(state.latest.unwrap().ppm(), 550.0);
        assert_eq!(state.status(), StatusBand::Good);
        assert_eq!(state.display(), LiveDisplay::Error("HTTP error! Status: 503"));
        assert_eq!(state.last_updated_at, Some(datetime!(2024-01-01 12:00:00 UTC)));
    }

    #[test]
    fn test_failure_before_any_success_leaves_latest_absent() {
        let state = LiveState::default().apply(LiveEvent::FetchStarted).apply(failure("down"));
        assert!(state.latest.is_none());
        assert_eq!(state.status(), StatusBand::Loading);
        assert_eq!(state.consecutive_failures, 1);
    }

    #[test]
    fn test_alternating_results() {
        let mut state = LiveState::default();
        let script = [
            success(500.0),
            failure("a"),
            success(700.0),
            failure("b"),
            failure("c"),
            success(1300.0),
        ];
        let mut last_success = None;
        let mut last_failure = None;

        for event in script {
            match &event {
                LiveEvent::FetchSucceeded { reading, .. } => {
                    last_success = Some(reading.ppm());
                    last_failure = None;
                }
                LiveEvent::FetchFailed { message } => last_failure = Some(message.clone()),
                _ => {}
            }
            state = state.apply(LiveEvent::FetchStarted).apply(event);
            assert_eq!(state.latest.map(|r| r.ppm()), last_success);
            assert_eq!(state.last_fetch_error, last_failure);
        }
        assert_eq!(state.status(), StatusBand::Severe);
        assert_eq!(state.consecutive_failures, 0);
    }

    #[test]
    fn test_clock_tick_is_independent_of_fetch() {
        let now = datetime!(2024-06-01 08:30:00 UTC);
        let state = LiveState::default()
            .apply(LiveEvent::FetchStarted)
            .apply(LiveEvent::ClockTick { now });
        assert_eq!(state.phase, PollPhase::Fetching);
        assert_eq!(state.clock, Some(now));

        let state = state.apply(failure("x")).apply(LiveEvent::ClockTick { now });
        assert_eq!(state.clock, Some(now));
        assert_eq!(state.phase, PollPhase::Failed);
    }

    #[test]
    fn test_stopped_returns_to_idle() {
        let state = LiveState::default().apply(success(600.0)).apply(LiveEvent::Stopped);
        assert_eq!(state.phase, PollPhase::Idle);
        assert!(state.latest.is_some());
    }
}
