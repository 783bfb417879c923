//! The device-monitor screen: state, one fetch cycle, and the polling lifecycle.
//!
//! A [`DeviceMonitor`] is activated into a [`ScreenHandle`]. Activation spawns
//! a single task that runs a cycle immediately and then once per interval,
//! publishing a fresh [`ScreenState`] after each cycle. Tearing the handle
//! down cancels the task together with any in-flight request.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::auth::{Navigator, TokenProvider};
use crate::battery::{percent, BatteryMonitor, NoBattery};
use crate::client::{FetchOutcome, SensorFeedClient};
use crate::data::{LatestReading, SensorViewModel};
use crate::locale::Locale;

/// Default refresh interval: one hour.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_600_000);

/// Everything the presentation layer needs for one render.
///
/// Replaced wholesale after every cycle; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenState {
    pub view_model: SensorViewModel,
    pub latest: Option<LatestReading>,
    pub error_message: Option<String>,
    pub loading: bool,
}

impl ScreenState {
    /// State shown before the first cycle completes.
    pub fn initial() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Build the state for a completed cycle.
    pub fn from_outcome(outcome: FetchOutcome, locale: Locale) -> Self {
        match outcome {
            FetchOutcome::Ok { model, latest } => Self {
                view_model: model,
                latest: Some(latest),
                error_message: None,
                loading: false,
            },
            FetchOutcome::Empty { model, message } => Self {
                view_model: model,
                error_message: Some(message),
                ..Self::default()
            },
            FetchOutcome::FetchFailed { message } => Self {
                error_message: Some(message),
                ..Self::default()
            },
            FetchOutcome::Unauthorized => Self {
                error_message: Some(locale.session_expired().to_string()),
                ..Self::default()
            },
            FetchOutcome::NoToken => Self::default(),
        }
    }

    /// Copy of this state flagged as loading, shown while a refresh runs.
    pub fn refreshing(&self) -> Self {
        Self {
            loading: true,
            ..self.clone()
        }
    }
}

/// The screen before activation: its collaborators and refresh interval.
#[derive(Debug)]
pub struct DeviceMonitor {
    client: SensorFeedClient,
    tokens: Arc<dyn TokenProvider>,
    navigator: Arc<dyn Navigator>,
    battery: Box<dyn BatteryMonitor>,
    interval: Duration,
}

impl DeviceMonitor {
    pub fn new(
        client: SensorFeedClient,
        tokens: Arc<dyn TokenProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            tokens,
            navigator,
            battery: Box::new(NoBattery),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the refresh interval (clamped to at least 1ms).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_battery(mut self, battery: Box<dyn BatteryMonitor>) -> Self {
        self.battery = battery;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle: token lookup, fetch, and the auth side effects.
    ///
    /// Without a token, or on a 401, the navigator is asked to redirect to
    /// sign-in exactly once; a 401 also clears the stored token first.
    pub async fn run_cycle(&self) -> FetchOutcome {
        let outcome = match self.tokens.get_token().await {
            Some(token) => self.client.fetch(&token).await,
            None => FetchOutcome::NoToken,
        };

        match outcome {
            FetchOutcome::NoToken => {
                info!("No authentication token found, redirecting to sign-in");
                self.navigator.redirect_to_sign_in();
            }
            FetchOutcome::Unauthorized => {
                info!("Session expired, clearing token and redirecting to sign-in");
                self.tokens.clear_token().await;
                self.navigator.redirect_to_sign_in();
            }
            _ => {}
        }

        outcome
    }

    /// Start polling. Must be called from within a tokio runtime.
    ///
    /// The battery level is read once here.
    pub fn activate(self) -> ScreenHandle {
        let battery_percent = self.battery.level().map(percent);
        info!(
            source = self.client.source_description(),
            interval = ?self.interval,
            battery = ?battery_percent,
            "Activating device monitor"
        );

        let (tx, rx) = watch::channel(Arc::new(ScreenState::initial()));
        let task = tokio::spawn(self.poll_loop(tx));

        ScreenHandle {
            state: rx,
            task: Some(task),
            battery_percent,
        }
    }

    async fn poll_loop(self, tx: watch::Sender<Arc<ScreenState>>) {
        let locale = self.client.locale();
        let mut ticker = tokio::time::interval(self.interval);
        // A cycle that overruns the interval skips ticks instead of bunching them
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut first = true;

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                debug!("No screen state consumers left, stopping");
                break;
            }

            if !first {
                let previous = tx.borrow().clone();
                tx.send_replace(Arc::new(previous.refreshing()));
            }
            first = false;

            let outcome = self.run_cycle().await;
            debug!(outcome = outcome.kind(), "Fetch cycle complete");

            let sign_in = outcome.requires_sign_in();
            tx.send_replace(Arc::new(ScreenState::from_outcome(outcome, locale)));

            if sign_in {
                info!("Screen replaced by sign-in, polling stopped");
                break;
            }
        }
    }
}

/// A running screen. Owns the polling task.
///
/// Dropping the handle cancels the task; [`ScreenHandle::teardown`] also waits
/// for it to finish.
#[derive(Debug)]
pub struct ScreenHandle {
    state: watch::Receiver<Arc<ScreenState>>,
    task: Option<JoinHandle<()>>,
    battery_percent: Option<u8>,
}

impl ScreenHandle {
    /// The most recently published state.
    pub fn state(&self) -> Arc<ScreenState> {
        self.state.borrow().clone()
    }

    /// Wait for the next published state.
    ///
    /// Returns `None` once polling has stopped and every state has been seen.
    pub async fn changed(&mut self) -> Option<Arc<ScreenState>> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// An independent receiver for another consumer.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ScreenState>> {
        self.state.clone()
    }

    /// Battery charge in percent, read at activation.
    pub fn battery_percent(&self) -> Option<u8> {
        self.battery_percent
    }

    /// True once polling has stopped, e.g. after a sign-in redirect.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Cancel the timer and any in-flight fetch, and wait for the task to end.
    ///
    /// No state is published after this returns.
    pub async fn teardown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Device monitor torn down");
        }
    }
}

impl Drop for ScreenHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
