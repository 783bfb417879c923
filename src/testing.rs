//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::auth::Navigator;
use crate::error::FetchError;
use crate::source::{RawSample, SensorResponse, SensorSource};

/// Holds a fetch open until the test releases it.
#[derive(Debug, Default)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

/// A sensor source that replays queued results, then repeats a fallback.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: Mutex<VecDeque<Result<SensorResponse, FetchError>>>,
    repeat: Option<SensorResponse>,
    gate: Option<Arc<Gate>>,
    calls: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every fetch with `response`.
    pub fn always(response: SensorResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::default()
        }
    }

    pub fn then(self, result: Result<SensorResponse, FetchError>) -> Self {
        self.queue.lock().push_back(result);
        self
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Shared call counter, readable after the source is moved.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Tokens seen by the source, in call order.
    pub fn tokens(&self) -> Arc<Mutex<Vec<String>>> {
        self.tokens.clone()
    }
}

#[async_trait]
impl SensorSource for ScriptedSource {
    async fn fetch(&self, token: &str) -> Result<SensorResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().push(token.to_string());

        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        match self.queue.lock().pop_front() {
            Some(result) => result,
            None => Ok(self.repeat.clone().unwrap_or_default()),
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

/// A navigator that counts redirects.
#[derive(Debug, Default, Clone)]
pub struct CountingNavigator {
    pub redirects: Arc<AtomicUsize>,
}

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_sign_in(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// A sample at the given UTC hour on 2024-05-01.
pub fn sample_at_hour(hour: u32, temperature: f64) -> RawSample {
    RawSample {
        timestamp: Some(format!("2024-05-01T{:02}:00:00Z", hour)),
        temperature: Some(temperature),
        humidity: Some(55.0),
        dew_point: Some(12.5),
        vpo: Some(1.1),
    }
}

pub fn response_with_hours(hours: &[u32]) -> SensorResponse {
    SensorResponse {
        data: hours.iter().map(|h| sample_at_hour(*h, 20.0 + *h as f64)).collect(),
    }
}
