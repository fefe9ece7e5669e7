//! Capture service seam.
//!
//! The engine never talks to hardware directly. A [`CaptureService`] yields a
//! single [`CaptureOutcome`] per call; [`SimulatedSensor`] stands in for a
//! device driver with a fixed delay and a random outcome.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use whorl_config::SensorSettings;
use whorl_types::CaptureOutcome;

/// Capture future type alias.
pub type CaptureFut = Pin<Box<dyn Future<Output = Result<CaptureOutcome, CaptureError>> + Send>>;

/// A capture that produced no outcome at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("sensor unavailable: {message}")]
    Unavailable { message: String },

    #[error("sensor did not respond within {}s", .after.as_secs())]
    TimedOut { after: Duration },
}

pub trait CaptureService: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str {
        "sensor"
    }

    /// Start one capture. The returned future resolves exactly once.
    fn attempt_capture(&self) -> CaptureFut;
}

/// Sensor stand-in: waits `delay`, then matches with `success_probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedSensor {
    delay: Duration,
    success_probability: f64,
}

impl SimulatedSensor {
    #[must_use]
    pub fn new(delay: Duration, success_probability: f64) -> Self {
        Self {
            delay,
            success_probability: success_probability.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SensorSettings) -> Self {
        Self::new(settings.delay, settings.success_probability)
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }
}

impl CaptureService for SimulatedSensor {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn attempt_capture(&self) -> CaptureFut {
        let delay = self.delay;
        let probability = self.success_probability;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let roll = rand::random::<f64>();
            let outcome = if roll < probability {
                CaptureOutcome::Matched
            } else {
                CaptureOutcome::Rejected
            };
            debug!(roll, probability, ?outcome, "Simulated capture finished");
            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{CaptureService, SimulatedSensor};
    use whorl_types::CaptureOutcome;

    #[tokio::test(start_paused = true)]
    async fn certain_success_always_matches_after_delay() {
        let sensor = SimulatedSensor::new(Duration::from_secs(3), 1.0);
        let started = Instant::now();
        let outcome = sensor.attempt_capture().await;
        assert_eq!(outcome, Ok(CaptureOutcome::Matched));
        assert!(started.elapsed() >= sensor.delay());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_probability_always_rejects() {
        let sensor = SimulatedSensor::new(Duration::from_millis(10), 0.0);
        for _ in 0..16 {
            assert_eq!(sensor.attempt_capture().await, Ok(CaptureOutcome::Rejected));
        }
    }

    #[test]
    fn probability_is_clamped() {
        let high = SimulatedSensor::new(Duration::ZERO, 7.0);
        let low = SimulatedSensor::new(Duration::ZERO, -1.0);
        assert!((high.success_probability() - 1.0).abs() < f64::EPSILON);
        assert!(low.success_probability().abs() < f64::EPSILON);
    }
}
