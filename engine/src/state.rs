//! In-flight capture bookkeeping.

use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;
use tracing::debug;

use whorl_core::CaptureTicket;
use whorl_types::CaptureOutcome;

use crate::capture::{CaptureError, CaptureFut};

/// A finished capture on its way back to the engine.
#[derive(Debug)]
pub(crate) struct CaptureCompletion {
    pub(crate) ticket: CaptureTicket,
    pub(crate) result: Result<CaptureOutcome, CaptureError>,
}

/// The capture task currently running, if any.
///
/// Dropping the handle does not stop the task; `abort` does. A task that
/// finished before the abort still delivers its completion, which the
/// machine then rejects as stale.
#[derive(Debug)]
pub(crate) struct InFlightCapture {
    ticket: CaptureTicket,
    abort_handle: AbortHandle,
}

impl InFlightCapture {
    /// Spawn `capture` bounded by `timeout`, reporting on `completions`.
    pub(crate) fn spawn(
        ticket: CaptureTicket,
        capture: CaptureFut,
        timeout: Duration,
        completions: mpsc::UnboundedSender<CaptureCompletion>,
    ) -> Self {
        let (abort_handle, registration) = AbortHandle::new_pair();

        let bounded = async move {
            match tokio::time::timeout(timeout, capture).await {
                Ok(result) => result,
                Err(_) => Err(CaptureError::TimedOut { after: timeout }),
            }
        };

        tokio::spawn(async move {
            match Abortable::new(bounded, registration).await {
                Ok(result) => {
                    // Receiver gone means the engine shut down; nothing to report to.
                    let _ = completions.send(CaptureCompletion { ticket, result });
                }
                Err(_aborted) => {
                    debug!(generation = %ticket.generation(), "Capture task aborted");
                }
            }
        });

        Self {
            ticket,
            abort_handle,
        }
    }

    pub(crate) fn ticket(&self) -> CaptureTicket {
        self.ticket
    }

    pub(crate) fn abort(self) {
        self.abort_handle.abort();
    }
}
