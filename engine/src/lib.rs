//! Enrollment engine for whorl - orchestration without TUI dependencies.
//!
//! [`App`] wraps the synchronous [`EnrollmentMachine`] with everything that
//! needs a runtime: capture tasks, their timeout, cancellation, and the host
//! surface lifecycle. The frame loop drives it:
//!
//! ```text
//! host intent -> App::dispatch -> machine transition -> (spawn capture)
//! frame tick  -> App::process_capture_events -> machine.resolve_capture
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use whorl_config::{EnrollmentSettings, SensorSettings, WhorlConfig};
pub use whorl_core::{
    CaptureTicket, Effect, EnrollmentMachine, IntentRejection, Resolution, SessionExit,
};
pub use whorl_types::ui::{ModalEffect, ModalEffectKind, ModalVisibility, UiOptions, ViewState};
pub use whorl_types::{
    CaptureOutcome, CapturePhase, EnrollmentSet, EnrollmentSnapshot, FlowVariant, Identifier,
    Intent, Step,
};

mod capture;
mod state;

pub use capture::{CaptureError, CaptureFut, CaptureService, SimulatedSensor};

use state::{CaptureCompletion, InFlightCapture};

const OPEN_EFFECT_DURATION: Duration = Duration::from_millis(180);
const REJECT_EFFECT_DURATION: Duration = Duration::from_millis(360);
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    machine: EnrollmentMachine,
    sensor: Arc<dyn CaptureService>,
    capture_timeout: Duration,
    completions_tx: mpsc::UnboundedSender<CaptureCompletion>,
    completions_rx: mpsc::UnboundedReceiver<CaptureCompletion>,
    in_flight: Option<InFlightCapture>,
    view: ViewState,
    /// User-facing message about the last capture that produced no outcome.
    notice: Option<String>,
    exits: VecDeque<SessionExit>,
    last_finished: Option<EnrollmentSet>,
    tick: usize,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(
        settings: EnrollmentSettings,
        sensor: Arc<dyn CaptureService>,
        capture_timeout: Duration,
        ui_options: UiOptions,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        info!(
            variant = ?settings.variant,
            identifiers = settings.identifiers.len(),
            sensor = sensor.name(),
            "Enrollment engine ready"
        );
        Self {
            machine: EnrollmentMachine::new(settings.identifiers, settings.variant),
            sensor,
            capture_timeout,
            completions_tx,
            completions_rx,
            in_flight: None,
            view: ViewState::new(ui_options),
            notice: None,
            exits: VecDeque::new(),
            last_finished: None,
            tick: 0,
            should_quit: false,
        }
    }

    /// Build an app backed by the simulated sensor, as configured.
    #[must_use]
    pub fn from_config(config: Option<&WhorlConfig>) -> Self {
        let enrollment = EnrollmentSettings::from_config(config);
        let sensor = SensorSettings::from_config(config);
        Self::new(
            enrollment,
            Arc::new(SimulatedSensor::from_settings(&sensor)),
            sensor.timeout,
            whorl_config::ui_options(config),
        )
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> EnrollmentSnapshot<'_> {
        self.machine.snapshot()
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.machine.step()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.machine.is_busy()
    }

    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.view.is_modal_open()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.view.ui_options
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn capture_timeout(&self) -> Duration {
        self.capture_timeout
    }

    /// Enrollments reported by the most recent `finish`.
    #[must_use]
    pub fn last_finished(&self) -> Option<&EnrollmentSet> {
        self.last_finished.as_ref()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    // ------------------------------------------------------------------
    // Host surface lifecycle
    // ------------------------------------------------------------------

    pub fn open_modal(&mut self) {
        if self.view.is_modal_open() {
            return;
        }
        self.view.modal = ModalVisibility::Open;
        self.notice = None;
        self.start_effect(ModalEffect::pop_scale(OPEN_EFFECT_DURATION));
        debug!("Enrollment dialog opened");
    }

    /// Close the dialog without going through an intent (backdrop, close button).
    ///
    /// The step resets to `Select`; enrollments made this session are kept.
    pub fn dismiss_modal(&mut self) {
        if !self.view.is_modal_open() {
            return;
        }
        self.abort_capture();
        self.machine.dismiss();
        self.hide_modal();
        debug!("Enrollment dialog dismissed");
    }

    /// Leave the dialog: cancel where the step allows it, dismiss otherwise.
    pub fn close_modal(&mut self) {
        if !self.dispatch(Intent::Cancel) {
            self.dismiss_modal();
        }
    }

    /// Next exit report for the host (cancel or finish), oldest first.
    pub fn take_exit(&mut self) -> Option<SessionExit> {
        self.exits.pop_front()
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Apply a host intent. Returns whether it was accepted.
    ///
    /// Rejected intents leave every piece of state untouched.
    pub fn dispatch(&mut self, intent: Intent) -> bool {
        if !self.view.is_modal_open() {
            debug!(intent = intent.name(), "Intent ignored: dialog is closed");
            return false;
        }

        let retrying = matches!(intent, Intent::Retry);
        match self.machine.apply(intent) {
            Ok(Effect::Updated) => {
                if retrying {
                    self.notice = None;
                }
                true
            }
            Ok(Effect::StartCapture(ticket)) => {
                self.start_capture(ticket);
                true
            }
            Ok(Effect::Exit(exit)) => {
                self.abort_capture();
                if let SessionExit::Finished { enrolled } = &exit {
                    self.last_finished = Some(enrolled.clone());
                }
                self.exits.push_back(exit);
                self.hide_modal();
                true
            }
            Err(_) => false,
        }
    }

    pub fn choose(&mut self, id: Identifier) -> bool {
        self.dispatch(Intent::Choose(id))
    }

    pub fn advance(&mut self) -> bool {
        self.dispatch(Intent::Advance)
    }

    pub fn cancel(&mut self) -> bool {
        self.dispatch(Intent::Cancel)
    }

    pub fn retry(&mut self) -> bool {
        self.dispatch(Intent::Retry)
    }

    pub fn restart(&mut self) -> bool {
        self.dispatch(Intent::Restart)
    }

    pub fn finish(&mut self) -> bool {
        self.dispatch(Intent::Finish)
    }

    /// Choose the identifier at `index` in display order.
    pub fn choose_index(&mut self, index: usize) -> bool {
        let Some(id) = self.machine.identifiers().get(index).cloned() else {
            return false;
        };
        self.choose(id)
    }

    /// Move the selection to the next (or previous) selectable identifier.
    pub fn cycle_selection(&mut self, forward: bool) -> bool {
        let snapshot = self.machine.snapshot();
        let ids = snapshot.identifiers;
        if ids.is_empty() {
            return false;
        }
        let len = ids.len();
        let current = snapshot
            .selection
            .and_then(|sel| ids.iter().position(|id| id == sel));
        let start = match (current, forward) {
            (Some(i), true) => i + 1,
            (Some(i), false) => i + len - 1,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        let candidate = (0..len)
            .map(|offset| {
                let step = if forward { offset } else { len - offset };
                &ids[(start + step) % len]
            })
            .find(|id| snapshot.is_selectable(id))
            .cloned();

        match candidate {
            Some(id) => self.choose(id),
            None => false,
        }
    }

    /// The action bound to the primary key in the current step.
    pub fn primary_action(&mut self) -> bool {
        let intent = match self.machine.step() {
            Step::Select | Step::CaptureOk | Step::Confirming => Intent::Advance,
            Step::FinalSuccess | Step::Success => Intent::Finish,
            Step::Rejected => Intent::Retry,
            Step::Scanning | Step::ConfirmScanning => return false,
        };
        self.dispatch(intent)
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if now.saturating_duration_since(self.view.last_ui_tick) >= UI_TICK_INTERVAL {
            self.view.last_ui_tick = now;
            self.tick = self.tick.wrapping_add(1);
        }
    }

    /// Time since the previous call, for animation.
    pub fn frame_elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.view.last_frame);
        self.view.last_frame = now;
        elapsed
    }

    pub fn modal_effect_mut(&mut self) -> Option<&mut ModalEffect> {
        self.view.modal_effect.as_mut()
    }

    pub fn clear_modal_effect(&mut self) {
        self.view.modal_effect = None;
    }

    /// Drain finished captures without blocking and apply the current ones.
    pub fn process_capture_events(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
        }
    }

    /// Stop any running capture. Call before dropping the runtime.
    pub fn shutdown(&mut self) {
        self.abort_capture();
    }

    fn apply_completion(&mut self, completion: CaptureCompletion) {
        let CaptureCompletion { ticket, result } = completion;
        if self
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.ticket() == ticket)
        {
            self.in_flight = None;
        }

        let resolution = match &result {
            Ok(outcome) => self.machine.resolve_capture(ticket, *outcome),
            Err(err) => self.machine.fail_capture(ticket, &err.to_string()),
        };

        // Stale results were already logged by the machine.
        let Ok(resolution) = resolution else {
            return;
        };

        if let Err(err) = result {
            warn!(phase = ticket.phase().as_str(), "Capture produced no outcome: {err}");
            self.notice = Some(err.to_string());
        }

        if let Resolution::Rejected { .. } = resolution {
            self.start_effect(ModalEffect::shake(REJECT_EFFECT_DURATION));
        }
    }

    fn start_capture(&mut self, ticket: CaptureTicket) {
        self.abort_capture();
        self.notice = None;
        debug!(
            phase = ticket.phase().as_str(),
            generation = %ticket.generation(),
            sensor = self.sensor.name(),
            "Starting capture"
        );
        let capture = self.sensor.attempt_capture();
        self.in_flight = Some(InFlightCapture::spawn(
            ticket,
            capture,
            self.capture_timeout,
            self.completions_tx.clone(),
        ));
    }

    fn abort_capture(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            debug!(generation = %flight.ticket().generation(), "Aborting capture");
            flight.abort();
        }
    }

    fn hide_modal(&mut self) {
        self.view.modal = ModalVisibility::Closed;
        self.view.modal_effect = None;
    }

    fn start_effect(&mut self, effect: ModalEffect) {
        if self.view.ui_options.reduced_motion {
            return;
        }
        self.view.modal_effect = Some(effect);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.abort_capture();
    }
}

#[cfg(test)]
mod tests;
