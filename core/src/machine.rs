//! Enrollment controller state machine.
//!
//! Transitions (two-phase):
//!
//! ```text
//! Select -advance-> Scanning -Matched-> CaptureOk -advance-> Confirming
//!    ^                 |                                         |
//!    |              Rejected                                  advance
//!    |                 v                                         v
//!    +----retry---- Rejected <-----------Rejected------- ConfirmScanning
//!                                                              |
//!                                                           Matched
//!                                                              v
//!                      Select <-------restart------------- FinalSuccess
//! ```
//!
//! The single-phase variant goes straight from `Scanning` to `Success` on a
//! matched capture.

use std::fmt;

use tracing::{debug, info};

use whorl_types::{
    CaptureOutcome, CapturePhase, EnrollmentSet, EnrollmentSnapshot, FlowVariant, Identifier,
    Intent, Step,
};

use crate::{IntentRejection, StaleCapture};

/// Monotonic token distinguishing capture requests.
///
/// Bumped whenever a capture starts and whenever the workflow is reset, so a
/// result carrying an older generation can never land on newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that the machine asked for a capture.
///
/// Only the machine mints tickets; the caller hands the ticket back together
/// with the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureTicket {
    generation: Generation,
    phase: CapturePhase,
}

impl CaptureTicket {
    #[must_use]
    pub fn generation(self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn phase(self) -> CapturePhase {
        self.phase
    }
}

/// How the workflow ended from the host's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    Cancelled,
    Finished { enrolled: EnrollmentSet },
}

/// What the caller must do after an accepted intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// State changed; nothing else to do.
    Updated,
    /// Invoke the capture service and report back with this ticket.
    StartCapture(CaptureTicket),
    /// The workflow exited. The machine is already back at `Select`.
    Exit(SessionExit),
}

/// What an applied capture result did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First capture matched; the confirming capture is next.
    FirstMatched,
    /// The selection was committed to the enrollment set.
    Committed { id: Identifier },
    /// The capture did not match (or never answered).
    Rejected { phase: CapturePhase },
}

#[derive(Debug, Clone)]
pub struct EnrollmentMachine {
    identifiers: Vec<Identifier>,
    variant: FlowVariant,
    step: Step,
    selection: Option<Identifier>,
    enrolled: EnrollmentSet,
    generation: Generation,
}

impl EnrollmentMachine {
    #[must_use]
    pub fn new(identifiers: Vec<Identifier>, variant: FlowVariant) -> Self {
        Self {
            identifiers,
            variant,
            step: Step::Select,
            selection: None,
            enrolled: EnrollmentSet::new(),
            generation: Generation::default(),
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Identifier> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn enrolled(&self) -> &EnrollmentSet {
        &self.enrolled
    }

    #[must_use]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    #[must_use]
    pub fn variant(&self) -> FlowVariant {
        self.variant
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.step.is_busy()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn snapshot(&self) -> EnrollmentSnapshot<'_> {
        EnrollmentSnapshot {
            step: self.step,
            selection: self.selection.as_ref(),
            enrolled: &self.enrolled,
            identifiers: &self.identifiers,
            variant: self.variant,
        }
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Effect, IntentRejection> {
        match intent {
            Intent::Choose(id) => self.choose(id),
            Intent::Advance => self.advance(),
            Intent::Cancel => self.cancel(),
            Intent::Retry => self.retry(),
            Intent::Restart => self.restart(),
            Intent::Finish => self.finish(),
        }
    }

    pub fn choose(&mut self, id: Identifier) -> Result<Effect, IntentRejection> {
        self.guard_idle("choose")?;
        self.require_step("choose", &[Step::Select])?;
        if !self.identifiers.contains(&id) {
            return Err(self.rejected("choose", IntentRejection::UnknownIdentifier { id }));
        }
        if self.enrolled.contains(&id) {
            return Err(self.rejected("choose", IntentRejection::AlreadyEnrolled { id }));
        }

        debug!(identifier = %id, "Selection changed");
        self.selection = Some(id);
        Ok(Effect::Updated)
    }

    pub fn advance(&mut self) -> Result<Effect, IntentRejection> {
        self.guard_idle("advance")?;
        match self.step {
            Step::Select => {
                if self.selection.is_none() {
                    return Err(self.rejected("advance", IntentRejection::NoSelection));
                }
                Ok(Effect::StartCapture(self.begin_capture(CapturePhase::First)))
            }
            Step::CaptureOk => {
                self.transition(Step::Confirming);
                Ok(Effect::Updated)
            }
            Step::Confirming => {
                if self.selection.is_none() {
                    return Err(self.rejected("advance", IntentRejection::NoSelection));
                }
                Ok(Effect::StartCapture(self.begin_capture(CapturePhase::Confirm)))
            }
            step => Err(self.rejected(
                "advance",
                IntentRejection::NotValidInStep {
                    intent: "advance",
                    step,
                },
            )),
        }
    }

    /// Leave the workflow. Accepted even while a capture is outstanding.
    pub fn cancel(&mut self) -> Result<Effect, IntentRejection> {
        self.require_step(
            "cancel",
            &[
                Step::Select,
                Step::Scanning,
                Step::Confirming,
                Step::ConfirmScanning,
                Step::Rejected,
            ],
        )?;
        self.reset();
        info!("Enrollment cancelled");
        Ok(Effect::Exit(SessionExit::Cancelled))
    }

    /// Back to `Select` after a rejection, keeping the selection.
    pub fn retry(&mut self) -> Result<Effect, IntentRejection> {
        self.guard_idle("retry")?;
        self.require_step("retry", &[Step::Rejected])?;
        self.transition(Step::Select);
        Ok(Effect::Updated)
    }

    /// "Enroll another": back to `Select` with nothing selected.
    pub fn restart(&mut self) -> Result<Effect, IntentRejection> {
        self.guard_idle("restart")?;
        self.require_step("restart", &[Step::FinalSuccess, Step::Success])?;
        self.reset();
        Ok(Effect::Updated)
    }

    pub fn finish(&mut self) -> Result<Effect, IntentRejection> {
        self.guard_idle("finish")?;
        self.require_step("finish", &[Step::FinalSuccess, Step::Success])?;
        let enrolled = self.enrolled.clone();
        self.reset();
        info!(enrolled = enrolled.len(), "Enrollment finished");
        Ok(Effect::Exit(SessionExit::Finished { enrolled }))
    }

    /// The host surface went away (backdrop click, close button, unmount).
    ///
    /// Always accepted. Any outstanding capture becomes stale.
    pub fn dismiss(&mut self) {
        if self.step != Step::Select || self.selection.is_some() {
            debug!(step = %self.step, "Host dismissed; resetting workflow");
        }
        self.reset();
    }

    /// Apply the outcome of the capture identified by `ticket`.
    pub fn resolve_capture(
        &mut self,
        ticket: CaptureTicket,
        outcome: CaptureOutcome,
    ) -> Result<Resolution, StaleCapture> {
        self.ensure_current(ticket)?;
        match outcome {
            CaptureOutcome::Rejected => Ok(self.reject_capture(ticket.phase)),
            CaptureOutcome::Matched => Ok(self.accept_capture(ticket.phase)),
        }
    }

    /// The capture service failed to produce an outcome at all.
    ///
    /// Handled like a rejected capture so the user lands on the retry path.
    pub fn fail_capture(
        &mut self,
        ticket: CaptureTicket,
        reason: &str,
    ) -> Result<Resolution, StaleCapture> {
        self.ensure_current(ticket)?;
        debug!(phase = ticket.phase.as_str(), reason, "Capture failed without an outcome");
        Ok(self.reject_capture(ticket.phase))
    }

    fn begin_capture(&mut self, phase: CapturePhase) -> CaptureTicket {
        self.generation = self.generation.next();
        self.transition(Step::scanning_for(phase));
        CaptureTicket {
            generation: self.generation,
            phase,
        }
    }

    fn accept_capture(&mut self, phase: CapturePhase) -> Resolution {
        if phase == CapturePhase::First && self.variant.requires_confirmation() {
            self.transition(Step::CaptureOk);
            return Resolution::FirstMatched;
        }

        // Scanning steps are only entered with a selection, and nothing
        // clears it while busy except reset(), which makes the ticket stale.
        let Some(id) = self.selection.take() else {
            debug!("Matched capture without a selection; treating as rejected");
            return self.reject_capture(phase);
        };
        self.enrolled.insert(id.clone());
        let committed = match self.variant {
            FlowVariant::TwoPhase => Step::FinalSuccess,
            FlowVariant::SinglePhase => Step::Success,
        };
        self.transition(committed);
        info!(identifier = %id, enrolled = self.enrolled.len(), "Identifier enrolled");
        Resolution::Committed { id }
    }

    fn reject_capture(&mut self, phase: CapturePhase) -> Resolution {
        info!(phase = phase.as_str(), "Capture rejected");
        self.transition(Step::Rejected);
        Resolution::Rejected { phase }
    }

    fn ensure_current(&self, ticket: CaptureTicket) -> Result<(), StaleCapture> {
        if ticket.generation == self.generation && self.step == Step::scanning_for(ticket.phase) {
            Ok(())
        } else {
            let stale = StaleCapture { ticket };
            debug!(current = %self.generation, step = %self.step, "{stale}");
            Err(stale)
        }
    }

    fn reset(&mut self) {
        self.generation = self.generation.next();
        self.step = Step::Select;
        self.selection = None;
    }

    fn transition(&mut self, next: Step) {
        debug!(from = %self.step, to = %next, "Step transition");
        self.step = next;
    }

    fn guard_idle(&self, intent: &'static str) -> Result<(), IntentRejection> {
        if self.is_busy() {
            return Err(self.rejected(intent, IntentRejection::Busy { intent }));
        }
        Ok(())
    }

    fn require_step(&self, intent: &'static str, allowed: &[Step]) -> Result<(), IntentRejection> {
        if allowed.contains(&self.step) {
            return Ok(());
        }
        Err(self.rejected(
            intent,
            IntentRejection::NotValidInStep {
                intent,
                step: self.step,
            },
        ))
    }

    fn rejected(&self, intent: &'static str, rejection: IntentRejection) -> IntentRejection {
        debug!(intent, step = %self.step, "Intent ignored: {rejection}");
        rejection
    }
}
