//! Per-step presentation of the enrollment dialog.
//!
//! Every [`Step`] maps to exactly one [`StepView`]. The match in
//! [`StepView::for_step`] has no wildcard arm, so adding a step without
//! deciding how it renders is a compile error.

use whorl_engine::{CapturePhase, Identifier, Step};

/// What the dialog body shows below the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBody {
    /// Identifier list with enrolled entries disabled.
    Picker,
    /// Spinner plus indeterminate progress for the outstanding capture.
    Scanning(CapturePhase),
    /// First capture accepted.
    Captured,
    /// Prompt for the confirming capture.
    AwaitConfirm,
    /// Enrollment committed.
    Enrolled,
    /// Capture rejected; retry path.
    Mismatch,
}

/// Accent used for the dialog border and headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Progress,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

const fn hint(key: &'static str, label: &'static str) -> KeyHint {
    KeyHint { key, label }
}

const SELECT_HINTS: &[KeyHint] = &[
    hint("↑↓", "select"),
    hint("1-9", "quick pick"),
    hint("Enter", "next"),
    hint("Esc", "cancel"),
];
const SCANNING_HINTS: &[KeyHint] = &[hint("Esc", "cancel")];
const CAPTURED_HINTS: &[KeyHint] = &[hint("Enter", "next")];
const CONFIRM_HINTS: &[KeyHint] = &[hint("Enter", "scan"), hint("Esc", "cancel")];
const ENROLLED_HINTS: &[KeyHint] = &[hint("a", "enroll another"), hint("Enter", "save")];
const REJECTED_HINTS: &[KeyHint] = &[hint("r", "try again"), hint("Esc", "close")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepView {
    pub step: Step,
    pub body: StepBody,
    pub tone: Tone,
    pub hints: &'static [KeyHint],
}

impl StepView {
    #[must_use]
    pub const fn for_step(step: Step) -> Self {
        let (body, tone, hints) = match step {
            Step::Select => (StepBody::Picker, Tone::Neutral, SELECT_HINTS),
            Step::Scanning => (
                StepBody::Scanning(CapturePhase::First),
                Tone::Progress,
                SCANNING_HINTS,
            ),
            Step::CaptureOk => (StepBody::Captured, Tone::Positive, CAPTURED_HINTS),
            Step::Confirming => (StepBody::AwaitConfirm, Tone::Progress, CONFIRM_HINTS),
            Step::ConfirmScanning => (
                StepBody::Scanning(CapturePhase::Confirm),
                Tone::Progress,
                SCANNING_HINTS,
            ),
            Step::FinalSuccess | Step::Success => {
                (StepBody::Enrolled, Tone::Positive, ENROLLED_HINTS)
            }
            Step::Rejected => (StepBody::Mismatch, Tone::Negative, REJECTED_HINTS),
        };
        Self {
            step,
            body,
            tone,
            hints,
        }
    }

    /// Headline shown under the dialog title.
    #[must_use]
    pub fn description(&self, selection: Option<&Identifier>) -> String {
        let finger = selection.map_or("finger", Identifier::as_str);
        match self.step {
            Step::Select => "Choose the finger you want to enroll.".to_string(),
            Step::Scanning => format!(
                "Place your {finger} on the sensor for the first reading. This can take up to a minute."
            ),
            Step::CaptureOk => "First reading completed.".to_string(),
            Step::Confirming => {
                format!("Place your {finger} on the sensor again to finish the enrollment.")
            }
            Step::ConfirmScanning => {
                "Checking the final reading. This can take up to a minute.".to_string()
            }
            Step::FinalSuccess => "Fingerprint enrollment completed.".to_string(),
            Step::Success => "Fingerprint enrolled.".to_string(),
            Step::Rejected => "The reading was not accepted.".to_string(),
        }
    }
}
